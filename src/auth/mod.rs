//! Admin authentication.
//!
//! The admin password is either a stored PBKDF2-HMAC-SHA256 credential or,
//! until one has been stored, a statically configured fallback password.
//! A successful login issues an opaque session cookie; the access gate only
//! checks that cookie's presence. There is no server-side session table, so
//! rotating the password does not revoke cookies already issued.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::models::AdminCredential;
use crate::store::CredentialStore;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "admin_auth";

/// Session lifetime in seconds (24 hours).
pub const SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 24;

/// Path unauthenticated requests are redirected to.
pub const LOGIN_PATH: &str = "/admin/login";

/// PBKDF2 rounds applied when a password is rotated.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

const DERIVED_KEY_LEN: usize = 32;
const SALT_LEN: usize = 16;

/// Which password check applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    /// Nothing stored yet: compare against the configured fallback password.
    NoCredentialConfigured,
    /// Compare a PBKDF2 derivation against the stored hash.
    CredentialStored(AdminCredential),
}

impl CredentialState {
    pub async fn load(store: &dyn CredentialStore) -> Result<Self, AppError> {
        Ok(match store.load().await? {
            Some(credential) => CredentialState::CredentialStored(credential),
            None => CredentialState::NoCredentialConfigured,
        })
    }

    /// Check `password` against this state.
    ///
    /// The fallback comparison is a plain string equality and is not
    /// constant-time. It is only reachable before a credential is stored.
    pub async fn verify(&self, password: &str, fallback_password: &str) -> Result<bool, AppError> {
        if password.is_empty() {
            return Ok(false);
        }

        match self {
            CredentialState::NoCredentialConfigured => Ok(password == fallback_password),
            CredentialState::CredentialStored(credential) => {
                let Ok(expected) = hex::decode(&credential.hash) else {
                    tracing::warn!("Stored admin hash is not valid hex");
                    return Ok(false);
                };
                let derived =
                    derive_key_blocking(password.to_string(), credential.salt.clone(), credential.iterations)
                        .await?;
                Ok(derived[..].ct_eq(&expected[..]).into())
            }
        }
    }
}

/// Verify a password against whatever the store currently holds.
pub async fn verify_password(
    store: &dyn CredentialStore,
    password: &str,
    fallback_password: &str,
) -> Result<bool, AppError> {
    CredentialState::load(store)
        .await?
        .verify(password, fallback_password)
        .await
}

/// Derive a credential for `new_password` with a fresh salt and store it,
/// replacing any previous credential.
pub async fn rotate_password(
    store: &dyn CredentialStore,
    new_password: &str,
) -> Result<AdminCredential, AppError> {
    let credential = new_credential(new_password.to_string(), DEFAULT_ITERATIONS).await?;
    store.save(&credential).await?;
    tracing::info!("Admin password rotated");
    Ok(credential)
}

async fn new_credential(password: String, iterations: u32) -> Result<AdminCredential, AppError> {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    let salt = hex::encode(salt);

    let derived = derive_key_blocking(password, salt.clone(), iterations).await?;

    Ok(AdminCredential {
        hash: hex::encode(derived),
        salt,
        iterations,
        updated_at: Utc::now().to_rfc3339(),
    })
}

/// PBKDF2-HMAC-SHA256 over the salt string's bytes.
pub fn derive_key(password: &str, salt: &str, iterations: u32) -> [u8; DERIVED_KEY_LEN] {
    let mut key = [0u8; DERIVED_KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);
    key
}

async fn derive_key_blocking(
    password: String,
    salt: String,
    iterations: u32,
) -> Result<[u8; DERIVED_KEY_LEN], AppError> {
    tokio::task::spawn_blocking(move || derive_key(&password, &salt, iterations))
        .await
        .map_err(|e| AppError::Internal(format!("Key derivation task failed: {}", e)))
}

// ==================== SESSION COOKIE ====================

/// `Set-Cookie` value issued on successful login.
pub fn session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=1; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, SESSION_MAX_AGE_SECS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Whether the request carries a non-empty session cookie.
pub fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name == SESSION_COOKIE && !value.is_empty())
}

pub fn set_cookie_header(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Internal(format!("Invalid cookie header: {}", e)))
}

// ==================== ACCESS GATE ====================

/// Outcome of the access gate for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin,
}

/// Whether `path` is an admin path that needs a session.
pub fn is_protected(path: &str) -> bool {
    let admin = path.starts_with("/admin") && !path.starts_with(LOGIN_PATH);
    admin || path.starts_with("/dashboard")
}

/// Decide whether a request may reach its handler.
pub fn access_gate(path: &str, session_present: bool) -> GateDecision {
    if is_protected(path) && !session_present {
        GateDecision::RedirectToLogin
    } else {
        GateDecision::Allow
    }
}

/// Middleware applying [`access_gate`] ahead of every handler.
pub async fn access_gate_layer(request: Request, next: Next) -> Response {
    let session_present = has_session(request.headers());

    match access_gate(request.uri().path(), session_present) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RedirectToLogin => {
            tracing::debug!(path = request.uri().path(), "Redirecting to login");
            Redirect::temporary(LOGIN_PATH).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FileRepository;
    use tempfile::TempDir;

    fn stored(password: &str, salt: &str, iterations: u32) -> CredentialState {
        CredentialState::CredentialStored(AdminCredential {
            hash: hex::encode(derive_key(password, salt, iterations)),
            salt: salt.to_string(),
            iterations,
            updated_at: Utc::now().to_rfc3339(),
        })
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        let a = derive_key("secret", "00ff", 10);
        assert_eq!(a, derive_key("secret", "00ff", 10));
        assert_ne!(a, derive_key("secret", "00fe", 10));
        assert_ne!(a, derive_key("secret", "00ff", 11));
    }

    #[tokio::test]
    async fn test_stored_credential_verify() {
        let state = stored("s3cret!", "a1b2c3", 1_000);

        assert!(state.verify("s3cret!", "admin123").await.unwrap());
        assert!(!state.verify("s3cret", "admin123").await.unwrap());
        assert!(!state.verify("", "admin123").await.unwrap());
        // The fallback no longer applies once a credential exists
        assert!(!state.verify("admin123", "admin123").await.unwrap());
    }

    #[tokio::test]
    async fn test_stored_iterations_are_used() {
        // Hash produced with 500 rounds must not verify under a different count
        let mut state = stored("pw", "salt", 500);
        if let CredentialState::CredentialStored(c) = &mut state {
            c.iterations = 501;
        }
        assert!(!state.verify("pw", "x").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_fails_closed() {
        let state = CredentialState::CredentialStored(AdminCredential {
            hash: "not-hex".into(),
            salt: "abc".into(),
            iterations: 10,
            updated_at: String::new(),
        });
        assert!(!state.verify("anything", "x").await.unwrap());
    }

    #[tokio::test]
    async fn test_fallback_password() {
        let state = CredentialState::NoCredentialConfigured;
        assert!(state.verify("admin123", "admin123").await.unwrap());
        assert!(!state.verify("admin1234", "admin123").await.unwrap());
        assert!(!state.verify("", "admin123").await.unwrap());
    }

    #[tokio::test]
    async fn test_rotate_replaces_fallback() {
        let dir = TempDir::new().unwrap();
        let store = FileRepository::new(dir.path());

        assert!(verify_password(&store, "admin123", "admin123").await.unwrap());

        let credential = rotate_password(&store, "new-password").await.unwrap();
        assert_eq!(credential.iterations, DEFAULT_ITERATIONS);
        assert_eq!(credential.salt.len(), SALT_LEN * 2);

        assert!(verify_password(&store, "new-password", "admin123").await.unwrap());
        assert!(!verify_password(&store, "admin123", "admin123").await.unwrap());
    }

    #[tokio::test]
    async fn test_rotate_uses_fresh_salt() {
        let dir = TempDir::new().unwrap();
        let store = FileRepository::new(dir.path());

        let first = rotate_password(&store, "same").await.unwrap();
        let second = rotate_password(&store, "same").await.unwrap();
        assert_ne!(first.salt, second.salt);
        assert_ne!(first.hash, second.hash);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(false);
        assert!(cookie.starts_with("admin_auth=1"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));
        assert!(session_cookie(true).ends_with("; Secure"));
    }

    #[test]
    fn test_has_session() {
        let mut headers = HeaderMap::new();
        assert!(!has_session(&headers));

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; admin_auth=1"));
        assert!(has_session(&headers));

        headers.insert(header::COOKIE, HeaderValue::from_static("admin_auth="));
        assert!(!has_session(&headers));
    }

    #[test]
    fn test_access_gate() {
        assert_eq!(access_gate("/admin", false), GateDecision::RedirectToLogin);
        assert_eq!(access_gate("/admin/tours", false), GateDecision::RedirectToLogin);
        assert_eq!(access_gate("/dashboard", false), GateDecision::RedirectToLogin);
        assert_eq!(access_gate("/dashboard/x", false), GateDecision::RedirectToLogin);
        assert_eq!(access_gate("/admin", true), GateDecision::Allow);
        assert_eq!(access_gate("/admin/login", false), GateDecision::Allow);
        assert_eq!(access_gate("/api/admin/login", false), GateDecision::Allow);
        assert_eq!(access_gate("/api/tours", false), GateDecision::Allow);
        assert_eq!(access_gate("/", false), GateDecision::Allow);
    }
}
