//! Admin credential and auth request bodies.

use serde::{Deserialize, Serialize};

/// Logical key the single admin credential is stored under.
pub const ADMIN_KEY: &str = "admin";

/// Stored admin password hash.
///
/// `hash` is hex encoded. `salt` is kept as the hex string it was generated
/// as, and its bytes are what the key derivation consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCredential {
    pub hash: String,
    pub salt: String,
    pub iterations: u32,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}
