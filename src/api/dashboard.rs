//! Back-office landing endpoints behind the access gate.

use axum::{extract::State, response::Html, Json};
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::AppState;

/// Summary of what the back-office currently manages.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub backend: String,
    pub tours: usize,
    pub carousel_slides: usize,
    pub about_configured: bool,
    pub contact_configured: bool,
    pub credential_stored: bool,
}

/// GET /admin, GET /dashboard
pub async fn overview(State(state): State<AppState>) -> ApiResult<Json<Overview>> {
    let stores = &state.stores;

    Ok(Json(Overview {
        backend: stores.backend.to_string(),
        tours: stores.tours.list_all().await?.len(),
        carousel_slides: stores.carousel.list().await?.len(),
        about_configured: stores.content.get_about().await?.is_some(),
        contact_configured: stores.content.get_contact().await?.is_some(),
        credential_stored: stores.credentials.load().await?.is_some(),
    }))
}

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Admin login</title></head>
<body>
<h1>Admin login</h1>
<p>Sign in with <code>POST /api/admin/login</code> and a JSON body <code>{"password": "..."}</code>.</p>
</body>
</html>
"#;

/// GET /admin/login
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}
