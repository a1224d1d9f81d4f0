//! REST API module.
//!
//! Handlers are thin: validate the body, call one store, shape the response.

mod admin;
mod carousel;
mod content;
mod dashboard;
mod tours;
mod upload;

pub use admin::*;
pub use carousel::*;
pub use content::*;
pub use dashboard::*;
pub use tours::*;
pub use upload::*;

use serde::{Deserialize, Serialize};

/// Response type for every handler; errors render as the error envelope.
pub type ApiResult<T> = Result<T, crate::errors::AppError>;

/// `{ "success": true }` acknowledgement.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
