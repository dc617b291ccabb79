//! Response DTOs
//!
//! Data structures for API response bodies. Entities and service views
//! already serialize in wire format; only composite bodies live here.

use serde::Serialize;

use crate::application::services::AuthTokens;
use crate::domain::User;

/// Registration and login response (user plus tokens)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    #[serde(flatten)]
    pub tokens: AuthTokens,
}

impl From<(User, AuthTokens)> for AuthResponse {
    fn from((user, tokens): (User, AuthTokens)) -> Self {
        Self { user, tokens }
    }
}

/// Background removal result
#[derive(Debug, Serialize)]
pub struct ImageResponse {
    /// `data:image/png;base64,...`
    pub image: String,
}
