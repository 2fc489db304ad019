//! Vault HTTP API wire types.

use serde::{Deserialize, Serialize};

use vaultlink_protocols::UnlockSummary;

#[derive(Debug, Serialize)]
pub struct UnlockRequest<'a> {
    pub password: &'a str,
}

/// `POST /unlock` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnlockGrant {
    pub token: String,
    #[serde(default)]
    pub summary: UnlockSummary,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResponse {
    pub password: String,
}

/// Error body some endpoints return: `{"error": "..."}` or `{"message": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Best human-readable message from a raw response body.
    pub fn message_from(body: &str) -> String {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .unwrap_or_else(|| body.to_string())
    }
}
