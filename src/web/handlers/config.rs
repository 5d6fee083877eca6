//! Runtime config handlers.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::AppState;
use crate::sync::RuntimeConfig;

/// Password check request.
#[derive(Debug, Deserialize)]
pub struct VerifyPasswordRequest {
    /// Candidate password. Non-string values never match.
    #[serde(default)]
    pub password: Option<Value>,
}

/// Password check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPasswordResponse {
    /// Whether the password matched.
    pub valid: bool,
    /// Reason when the check could not be performed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VerifyPasswordResponse {
    fn rejected(message: &str) -> Self {
        Self {
            valid: false,
            message: Some(message.to_string()),
        }
    }
}

/// Get the runtime config.
///
/// Reports whether a password is configured, never the password itself.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<RuntimeConfig> {
    Json(state.runtime_config())
}

/// Check a password against the configured access password.
///
/// The body is decoded by hand so a malformed request gets the same JSON
/// shape as every other answer, with status 400.
pub async fn verify_password(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<VerifyPasswordResponse>) {
    let request: VerifyPasswordRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected malformed password request");
            return (
                StatusCode::BAD_REQUEST,
                Json(VerifyPasswordResponse::rejected("Invalid request")),
            );
        }
    };

    if state.access_password.is_empty() {
        return (
            StatusCode::OK,
            Json(VerifyPasswordResponse::rejected("No env password set")),
        );
    }

    let valid = matches!(
        request.password,
        Some(Value::String(ref candidate)) if *candidate == state.access_password
    );

    (
        StatusCode::OK,
        Json(VerifyPasswordResponse {
            valid,
            message: None,
        }),
    )
}
