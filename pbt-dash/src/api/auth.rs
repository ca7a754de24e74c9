//! Operator authentication
//!
//! Stand-in for a real sign-in provider: when an operator token is
//! configured, `/api` requests must carry `Authorization: Bearer <token>`.
//! With no token configured, the check is disabled.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::AppState;

/// Authentication middleware
///
/// Applied to protected routes only. `/health`, the UI and media routes do
/// NOT use this middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(expected) = state.config.operator_token.as_deref() else {
        // Auth disabled - pass through without validation
        return Ok(next.run(request).await);
    };

    let verdict = match bearer_token(&request) {
        Some(token) if token == expected => Ok(()),
        Some(_) => Err(AuthError::InvalidToken),
        None => Err(AuthError::MissingToken),
    };

    if let Err(AuthError::InvalidToken) = verdict {
        warn!(uri = %request.uri(), "Rejected request with invalid operator token");
    }
    verdict?;
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Identity of the signed-in operator
#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub operator: Option<String>,
    pub auth_enabled: bool,
}

/// GET /api/me
pub async fn whoami(State(state): State<AppState>) -> Json<WhoAmI> {
    Json(WhoAmI {
        operator: state.config.operator.clone(),
        auth_enabled: state.config.operator_token.is_some(),
    })
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Missing operator token",
            AuthError::InvalidToken => "Invalid operator token",
        };

        let body = Json(json!({
            "error": {
                "code": "UNAUTHORIZED",
                "message": message,
            }
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
