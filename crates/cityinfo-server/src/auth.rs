use std::sync::Arc;

use axum::extract::State;
use axum::http::{Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::dto::ErrorResponse;
use crate::state::AppState;

/// Middleware that validates `Authorization: Bearer <token>` against the token service.
///
/// On success the decoded [`Claims`](crate::token::Claims) are stored in the
/// request extensions for downstream handlers.
pub async fn require_bearer_token(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let claims = match token.map(|t| state.tokens.verify(t.trim())) {
        Some(Ok(claims)) => claims,
        Some(Err(e)) => return unauthorized(&e.to_string()),
        None => {
            return unauthorized(
                "Missing or invalid Authorization header. Expected: Bearer <token>",
            );
        }
    };

    tracing::debug!(sub = %claims.sub, "Authenticated request");
    request.extensions_mut().insert(claims);
    next.run(request).await
}

fn unauthorized(message: &str) -> Response {
    tracing::warn!("Rejected request: {message}");
    let body = ErrorResponse {
        error: "unauthorized".to_string(),
        message: message.to_string(),
    };
    (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
}
