use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::services::token_service;
use crate::state::AppState;

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
    pub username: String,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(claims) =
        token.and_then(|t| token_service::validate_token(t, &state.config.token_key))
    {
        // Inject user into request extensions
        request.extensions_mut().insert(AuthenticatedUser {
            id: claims.sub,
            username: claims.unique_name,
        });
        return next.run(request).await;
    }

    debug!(path = %request.uri().path(), "missing or invalid bearer token");
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
    )
        .into_response()
}
