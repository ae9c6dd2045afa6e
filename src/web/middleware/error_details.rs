use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{InternalErrorDetail, ServerErrorBody};
use crate::state::AppState;

/// In development, rewrites 500 bodies to carry the error detail.
pub async fn expose_error_details(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.config.is_development() {
        return response;
    }
    let Some(InternalErrorDetail(detail)) = response.extensions().get::<InternalErrorDetail>().cloned()
    else {
        return response;
    };

    let status = response.status();
    let body = ServerErrorBody {
        status_code: status.as_u16(),
        message: "Internal Server Error".to_string(),
        details: Some(detail),
    };
    (status, Json(body)).into_response()
}
