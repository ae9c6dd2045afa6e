use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

/// Field name to the messages reported for it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("One or more validation errors occurred.")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        ApiError::Validation(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(flatten_validation_errors(&errors))
    }
}

pub fn flatten_validation_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, errs) in errors.field_errors() {
        let messages = errs
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        out.insert(camel_case(&field), messages);
    }
    out
}

// Field keys go out the way the JSON bodies spell them.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Detail of a 500, attached to the response so `web::middleware::error_details`
/// can decide whether to expose it.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerErrorBody {
    pub status_code: u16,
    pub message: String,
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(errors) => (
                status,
                Json(json!({
                    "title": "One or more validation errors occurred.",
                    "status": status.as_u16(),
                    "errors": errors,
                })),
            )
                .into_response(),
            ApiError::BadRequest(message) => (status, message).into_response(),
            ApiError::Unauthorized | ApiError::Forbidden | ApiError::NotFound => {
                status.into_response()
            }
            err @ (ApiError::Database(_) | ApiError::Internal(_)) => {
                let detail = err.to_string();
                error!(error = %detail, "request failed");
                let body = ServerErrorBody {
                    status_code: status.as_u16(),
                    message: "Internal Server Error".to_string(),
                    details: None,
                };
                let mut response = (status, Json(body)).into_response();
                response.extensions_mut().insert(InternalErrorDetail(detail));
                response
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn validation_error_renders_field_map() {
        let response = ApiError::field("description", "Activity description is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body["errors"]["description"][0],
            "Activity description is required"
        );
    }

    #[tokio::test]
    async fn internal_error_hides_detail_in_body() {
        let response = ApiError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<InternalErrorDetail>().is_some());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["statusCode"], 500);
        assert!(body["details"].is_null());
    }

    #[test]
    fn field_keys_are_camel_cased() {
        assert_eq!(camel_case("display_name"), "displayName");
        assert_eq!(camel_case("title"), "title");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
