use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of a 500 response, kept in the common store for the error view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerErrorDetail {
    pub status_code: u16,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorised")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("server error: {}", .0.message)]
    Server(ServerErrorDetail),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn validation_messages(&self) -> &[String] {
        match self {
            ClientError::Validation(messages) => messages,
            _ => &[],
        }
    }
}
