use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Conflict,
    Internal,
}

impl ErrorCode {
    /// Notification title used when an error carries no specific one.
    pub fn default_title(self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Login Required",
            ErrorCode::Forbidden => "Not Permitted",
            ErrorCode::NotFound => "Not Found",
            ErrorCode::Validation => "Invalid Input",
            ErrorCode::Conflict => "Action Not Allowed",
            ErrorCode::Internal => "Something Went Wrong",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub title: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            title: code.default_title().to_string(),
            message: message.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

#[derive(Debug, Error)]
#[error("{code:?}: {title}: {message}")]
pub struct ApiException {
    pub code: ErrorCode,
    pub title: String,
    pub message: String,
}

impl From<ApiException> for ApiError {
    fn from(value: ApiException) -> Self {
        Self {
            code: value.code,
            title: value.title,
            message: value.message,
        }
    }
}

impl From<ApiError> for ApiException {
    fn from(value: ApiError) -> Self {
        Self {
            code: value.code,
            title: value.title,
            message: value.message,
        }
    }
}
