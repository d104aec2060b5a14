//! HTTP mapping for core errors.
//!
//! Every failure leaves the API as `{statusCode, message, error}`. Internal
//! details are logged here and replaced by a generic message.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use mail_orchestrator_core::error::{BackendError, CoreError};
use serde::Serialize;
use thiserror::Error;

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

const BACKEND_UNREACHABLE: &str = "Backend service not reachable";
const INTERNAL_ERROR: &str = "Internal server error";

/// Error returned by every handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No user id on the request
    #[error("Missing authenticated user")]
    Unauthorized,

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// JSON error body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
    pub error: &'static str,
}

fn backend_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::AliasExists { .. }
        | BackendError::AddressExists { .. }
        | BackendError::ChangeNotAllowed { .. } => StatusCode::BAD_REQUEST,
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::UserNotFound(_) => StatusCode::UNAUTHORIZED,
        CoreError::DomainExists(_)
        | CoreError::DomainClaimed(_)
        | CoreError::AliasExists(_)
        | CoreError::ValidationError(_) => StatusCode::BAD_REQUEST,
        CoreError::DomainNotFound(_)
        | CoreError::DkimNotFound(_)
        | CoreError::ForwarderNotFound(_)
        | CoreError::AccountNotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Backend(e) => backend_status(e),
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UnauthorizedError",
            Self::Core(e) => e.code(),
        }
    }

    /// Client-facing message; server errors never carry details.
    fn public_message(&self) -> String {
        match self {
            Self::Core(CoreError::Backend(e)) if e.is_transport() => {
                BACKEND_UNREACHABLE.to_string()
            }
            _ if self.status_code().is_server_error() => INTERNAL_ERROR.to_string(),
            _ => self.to_string(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            status_code: self.status_code().as_u16(),
            message: self.public_message(),
            error: self.code(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Core(e) => core_status(e),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "request failed");
        } else {
            tracing::warn!(error = %self, code = self.code(), "request rejected");
        }
        HttpResponse::build(status).json(self.body())
    }
}
