//! Mapping of request failures onto HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fakearr_core::{FakearrError, NewznabError, RouteError, SynthesisError};

/// Errors a handler can return.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error(transparent)]
    Fakearr(#[from] FakearrError),

    #[error("Invalid header value: {reason}")]
    InvalidHeader { reason: String },
}

impl From<RouteError> for WebError {
    fn from(err: RouteError) -> Self {
        WebError::Fakearr(err.into())
    }
}

impl From<SynthesisError> for WebError {
    fn from(err: SynthesisError) -> Self {
        WebError::Fakearr(err.into())
    }
}

impl From<NewznabError> for WebError {
    fn from(err: NewznabError) -> Self {
        WebError::Fakearr(err.into())
    }
}

impl WebError {
    /// Status code the error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Fakearr(FakearrError::Route(RouteError::MalformedRequest { .. })) => {
                StatusCode::NOT_FOUND
            }
            WebError::Fakearr(FakearrError::Route(RouteError::UnsupportedExtension { .. }))
            | WebError::Fakearr(FakearrError::Newznab(_)) => StatusCode::BAD_REQUEST,
            WebError::Fakearr(_) | WebError::InvalidHeader { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            WebError::Fakearr(err) => err.user_message(),
            WebError::InvalidHeader { .. } => "Failed to generate file".to_string(),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        } else {
            tracing::debug!("Request rejected ({status}): {self}");
        }

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let malformed = WebError::from(RouteError::MalformedRequest {
            path: "/noext".to_string(),
        });
        assert_eq!(malformed.status(), StatusCode::NOT_FOUND);

        let unsupported = WebError::from(RouteError::UnsupportedExtension {
            extension: "mkv".to_string(),
        });
        assert_eq!(unsupported.status(), StatusCode::BAD_REQUEST);

        let invalid = WebError::from(NewznabError::InvalidRequest { function: None });
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let failed = WebError::from(SynthesisError::Encoding {
            reason: "writer closed".to_string(),
        });
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
