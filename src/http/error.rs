use crate::openai::ApiError;
use crate::retry::RetryError;
use crate::session::InvalidMeetingId;
use crate::storage::StoreError;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    /// Upstream API status, for failed transcription or chat calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Upstream response body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// A failed request: status code plus JSON error body
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl HttpError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                status: None,
                raw: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    pub fn from_multipart(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::InvalidMeetingId(_) | StoreError::InvalidFileName(_) => {
                StatusCode::BAD_REQUEST
            }
            StoreError::MeetingNotFound(_) | StoreError::FileNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::AlreadyExists(_) => StatusCode::CONFLICT,
            StoreError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            StoreError::CorruptState { .. } | StoreError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<InvalidMeetingId> for HttpError {
    fn from(err: InvalidMeetingId) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<RetryError<ApiError>> for HttpError {
    fn from(err: RetryError<ApiError>) -> Self {
        let status = if err.is_rate_limit_exhausted() {
            StatusCode::TOO_MANY_REQUESTS
        } else {
            StatusCode::BAD_GATEWAY
        };

        let api = err.inner();
        Self {
            status,
            body: ErrorResponse {
                error: err.to_string(),
                status: api.status(),
                raw: api.raw().map(str::to_string),
            },
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MeetingId;

    #[test]
    fn store_errors_map_to_status() {
        let id = MeetingId::parse("m1").unwrap();
        assert_eq!(
            HttpError::from(StoreError::MeetingNotFound(id.clone())).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HttpError::from(StoreError::AlreadyExists(id)).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            HttpError::from(StoreError::TooLarge { size: 2, limit: 1 }).status,
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn exhausted_rate_limit_is_429() {
        let err = RetryError::RateLimitExhausted {
            attempts: 3,
            last: ApiError::from_status(429, "{}".to_string()),
        };
        let http = HttpError::from(err);
        assert_eq!(http.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(http.body.status, Some(429));
    }

    #[test]
    fn other_upstream_failures_are_502() {
        let err = RetryError::NonRetryable(ApiError::from_status(500, "boom".to_string()));
        let http = HttpError::from(err);
        assert_eq!(http.status, StatusCode::BAD_GATEWAY);
        assert_eq!(http.body.raw.as_deref(), Some("boom"));
    }
}
