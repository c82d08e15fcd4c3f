use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Rejected input to paste creation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalid {
    #[error("Invalid content")]
    Content,
    #[error("Invalid ttl_seconds")]
    TtlSeconds,
    #[error("Invalid max_views")]
    MaxViews,
}

/// Why a paste could not be served. All three map to 404.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    #[error("Not found")]
    NotFound,
    #[error("Expired")]
    Expired,
    #[error("View limit exceeded")]
    Exhausted,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    #[error(transparent)]
    Invalid(#[from] Invalid),
    #[error(transparent)]
    Unavailable(#[from] Unavailable),
    #[error("Invalid request body")]
    Json {
        #[from]
        source: JsonRejection,
    },
    #[error("Invalid request body")]
    Form {
        #[from]
        source: FormRejection,
    },
    #[error("no free paste id after {attempts} attempts")]
    KeySpaceExhausted { attempts: usize },
    #[error("database error")]
    Database {
        #[from]
        source: sqlx::Error,
    },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::NOT_FOUND,
            ApiError::Json { .. } => StatusCode::BAD_REQUEST,
            ApiError::Form { .. } => StatusCode::BAD_REQUEST,
            ApiError::KeySpaceExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients; server faults are not described further.
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            "Internal server error".to_owned()
        } else {
            self.to_string()
        }
    }

    fn log_server_error(&self) {
        if self.status_code().is_server_error() {
            error!(error = ?self, "request failed");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_server_error();
        let status_code = self.status_code();
        (status_code, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Same errors, rendered as plain text for the HTML view.
#[derive(Debug)]
pub struct PageError(pub ApiError);

impl From<ApiError> for PageError {
    fn from(source: ApiError) -> Self {
        PageError(source)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.0.log_server_error();
        (self.0.status_code(), self.0.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_reasons_share_status_but_not_message() {
        let reasons = [
            (Unavailable::NotFound, "Not found"),
            (Unavailable::Expired, "Expired"),
            (Unavailable::Exhausted, "View limit exceeded"),
        ];
        for (reason, message) in reasons {
            let error = ApiError::from(reason);
            assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
            assert_eq!(error.public_message(), message);
        }
    }

    #[test]
    fn database_errors_are_not_leaked() {
        let error = ApiError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.public_message(), "Internal server error");
        // describing the error twice yields the same text
        assert_eq!(error.public_message(), error.public_message());
    }

    #[tokio::test]
    async fn server_errors_render_generic_bodies() {
        let response = ApiError::from(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Internal server error"}"#);

        let response = PageError(ApiError::from(sqlx::Error::PoolTimedOut)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&body[..], b"Internal server error");
    }
}
