use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// An error response with a json body of the form `{"error": "..."}`
pub struct ResponseError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl<E> From<E> for ResponseError
where
    E: Into<color_eyre::eyre::Error>,
{
    fn from(value: E) -> Self {
        let report: color_eyre::eyre::Error = value.into();
        tracing::error!("{:#}", report);
        ResponseError::internal_server_error(report.to_string())
    }
}

impl ResponseError {
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        ResponseError {
            status,
            message: message.into(),
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message)
    }
}

pub type Result<T, E = ResponseError> = axum::response::Result<T, E>;
