use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use datagrid_core::{DataTableError, FieldError};

/// HTTP-facing failure of a table request.
pub enum DataTablesHttpError {
    /// The body could not be bound or failed validation.
    Validation(Vec<FieldError>),
    BadRequest(String),
    Internal(String),
}

/// Helper to create a JSON error response with a standard `{ "error": message }` body.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

impl IntoResponse for DataTablesHttpError {
    fn into_response(self) -> Response {
        match self {
            DataTablesHttpError::Validation(errors) => {
                let body = serde_json::json!({
                    "error": "Validation failed",
                    "details": errors,
                });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            DataTablesHttpError::BadRequest(msg) => error_response(StatusCode::BAD_REQUEST, msg),
            DataTablesHttpError::Internal(msg) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        }
    }
}

impl From<DataTableError> for DataTablesHttpError {
    fn from(err: DataTableError) -> Self {
        match err {
            DataTableError::Binding(errors) => DataTablesHttpError::Validation(errors),
            DataTableError::UnknownOrderColumn(_) => {
                DataTablesHttpError::BadRequest(err.to_string())
            }
            DataTableError::Backend(_) | DataTableError::Execution(_) => {
                tracing::error!(error = %err, "Table request failed");
                DataTablesHttpError::Internal(err.to_string())
            }
        }
    }
}

impl std::fmt::Display for DataTablesHttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataTablesHttpError::Validation(errors) => {
                write!(f, "Validation Error: {} errors", errors.len())
            }
            DataTablesHttpError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            DataTablesHttpError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl std::fmt::Debug for DataTablesHttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}
