use serde::Serialize;

/// A field-level binding error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

/// Errors that can occur while answering a table request.
#[derive(Debug)]
pub enum DataTableError {
    /// The inbound request was malformed or failed validation.
    Binding(Vec<FieldError>),
    /// An order entry points at a column position that is not declared in `columns`.
    UnknownOrderColumn(i32),
    /// The backend failed while counting or fetching.
    Backend(Box<dyn std::error::Error + Send + Sync>),
    /// The pipeline could not run to completion (e.g. the worker task panicked).
    Execution(String),
}

impl DataTableError {
    /// Construct a `Backend` variant from any error type.
    ///
    /// Used by backend crates (e.g. `datagrid-sql`) to wrap driver-specific errors.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataTableError::Backend(Box::new(err))
    }

    /// `true` when the failure is caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DataTableError::Binding(_) | DataTableError::UnknownOrderColumn(_)
        )
    }
}

impl std::fmt::Display for DataTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataTableError::Binding(errors) => {
                write!(f, "Invalid table request: {} error(s)", errors.len())?;
                for err in errors {
                    write!(f, "\n  - {}: {}", err.field, err.message)?;
                }
                Ok(())
            }
            DataTableError::UnknownOrderColumn(position) => {
                write!(f, "Order references unknown column position {position}")
            }
            DataTableError::Backend(err) => write!(f, "Backend error: {err}"),
            DataTableError::Execution(msg) => write!(f, "Execution error: {msg}"),
        }
    }
}

impl std::error::Error for DataTableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataTableError::Backend(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
