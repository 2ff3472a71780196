//! Request binding and validation.
//!
//! Binding runs before the pipeline: a malformed body never reaches the
//! query builder.

use garde::Validate;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{DataTableError, FieldError};
use crate::request::Parameters;

/// Form envelope wrapping the parameters under a `parameters` key.
#[derive(Debug, Deserialize)]
struct AjaxQueryForm {
    parameters: Parameters,
}

/// Parse and validate a JSON request body.
pub fn bind_parameters(body: &[u8]) -> Result<Parameters, DataTableError> {
    let params: Parameters = serde_json::from_slice(body).map_err(parse_error)?;
    validate(params)
}

pub fn bind_value(value: Value) -> Result<Parameters, DataTableError> {
    let params: Parameters = serde_json::from_value(value).map_err(parse_error)?;
    validate(params)
}

/// Parse a body of the form `{ "parameters": { ... } }`.
pub fn bind_form(body: &[u8]) -> Result<Parameters, DataTableError> {
    let form: AjaxQueryForm = serde_json::from_slice(body).map_err(parse_error)?;
    validate(form.parameters)
}

pub fn validate(params: Parameters) -> Result<Parameters, DataTableError> {
    params
        .validate()
        .map_err(|report| DataTableError::Binding(convert_garde_report(&report)))?;
    Ok(params)
}

/// Bind `body`, then hand the outcome to one of two callbacks.
///
/// ```ignore
/// let reply = dispatch(
///     &body,
///     |errors| {
///         tracing::error!(?errors, "The form is invalid");
///         Reply::bad_request()
///     },
///     |params| Reply::ok(table.ajax_result(&params)),
/// );
/// ```
pub fn dispatch<R>(
    body: &[u8],
    on_error: impl FnOnce(Vec<FieldError>) -> R,
    on_success: impl FnOnce(Parameters) -> R,
) -> R {
    match bind_parameters(body) {
        Ok(params) => on_success(params),
        Err(DataTableError::Binding(errors)) => on_error(errors),
        Err(other) => on_error(vec![FieldError::new("body", other.to_string(), "binding")]),
    }
}

fn parse_error(err: serde_json::Error) -> DataTableError {
    DataTableError::Binding(vec![FieldError::new("body", err.to_string(), "parse")])
}

fn convert_garde_report(report: &garde::Report) -> Vec<FieldError> {
    report
        .iter()
        .map(|(path, error)| {
            let field = {
                let s = path.to_string();
                if s.is_empty() { "value".to_string() } else { s }
            };
            FieldError::new(field, error.message().to_string(), "validation")
        })
        .collect()
}
