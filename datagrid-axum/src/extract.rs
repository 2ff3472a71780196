use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use axum::Json;
use datagrid_core::{bind_parameters, DataTablesResponse, Parameters};

use crate::error::DataTablesHttpError;

/// Extractor binding and validating a JSON table request body.
///
/// Rejects with `400 {"error": "Validation failed", "details": [...]}`.
///
/// ```ignore
/// async fn accounts(
///     State(table): State<Arc<AccountTable>>,
///     DataTablesRequest(params): DataTablesRequest,
/// ) -> Result<DataTablesJson, DataTablesHttpError> {
///     let response = table.ajax_result_async(params, RequestContext::new()).await?;
///     Ok(DataTablesJson(response))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DataTablesRequest(pub Parameters);

impl<S> FromRequest<S> for DataTablesRequest
where
    S: Send + Sync,
{
    type Rejection = DataTablesHttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "Could not read table request body");
            DataTablesHttpError::BadRequest(rejection.body_text())
        })?;
        let params = bind_parameters(&body).map_err(|err| {
            tracing::debug!(error = %err, "Table request rejected");
            DataTablesHttpError::from(err)
        })?;
        Ok(DataTablesRequest(params))
    }
}

/// The response envelope as a `200 OK` JSON body.
#[derive(Debug, Clone)]
pub struct DataTablesJson(pub DataTablesResponse);

impl IntoResponse for DataTablesJson {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}
