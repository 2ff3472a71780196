//! axum integration for datagrid tables.
//!
//! [`DataTablesRequest`] binds the JSON body before any table code runs, so a
//! malformed request never reaches the pipeline. [`DataTablesHttpError`] maps
//! table failures to status codes: binding and unknown order columns are
//! `400`, backend and execution failures are `500`.
//!
//! ```ignore
//! let app = Router::new().route("/accounts/table", table_route(Arc::new(table)));
//! ```

pub mod error;
pub mod extract;

use std::sync::Arc;

use axum::routing::{post, MethodRouter};
use datagrid_core::{DataTable, Entity, QueryBackend, RequestContext};

pub use error::{error_response, DataTablesHttpError};
pub use extract::{DataTablesJson, DataTablesRequest};

/// Answer an extracted request on the blocking pool.
pub async fn serve<T, B>(
    table: &Arc<DataTable<T, B>>,
    DataTablesRequest(params): DataTablesRequest,
) -> Result<DataTablesJson, DataTablesHttpError>
where
    T: Entity,
    B: QueryBackend<Entity = T> + 'static,
    B::Query: 'static,
{
    let response = table.ajax_result_async(params, RequestContext::new()).await?;
    Ok(DataTablesJson(response))
}

/// A `POST` route serving `table`.
pub fn table_route<T, B, S>(table: Arc<DataTable<T, B>>) -> MethodRouter<S>
where
    T: Entity,
    B: QueryBackend<Entity = T> + 'static,
    B::Query: 'static,
    S: Clone + Send + Sync + 'static,
{
    post(move |request: DataTablesRequest| async move { serve(&table, request).await })
}
