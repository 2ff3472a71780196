use std::future::Future;
use std::sync::{Arc, RwLock};

use crate::binding::bind_parameters;
use crate::builder::build_query;
use crate::config::DataTablesConfig;
use crate::context::RequestContext;
use crate::entity::Entity;
use crate::error::DataTableError;
use crate::executor::execute;
use crate::hooks::{StandardHooks, TableHooks};
use crate::query::{PageSlice, QueryBackend, QueryHandle};
use crate::registry::{FieldHandlers, FieldHandlersBuilder};
use crate::request::Parameters;
use crate::response::{assemble, DataTablesResponse};
use crate::serializer::serialize_rows;

/// A table adapter: one backend, one entity type, one handler registry.
///
/// Share it behind an `Arc`; every request takes a snapshot of the
/// registry and never mutates it.
///
/// # Example
///
/// ```ignore
/// let table = Arc::new(DataTable::new(
///     MemoryBackend::new(accounts),
///     FieldHandlers::builder()
///         .search("email", |q, term| q.add_predicate(Filter::contains("email", term)))
///         .build(),
/// ));
/// let response = table.ajax_result(&params)?;
/// ```
pub struct DataTable<T, B: QueryBackend<Entity = T>> {
    backend: B,
    handlers: RwLock<Arc<FieldHandlers<T, B::Query>>>,
    hooks: Arc<dyn TableHooks<B::Query>>,
    config: DataTablesConfig,
}

impl<T, B> DataTable<T, B>
where
    T: Entity,
    B: QueryBackend<Entity = T>,
    B::Query: 'static,
{
    pub fn new(backend: B, handlers: FieldHandlers<T, B::Query>) -> Self {
        Self {
            backend,
            handlers: RwLock::new(Arc::new(handlers)),
            hooks: Arc::new(StandardHooks),
            config: DataTablesConfig::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: impl TableHooks<B::Query> + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn with_config(mut self, config: DataTablesConfig) -> Self {
        self.config = config;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &DataTablesConfig {
        &self.config
    }

    /// The current registry snapshot.
    pub fn handlers(&self) -> Arc<FieldHandlers<T, B::Query>> {
        self.handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Rebuild the registry from the current snapshot and swap it in.
    ///
    /// Requests already running keep the snapshot they started with.
    pub fn reconfigure<F>(&self, configure: F)
    where
        F: FnOnce(FieldHandlersBuilder<T, B::Query>) -> FieldHandlersBuilder<T, B::Query>,
    {
        let next = Arc::new(configure(self.handlers().to_builder()).build());
        let mut slot = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        *slot = next;
        tracing::debug!(table = T::table_name(), "Field handlers reconfigured");
    }

    /// Run the query for `params` without serializing rows.
    pub fn paged_list(&self, params: &Parameters) -> Result<PageSlice<T>, DataTableError> {
        let handlers = self.handlers();
        let mut ctx = RequestContext::new();
        let mut query = build_query(
            &self.backend,
            &handlers,
            self.hooks.as_ref(),
            params,
            &mut ctx,
            &self.config,
        )?;
        query.fetch_page()
    }

    pub fn ajax_result(
        &self,
        params: &Parameters,
    ) -> Result<DataTablesResponse, DataTableError> {
        self.ajax_result_with(params, RequestContext::new())
    }

    /// Answer a request with a caller-supplied context.
    pub fn ajax_result_with(
        &self,
        params: &Parameters,
        mut ctx: RequestContext<B::Query>,
    ) -> Result<DataTablesResponse, DataTableError> {
        let span = tracing::debug_span!("datatables", table = T::table_name(), draw = params.draw);
        let _enter = span.enter();

        let handlers = self.handlers();
        let query = build_query(
            &self.backend,
            &handlers,
            self.hooks.as_ref(),
            params,
            &mut ctx,
            &self.config,
        )
        .inspect_err(|err| tracing::debug!(error = %err, "Query build failed"))?;
        let execution = execute(&self.backend, &handlers, query, &ctx)
            .inspect_err(|err| tracing::warn!(error = %err, "Query execution failed"))?;
        let rows = serialize_rows(
            &execution.items,
            &handlers,
            params,
            &ctx,
            &self.config.date_format,
        );

        tracing::debug!(
            records_total = execution.records_total,
            records_filtered = execution.records_filtered,
            rows = rows.len(),
            "Table request served"
        );
        Ok(assemble(
            params.draw,
            execution.records_total,
            execution.records_filtered,
            rows,
        ))
    }

    /// Bind a raw JSON body, then answer it.
    pub fn ajax_request(&self, body: &[u8]) -> Result<DataTablesResponse, DataTableError> {
        let params = bind_parameters(body)?;
        self.ajax_result(&params)
    }
}

impl<T, B> DataTable<T, B>
where
    T: Entity,
    B: QueryBackend<Entity = T> + 'static,
    B::Query: 'static,
{
    /// Run the whole pipeline on the blocking pool.
    pub async fn ajax_result_async(
        self: &Arc<Self>,
        params: Parameters,
        ctx: RequestContext<B::Query>,
    ) -> Result<DataTablesResponse, DataTableError> {
        let table = Arc::clone(self);
        tokio::task::spawn_blocking(move || table.ajax_result_with(&params, ctx))
            .await
            .map_err(|e| DataTableError::Execution(e.to_string()))?
    }

    /// Bind `body` synchronously, then hand back a future running the pipeline.
    ///
    /// A binding failure is returned immediately; nothing is spawned.
    pub fn ajax_request_async(
        self: &Arc<Self>,
        body: &[u8],
    ) -> Result<
        impl Future<Output = Result<DataTablesResponse, DataTableError>> + Send + 'static,
        DataTableError,
    > {
        let params = bind_parameters(body)?;
        let table = Arc::clone(self);
        Ok(async move { table.ajax_result_async(params, RequestContext::new()).await })
    }
}
