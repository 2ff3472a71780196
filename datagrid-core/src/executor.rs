use crate::context::RequestContext;
use crate::error::DataTableError;
use crate::query::{QueryBackend, QueryHandle};
use crate::registry::FieldHandlers;

/// Entities of the requested page plus both record counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution<T> {
    pub records_total: u64,
    pub records_filtered: u64,
    pub items: Vec<T>,
}

/// Run a built query.
///
/// `records_filtered` is the total reported by the paged fetch.
/// `records_total` comes from the context when a hook already computed it,
/// otherwise from a fresh count under the initial filter alone.
pub fn execute<B>(
    backend: &B,
    handlers: &FieldHandlers<B::Entity, B::Query>,
    mut query: B::Query,
    ctx: &RequestContext<B::Query>,
) -> Result<Execution<B::Entity>, DataTableError>
where
    B: QueryBackend,
{
    let page = query.fetch_page()?;
    let records_total = match ctx.total_match_count {
        Some(total) => total,
        None => count_unfiltered(backend, handlers)?,
    };
    Ok(Execution {
        records_total,
        records_filtered: page.filtered_count,
        items: page.items,
    })
}

/// Count the table under its initial filter only.
pub fn count_unfiltered<B>(
    backend: &B,
    handlers: &FieldHandlers<B::Entity, B::Query>,
) -> Result<u64, DataTableError>
where
    B: QueryBackend,
{
    let mut query = backend.new_query();
    handlers.apply_initial_filter(&mut query);
    query.count()
}
