//! Translate a request into a configured query handle.

use crate::config::DataTablesConfig;
use crate::context::RequestContext;
use crate::error::DataTableError;
use crate::hooks::TableHooks;
use crate::query::{QueryBackend, QueryHandle};
use crate::registry::FieldHandlers;
use crate::request::{Column, OrderDirection, Parameters};

/// Resolve the order list against the declared columns.
///
/// Fails on the first entry pointing at an undeclared position.
pub fn resolve_order(
    params: &Parameters,
) -> Result<Vec<(&Column, OrderDirection)>, DataTableError> {
    let columns = params.indexed_columns();
    params
        .order
        .iter()
        .map(|entry| {
            columns
                .get(&entry.column)
                .map(|column| (*column, entry.direction()))
                .ok_or(DataTableError::UnknownOrderColumn(entry.column))
        })
        .collect()
}

/// Build the query for one request.
///
/// Stages: initial filter, pre-search hook, global search, column searches,
/// pre-order hook, order clauses, post-order hook, post-search hook, window.
pub fn build_query<B>(
    backend: &B,
    handlers: &FieldHandlers<B::Entity, B::Query>,
    hooks: &dyn TableHooks<B::Query>,
    params: &Parameters,
    ctx: &mut RequestContext<B::Query>,
    config: &DataTablesConfig,
) -> Result<B::Query, DataTableError>
where
    B: QueryBackend,
{
    // Validate before touching the backend.
    let order = resolve_order(params)?;

    let mut query = backend.new_query();
    handlers.apply_initial_filter(&mut query);

    hooks.pre_search(&mut query, ctx, params)?;
    apply_search(&mut query, handlers, params);

    hooks.pre_order(&mut query, ctx, params)?;
    apply_order(&mut query, handlers, &order);
    hooks.post_order(&mut query, ctx, params)?;

    hooks.post_search(&mut query, ctx, params)?;

    let (offset, limit) = config.clamp_window(params.window());
    query.set_window(offset, limit);
    Ok(query)
}

fn apply_search<T, Q: QueryHandle>(
    query: &mut Q,
    handlers: &FieldHandlers<T, Q>,
    params: &Parameters,
) {
    if let Some(term) = params.global_search() {
        match handlers.global_search_handler() {
            Some(handler) => handler(query, term),
            None => tracing::trace!("No global search handler, ignoring global search"),
        }
    }

    for column in &params.columns {
        if !column.searchable {
            continue;
        }
        let Some(term) = column.search_value() else {
            continue;
        };
        match handlers.search_handler(&column.name) {
            Some(handler) => handler(query, term),
            None => tracing::trace!(
                column = %column.name,
                "No search handler, ignoring column search"
            ),
        }
    }
}

fn apply_order<T, Q: QueryHandle>(
    query: &mut Q,
    handlers: &FieldHandlers<T, Q>,
    order: &[(&Column, OrderDirection)],
) {
    for (column, direction) in order {
        match handlers.order_handler(&column.name) {
            Some(handler) => handler(query, *direction),
            None => query.add_order(&column.name, *direction),
        }
    }
}
