use crate::context::RequestContext;
use crate::error::DataTableError;
use crate::query::QueryHandle;
use crate::request::Parameters;

/// Extension points around the search and order stages of a request.
///
/// Every method defaults to a no-op. Hooks receive the query handle under
/// construction and the per-request context.
pub trait TableHooks<Q: QueryHandle>: Send + Sync {
    /// Runs after the initial filter, before any search predicate.
    fn pre_search(
        &self,
        query: &mut Q,
        ctx: &mut RequestContext<Q>,
        params: &Parameters,
    ) -> Result<(), DataTableError> {
        let _ = (query, ctx, params);
        Ok(())
    }

    /// Runs once search predicates and order clauses are in place.
    fn post_search(
        &self,
        query: &mut Q,
        ctx: &mut RequestContext<Q>,
        params: &Parameters,
    ) -> Result<(), DataTableError> {
        let _ = (query, ctx, params);
        Ok(())
    }

    fn pre_order(
        &self,
        query: &mut Q,
        ctx: &mut RequestContext<Q>,
        params: &Parameters,
    ) -> Result<(), DataTableError> {
        let _ = (query, ctx, params);
        Ok(())
    }

    fn post_order(
        &self,
        query: &mut Q,
        ctx: &mut RequestContext<Q>,
        params: &Parameters,
    ) -> Result<(), DataTableError> {
        let _ = (query, ctx, params);
        Ok(())
    }
}

/// Hooks that do nothing. `recordsTotal` is then computed with a separate
/// unfiltered count.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl<Q: QueryHandle> TableHooks<Q> for NoHooks {}

/// Default hooks.
///
/// Before searching, applies the context's `extra_query` and stores the
/// resulting count as `total_match_count`, so the total is served without
/// a second query.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardHooks;

impl<Q: QueryHandle> TableHooks<Q> for StandardHooks {
    fn pre_search(
        &self,
        query: &mut Q,
        ctx: &mut RequestContext<Q>,
        _params: &Parameters,
    ) -> Result<(), DataTableError> {
        ctx.apply_extra_query(query);
        ctx.total_match_count = Some(query.count()?);
        Ok(())
    }
}
