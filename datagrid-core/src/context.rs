/// Caller-specific restriction applied by the pre-search hook.
pub type ExtraQuery<Q> = Box<dyn Fn(&mut Q) + Send + Sync>;

/// Per-request state threaded through the pipeline stages.
///
/// Hooks stash values here (e.g. an early-computed total) so the executor
/// can reuse them. A context lives for a single request.
pub struct RequestContext<Q> {
    /// Total of the table before search filters, when already computed.
    pub total_match_count: Option<u64>,
    /// Caller-specific restriction applied before search filters.
    pub extra_query: Option<ExtraQuery<Q>>,
}

impl<Q> RequestContext<Q> {
    pub fn new() -> Self {
        Self {
            total_match_count: None,
            extra_query: None,
        }
    }

    pub fn with_extra_query<F>(mut self, extra: F) -> Self
    where
        F: Fn(&mut Q) + Send + Sync + 'static,
    {
        self.extra_query = Some(Box::new(extra));
        self
    }

    pub fn with_total_match_count(mut self, total: u64) -> Self {
        self.total_match_count = Some(total);
        self
    }

    /// Apply the extra restriction, if any. Returns whether one was applied.
    pub fn apply_extra_query(&self, query: &mut Q) -> bool {
        match &self.extra_query {
            Some(extra) => {
                extra(query);
                true
            }
            None => false,
        }
    }
}

impl<Q> Default for RequestContext<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> std::fmt::Debug for RequestContext<Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("total_match_count", &self.total_match_count)
            .field("extra_query", &self.extra_query.is_some())
            .finish()
    }
}
