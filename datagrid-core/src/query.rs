use crate::error::DataTableError;
use crate::filter::Filter;
use crate::request::OrderDirection;

/// A bounded page of entities plus the number of entities matching the
/// query before pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub filtered_count: u64,
}

impl<T> PageSlice<T> {
    pub fn new(items: Vec<T>, filtered_count: u64) -> Self {
        Self {
            items,
            filtered_count,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Backend-agnostic query under construction.
///
/// Predicates accumulate with `AND` semantics; order clauses accumulate as
/// successive sort keys, the first one added having the highest priority.
pub trait QueryHandle: Send {
    type Entity;

    fn add_predicate(&mut self, filter: Filter);

    fn add_order(&mut self, field: &str, direction: OrderDirection);

    /// Set the pagination window. A `None` limit means all rows.
    fn set_window(&mut self, offset: u64, limit: Option<u64>);

    /// Fetch the configured page together with the filtered total.
    fn fetch_page(&mut self) -> Result<PageSlice<Self::Entity>, DataTableError>;

    /// Count entities matching the predicates, ignoring order and window.
    fn count(&mut self) -> Result<u64, DataTableError>;
}

/// Factory producing a fresh [`QueryHandle`] per request.
pub trait QueryBackend: Send + Sync {
    type Entity;
    type Query: QueryHandle<Entity = Self::Entity>;

    fn new_query(&self) -> Self::Query;
}
