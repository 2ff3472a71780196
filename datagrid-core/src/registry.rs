//! Per-table field handlers.
//!
//! A [`FieldHandlers`] snapshot is built once through [`FieldHandlersBuilder`]
//! and is read-only afterwards; it is shared by every request of a table.

use std::collections::HashMap;
use std::sync::Arc;

use crate::accessor::Accessors;
use crate::context::RequestContext;
use crate::entity::Entity;
use crate::request::{Column, OrderDirection, Parameters};
use crate::value::CellValue;

pub type DisplayFn<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;
pub type SearchFn<Q> = Arc<dyn Fn(&mut Q, &str) + Send + Sync>;
pub type OrderFn<Q> = Arc<dyn Fn(&mut Q, OrderDirection) + Send + Sync>;
pub type InitialFilterFn<Q> = Arc<dyn Fn(&mut Q) + Send + Sync>;

/// What an HTML renderer sees besides the entity.
pub struct DisplayContext<'a, Q> {
    pub parameters: &'a Parameters,
    pub column: &'a Column,
    pub payload: &'a RequestContext<Q>,
}

/// Renders an HTML fragment for one cell.
///
/// Implemented for any `Fn(&T, &DisplayContext<'_, Q>) -> String`.
pub trait Renderer<T, Q>: Send + Sync {
    fn render(&self, entity: &T, ctx: &DisplayContext<'_, Q>) -> String;
}

impl<T, Q, F> Renderer<T, Q> for F
where
    F: Fn(&T, &DisplayContext<'_, Q>) -> String + Send + Sync,
{
    fn render(&self, entity: &T, ctx: &DisplayContext<'_, Q>) -> String {
        self(entity, ctx)
    }
}

/// Display override for one field.
pub enum DisplayHandler<T, Q> {
    Value(DisplayFn<T>),
    Html(Arc<dyn Renderer<T, Q>>),
}

impl<T, Q> DisplayHandler<T, Q> {
    pub fn display(&self, entity: &T, ctx: &DisplayContext<'_, Q>) -> CellValue {
        match self {
            DisplayHandler::Value(supplier) => supplier(entity),
            DisplayHandler::Html(renderer) => CellValue::Text(renderer.render(entity, ctx)),
        }
    }
}

impl<T, Q> Clone for DisplayHandler<T, Q> {
    fn clone(&self) -> Self {
        match self {
            DisplayHandler::Value(f) => DisplayHandler::Value(f.clone()),
            DisplayHandler::Html(r) => DisplayHandler::Html(r.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Display,
    Search,
    Order,
}

impl HandlerKind {
    fn as_str(self) -> &'static str {
        match self {
            HandlerKind::Display => "display",
            HandlerKind::Search => "search",
            HandlerKind::Order => "order",
        }
    }
}

/// Immutable set of field overrides for one table.
pub struct FieldHandlers<T, Q> {
    display: HashMap<String, DisplayHandler<T, Q>>,
    search: HashMap<String, SearchFn<Q>>,
    order: HashMap<String, OrderFn<Q>>,
    global_search: Option<SearchFn<Q>>,
    initial_filter: Option<InitialFilterFn<Q>>,
    accessors: Arc<Accessors<T>>,
}

impl<T, Q> FieldHandlers<T, Q> {
    /// Start a registry whose fallback accessors come from the entity type.
    pub fn builder() -> FieldHandlersBuilder<T, Q>
    where
        T: Entity,
    {
        Self::builder_with(Accessors::for_entity())
    }

    pub fn builder_with(accessors: Accessors<T>) -> FieldHandlersBuilder<T, Q> {
        FieldHandlersBuilder {
            inner: FieldHandlers {
                display: HashMap::new(),
                search: HashMap::new(),
                order: HashMap::new(),
                global_search: None,
                initial_filter: None,
                accessors: Arc::new(accessors),
            },
        }
    }

    /// A builder seeded with this snapshot's handlers.
    pub fn to_builder(&self) -> FieldHandlersBuilder<T, Q> {
        FieldHandlersBuilder {
            inner: self.clone(),
        }
    }

    pub fn display_handler(&self, field: &str) -> Option<&DisplayHandler<T, Q>> {
        self.display.get(field)
    }

    pub fn search_handler(&self, field: &str) -> Option<&SearchFn<Q>> {
        self.search.get(field)
    }

    pub fn order_handler(&self, field: &str) -> Option<&OrderFn<Q>> {
        self.order.get(field)
    }

    pub fn global_search_handler(&self) -> Option<&SearchFn<Q>> {
        self.global_search.as_ref()
    }

    pub fn initial_filter(&self) -> Option<&InitialFilterFn<Q>> {
        self.initial_filter.as_ref()
    }

    /// Apply the initial filter to `query`, if one is registered.
    pub fn apply_initial_filter(&self, query: &mut Q) {
        if let Some(filter) = &self.initial_filter {
            filter(query);
        }
    }

    pub fn accessors(&self) -> &Accessors<T> {
        &self.accessors
    }

    pub fn contains(&self, kind: HandlerKind, field: &str) -> bool {
        match kind {
            HandlerKind::Display => self.display.contains_key(field),
            HandlerKind::Search => self.search.contains_key(field),
            HandlerKind::Order => self.order.contains_key(field),
        }
    }
}

impl<T, Q> Clone for FieldHandlers<T, Q> {
    fn clone(&self) -> Self {
        Self {
            display: self.display.clone(),
            search: self.search.clone(),
            order: self.order.clone(),
            global_search: self.global_search.clone(),
            initial_filter: self.initial_filter.clone(),
            accessors: self.accessors.clone(),
        }
    }
}

impl<T, Q> std::fmt::Debug for FieldHandlers<T, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
            let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
            keys.sort_unstable();
            keys
        }
        f.debug_struct("FieldHandlers")
            .field("display", &keys(&self.display))
            .field("search", &keys(&self.search))
            .field("order", &keys(&self.order))
            .field("global_search", &self.global_search.is_some())
            .field("initial_filter", &self.initial_filter.is_some())
            .field("accessors", &self.accessors)
            .finish()
    }
}

/// Builder for [`FieldHandlers`].
///
/// Registering a handler twice for the same field and kind keeps the last
/// one and logs a warning.
///
/// # Example
///
/// ```ignore
/// let handlers = FieldHandlers::<Account, MemoryQuery<Account>>::builder()
///     .display("uid", |a: &Account| a.uid.to_string())
///     .search("email", |q, term| q.add_predicate(Filter::contains("email", term)))
///     .order("email", |q, dir| q.add_order("email", dir))
///     .initial_filter(|q| q.add_predicate(Filter::eq("active", true)))
///     .build();
/// ```
pub struct FieldHandlersBuilder<T, Q> {
    inner: FieldHandlers<T, Q>,
}

impl<T: 'static, Q: 'static> FieldHandlersBuilder<T, Q> {
    pub fn display<F, V>(mut self, field: &str, supplier: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<CellValue>,
    {
        let handler = DisplayHandler::Value(Arc::new(move |entity: &T| {
            Into::<CellValue>::into(supplier(entity))
        }));
        if self.inner.display.insert(field.to_string(), handler).is_some() {
            warn_replaced(HandlerKind::Display, field);
        }
        self
    }

    /// Register an HTML fragment closure for `field`.
    pub fn display_html<F>(self, field: &str, render: F) -> Self
    where
        F: Fn(&T, &DisplayContext<'_, Q>) -> String + Send + Sync + 'static,
    {
        self.display_renderer(field, render)
    }

    /// Register an HTML fragment renderer for `field`.
    pub fn display_renderer<R>(mut self, field: &str, renderer: R) -> Self
    where
        R: Renderer<T, Q> + 'static,
    {
        let handler = DisplayHandler::Html(Arc::new(renderer));
        if self.inner.display.insert(field.to_string(), handler).is_some() {
            warn_replaced(HandlerKind::Display, field);
        }
        self
    }

    pub fn search<F>(mut self, field: &str, handler: F) -> Self
    where
        F: Fn(&mut Q, &str) + Send + Sync + 'static,
    {
        if self.inner.search.insert(field.to_string(), Arc::new(handler)).is_some() {
            warn_replaced(HandlerKind::Search, field);
        }
        self
    }

    pub fn order<F>(mut self, field: &str, handler: F) -> Self
    where
        F: Fn(&mut Q, OrderDirection) + Send + Sync + 'static,
    {
        if self.inner.order.insert(field.to_string(), Arc::new(handler)).is_some() {
            warn_replaced(HandlerKind::Order, field);
        }
        self
    }

    pub fn global_search<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Q, &str) + Send + Sync + 'static,
    {
        if self.inner.global_search.replace(Arc::new(handler)).is_some() {
            tracing::warn!("Global search handler registered twice, keeping the last one");
        }
        self
    }

    /// Table-level restriction applied to every query, counts included.
    pub fn initial_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&mut Q) + Send + Sync + 'static,
    {
        if self.inner.initial_filter.replace(Arc::new(filter)).is_some() {
            tracing::warn!("Initial filter registered twice, keeping the last one");
        }
        self
    }

    /// Drop every handler of `kind` registered for `field`.
    pub fn remove(mut self, kind: HandlerKind, field: &str) -> Self {
        match kind {
            HandlerKind::Display => {
                self.inner.display.remove(field);
            }
            HandlerKind::Search => {
                self.inner.search.remove(field);
            }
            HandlerKind::Order => {
                self.inner.order.remove(field);
            }
        }
        self
    }

    pub fn build(self) -> FieldHandlers<T, Q> {
        self.inner
    }
}

fn warn_replaced(kind: HandlerKind, field: &str) {
    tracing::warn!(
        kind = kind.as_str(),
        field,
        "Handler registered twice for the same field, keeping the last one"
    );
}
