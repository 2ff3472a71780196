//! Server-side query adapter for DataTables-style grids.
//!
//! A [`DataTable`] turns a grid request ([`Parameters`]) into a backend
//! query, runs it, and shapes the result as a [`DataTablesResponse`].
//! Backends plug in through [`QueryBackend`] and [`QueryHandle`]; per-field
//! behavior is overridden through [`FieldHandlers`].

pub mod accessor;
pub mod binding;
pub mod builder;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod executor;
pub mod filter;
pub mod hooks;
pub mod memory;
pub mod query;
pub mod registry;
pub mod request;
pub mod response;
pub mod serializer;
pub mod table;
pub mod value;

pub use accessor::{AccessError, Accessors};
pub use binding::{bind_form, bind_parameters, bind_value, dispatch};
pub use config::{ConfigError, DataTablesConfig};
pub use context::RequestContext;
pub use entity::Entity;
pub use error::{DataTableError, FieldError};
pub use filter::Filter;
pub use hooks::{NoHooks, StandardHooks, TableHooks};
pub use memory::{MemoryBackend, MemoryQuery};
pub use query::{PageSlice, QueryBackend, QueryHandle};
pub use registry::{DisplayContext, FieldHandlers, FieldHandlersBuilder, HandlerKind, Renderer};
pub use request::{Column, Order, OrderDirection, Parameters, Search};
pub use response::DataTablesResponse;
pub use table::DataTable;
pub use value::{CellValue, Symbolic};

pub mod prelude {
    //! Re-exports of the most commonly used types.
    pub use crate::{
        Accessors, CellValue, Column, DataTable, DataTableError, DataTablesResponse, Entity,
        FieldHandlers, Filter, Parameters, QueryBackend, QueryHandle, RequestContext,
    };
}
