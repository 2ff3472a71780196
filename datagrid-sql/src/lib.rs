//! # datagrid-sql — SQL backend for datagrid tables
//!
//! Implements the query handle of `datagrid-core` on top of SQLite through
//! [`rusqlite`]. Filters, orders and the pagination window accumulate in a
//! [`Statement`] and are rendered with `?` placeholders when the page is
//! fetched.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlBackend`] | Query backend holding a shared `rusqlite::Connection` |
//! | [`SqlQuery`] | Query handle; adds [`SqlQuery::where_raw`] for raw predicates |
//! | [`SqlEntity`] | Row mapping for an entity (`columns()` + `from_row`) |
//! | [`Statement`] | `SELECT` / `COUNT(*)` rendering with identifier validation |
//! | [`SqlErrorExt`] | Converts `rusqlite::Error` and [`StatementError`] into `DataTableError` |
//!
//! Identifiers (table, columns, order fields) are validated before they reach
//! SQL. Column names sent by the client and used by the default order clause
//! therefore fail the request with a backend error when they are not plain
//! identifiers.
//!
//! # Quick start
//!
//! ```ignore
//! use datagrid_core::prelude::*;
//! use datagrid_sql::{SqlBackend, SqlQuery};
//!
//! let backend = SqlBackend::<Account>::new(rusqlite::Connection::open("app.db")?);
//! let table = DataTable::new(
//!     backend,
//!     FieldHandlers::<Account, SqlQuery<Account>>::builder()
//!         .search("email", |q, term| q.add_predicate(Filter::contains("email", term)))
//!         .build(),
//! );
//! ```

pub mod backend;
pub mod entity;
pub mod error;
pub mod statement;

pub use backend::{SqlBackend, SqlQuery};
pub use entity::SqlEntity;
pub use error::{SqlErrorExt, SqlResult};
pub use statement::{IdentifierPolicy, Statement, StatementError};
