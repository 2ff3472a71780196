use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use datagrid_core::{
    CellValue, DataTableError, Filter, OrderDirection, PageSlice, QueryBackend, QueryHandle,
};
use rusqlite::{params_from_iter, Connection};

use crate::entity::SqlEntity;
use crate::error::{SqlErrorExt, SqlResult};
use crate::statement::{IdentifierPolicy, Statement};

/// Query backend over a shared SQLite connection.
pub struct SqlBackend<T> {
    conn: Arc<Mutex<Connection>>,
    identifier_policy: IdentifierPolicy,
    _entity: PhantomData<fn() -> T>,
}

impl<T: SqlEntity> SqlBackend<T> {
    pub fn new(conn: Connection) -> Self {
        Self::from_shared(Arc::new(Mutex::new(conn)))
    }

    /// Share an existing connection with other backends.
    pub fn from_shared(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            identifier_policy: IdentifierPolicy::default(),
            _entity: PhantomData,
        }
    }

    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    /// Run one or more statements that return no rows (schema setup, seeding).
    pub fn execute_batch(&self, sql: &str) -> SqlResult<()> {
        lock(&self.conn)
            .execute_batch(sql)
            .map_err(SqlErrorExt::into_table_error)
    }
}

impl<T> Clone for SqlBackend<T> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            identifier_policy: self.identifier_policy,
            _entity: PhantomData,
        }
    }
}

impl<T: SqlEntity> QueryBackend for SqlBackend<T> {
    type Entity = T;
    type Query = SqlQuery<T>;

    fn new_query(&self) -> SqlQuery<T> {
        SqlQuery {
            conn: self.conn.clone(),
            statement: Statement::new(T::table_name()).identifier_policy(self.identifier_policy),
            _entity: PhantomData,
        }
    }
}

/// Query handle rendering to SQL on execution.
pub struct SqlQuery<T> {
    conn: Arc<Mutex<Connection>>,
    statement: Statement,
    _entity: PhantomData<fn() -> T>,
}

impl<T: SqlEntity> SqlQuery<T> {
    /// Add a raw SQL predicate with `?` placeholders.
    ///
    /// The fragment is trusted and inserted verbatim; never build it from
    /// request input.
    ///
    /// ```ignore
    /// handlers.search("name", |q: &mut SqlQuery<Account>, term| {
    ///     q.where_raw("instr(lower(name), lower(?)) > 0", [term]);
    /// });
    /// ```
    pub fn where_raw<V: Into<CellValue>>(
        &mut self,
        sql: &str,
        params: impl IntoIterator<Item = V>,
    ) {
        self.statement
            .push_raw(sql, params.into_iter().map(Into::into).collect());
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    fn select(&self) -> SqlResult<Vec<T>> {
        let (sql, params) = self
            .statement
            .build_select(T::columns())
            .map_err(SqlErrorExt::into_table_error)?;
        tracing::trace!(sql = %sql, params = params.len(), "Executing page query");

        let conn = lock(&self.conn);
        let mut stmt = conn.prepare(&sql).map_err(SqlErrorExt::into_table_error)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| T::from_row(row))
            .map_err(SqlErrorExt::into_table_error)?;
        let items = rows
            .collect::<rusqlite::Result<Vec<T>>>()
            .map_err(SqlErrorExt::into_table_error)?;
        Ok(items)
    }
}

impl<T: SqlEntity> QueryHandle for SqlQuery<T> {
    type Entity = T;

    fn add_predicate(&mut self, filter: Filter) {
        self.statement.push_filter(filter);
    }

    fn add_order(&mut self, field: &str, direction: OrderDirection) {
        self.statement.push_order(field, direction);
    }

    fn set_window(&mut self, offset: u64, limit: Option<u64>) {
        self.statement.set_window(offset, limit);
    }

    fn fetch_page(&mut self) -> Result<PageSlice<T>, DataTableError> {
        let filtered_count = self.count()?;
        let items = self.select()?;
        Ok(PageSlice::new(items, filtered_count))
    }

    fn count(&mut self) -> Result<u64, DataTableError> {
        let (sql, params) = self
            .statement
            .build_count()
            .map_err(SqlErrorExt::into_table_error)?;
        tracing::trace!(sql = %sql, params = params.len(), "Executing count query");

        let count: i64 = lock(&self.conn)
            .query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))
            .map_err(SqlErrorExt::into_table_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(|e| e.into_inner())
}
