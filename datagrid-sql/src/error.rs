use datagrid_core::DataTableError;

use crate::statement::StatementError;

/// Extension trait for converting SQL-layer errors into `DataTableError`.
///
/// Due to Rust's orphan rules, we can't implement `From<rusqlite::Error> for DataTableError`
/// in this crate. Use `.into_table_error()` or `map_err(SqlErrorExt::into_table_error)`.
pub trait SqlErrorExt {
    fn into_table_error(self) -> DataTableError;
}

impl SqlErrorExt for rusqlite::Error {
    fn into_table_error(self) -> DataTableError {
        DataTableError::backend(self)
    }
}

impl SqlErrorExt for StatementError {
    fn into_table_error(self) -> DataTableError {
        DataTableError::backend(self)
    }
}

/// Convenience alias for SQL backend results.
pub type SqlResult<T> = Result<T, DataTableError>;
