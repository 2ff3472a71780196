use datagrid_core::Entity;

/// An [`Entity`] stored in a SQL table.
///
/// The table is [`Entity::table_name`]; field names used by handlers and by
/// the default order clause are taken as column names.
///
/// # Example
///
/// ```ignore
/// impl SqlEntity for Account {
///     fn columns() -> &'static [&'static str] {
///         &["id", "name", "email", "active"]
///     }
///
///     fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
///         Ok(Account {
///             id: row.get("id")?,
///             name: row.get("name")?,
///             email: row.get("email")?,
///             active: row.get("active")?,
///         })
///     }
/// }
/// ```
pub trait SqlEntity: Entity {
    /// Columns selected for each row, in the order `from_row` expects.
    fn columns() -> &'static [&'static str];

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;
}
