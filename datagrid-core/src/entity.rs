use crate::accessor::Accessors;

/// Trait representing a row type served by a table.
///
/// Accessors are registered once and resolved by field name when a column
/// has no explicit display handler.
///
/// # Example
///
/// ```ignore
/// impl Entity for Account {
///     fn table_name() -> &'static str { "account" }
///
///     fn register_accessors(accessors: &mut Accessors<Self>) {
///         accessors
///             .register("getId", |a: &Account| a.id)
///             .register("getEmail", |a: &Account| a.email.clone())
///             .register("isActive", |a: &Account| a.active);
///     }
/// }
/// ```
pub trait Entity: Sized + Send + Sync + 'static {
    fn table_name() -> &'static str;

    fn register_accessors(accessors: &mut Accessors<Self>);
}
