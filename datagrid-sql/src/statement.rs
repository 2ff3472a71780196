use datagrid_core::{CellValue, Filter, OrderDirection};
use rusqlite::types::Value;

/// Rendering of the accumulated filters, orders and window into SQLite
/// statements with `?` placeholders.
///
/// # Example
///
/// ```ignore
/// let stmt = Statement::new("account")
///     .filter(Filter::eq("active", true))
///     .filter(Filter::contains("email", "bob"))
///     .order_by("id", OrderDirection::Desc)
///     .window(20, Some(10));
/// let (sql, params) = stmt.build_select(&["id", "email"])?;
/// ```
#[derive(Debug, Clone)]
pub struct Statement {
    table: String,
    clauses: Vec<Clause>,
    order: Vec<(String, OrderDirection)>,
    limit: Option<u64>,
    offset: u64,
    identifier_policy: IdentifierPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentifierPolicy {
    /// Validate identifiers against a conservative pattern.
    Validate,
    /// Validate identifiers and wrap them in double quotes.
    #[default]
    Quote,
}

#[derive(Debug, Clone)]
enum Clause {
    Filter(Filter),
    /// Trusted SQL fragment with its bound values.
    Raw(String, Vec<CellValue>),
}

impl Statement {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            clauses: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: 0,
            identifier_policy: IdentifierPolicy::default(),
        }
    }

    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.push_filter(filter);
        self
    }

    pub fn raw(mut self, sql: &str, params: Vec<CellValue>) -> Self {
        self.push_raw(sql, params);
        self
    }

    pub fn order_by(mut self, column: &str, direction: OrderDirection) -> Self {
        self.push_order(column, direction);
        self
    }

    pub fn window(mut self, offset: u64, limit: Option<u64>) -> Self {
        self.set_window(offset, limit);
        self
    }

    pub fn push_filter(&mut self, filter: Filter) {
        self.clauses.push(Clause::Filter(filter));
    }

    /// Add a raw predicate. `sql` is inserted verbatim; only `params` are bound.
    pub fn push_raw(&mut self, sql: &str, params: Vec<CellValue>) {
        self.clauses.push(Clause::Raw(sql.to_string(), params));
    }

    pub fn push_order(&mut self, column: &str, direction: OrderDirection) {
        self.order.push((column.to_string(), direction));
    }

    pub fn set_window(&mut self, offset: u64, limit: Option<u64>) {
        self.offset = offset;
        self.limit = limit;
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Build the paged `SELECT` returning `(sql, bind_values)`.
    pub fn build_select(&self, columns: &[&str]) -> Result<(String, Vec<Value>), StatementError> {
        let table = self.format_identifier(&self.table, "table")?;
        let columns = self.format_column_list(columns)?;

        let mut sql = format!("SELECT {columns} FROM {table}");
        let mut params = Vec::new();
        self.append_where(&mut sql, &mut params)?;
        self.append_order(&mut sql)?;
        self.append_limit_offset(&mut sql);
        Ok((sql, params))
    }

    /// Build a `COUNT(*)` over the filters only, ignoring order and window.
    pub fn build_count(&self) -> Result<(String, Vec<Value>), StatementError> {
        let table = self.format_identifier(&self.table, "table")?;
        let mut sql = format!("SELECT COUNT(*) FROM {table}");
        let mut params = Vec::new();
        self.append_where(&mut sql, &mut params)?;
        Ok((sql, params))
    }

    fn append_where(
        &self,
        sql: &mut String,
        params: &mut Vec<Value>,
    ) -> Result<(), StatementError> {
        if self.clauses.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::with_capacity(self.clauses.len());
        for clause in &self.clauses {
            match clause {
                Clause::Filter(filter) => parts.push(self.render_filter(filter, params)?),
                Clause::Raw(fragment, values) => {
                    parts.push(format!("({fragment})"));
                    params.extend(values.iter().map(to_sql_value));
                }
            }
        }
        sql.push_str(" WHERE ");
        sql.push_str(&parts.join(" AND "));
        Ok(())
    }

    fn render_filter(
        &self,
        filter: &Filter,
        params: &mut Vec<Value>,
    ) -> Result<String, StatementError> {
        let rendered = match filter {
            Filter::Eq(col, value) => self.render_compare(col, "=", value, params)?,
            Filter::NotEq(col, value) => self.render_compare(col, "!=", value, params)?,
            Filter::Gt(col, value) => self.render_compare(col, ">", value, params)?,
            Filter::Lt(col, value) => self.render_compare(col, "<", value, params)?,
            Filter::Like(col, pattern) => {
                // SQLite's LIKE ignores ASCII case; GLOB does not.
                let col = self.format_identifier(col, "column")?;
                params.push(Value::Text(like_to_glob(pattern)));
                format!("{col} GLOB ?")
            }
            Filter::ILike(col, pattern) => {
                let col = self.format_identifier(col, "column")?;
                params.push(Value::Text(pattern.clone()));
                format!("LOWER({col}) LIKE LOWER(?)")
            }
            Filter::In(col, values) => {
                let col = self.format_identifier(col, "column")?;
                if values.is_empty() {
                    return Ok("1 = 0".to_string());
                }
                let placeholders = vec!["?"; values.len()].join(", ");
                params.extend(values.iter().map(to_sql_value));
                format!("{col} IN ({placeholders})")
            }
            Filter::IsNull(col) => format!("{} IS NULL", self.format_identifier(col, "column")?),
            Filter::IsNotNull(col) => {
                format!("{} IS NOT NULL", self.format_identifier(col, "column")?)
            }
            Filter::And(filters) => self.render_group(filters, " AND ", "1 = 1", params)?,
            Filter::Or(filters) => self.render_group(filters, " OR ", "1 = 0", params)?,
        };
        Ok(rendered)
    }

    fn render_compare(
        &self,
        col: &str,
        op: &str,
        value: &CellValue,
        params: &mut Vec<Value>,
    ) -> Result<String, StatementError> {
        let col = self.format_identifier(col, "column")?;
        params.push(to_sql_value(value));
        Ok(format!("{col} {op} ?"))
    }

    fn render_group(
        &self,
        filters: &[Filter],
        separator: &str,
        empty: &str,
        params: &mut Vec<Value>,
    ) -> Result<String, StatementError> {
        if filters.is_empty() {
            return Ok(empty.to_string());
        }
        let mut parts = Vec::with_capacity(filters.len());
        for filter in filters {
            parts.push(self.render_filter(filter, params)?);
        }
        Ok(format!("({})", parts.join(separator)))
    }

    fn append_order(&self, sql: &mut String) -> Result<(), StatementError> {
        if self.order.is_empty() {
            return Ok(());
        }
        let mut clauses = Vec::with_capacity(self.order.len());
        for (col, direction) in &self.order {
            let col = self.format_identifier(col, "column")?;
            clauses.push(format!("{col} {}", direction.as_sql()));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&clauses.join(", "));
        Ok(())
    }

    fn append_limit_offset(&self, sql: &mut String) {
        match self.limit {
            Some(limit) => sql.push_str(&format!(" LIMIT {limit}")),
            // SQLite only accepts OFFSET after a LIMIT; -1 means no limit.
            None if self.offset > 0 => sql.push_str(" LIMIT -1"),
            None => {}
        }
        if self.offset > 0 {
            sql.push_str(&format!(" OFFSET {}", self.offset));
        }
    }

    fn format_column_list(&self, columns: &[&str]) -> Result<String, StatementError> {
        if columns.is_empty() {
            return Ok("*".to_string());
        }
        let mut out = Vec::with_capacity(columns.len());
        for col in columns {
            out.push(self.format_identifier(col, "column")?);
        }
        Ok(out.join(", "))
    }

    fn format_identifier(&self, ident: &str, kind: &'static str) -> Result<String, StatementError> {
        if !is_valid_identifier(ident) {
            return Err(StatementError::InvalidIdentifier {
                kind,
                ident: ident.to_string(),
            });
        }
        match self.identifier_policy {
            IdentifierPolicy::Quote => Ok(quote_identifier(ident)),
            IdentifierPolicy::Validate => Ok(ident.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementError {
    InvalidIdentifier { kind: &'static str, ident: String },
}

impl std::fmt::Display for StatementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
        }
    }
}

impl std::error::Error for StatementError {}

/// Map a cell to the value bound for it.
///
/// Booleans bind as `0`/`1`, dates as ISO-8601 text, structured JSON as its
/// serialized text.
pub fn to_sql_value(value: &CellValue) -> Value {
    match value {
        CellValue::Null | CellValue::Unsupported => Value::Null,
        CellValue::Text(s) | CellValue::Enum(s) => Value::Text(s.clone()),
        CellValue::Integer(i) => Value::Integer(*i),
        CellValue::Float(f) => Value::Real(*f),
        CellValue::Bool(b) => Value::Integer(i64::from(*b)),
        CellValue::Uuid(id) => Value::Text(id.to_string()),
        CellValue::Timestamp(ts) => Value::Text(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
        CellValue::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        CellValue::Json(v) => Value::Text(v.to_string()),
    }
}

/// Translate a `LIKE` pattern into an equivalent `GLOB` pattern.
///
/// GLOB metacharacters in the input are bracketed so they match literally.
pub fn like_to_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '%' => glob.push('*'),
            '_' => glob.push('?'),
            '*' | '?' | '[' => {
                glob.push('[');
                glob.push(c);
                glob.push(']');
            }
            _ => glob.push(c),
        }
    }
    glob
}

fn is_valid_identifier(ident: &str) -> bool {
    !ident.is_empty() && ident.split('.').all(is_valid_segment)
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_identifier(ident: &str) -> String {
    ident
        .split('.')
        .map(|part| format!("\"{part}\""))
        .collect::<Vec<_>>()
        .join(".")
}
