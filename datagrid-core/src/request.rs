use std::collections::{HashMap, HashSet};

use garde::Validate;
use serde::{Deserialize, Serialize};

/// Sort direction of one order entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    /// Lenient parse: `asc`/`desc` in any case, anything else is `Asc`.
    pub fn parse(dir: &str) -> Self {
        if dir.trim().eq_ignore_ascii_case("desc") {
            OrderDirection::Desc
        } else {
            OrderDirection::Asc
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }

    pub fn is_ascending(self) -> bool {
        self == OrderDirection::Asc
    }
}

impl std::fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A search term, global or per column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Search {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub regex: bool,
}

impl Search {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            regex: false,
        }
    }

    /// The term, when it is not empty.
    pub fn term(&self) -> Option<&str> {
        if self.value.is_empty() {
            None
        } else {
            Some(&self.value)
        }
    }
}

fn enabled() -> bool {
    true
}

/// Client-declared column descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Column {
    /// Canonical position of the column in each row.
    #[garde(range(min = 0))]
    pub data: i32,
    /// Logical field name used to look up handlers and accessors.
    #[serde(default)]
    #[garde(skip)]
    pub name: String,
    #[serde(rename = "searcheable", alias = "searchable", default = "enabled")]
    #[garde(skip)]
    pub searchable: bool,
    #[serde(default = "enabled")]
    #[garde(skip)]
    pub orderable: bool,
    #[serde(default)]
    #[garde(skip)]
    pub search: Option<Search>,
}

impl Column {
    pub fn new(data: i32, name: impl Into<String>) -> Self {
        Self {
            data,
            name: name.into(),
            searchable: true,
            orderable: true,
            search: None,
        }
    }

    pub fn with_search(mut self, value: impl Into<String>) -> Self {
        self.search = Some(Search::new(value));
        self
    }

    /// The per-column search term, when present and not empty.
    pub fn search_value(&self) -> Option<&str> {
        self.search.as_ref().and_then(Search::term)
    }
}

/// One entry of the order list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub column: i32,
    #[serde(default)]
    pub dir: String,
}

impl Order {
    pub fn new(column: i32, dir: impl Into<String>) -> Self {
        Self {
            column,
            dir: dir.into(),
        }
    }

    pub fn direction(&self) -> OrderDirection {
        OrderDirection::parse(&self.dir)
    }
}

fn all_rows() -> i64 {
    -1
}

/// A normalized table request.
///
/// `length` below zero means "all rows".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Parameters {
    #[garde(skip)]
    pub draw: i64,
    #[garde(dive, custom(unique_positions))]
    pub columns: Vec<Column>,
    #[serde(default)]
    #[garde(skip)]
    pub order: Vec<Order>,
    #[serde(default)]
    #[garde(range(min = 0))]
    pub start: i64,
    #[serde(default = "all_rows")]
    #[garde(skip)]
    pub length: i64,
    #[serde(default)]
    #[garde(skip)]
    pub search: Option<Search>,
}

fn unique_positions(columns: &Vec<Column>, _ctx: &()) -> garde::Result {
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.data) {
            return Err(garde::Error::new(format!(
                "duplicate column position {}",
                column.data
            )));
        }
    }
    Ok(())
}

impl Parameters {
    pub fn new(draw: i64, columns: Vec<Column>) -> Self {
        Self {
            draw,
            columns,
            order: Vec::new(),
            start: 0,
            length: all_rows(),
            search: None,
        }
    }

    pub fn page(mut self, start: i64, length: i64) -> Self {
        self.start = start;
        self.length = length;
        self
    }

    pub fn order_by(mut self, column: i32, dir: impl Into<String>) -> Self {
        self.order.push(Order::new(column, dir));
        self
    }

    pub fn search(mut self, value: impl Into<String>) -> Self {
        self.search = Some(Search::new(value));
        self
    }

    /// Columns keyed by position.
    pub fn indexed_columns(&self) -> HashMap<i32, &Column> {
        self.columns.iter().map(|c| (c.data, c)).collect()
    }

    pub fn column_at(&self, position: i32) -> Option<&Column> {
        self.columns.iter().find(|c| c.data == position)
    }

    /// Columns sorted by position; this is the cell order of every row.
    pub fn columns_by_position(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        columns.sort_by_key(|c| c.data);
        columns
    }

    /// The global search term, when present and not empty.
    pub fn global_search(&self) -> Option<&str> {
        self.search.as_ref().and_then(Search::term)
    }

    /// `(offset, limit)`; a `None` limit means all rows.
    pub fn window(&self) -> (u64, Option<u64>) {
        let offset = u64::try_from(self.start).unwrap_or(0);
        let limit = u64::try_from(self.length).ok();
        (offset, limit)
    }
}
