use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;
use uuid::Uuid;

/// Default pattern for date and timestamp cells (`dd/MM/yyyy`).
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// A scalar produced for one cell of a row.
///
/// Accessors and display handlers return this instead of an arbitrary
/// value, so serialization never has to inspect types at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Uuid(Uuid),
    /// Symbolic name of an enumerated value.
    Enum(String),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    /// Structured JSON, passed through unchanged.
    Json(Value),
    /// A value with no JSON mapping; always serialized as `null`.
    Unsupported,
}

/// Enumerations that expose a symbolic name.
///
/// ```ignore
/// enum Role { Admin, User }
///
/// impl Symbolic for Role {
///     fn symbol(&self) -> &str {
///         match self {
///             Role::Admin => "ADMIN",
///             Role::User => "USER",
///         }
///     }
/// }
/// ```
pub trait Symbolic {
    fn symbol(&self) -> &str;
}

impl CellValue {
    pub fn enumeration<E: Symbolic + ?Sized>(value: &E) -> Self {
        CellValue::Enum(value.symbol().to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null | CellValue::Unsupported)
    }

    /// Encode the cell into its canonical JSON value.
    ///
    /// Enum symbols that parse as integers are emitted as numbers, other
    /// symbols as strings. Dates use `date_format` (chrono `strftime` syntax).
    pub fn to_json(&self, date_format: &str) -> Value {
        match self {
            CellValue::Null | CellValue::Unsupported => Value::Null,
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Integer(i) => Value::from(*i),
            CellValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Uuid(id) => Value::String(id.to_string()),
            CellValue::Enum(symbol) => match symbol.parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::String(symbol.clone()),
            },
            CellValue::Timestamp(ts) => format_date(ts.format(date_format)),
            CellValue::Date(d) => format_date(d.format(date_format)),
            CellValue::Json(v) => v.clone(),
        }
    }

    /// Plain-text form used for pattern matching, `None` for null-like cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null | CellValue::Unsupported => None,
            CellValue::Text(s) | CellValue::Enum(s) => Some(s.clone()),
            CellValue::Integer(i) => Some(i.to_string()),
            CellValue::Float(f) => Some(f.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Uuid(id) => Some(id.to_string()),
            CellValue::Timestamp(ts) => Some(ts.to_string()),
            CellValue::Date(d) => Some(d.to_string()),
            CellValue::Json(v) => Some(v.to_string()),
        }
    }
}

fn format_date(formatted: impl std::fmt::Display) -> Value {
    let mut out = String::new();
    match write!(out, "{formatted}") {
        Ok(()) => Value::String(out),
        Err(_) => Value::Null,
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<&String> for CellValue {
    fn from(value: &String) -> Self {
        CellValue::Text(value.clone())
    }
}

macro_rules! integer_cell {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for CellValue {
                fn from(value: $ty) -> Self {
                    CellValue::Integer(i64::from(value))
                }
            }
        )*
    };
}

integer_cell!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => CellValue::Integer(v),
            Err(_) => CellValue::Float(value as f64),
        }
    }
}

impl From<f32> for CellValue {
    fn from(value: f32) -> Self {
        CellValue::Float(f64::from(value))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<Uuid> for CellValue {
    fn from(value: Uuid) -> Self {
        CellValue::Uuid(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Timestamp(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for CellValue {
    fn from(value: DateTime<Tz>) -> Self {
        CellValue::Timestamp(value.naive_utc())
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        CellValue::Json(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}
