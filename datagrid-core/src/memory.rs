//! In-memory backend.
//!
//! Evaluates [`Filter`]s against accessor values and sorts with a stable
//! multi-key comparison. Useful for tests and small reference tables.

use std::cmp::Ordering;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use crate::accessor::Accessors;
use crate::entity::Entity;
use crate::error::DataTableError;
use crate::filter::{like_matches, Filter};
use crate::query::{PageSlice, QueryBackend, QueryHandle};
use crate::request::OrderDirection;
use crate::value::CellValue;

type RowPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Shared in-memory store of entities.
pub struct MemoryBackend<T> {
    rows: Arc<RwLock<Vec<T>>>,
    accessors: Arc<Accessors<T>>,
}

impl<T: Entity + Clone> MemoryBackend<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
            accessors: Arc::new(Accessors::for_entity()),
        }
    }

    pub fn insert(&self, row: T) {
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        rows.push(row);
    }

    /// Keep only rows for which `keep` returns `true`.
    pub fn retain(&self, keep: impl FnMut(&T) -> bool) {
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        rows.retain(keep);
    }

    pub fn len(&self) -> usize {
        read_rows(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Clone for MemoryBackend<T> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            accessors: self.accessors.clone(),
        }
    }
}

impl<T: Entity + Clone> QueryBackend for MemoryBackend<T> {
    type Entity = T;
    type Query = MemoryQuery<T>;

    fn new_query(&self) -> MemoryQuery<T> {
        MemoryQuery {
            rows: self.rows.clone(),
            accessors: self.accessors.clone(),
            filters: Vec::new(),
            predicates: Vec::new(),
            order: Vec::new(),
            offset: 0,
            limit: None,
        }
    }
}

/// Query handle over a [`MemoryBackend`].
pub struct MemoryQuery<T> {
    rows: Arc<RwLock<Vec<T>>>,
    accessors: Arc<Accessors<T>>,
    filters: Vec<Filter>,
    predicates: Vec<RowPredicate<T>>,
    order: Vec<(String, OrderDirection)>,
    offset: u64,
    limit: Option<u64>,
}

impl<T: Entity + Clone> MemoryQuery<T> {
    /// Add a closure predicate, for restrictions `Filter` cannot express.
    pub fn filter_with(&mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) {
        self.predicates.push(Arc::new(predicate));
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn orders(&self) -> &[(String, OrderDirection)] {
        &self.order
    }

    pub fn window(&self) -> (u64, Option<u64>) {
        (self.offset, self.limit)
    }

    fn matching(&self) -> Vec<T> {
        read_rows(&self.rows)
            .iter()
            .filter(|row| self.filters.iter().all(|f| self.eval(f, *row)))
            .filter(|row| self.predicates.iter().all(|p| p(*row)))
            .cloned()
            .collect()
    }

    fn value(&self, row: &T, field: &str) -> Option<CellValue> {
        self.accessors.read(row, field)
    }

    fn eval(&self, filter: &Filter, row: &T) -> bool {
        let compare = |field: &str, expected: &CellValue, accept: fn(Ordering) -> bool| {
            match self.value(row, field) {
                Some(actual) if !actual.is_null() && !expected.is_null() => {
                    accept(compare_cells(&actual, expected))
                }
                _ => false,
            }
        };
        let like = |field: &str, pattern: &str, case_insensitive: bool| {
            self.value(row, field)
                .and_then(|v| v.as_text())
                .map(|text| like_matches(pattern, &text, case_insensitive))
                .unwrap_or(false)
        };

        match filter {
            Filter::Eq(field, v) => compare(field, v, Ordering::is_eq),
            Filter::NotEq(field, v) => compare(field, v, Ordering::is_ne),
            Filter::Gt(field, v) => compare(field, v, Ordering::is_gt),
            Filter::Lt(field, v) => compare(field, v, Ordering::is_lt),
            Filter::Like(field, pattern) => like(field, pattern, false),
            Filter::ILike(field, pattern) => like(field, pattern, true),
            Filter::In(field, values) => values.iter().any(|v| compare(field, v, Ordering::is_eq)),
            Filter::IsNull(field) => self.value(row, field).map_or(true, |v| v.is_null()),
            Filter::IsNotNull(field) => self.value(row, field).is_some_and(|v| !v.is_null()),
            Filter::And(filters) => filters.iter().all(|f| self.eval(f, row)),
            Filter::Or(filters) => filters.iter().any(|f| self.eval(f, row)),
        }
    }

    fn sort(&self, rows: &mut [T]) {
        if self.order.is_empty() {
            return;
        }
        // `sort_by` is stable: rows equal on every key keep insertion order.
        rows.sort_by(|a, b| {
            for (field, direction) in &self.order {
                let left = self.value(a, field).unwrap_or(CellValue::Null);
                let right = self.value(b, field).unwrap_or(CellValue::Null);
                let ord = compare_cells(&left, &right);
                let ord = if direction.is_ascending() { ord } else { ord.reverse() };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }
}

impl<T: Entity + Clone> QueryHandle for MemoryQuery<T> {
    type Entity = T;

    fn add_predicate(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    fn add_order(&mut self, field: &str, direction: OrderDirection) {
        self.order.push((field.to_string(), direction));
    }

    fn set_window(&mut self, offset: u64, limit: Option<u64>) {
        self.offset = offset;
        self.limit = limit;
    }

    fn fetch_page(&mut self) -> Result<PageSlice<T>, DataTableError> {
        let mut rows = self.matching();
        let filtered_count = rows.len() as u64;
        self.sort(&mut rows);
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let items = match self.limit {
            Some(limit) => rows
                .into_iter()
                .skip(offset)
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            None => rows.into_iter().skip(offset).collect(),
        };
        Ok(PageSlice::new(items, filtered_count))
    }

    fn count(&mut self) -> Result<u64, DataTableError> {
        Ok(self.matching().len() as u64)
    }
}

fn read_rows<T>(rows: &RwLock<Vec<T>>) -> RwLockReadGuard<'_, Vec<T>> {
    rows.read().unwrap_or_else(|e| e.into_inner())
}

fn rank(value: &CellValue) -> u8 {
    match value {
        CellValue::Null | CellValue::Unsupported => 0,
        CellValue::Bool(_) => 1,
        CellValue::Integer(_) | CellValue::Float(_) => 2,
        CellValue::Date(_) | CellValue::Timestamp(_) => 3,
        CellValue::Text(_) | CellValue::Enum(_) | CellValue::Uuid(_) => 4,
        CellValue::Json(_) => 5,
    }
}

/// NaN ranks after every other number and equal to itself.
fn compare_floats(x: f64, y: f64) -> Ordering {
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

/// Total order over cells: nulls first, numbers compared across int/float.
pub(crate) fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    use CellValue::*;
    match (a, b) {
        (Integer(x), Integer(y)) => x.cmp(y),
        (Integer(x), Float(y)) => compare_floats(*x as f64, *y),
        (Float(x), Integer(y)) => compare_floats(*x, *y as f64),
        (Float(x), Float(y)) => compare_floats(*x, *y),
        (Bool(x), Bool(y)) => x.cmp(y),
        (Date(x), Date(y)) => x.cmp(y),
        (Timestamp(x), Timestamp(y)) => x.cmp(y),
        (Date(x), Timestamp(y)) => x.and_hms_opt(0, 0, 0).map_or(Ordering::Equal, |d| d.cmp(y)),
        (Timestamp(x), Date(y)) => y.and_hms_opt(0, 0, 0).map_or(Ordering::Equal, |d| x.cmp(&d)),
        _ if rank(a) == rank(b) => a.as_text().cmp(&b.as_text()),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_compare_across_kinds() {
        assert_eq!(compare_cells(&CellValue::Integer(2), &CellValue::Float(2.5)), Ordering::Less);
        assert_eq!(compare_cells(&CellValue::Float(3.0), &CellValue::Integer(3)), Ordering::Equal);
    }

    #[test]
    fn test_nan_ranks_after_numbers() {
        let nan = CellValue::Float(f64::NAN);
        assert_eq!(compare_cells(&nan, &CellValue::Float(f64::INFINITY)), Ordering::Greater);
        assert_eq!(compare_cells(&CellValue::Integer(i64::MAX), &nan), Ordering::Less);
        assert_eq!(compare_cells(&nan, &CellValue::Float(f64::NAN)), Ordering::Equal);
        assert_eq!(compare_cells(&CellValue::Null, &nan), Ordering::Less);
    }

    #[derive(Debug, Clone)]
    struct Reading {
        id: i64,
        value: f64,
    }

    impl Entity for Reading {
        fn table_name() -> &'static str {
            "reading"
        }

        fn register_accessors(accessors: &mut Accessors<Self>) {
            accessors
                .register("getId", |r: &Reading| r.id)
                .register("getValue", |r: &Reading| r.value);
        }
    }

    #[test]
    fn test_order_with_nan_values() {
        let rows = (0..60)
            .map(|i| Reading {
                id: i,
                value: if i % 3 == 0 { f64::NAN } else { ((i * 37) % 101) as f64 },
            })
            .collect();
        let backend = MemoryBackend::new(rows);

        let mut query = backend.new_query();
        query.add_order("value", OrderDirection::Asc);
        let page = query.fetch_page().unwrap();
        let values: Vec<f64> = page.items.iter().map(|r| r.value).collect();
        let (numbers, nans) = values.split_at(40);
        assert!(numbers.windows(2).all(|w| w[0] <= w[1]), "{numbers:?}");
        assert!(nans.iter().all(|v| v.is_nan()));

        let mut query = backend.new_query();
        query.add_order("value", OrderDirection::Desc);
        let page = query.fetch_page().unwrap();
        assert!(page.items[..20].iter().all(|r| r.value.is_nan()));
        assert!(page.items[20..].windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn test_nulls_sort_first() {
        assert_eq!(compare_cells(&CellValue::Null, &CellValue::Integer(0)), Ordering::Less);
        assert_eq!(
            compare_cells(&CellValue::from("b"), &CellValue::from("a")),
            Ordering::Greater
        );
    }
}
