use crate::value::CellValue;

/// Backend-neutral predicate added to a query handle.
///
/// # Example
///
/// ```ignore
/// query.add_predicate(Filter::or([
///     Filter::contains("firstName", term),
///     Filter::contains("email", term),
/// ]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, CellValue),
    NotEq(String, CellValue),
    /// SQL `LIKE` pattern (`%` and `_` wildcards), case-sensitive.
    Like(String, String),
    /// Case-insensitive `LIKE`.
    ILike(String, String),
    Gt(String, CellValue),
    Lt(String, CellValue),
    In(String, Vec<CellValue>),
    IsNull(String),
    IsNotNull(String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<CellValue>) -> Self {
        Filter::Eq(column.to_string(), value.into())
    }

    pub fn not_eq(column: &str, value: impl Into<CellValue>) -> Self {
        Filter::NotEq(column.to_string(), value.into())
    }

    pub fn like(column: &str, pattern: &str) -> Self {
        Filter::Like(column.to_string(), pattern.to_string())
    }

    pub fn ilike(column: &str, pattern: &str) -> Self {
        Filter::ILike(column.to_string(), pattern.to_string())
    }

    /// Case-insensitive substring match.
    pub fn contains(column: &str, term: &str) -> Self {
        Filter::ILike(column.to_string(), format!("%{term}%"))
    }

    pub fn gt(column: &str, value: impl Into<CellValue>) -> Self {
        Filter::Gt(column.to_string(), value.into())
    }

    pub fn lt(column: &str, value: impl Into<CellValue>) -> Self {
        Filter::Lt(column.to_string(), value.into())
    }

    pub fn is_in<V: Into<CellValue>>(column: &str, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(column.to_string(), values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(column: &str) -> Self {
        Filter::IsNull(column.to_string())
    }

    pub fn is_not_null(column: &str) -> Self {
        Filter::IsNotNull(column.to_string())
    }

    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }
}

/// Match `text` against a `LIKE` pattern.
pub fn like_matches(pattern: &str, text: &str, case_insensitive: bool) -> bool {
    let (pattern, text): (Vec<char>, Vec<char>) = if case_insensitive {
        (
            pattern.to_lowercase().chars().collect(),
            text.to_lowercase().chars().collect(),
        )
    } else {
        (pattern.chars().collect(), text.chars().collect())
    };

    // Greedy wildcard matching with backtracking to the last `%`.
    let (mut p, mut t) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut star_text = 0usize;
    while t < text.len() {
        if p < pattern.len() && pattern[p] == '%' {
            star = Some(p);
            star_text = t;
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if let Some(s) = star {
            p = s + 1;
            star_text += 1;
            t = star_text;
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == '%' {
        p += 1;
    }
    p == pattern.len()
}
