//! Filter documents understood by the backend's `filter` query parameter.

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

/// A filter condition for list queries.
///
/// Filters render to the Mongo-style JSON document the backend expects in its
/// `filter` query parameter. Conditions can be combined with [`Filter::and`]
/// and [`Filter::or`].
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tradedesk_lib::api::query::Filter;
///
/// let filter = Filter::and([
///     Filter::contains("name", "acme"),
///     Filter::any_of("status", ["active", "pending"]),
/// ]);
///
/// assert_eq!(
///     filter.to_json(),
///     json!({"$and": [
///         {"name": {"$regex": "acme", "$options": "i"}},
///         {"status": {"$in": ["active", "pending"]}}
///     ]})
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Equality: `{field: value}`
    Eq(String, Value),
    /// Not equal: `{field: {"$ne": value}}`
    Ne(String, Value),
    /// Greater than: `{field: {"$gt": value}}`
    Gt(String, Value),
    /// Greater than or equal: `{field: {"$gte": value}}`
    Gte(String, Value),
    /// Less than: `{field: {"$lt": value}}`
    Lt(String, Value),
    /// Less than or equal: `{field: {"$lte": value}}`
    Lte(String, Value),
    /// Membership: `{field: {"$in": [..]}}`
    In(String, Vec<Value>),
    /// Case-insensitive substring match on a literal string.
    Contains(String, String),
    /// Field presence: `{field: {"$exists": bool}}`
    Exists(String, bool),
    /// Logical AND of multiple filters.
    And(Vec<Filter>),
    /// Logical OR of multiple filters.
    Or(Vec<Filter>),
    /// Raw filter document (escape hatch).
    Raw(Value),
}

impl Filter {
    /// Creates an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    /// Creates a not-equal filter.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    /// Creates a greater-than filter.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gt(field.into(), value.into())
    }

    /// Creates a greater-than-or-equal filter.
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gte(field.into(), value.into())
    }

    /// Creates a less-than filter.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lt(field.into(), value.into())
    }

    /// Creates a less-than-or-equal filter.
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lte(field.into(), value.into())
    }

    /// Creates a membership filter from any iterable of values.
    pub fn any_of<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// Creates a case-insensitive substring filter.
    ///
    /// `needle` is matched literally; regex metacharacters are escaped.
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Filter::Contains(field.into(), needle.into())
    }

    /// Creates a field-presence filter.
    pub fn exists(field: impl Into<String>, present: bool) -> Self {
        Filter::Exists(field.into(), present)
    }

    /// Combines filters with logical AND.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    /// Combines filters with logical OR.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    /// Combines this filter with another using AND.
    pub fn and_also(self, other: Filter) -> Self {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    /// Combines a list of clauses, collapsing the trivial cases.
    ///
    /// Returns `None` for no clauses and the clause itself for one.
    pub fn all_of(mut clauses: Vec<Filter>) -> Option<Filter> {
        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Filter::And(clauses)),
        }
    }

    /// Renders the filter as a JSON document.
    pub fn to_json(&self) -> Value {
        match self {
            Filter::Eq(field, value) => single(field, value.clone()),
            Filter::Ne(field, value) => operator(field, "$ne", value.clone()),
            Filter::Gt(field, value) => operator(field, "$gt", value.clone()),
            Filter::Gte(field, value) => operator(field, "$gte", value.clone()),
            Filter::Lt(field, value) => operator(field, "$lt", value.clone()),
            Filter::Lte(field, value) => operator(field, "$lte", value.clone()),
            Filter::In(field, values) => operator(field, "$in", Value::Array(values.clone())),
            Filter::Contains(field, needle) => single(
                field,
                json!({ "$regex": escape_regex(needle), "$options": "i" }),
            ),
            Filter::Exists(field, present) => operator(field, "$exists", Value::Bool(*present)),
            Filter::And(filters) => json!({ "$and": filters.iter().map(Filter::to_json).collect::<Vec<_>>() }),
            Filter::Or(filters) => json!({ "$or": filters.iter().map(Filter::to_json).collect::<Vec<_>>() }),
            Filter::Raw(value) => value.clone(),
        }
    }
}

fn single(field: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(field.to_string(), value);
    Value::Object(map)
}

fn operator(field: &str, op: &str, value: Value) -> Value {
    single(field, single(op, value))
}

/// Escapes regex metacharacters so `input` matches literally.
pub fn escape_regex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
