//! Dot/bracket path resolution against JSON rows.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

/// Splits `participants[0].name` into `[Key("participants"), Index(0), Key("name")]`.
///
/// Returns `None` for malformed paths (empty segments, unclosed brackets,
/// non-numeric indices).
fn parse_path(path: &str) -> Option<Vec<Segment<'_>>> {
    if path.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    for part in path.split('.') {
        let (name, mut rest) = match part.find('[') {
            Some(idx) => (&part[..idx], &part[idx..]),
            None => (part, ""),
        };

        if name.is_empty() && rest.is_empty() {
            return None;
        }
        if !name.is_empty() {
            segments.push(Segment::Key(name));
        }

        while !rest.is_empty() {
            let inner = rest.strip_prefix('[')?;
            let close = inner.find(']')?;
            let index = inner[..close].trim().parse::<usize>().ok()?;
            segments.push(Segment::Index(index));
            rest = &inner[close + 1..];
        }
    }

    Some(segments)
}

/// Resolves a dot/bracket path against a JSON value.
///
/// Supports object keys, bracketed array indices and numeric keys on arrays
/// (`items.0.name` behaves like `items[0].name`). Anything that does not
/// resolve, including malformed paths, yields `None`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tradedesk_lib::table::get_nested_value;
///
/// let row = json!({ "participants": [{ "name": "A" }] });
/// assert_eq!(get_nested_value(&row, "participants[0].name"), Some(&json!("A")));
/// assert_eq!(get_nested_value(&json!({}), "a.b.c"), None);
/// ```
pub fn get_nested_value<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let segments = parse_path(path)?;

    segments
        .into_iter()
        .try_fold(value, |current, segment| match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key),
            (Segment::Key(key), Value::Array(items)) => {
                key.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            (Segment::Index(i), Value::Array(items)) => items.get(i),
            (Segment::Index(i), Value::Object(map)) => map.get(&i.to_string()),
            _ => None,
        })
}

/// Converts a resolved value into display text.
///
/// Missing values and `null` become the empty string.
pub fn value_to_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_resolves_bracket_index() {
        let row = json!({ "participants": [{ "name": "A" }, { "name": "B" }] });
        assert_eq!(get_nested_value(&row, "participants[0].name"), Some(&json!("A")));
        assert_eq!(get_nested_value(&row, "participants[1].name"), Some(&json!("B")));
        assert_eq!(get_nested_value(&row, "participants.1.name"), Some(&json!("B")));
    }

    #[test]
    fn test_missing_path_is_none() {
        assert_eq!(get_nested_value(&json!({}), "a.b.c"), None);
        assert_eq!(get_nested_value(&json!({ "a": 1 }), "a.b"), None);
        assert_eq!(get_nested_value(&json!({ "a": [] }), "a[3]"), None);
    }

    #[test]
    fn test_malformed_paths() {
        let row = json!({ "a": [{ "b": 1 }] });
        assert_eq!(get_nested_value(&row, ""), None);
        assert_eq!(get_nested_value(&row, "a..b"), None);
        assert_eq!(get_nested_value(&row, "a[0"), None);
        assert_eq!(get_nested_value(&row, "a[x].b"), None);
        assert_eq!(get_nested_value(&row, "a[0]b"), None);
    }

    #[test]
    fn test_nested_indices() {
        let row = json!({ "grid": [[1, 2], [3, 4]] });
        assert_eq!(get_nested_value(&row, "grid[1][0]"), Some(&json!(3)));
    }

    #[test]
    fn test_value_to_cell() {
        assert_eq!(value_to_cell(None), "");
        assert_eq!(value_to_cell(Some(&Value::Null)), "");
        assert_eq!(value_to_cell(Some(&json!("corn"))), "corn");
        assert_eq!(value_to_cell(Some(&json!(12.5))), "12.5");
        assert_eq!(value_to_cell(Some(&json!(true))), "true");
        assert_eq!(value_to_cell(Some(&json!([1, 2]))), "[1,2]");
    }
}
