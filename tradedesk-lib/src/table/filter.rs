//! Filter descriptors and the filter reducer.
//!
//! Each filter key carries a [`SelectionMode`] that decides how a click on one
//! of its values changes the selection. The reducer is a pure function over
//! [`Filters`]; it never looks at key names.

use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::error::TableError;

/// Sentinel value meaning "no restriction" for [`SelectionMode::ExclusiveAll`].
pub const ALL: &str = "all";

/// How toggling a value changes the selection of a filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    /// Clicking a value adds it to, or removes it from, the selection.
    #[default]
    MultiSelect,
    /// At most one value; clicking the selected value clears the selection.
    SingleSelect,
    /// Like multi-select, but [`ALL`] excludes every other value and the
    /// selection never becomes empty.
    ExclusiveAll,
}

/// How a filter is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    /// A row of toggle buttons.
    #[default]
    Button,
    /// A dropdown.
    Select,
}

/// A selectable filter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    /// Stable identifier of the option.
    pub key: String,
    /// Value placed into the selection.
    pub value: String,
    /// Label (or i18n key) shown to the user.
    pub label: String,
}

impl FilterOption {
    /// Creates an option with distinct key, value and label.
    pub fn new(key: impl Into<String>, value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            label: label.into(),
        }
    }
}

impl From<&str> for FilterOption {
    fn from(value: &str) -> Self {
        Self::new(value, value, value)
    }
}

impl From<String> for FilterOption {
    fn from(value: String) -> Self {
        Self::new(value.clone(), value.clone(), value)
    }
}

/// Declarative description of a filter control.
///
/// The key must be one the table's fetch source understands; nothing checks
/// this statically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDescriptor {
    /// Filter key forwarded to the fetch source.
    pub key: String,
    /// i18n key of the filter title.
    pub title_key: String,
    /// Presentation.
    pub kind: FilterKind,
    /// Values the user can pick from.
    pub options: Vec<FilterOption>,
    /// Toggle semantics.
    pub selection_mode: SelectionMode,
}

impl FilterDescriptor {
    /// Creates a multi-select button filter.
    pub fn new(key: impl Into<String>, title_key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title_key: title_key.into(),
            kind: FilterKind::Button,
            options: Vec::new(),
            selection_mode: SelectionMode::MultiSelect,
        }
    }

    /// Sets the presentation.
    pub fn kind(mut self, kind: FilterKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the available values.
    pub fn options<I, O>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<FilterOption>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the toggle semantics.
    pub fn selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// The selection this filter starts with.
    pub fn default_selection(&self) -> Vec<String> {
        match self.selection_mode {
            SelectionMode::ExclusiveAll => vec![ALL.to_string()],
            SelectionMode::MultiSelect | SelectionMode::SingleSelect => Vec::new(),
        }
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Current selection per filter key.
///
/// Keys with an empty selection are not stored, so a missing key and an
/// empty selection are the same state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Filters {
    selected: BTreeMap<String, Vec<String>>,
}

impl<'de> Deserialize<'de> for Filters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Vec<String>>::deserialize(deserializer)?;
        let mut filters = Filters::new();
        for (key, values) in raw {
            filters.set(key, values);
        }
        Ok(filters)
    }
}

impl Filters {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the selection of `key`.
    pub fn with(mut self, key: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.set(key, values.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the selection of `key` (empty if none).
    pub fn get(&self, key: &str) -> &[String] {
        self.selected.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns `true` if `value` is selected for `key`.
    pub fn is_selected(&self, key: &str, value: &str) -> bool {
        self.get(key).iter().any(|v| v == value)
    }

    /// Returns `true` if no key has a selection.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Iterates over all keys with a selection, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.selected.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Iterates over selections that actually restrict results.
    ///
    /// The [`ALL`] sentinel is dropped and keys left with nothing are skipped.
    pub fn active(&self) -> impl Iterator<Item = (&str, Vec<&str>)> {
        self.selected.iter().filter_map(|(k, values)| {
            let values: Vec<&str> = values
                .iter()
                .map(String::as_str)
                .filter(|v| *v != ALL)
                .collect();
            (!values.is_empty()).then_some((k.as_str(), values))
        })
    }

    fn set(&mut self, key: impl Into<String>, values: Vec<String>) {
        let key = key.into();
        if values.is_empty() {
            self.selected.remove(&key);
        } else {
            self.selected.insert(key, values);
        }
    }
}

/// Applies one click on `value` of filter `key` under `mode`.
///
/// # Example
///
/// ```
/// use tradedesk_lib::table::{toggle, Filters, SelectionMode};
///
/// let filters = Filters::new().with("commodity", ["all"]);
/// let filters = toggle(&filters, "commodity", "corn", SelectionMode::ExclusiveAll);
/// assert_eq!(filters.get("commodity"), ["corn"]);
///
/// let filters = toggle(&filters, "commodity", "corn", SelectionMode::ExclusiveAll);
/// assert_eq!(filters.get("commodity"), ["all"]);
/// ```
pub fn toggle(filters: &Filters, key: &str, value: &str, mode: SelectionMode) -> Filters {
    let current = filters.get(key);

    let next: Vec<String> = match mode {
        SelectionMode::MultiSelect => toggle_value(current, value),
        SelectionMode::SingleSelect => {
            if current.len() == 1 && current[0] == value {
                Vec::new()
            } else {
                vec![value.to_string()]
            }
        }
        SelectionMode::ExclusiveAll => {
            if value == ALL {
                vec![ALL.to_string()]
            } else {
                let without_all: Vec<String> =
                    current.iter().filter(|v| *v != ALL).cloned().collect();
                let next = toggle_value(&without_all, value);
                if next.is_empty() {
                    vec![ALL.to_string()]
                } else {
                    next
                }
            }
        }
    };

    let mut result = filters.clone();
    result.set(key, next);
    result
}

fn toggle_value(current: &[String], value: &str) -> Vec<String> {
    if current.iter().any(|v| v == value) {
        current.iter().filter(|v| *v != value).cloned().collect()
    } else {
        let mut next = current.to_vec();
        next.push(value.to_string());
        next
    }
}

// =============================================================================
// FilterSet
// =============================================================================

/// The filters configured for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    descriptors: Vec<FilterDescriptor>,
}

impl FilterSet {
    /// Creates a filter set, rejecting duplicate keys.
    pub fn new(descriptors: Vec<FilterDescriptor>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for d in &descriptors {
            if !seen.insert(d.key.as_str()) {
                return Err(TableError::DuplicateFilter(d.key.clone()));
            }
        }
        Ok(Self { descriptors })
    }

    /// The configured descriptors, in display order.
    pub fn descriptors(&self) -> &[FilterDescriptor] {
        &self.descriptors
    }

    /// Looks up a descriptor by key.
    pub fn get(&self, key: &str) -> Option<&FilterDescriptor> {
        self.descriptors.iter().find(|d| d.key == key)
    }

    /// Selection mode of `key`; unknown keys are multi-select.
    pub fn mode(&self, key: &str) -> SelectionMode {
        self.get(key)
            .map(|d| d.selection_mode)
            .unwrap_or_default()
    }

    /// Initial selection for a freshly mounted table.
    pub fn defaults(&self) -> Filters {
        let mut filters = Filters::new();
        for d in &self.descriptors {
            filters.set(d.key.clone(), d.default_selection());
        }
        filters
    }

    /// Applies a click using the mode configured for `key`.
    pub fn toggle(&self, filters: &Filters, key: &str, value: &str) -> Filters {
        toggle(filters, key, value, self.mode(key))
    }
}
