//! Column descriptors and the column mapper.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::path::get_nested_value;
use super::path::value_to_cell;
use super::view::Translator;
use crate::error::TableError;

/// Key of the synthetic actions column.
pub const ACTIONS_COLUMN_KEY: &str = "actions";

/// Title key of the synthetic actions column.
pub const ACTIONS_COLUMN_TITLE_KEY: &str = "table.actions";

/// Fixed width of the synthetic actions column.
pub const ACTIONS_COLUMN_WIDTH: &str = "80px";

/// Custom cell renderer.
pub type CellRenderer<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Callback run when a row action is chosen.
pub type RowAction<T> = Arc<dyn Fn(&T) + Send + Sync>;

// =============================================================================
// Descriptors
// =============================================================================

/// Declarative description of a table column.
///
/// When no `data_mapping` is set, `key` doubles as the property read from the
/// row.
///
/// # Example
///
/// ```
/// use tradedesk_lib::table::ColumnDescriptor;
/// # #[derive(serde::Serialize)]
/// # struct Contract { folio: String }
///
/// let columns: Vec<ColumnDescriptor<Contract>> = vec![
///     ColumnDescriptor::new("folio", "contracts.folio").sortable(),
///     ColumnDescriptor::new("seller", "contracts.seller")
///         .mapping("participants[0].name")
///         .width("200px"),
/// ];
/// ```
pub struct ColumnDescriptor<T> {
    /// Unique key within the table.
    pub key: String,
    /// i18n key of the header title.
    pub title_key: String,
    /// Whether clicking the header changes the sort.
    pub sortable: bool,
    /// Optional CSS-style width hint (e.g. `"120px"`).
    pub width: Option<String>,
    /// Optional dot/bracket path used instead of `key` to read the row.
    pub data_mapping: Option<String>,
    render: Option<CellRenderer<T>>,
}

impl<T> ColumnDescriptor<T> {
    /// Creates a non-sortable column reading `row[key]`.
    pub fn new(key: impl Into<String>, title_key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title_key: title_key.into(),
            sortable: false,
            width: None,
            data_mapping: None,
            render: None,
        }
    }

    /// Marks the column as sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Sets the width hint.
    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Reads the cell from a nested path instead of `key`.
    pub fn mapping(mut self, path: impl Into<String>) -> Self {
        self.data_mapping = Some(path.into());
        self
    }

    /// Renders the cell with a custom function.
    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Returns `true` if a custom renderer is set.
    pub fn has_renderer(&self) -> bool {
        self.render.is_some()
    }

    /// The path used to read this column from a row.
    pub fn accessor(&self) -> &str {
        self.data_mapping.as_deref().unwrap_or(&self.key)
    }

    /// Serialisable projection forwarded to fetch sources.
    pub fn to_ref(&self) -> ColumnRef {
        ColumnRef {
            key: self.key.clone(),
            data_mapping: self.data_mapping.clone(),
        }
    }
}

impl<T> Clone for ColumnDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            title_key: self.title_key.clone(),
            sortable: self.sortable,
            width: self.width.clone(),
            data_mapping: self.data_mapping.clone(),
            render: self.render.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("title_key", &self.title_key)
            .field("sortable", &self.sortable)
            .field("width", &self.width)
            .field("data_mapping", &self.data_mapping)
            .field("render", &self.render.is_some())
            .finish()
    }
}

/// Column key and accessor path, as forwarded to a fetch source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRef {
    /// Column key.
    pub key: String,
    /// Nested path, if the column does not read `row[key]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_mapping: Option<String>,
}

impl ColumnRef {
    /// Creates a reference reading `row[key]`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            data_mapping: None,
        }
    }

    /// The path used to read this column from a row.
    pub fn accessor(&self) -> &str {
        self.data_mapping.as_deref().unwrap_or(&self.key)
    }
}

/// An entry of the per-row actions menu.
pub struct ActionItem<T> {
    /// Unique key within the menu.
    pub key: String,
    /// i18n key of the menu label.
    pub label_key: String,
    /// Optional style class forwarded to the renderer.
    pub class_name: Option<String>,
    action: RowAction<T>,
}

impl<T> ActionItem<T> {
    /// Creates a menu entry.
    pub fn new<F>(key: impl Into<String>, label_key: impl Into<String>, action: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            label_key: label_key.into(),
            class_name: None,
            action: Arc::new(action),
        }
    }

    /// Sets the style class.
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Runs the action against a row.
    pub fn invoke(&self, row: &T) {
        (self.action)(row)
    }
}

impl<T> Clone for ActionItem<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            label_key: self.label_key.clone(),
            class_name: self.class_name.clone(),
            action: self.action.clone(),
        }
    }
}

impl<T> fmt::Debug for ActionItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionItem")
            .field("key", &self.key)
            .field("label_key", &self.label_key)
            .field("class_name", &self.class_name)
            .finish()
    }
}

// =============================================================================
// Mapped columns
// =============================================================================

/// A rendered cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Plain text content.
    Text(String),
    /// Dropdown of row actions.
    Actions(Vec<ActionLabel>),
}

impl Cell {
    /// Returns the text content, or `None` for an actions cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            Cell::Actions(_) => None,
        }
    }
}

/// A translated action menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLabel {
    /// Action key, passed back to the controller when chosen.
    pub key: String,
    /// Translated label.
    pub label: String,
    /// Optional style class.
    pub class_name: Option<String>,
}

enum ColumnKind<T> {
    Data(ColumnDescriptor<T>),
    Actions(Vec<ActionItem<T>>),
}

/// A render-ready column produced by [`map_columns`].
pub struct MappedColumn<T> {
    kind: ColumnKind<T>,
}

impl<T> MappedColumn<T> {
    /// Column key.
    pub fn key(&self) -> &str {
        match &self.kind {
            ColumnKind::Data(d) => &d.key,
            ColumnKind::Actions(_) => ACTIONS_COLUMN_KEY,
        }
    }

    /// i18n key of the header title.
    pub fn title_key(&self) -> &str {
        match &self.kind {
            ColumnKind::Data(d) => &d.title_key,
            ColumnKind::Actions(_) => ACTIONS_COLUMN_TITLE_KEY,
        }
    }

    /// Width hint.
    pub fn width(&self) -> Option<&str> {
        match &self.kind {
            ColumnKind::Data(d) => d.width.as_deref(),
            ColumnKind::Actions(_) => Some(ACTIONS_COLUMN_WIDTH),
        }
    }

    /// Whether the header is clickable for sorting.
    pub fn sortable(&self) -> bool {
        match &self.kind {
            ColumnKind::Data(d) => d.sortable,
            ColumnKind::Actions(_) => false,
        }
    }

    /// Returns `true` for the synthetic actions column.
    pub fn is_actions(&self) -> bool {
        matches!(self.kind, ColumnKind::Actions(_))
    }

    /// Looks up an action of the actions column.
    pub fn action(&self, key: &str) -> Option<&ActionItem<T>> {
        match &self.kind {
            ColumnKind::Actions(items) => items.iter().find(|item| item.key == key),
            ColumnKind::Data(_) => None,
        }
    }

    /// Renders the cell for `row`.
    ///
    /// `row_json` is the serialised row used for path lookups. A custom
    /// renderer takes precedence over the path.
    pub fn cell(&self, row: &T, row_json: &Value, translator: &dyn Translator) -> Cell {
        match &self.kind {
            ColumnKind::Data(d) => match &d.render {
                Some(render) => Cell::Text(render(row)),
                None => Cell::Text(value_to_cell(get_nested_value(row_json, d.accessor()))),
            },
            ColumnKind::Actions(items) => Cell::Actions(
                items
                    .iter()
                    .map(|item| ActionLabel {
                        key: item.key.clone(),
                        label: translator.translate(&item.label_key),
                        class_name: item.class_name.clone(),
                    })
                    .collect(),
            ),
        }
    }
}

impl<T> Clone for MappedColumn<T> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            ColumnKind::Data(d) => ColumnKind::Data(d.clone()),
            ColumnKind::Actions(items) => ColumnKind::Actions(items.clone()),
        };
        Self { kind }
    }
}

impl<T> fmt::Debug for MappedColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedColumn")
            .field("key", &self.key())
            .field("actions", &self.is_actions())
            .finish()
    }
}

/// Turns column descriptors into render-ready columns.
///
/// Order is preserved. A synthetic actions column is appended when `actions`
/// is non-empty.
///
/// # Errors
///
/// Returns [`TableError::DuplicateColumn`] when two descriptors share a key
/// and [`TableError::ReservedColumn`] when a descriptor uses the actions key
/// while an actions menu is supplied.
pub fn map_columns<T>(
    descriptors: Vec<ColumnDescriptor<T>>,
    actions: Vec<ActionItem<T>>,
) -> Result<Vec<MappedColumn<T>>, TableError> {
    let mut seen = HashSet::new();
    for descriptor in &descriptors {
        if !seen.insert(descriptor.key.as_str()) {
            return Err(TableError::DuplicateColumn(descriptor.key.clone()));
        }
        if !actions.is_empty() && descriptor.key == ACTIONS_COLUMN_KEY {
            return Err(TableError::ReservedColumn(descriptor.key.clone()));
        }
    }

    let mut columns: Vec<MappedColumn<T>> = descriptors
        .into_iter()
        .map(|d| MappedColumn {
            kind: ColumnKind::Data(d),
        })
        .collect();

    if !actions.is_empty() {
        columns.push(MappedColumn {
            kind: ColumnKind::Actions(actions),
        });
    }

    Ok(columns)
}
