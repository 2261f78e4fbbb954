//! Presentation table: a render-ready view model and the events it emits.
//!
//! The view never fetches or mutates anything itself. Renderers read a
//! [`TableView`] and report user interaction back as [`TableEvent`]s, which the
//! controller turns into query changes.

use serde::Serialize;
use serde_json::Value;

use super::column::Cell;
use super::column::MappedColumn;
use super::fetch::TableSnapshot;
use super::filter::FilterKind;
use super::filter::FilterSet;
use super::query::PAGE_SIZE_OPTIONS;
use super::query::QueryState;
use super::query::SortDirection;
use super::status::LoadStatus;

/// i18n key of the empty-state message.
pub const EMPTY_MESSAGE_KEY: &str = "table.empty";

/// i18n key of the retry button.
pub const RETRY_LABEL_KEY: &str = "table.retry";

/// Resolves i18n keys to display text.
pub trait Translator: Send + Sync {
    /// Translates `key`; unknown keys should come back unchanged.
    fn translate(&self, key: &str) -> String;
}

/// Translator that shows the keys themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyTranslator;

impl Translator for KeyTranslator {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}

impl<F> Translator for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

// =============================================================================
// Events
// =============================================================================

/// User interaction reported by a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// A pagination button was pressed.
    PageChanged(u32),
    /// Another page size was picked.
    PageSizeChanged(u32),
    /// A sortable header was clicked.
    HeaderClicked(String),
    /// The search box changed (debounced by the controller).
    SearchInput(String),
    /// A filter value was clicked.
    FilterToggled {
        /// Filter key.
        key: String,
        /// Clicked value.
        value: String,
    },
    /// The retry button of the error state was pressed.
    Retry,
}

// =============================================================================
// View model
// =============================================================================

/// A column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    /// Column key.
    pub key: String,
    /// Translated title.
    pub title: String,
    /// Width hint.
    pub width: Option<String>,
    /// Whether clicking the header sorts.
    pub sortable: bool,
    /// Direction, if this column is the sorted one.
    pub sort: Option<SortDirection>,
}

impl HeaderCell {
    /// Sort indicator glyph.
    pub fn indicator(&self) -> &'static str {
        match (self.sortable, self.sort) {
            (_, Some(SortDirection::Asc)) => "▲",
            (_, Some(SortDirection::Desc)) => "▼",
            (true, None) => "↕",
            (false, None) => "",
        }
    }

    /// The event a click on this header produces, if it is sortable.
    pub fn click(&self) -> Option<TableEvent> {
        self.sortable
            .then(|| TableEvent::HeaderClicked(self.key.clone()))
    }
}

/// A body row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    /// Index of the row within the current page.
    pub index: usize,
    /// One cell per header.
    pub cells: Vec<Cell>,
}

/// A value of a filter control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    /// Value placed into the selection.
    pub value: String,
    /// Translated label.
    pub label: String,
    /// Whether the value is currently selected.
    pub selected: bool,
}

/// A filter control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterControl {
    /// Filter key.
    pub key: String,
    /// Translated title.
    pub title: String,
    /// Presentation.
    pub kind: FilterKind,
    /// Values with their selection state.
    pub chips: Vec<FilterChip>,
}

impl FilterControl {
    /// The event a click on `value` produces.
    pub fn click(&self, value: &str) -> TableEvent {
        TableEvent::FilterToggled {
            key: self.key.clone(),
            value: value.to_string(),
        }
    }
}

/// The error state shown instead of the empty state when a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorState {
    /// Error message.
    pub message: String,
    /// Translated retry label, if a retry could help.
    pub retry_label: Option<String>,
}

/// Pagination footer: "showing X–Y of Z" plus first/prev/next/last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page (1-based).
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of rows.
    pub total: u64,
    /// 1-based index of the first visible row (0 when none).
    pub from: u64,
    /// 1-based index of the last visible row (0 when none).
    pub to: u64,
}

impl Pagination {
    /// Computes the footer for a page.
    pub fn new(page: u32, page_size: u32, total: u64, total_pages: u32) -> Self {
        let offset = u64::from(page.saturating_sub(1)) * u64::from(page_size);
        let (from, to) = if total == 0 || offset >= total {
            (0, 0)
        } else {
            (offset + 1, (offset + u64::from(page_size)).min(total))
        };
        Self {
            page,
            page_size,
            total_pages,
            total,
            from,
            to,
        }
    }

    /// First and previous are disabled on the first page.
    pub fn first_disabled(&self) -> bool {
        self.page <= 1
    }

    /// See [`first_disabled`](Self::first_disabled).
    pub fn prev_disabled(&self) -> bool {
        self.first_disabled()
    }

    /// Next and last are disabled on the last page or when there are no pages.
    pub fn last_disabled(&self) -> bool {
        self.total_pages == 0 || self.page >= self.total_pages
    }

    /// See [`last_disabled`](Self::last_disabled).
    pub fn next_disabled(&self) -> bool {
        self.last_disabled()
    }

    /// Event of the "first" button, unless disabled.
    pub fn first(&self) -> Option<TableEvent> {
        (!self.first_disabled()).then_some(TableEvent::PageChanged(1))
    }

    /// Event of the "previous" button, unless disabled.
    pub fn prev(&self) -> Option<TableEvent> {
        (!self.prev_disabled()).then(|| TableEvent::PageChanged(self.page - 1))
    }

    /// Event of the "next" button, unless disabled.
    pub fn next(&self) -> Option<TableEvent> {
        (!self.next_disabled()).then(|| TableEvent::PageChanged(self.page + 1))
    }

    /// Event of the "last" button, unless disabled.
    pub fn last(&self) -> Option<TableEvent> {
        (!self.last_disabled()).then_some(TableEvent::PageChanged(self.total_pages))
    }

    /// The "X–Y of Z" part of the footer.
    pub fn range_label(&self) -> String {
        format!("{}–{} of {}", self.from, self.to, self.total)
    }
}

/// Everything a renderer needs to draw the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    /// Column headers.
    pub headers: Vec<HeaderCell>,
    /// Body rows of the current page.
    pub rows: Vec<ViewRow>,
    /// Filter controls.
    pub filters: Vec<FilterControl>,
    /// Current search term.
    pub search: String,
    /// Whether the loading overlay is shown.
    pub loading: bool,
    /// Translated empty-state message, when the last fetch returned no rows.
    pub empty_message: Option<String>,
    /// Error state, when the last fetch failed.
    pub error: Option<ErrorState>,
    /// Footer.
    pub pagination: Pagination,
    /// Page sizes offered by the selector.
    pub page_size_options: Vec<u32>,
}

impl TableView {
    /// Builds the view of a table.
    pub fn build<T: Serialize>(
        query: &QueryState,
        snapshot: &TableSnapshot<T>,
        columns: &[MappedColumn<T>],
        filters: &FilterSet,
        translator: &dyn Translator,
    ) -> Self {
        let headers = columns
            .iter()
            .map(|c| HeaderCell {
                key: c.key().to_string(),
                title: translator.translate(c.title_key()),
                width: c.width().map(str::to_string),
                sortable: c.sortable(),
                sort: query
                    .sort()
                    .filter(|s| s.key == c.key())
                    .map(|s| s.direction),
            })
            .collect();

        let rows = snapshot
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let json = serde_json::to_value(row).unwrap_or_else(|e| {
                    log::warn!("row {} could not be serialised: {}", index, e);
                    Value::Null
                });
                ViewRow {
                    index,
                    cells: columns
                        .iter()
                        .map(|c| c.cell(row, &json, translator))
                        .collect(),
                }
            })
            .collect();

        let filter_controls = filters
            .descriptors()
            .iter()
            .map(|d| FilterControl {
                key: d.key.clone(),
                title: translator.translate(&d.title_key),
                kind: d.kind,
                chips: d
                    .options
                    .iter()
                    .map(|o| FilterChip {
                        value: o.value.clone(),
                        label: translator.translate(&o.label),
                        selected: query.filters().is_selected(&d.key, &o.value),
                    })
                    .collect(),
            })
            .collect();

        let empty_message = (snapshot.status == LoadStatus::Ready && snapshot.rows.is_empty())
            .then(|| translator.translate(EMPTY_MESSAGE_KEY));

        let error = snapshot.status.as_error().map(|e| ErrorState {
            message: e.message.clone(),
            retry_label: e.retryable.then(|| translator.translate(RETRY_LABEL_KEY)),
        });

        Self {
            headers,
            rows,
            filters: filter_controls,
            search: query.search().to_string(),
            loading: snapshot.loading(),
            empty_message,
            error,
            pagination: Pagination::new(
                query.page(),
                query.page_size(),
                snapshot.total,
                snapshot.total_pages,
            ),
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
        }
    }

    /// Returns `true` if the table has nothing to show in its body.
    pub fn is_blank(&self) -> bool {
        self.rows.is_empty()
    }

    /// Event for the retry button, if the error state offers one.
    pub fn retry(&self) -> Option<TableEvent> {
        self.error
            .as_ref()
            .and_then(|e| e.retry_label.as_ref())
            .map(|_| TableEvent::Retry)
    }

    /// Event for picking a page size from the selector.
    pub fn pick_page_size(&self, size: u32) -> Option<TableEvent> {
        self.page_size_options
            .contains(&size)
            .then_some(TableEvent::PageSizeChanged(size))
    }
}
