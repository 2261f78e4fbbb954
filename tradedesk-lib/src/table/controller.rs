//! The generic table controller.
//!
//! Ties query state, filter reducer, fetcher and column mapper together behind
//! one cheap-to-clone handle. Every query change spawns a fetch on the tokio
//! runtime; the returned [`FetchHandle`] can be awaited but does not have to be.

use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::TableRow;
use super::column::ActionItem;
use super::column::ColumnDescriptor;
use super::column::ColumnRef;
use super::column::MappedColumn;
use super::column::map_columns;
use super::debounce::DEFAULT_SEARCH_DEBOUNCE;
use super::debounce::Debouncer;
use super::fetch::DEFAULT_MIN_LOADING;
use super::fetch::FetchOutcome;
use super::fetch::FetchParams;
use super::fetch::Fetcher;
use super::fetch::TableSnapshot;
use super::fetch::TableSource;
use super::filter::FilterDescriptor;
use super::filter::FilterSet;
use super::query::QueryState;
use super::query::SortDirection;
use super::query::TableVariant;
use super::view::TableEvent;
use super::view::TableView;
use super::view::Translator;
use crate::error::TableError;

/// Handle of a spawned fetch.
pub type FetchHandle = JoinHandle<FetchOutcome>;

/// Tuning knobs of a table.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tradedesk_lib::table::{TableOptions, TableVariant};
///
/// let options = TableOptions::default()
///     .variant(TableVariant::Compact)
///     .min_loading(Duration::ZERO);
/// ```
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Table flavour; decides the initial page size.
    pub variant: TableVariant,
    /// Minimum time the loading state stays visible.
    pub min_loading: Duration,
    /// Delay between the last search keystroke and the request.
    pub search_debounce: Duration,
    /// Whether column keys and paths are forwarded in [`FetchParams::columns`].
    pub forward_columns: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            variant: TableVariant::Standard,
            min_loading: DEFAULT_MIN_LOADING,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            forward_columns: true,
        }
    }
}

impl TableOptions {
    /// Sets the table flavour.
    pub fn variant(mut self, variant: TableVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the minimum loading time.
    pub fn min_loading(mut self, min_loading: Duration) -> Self {
        self.min_loading = min_loading;
        self
    }

    /// Sets the search debounce delay.
    pub fn search_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce = delay;
        self
    }

    /// Enables or disables forwarding of column information to the source.
    pub fn forward_columns(mut self, enabled: bool) -> Self {
        self.forward_columns = enabled;
        self
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for a [`TableController`].
pub struct TableBuilder<T> {
    source: Arc<dyn TableSource<T>>,
    columns: Vec<ColumnDescriptor<T>>,
    actions: Vec<ActionItem<T>>,
    filters: Vec<FilterDescriptor>,
    options: TableOptions,
    initial: Option<Box<dyn FnOnce(&mut QueryState, &FilterSet) + Send>>,
}

impl<T: TableRow> TableBuilder<T> {
    /// Sets the columns.
    pub fn columns(mut self, columns: Vec<ColumnDescriptor<T>>) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the per-row actions menu.
    pub fn actions(mut self, actions: Vec<ActionItem<T>>) -> Self {
        self.actions = actions;
        self
    }

    /// Sets the filters.
    pub fn filters(mut self, filters: Vec<FilterDescriptor>) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the options.
    pub fn options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Adjusts the initial query before anything is fetched.
    ///
    /// `f` runs on the default state for the configured variant and filters.
    pub fn initial_query<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut QueryState, &FilterSet) + Send + 'static,
    {
        self.initial = Some(Box::new(f));
        self
    }

    /// Builds the controller. Nothing is fetched until
    /// [`refresh`](TableController::refresh) or a query change.
    ///
    /// # Errors
    ///
    /// Fails on duplicate column or filter keys.
    pub fn build(self) -> Result<TableController<T>, TableError> {
        let column_refs = self.columns.iter().map(ColumnDescriptor::to_ref).collect();
        let columns = map_columns(self.columns, self.actions)?;
        let filters = FilterSet::new(self.filters)?;
        let mut query = QueryState::for_table(self.options.variant, &filters);
        if let Some(initial) = self.initial {
            initial(&mut query, &filters);
        }
        let fetcher = Fetcher::new(self.source).with_min_loading(self.options.min_loading);

        Ok(TableController {
            shared: Arc::new(Shared {
                query: RwLock::new(query),
                filters,
                columns,
                column_refs,
                fetcher,
                debouncer: Debouncer::new(self.options.search_debounce),
                forward_columns: self.options.forward_columns,
            }),
        })
    }
}

// =============================================================================
// Controller
// =============================================================================

struct Shared<T> {
    query: RwLock<QueryState>,
    filters: FilterSet,
    columns: Vec<MappedColumn<T>>,
    column_refs: Vec<ColumnRef>,
    fetcher: Fetcher<T>,
    debouncer: Debouncer,
    forward_columns: bool,
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        self.debouncer.cancel();
        self.fetcher.cancel();
    }
}

/// Owns the state of one table and drives its fetches.
///
/// Cheap to clone; clones control the same table. When the last clone is
/// dropped (or [`close`](Self::close) is called) pending search timers are
/// cleared and in-flight fetches are discarded.
pub struct TableController<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for TableController<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: TableRow> TableController<T> {
    /// Starts building a controller around a source.
    pub fn builder(source: impl TableSource<T> + 'static) -> TableBuilder<T> {
        TableBuilder {
            source: Arc::new(source),
            columns: Vec::new(),
            actions: Vec::new(),
            filters: Vec::new(),
            options: TableOptions::default(),
            initial: None,
        }
    }

    /// Returns a copy of the query state.
    pub fn query(&self) -> QueryState {
        self.shared
            .query
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns a copy of what the table currently shows.
    pub fn snapshot(&self) -> TableSnapshot<T> {
        self.shared.fetcher.snapshot()
    }

    /// The configured filters.
    pub fn filters(&self) -> &FilterSet {
        &self.shared.filters
    }

    /// The mapped columns, actions column included.
    pub fn columns(&self) -> &[MappedColumn<T>] {
        &self.shared.columns
    }

    /// The parameters the next fetch would be issued with.
    pub fn params(&self) -> FetchParams {
        let refs = self.column_refs();
        self.shared
            .query
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .to_params(refs)
    }

    /// Fetches the current query again.
    pub fn refresh(&self) -> FetchHandle {
        self.update(|_| {})
    }

    /// Retries after a failed fetch.
    pub fn retry(&self) -> FetchHandle {
        self.refresh()
    }

    /// Moves to page `n`.
    pub fn set_page(&self, n: u32) -> FetchHandle {
        self.update(|q| q.set_page(n))
    }

    /// Changes the page size; returns to page 1.
    pub fn set_page_size(&self, n: u32) -> FetchHandle {
        self.update(|q| q.set_page_size(n))
    }

    /// Sets the sort.
    pub fn set_sort(&self, key: impl Into<String>, direction: SortDirection) -> FetchHandle {
        let key = key.into();
        self.update(|q| q.set_sort(key, direction))
    }

    /// Applies a header click.
    ///
    /// Returns `None` (and fetches nothing) if `key` is not a sortable column.
    pub fn toggle_sort(&self, key: &str) -> Option<FetchHandle> {
        let sortable = self
            .shared
            .columns
            .iter()
            .any(|c| c.key() == key && c.sortable());
        if !sortable {
            return None;
        }
        Some(self.update(|q| {
            q.toggle_sort(key);
        }))
    }

    /// Changes the search term immediately; returns to page 1.
    pub fn set_search(&self, term: impl Into<String>) -> FetchHandle {
        let term = term.into();
        self.shared.debouncer.cancel();
        self.update(|q| q.set_search(term))
    }

    /// Feeds a search-box change through the debouncer.
    ///
    /// Only the last term of a burst of input within the debounce window is
    /// searched for.
    pub fn search_input(&self, term: impl Into<String>) {
        let term = term.into();
        let weak: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        self.shared.debouncer.call(async move {
            if let Some(shared) = weak.upgrade() {
                let controller = TableController { shared };
                controller.update(|q| q.set_search(term));
            }
        });
    }

    /// Toggles a filter value; returns to page 1.
    pub fn toggle_filter(&self, key: &str, value: &str) -> FetchHandle {
        let filters = &self.shared.filters;
        self.update(|q| q.toggle_filter(filters, key, value))
    }

    /// Applies an event reported by the presentation.
    ///
    /// Returns the spawned fetch, if the event started one right away.
    pub fn handle(&self, event: TableEvent) -> Option<FetchHandle> {
        match event {
            TableEvent::PageChanged(page) => Some(self.set_page(page)),
            TableEvent::PageSizeChanged(size) => Some(self.set_page_size(size)),
            TableEvent::HeaderClicked(key) => self.toggle_sort(&key),
            TableEvent::SearchInput(term) => {
                self.search_input(term);
                None
            }
            TableEvent::FilterToggled { key, value } => Some(self.toggle_filter(&key, &value)),
            TableEvent::Retry => Some(self.retry()),
        }
    }

    /// Runs the action `action_key` against the row at `row_index` of the
    /// current page. Returns `false` if either does not exist.
    pub fn trigger_action(&self, row_index: usize, action_key: &str) -> bool {
        let Some(action) = self
            .shared
            .columns
            .iter()
            .find_map(|c| c.action(action_key))
        else {
            return false;
        };

        let row = self
            .shared
            .fetcher
            .with_snapshot(|s| s.rows.get(row_index).cloned())
            .flatten();

        match row {
            Some(row) => {
                action.invoke(&row);
                true
            }
            None => false,
        }
    }

    /// Builds the presentation view model.
    pub fn view(&self, translator: &dyn Translator) -> TableView {
        let query = self.query();
        let snapshot = self.snapshot();
        TableView::build(
            &query,
            &snapshot,
            &self.shared.columns,
            &self.shared.filters,
            translator,
        )
    }

    /// Returns `true` while a search is waiting for the debounce delay.
    pub fn search_pending(&self) -> bool {
        self.shared.debouncer.is_pending()
    }

    /// Clears pending timers and discards all in-flight and future fetches.
    pub fn close(&self) {
        self.shared.debouncer.cancel();
        self.shared.fetcher.cancel();
    }

    /// Returns `true` once the controller was closed.
    pub fn is_closed(&self) -> bool {
        self.shared.fetcher.is_cancelled()
    }

    fn column_refs(&self) -> Option<Vec<ColumnRef>> {
        self.shared
            .forward_columns
            .then(|| self.shared.column_refs.clone())
    }

    fn update(&self, f: impl FnOnce(&mut QueryState)) -> FetchHandle {
        let refs = self.column_refs();
        // The ticket is taken under the query lock so that ticket order
        // matches the order of query changes across threads.
        let (ticket, params) = {
            let mut query = self
                .shared
                .query
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            f(&mut query);
            (self.shared.fetcher.begin(), query.to_params(refs))
        };
        let fetcher = self.shared.fetcher.clone();
        tokio::spawn(async move { fetcher.fetch_with_ticket(ticket, params).await })
    }
}
