//! Query state: the parameters that decide which page of data is visible.

use serde::Deserialize;
use serde::Serialize;

use super::column::ColumnRef;
use super::fetch::FetchParams;
use super::filter::FilterSet;
use super::filter::Filters;

/// Page sizes offered by the page-size selector.
pub const PAGE_SIZE_OPTIONS: [u32; 6] = [5, 10, 20, 25, 50, 100];

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Column key.
    pub key: String,
    /// Direction.
    pub direction: SortDirection,
}

impl Sort {
    /// Creates a sort.
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    /// Ascending sort on `key`.
    pub fn asc(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Asc)
    }

    /// Descending sort on `key`.
    pub fn desc(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Desc)
    }
}

/// Returns the sort that results from clicking the header of `key`.
///
/// Clicking the sorted column flips its direction; clicking any other column
/// sorts it ascending.
pub fn next_sort(current: Option<&Sort>, key: &str) -> Sort {
    match current {
        Some(sort) if sort.key == key => Sort::new(key, sort.direction.toggled()),
        _ => Sort::asc(key),
    }
}

/// The two table flavours found in the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableVariant {
    /// Selection modals and embedded lists (5 rows per page).
    Compact,
    /// Full-page tables (25 rows per page).
    #[default]
    Standard,
}

impl TableVariant {
    /// Page size a table of this variant starts with.
    pub fn default_page_size(self) -> u32 {
        match self {
            Self::Compact => 5,
            Self::Standard => 25,
        }
    }
}

/// Pagination, sort, search and filter selection of a table.
///
/// Lives as long as the table; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    page: u32,
    page_size: u32,
    sort: Option<Sort>,
    search: String,
    filters: Filters,
}

impl QueryState {
    /// Creates the initial state: first page, no sort, no search.
    pub fn new(page_size: u32, filters: Filters) -> Self {
        Self {
            page: 1,
            page_size,
            sort: None,
            search: String::new(),
            filters,
        }
    }

    /// Initial state for a table variant and filter configuration.
    pub fn for_table(variant: TableVariant, filters: &FilterSet) -> Self {
        Self::new(variant.default_page_size(), filters.defaults())
    }

    /// Current page (1-based).
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Rows per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Active sort, if any.
    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    /// Free-text search term.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Filter selection.
    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Moves to page `n`.
    ///
    /// The value is trusted; clamping is left to the pagination controls.
    pub fn set_page(&mut self, n: u32) {
        self.page = n;
    }

    /// Changes the page size and returns to the first page.
    pub fn set_page_size(&mut self, n: u32) {
        self.page_size = n;
        self.page = 1;
    }

    /// Sets the sort column and direction.
    pub fn set_sort(&mut self, key: impl Into<String>, direction: SortDirection) {
        self.sort = Some(Sort::new(key, direction));
    }

    /// Applies a header click on `key` and returns the new sort.
    pub fn toggle_sort(&mut self, key: &str) -> &Sort {
        let next = next_sort(self.sort.as_ref(), key);
        self.sort.insert(next)
    }

    /// Removes the sort.
    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// Changes the search term and returns to the first page.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    /// Toggles a filter value and returns to the first page.
    pub fn toggle_filter(&mut self, filter_set: &FilterSet, key: &str, value: &str) {
        self.filters = filter_set.toggle(&self.filters, key, value);
        self.page = 1;
    }

    /// Replaces the whole filter selection and returns to the first page.
    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters;
        self.page = 1;
    }

    /// Builds the parameters handed to the fetch source.
    pub fn to_params(&self, columns: Option<Vec<ColumnRef>>) -> FetchParams {
        let search = self.search.trim();
        FetchParams {
            page: self.page,
            page_size: self.page_size,
            search: (!search.is_empty()).then(|| search.to_string()),
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            columns,
        }
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(TableVariant::default().default_page_size(), Filters::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::FilterDescriptor;
    use crate::table::SelectionMode;

    fn filter_set() -> FilterSet {
        FilterSet::new(vec![
            FilterDescriptor::new("commodity", "filters.commodity")
                .selection_mode(SelectionMode::ExclusiveAll),
        ])
        .unwrap()
    }

    fn on_page_three() -> QueryState {
        let mut q = QueryState::for_table(TableVariant::Standard, &filter_set());
        q.set_page(3);
        q
    }

    #[test]
    fn test_defaults() {
        let q = QueryState::for_table(TableVariant::Compact, &filter_set());
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 5);
        assert_eq!(q.sort(), None);
        assert_eq!(q.search(), "");
        assert_eq!(q.filters().get("commodity"), ["all"]);

        let q = QueryState::for_table(TableVariant::Standard, &filter_set());
        assert_eq!(q.page_size(), 25);
    }

    #[test]
    fn test_search_resets_page() {
        let mut q = on_page_three();
        q.set_search("corn");
        assert_eq!(q.page(), 1);
        assert_eq!(q.search(), "corn");
    }

    #[test]
    fn test_page_size_resets_page() {
        let mut q = on_page_three();
        q.set_page_size(50);
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 50);
    }

    #[test]
    fn test_filter_resets_page() {
        let mut q = on_page_three();
        q.toggle_filter(&filter_set(), "commodity", "corn");
        assert_eq!(q.page(), 1);
        assert_eq!(q.filters().get("commodity"), ["corn"]);
    }

    #[test]
    fn test_sort_and_page_keep_page() {
        let mut q = on_page_three();
        q.set_sort("folio", SortDirection::Desc);
        assert_eq!(q.page(), 3);
        q.set_page(7);
        assert_eq!(q.page(), 7);
    }

    #[test]
    fn test_set_page_is_not_clamped() {
        let mut q = QueryState::default();
        q.set_page(9_999);
        assert_eq!(q.page(), 9_999);
    }

    #[test]
    fn test_toggle_sort_alternates() {
        let mut q = QueryState::default();
        assert_eq!(q.toggle_sort("folio"), &Sort::asc("folio"));
        assert_eq!(q.toggle_sort("folio"), &Sort::desc("folio"));
        assert_eq!(q.toggle_sort("folio"), &Sort::asc("folio"));
        assert_eq!(q.toggle_sort("quantity"), &Sort::asc("quantity"));
        assert_eq!(q.toggle_sort("quantity"), &Sort::desc("quantity"));
        assert_eq!(q.toggle_sort("folio"), &Sort::asc("folio"));
    }

    #[test]
    fn test_to_params() {
        let mut q = QueryState::default();
        q.set_search("  ");
        q.set_sort("folio", SortDirection::Desc);
        let params = q.to_params(None);
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 25);
        assert_eq!(params.search, None);
        assert_eq!(params.sort, Some(Sort::desc("folio")));

        q.set_search(" corn ");
        assert_eq!(q.to_params(None).search.as_deref(), Some("corn"));
    }
}
