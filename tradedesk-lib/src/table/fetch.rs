//! Data fetching: the source contract and the fetcher that drives it.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::column::ColumnRef;
use super::filter::Filters;
use super::query::Sort;
use super::status::LoadError;
use super::status::LoadStatus;
use crate::error::Error;

/// Default minimum time the loading state stays visible.
pub const DEFAULT_MIN_LOADING: Duration = Duration::from_millis(300);

// =============================================================================
// Source contract
// =============================================================================

/// Parameters handed to a [`TableSource`].
///
/// The source translates them into whatever query language its backend speaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchParams {
    /// Requested page (1-based).
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Trimmed search term; `None` when blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Filter selection.
    #[serde(default)]
    pub filters: Filters,
    /// Sort, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    /// Table columns, for sources that search client-side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnRef>>,
}

impl FetchParams {
    /// Parameters for `page` with `page_size` rows and nothing else set.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            search: None,
            filters: Filters::new(),
            sort: None,
            columns: None,
        }
    }

    /// Zero-based offset of the first row of the page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// One page of rows plus the totals needed for pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePage<T> {
    /// Rows of the page.
    pub data: Vec<T>,
    /// Total number of matching rows.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

impl<T> TablePage<T> {
    /// A page without rows.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            total_pages: 0,
        }
    }

    /// Builds a page, deriving `total_pages` from `total` and `page_size`.
    pub fn new(data: Vec<T>, total: u64, page_size: u32) -> Self {
        Self {
            data,
            total,
            total_pages: total_pages(total, page_size),
        }
    }

    /// Returns `true` if the page has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Maps the rows.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> TablePage<U> {
        TablePage {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

impl<T> Default for TablePage<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Number of pages needed for `total` rows.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Supplies pages of rows to a table.
///
/// This is the only seam between the table and a backend.
#[async_trait]
pub trait TableSource<T>: Send + Sync {
    /// Fetches the page described by `params`.
    async fn fetch(&self, params: FetchParams) -> Result<TablePage<T>, Error>;
}

/// A [`TableSource`] backed by an async function.
pub struct FnSource<F, Fut> {
    f: F,
    _marker: PhantomData<fn() -> Fut>,
}

/// Wraps an async function as a [`TableSource`].
///
/// # Example
///
/// ```
/// use tradedesk_lib::error::Error;
/// use tradedesk_lib::table::{source_fn, FetchParams, TablePage};
///
/// let source = source_fn(|params: FetchParams| async move {
///     Ok::<_, Error>(TablePage::new(vec![params.page], 1, params.page_size))
/// });
/// ```
pub fn source_fn<T, F, Fut>(f: F) -> FnSource<F, Fut>
where
    F: Fn(FetchParams) -> Fut + Send + Sync,
    Fut: Future<Output = Result<TablePage<T>, Error>> + Send,
{
    FnSource {
        f,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<T, F, Fut> TableSource<T> for FnSource<F, Fut>
where
    T: Send + 'static,
    F: Fn(FetchParams) -> Fut + Send + Sync,
    Fut: Future<Output = Result<TablePage<T>, Error>> + Send,
{
    async fn fetch(&self, params: FetchParams) -> Result<TablePage<T>, Error> {
        (self.f)(params).await
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// What the table currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot<T> {
    /// Rows of the current page.
    pub rows: Vec<T>,
    /// Total number of matching rows.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u32,
    /// Load status of the data.
    pub status: LoadStatus,
}

impl<T> TableSnapshot<T> {
    /// Returns `true` while a request is in flight.
    pub fn loading(&self) -> bool {
        self.status.is_loading()
    }
}

impl<T> Default for TableSnapshot<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
            total_pages: 0,
            status: LoadStatus::Idle,
        }
    }
}

/// What happened to the result of a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result (rows or error) is now displayed.
    Applied,
    /// A newer fetch was issued meanwhile; the result was discarded.
    Stale,
    /// The fetcher was cancelled before the result arrived.
    Cancelled,
}

// =============================================================================
// Fetcher
// =============================================================================

/// Runs fetches against a [`TableSource`] and keeps the displayed snapshot.
///
/// Every fetch takes a ticket from a monotonically increasing generation
/// counter. When a result arrives, it is applied only if no newer fetch was
/// issued in between, so slow responses never overwrite newer data.
///
/// Cheap to clone; clones share the snapshot and the generation counter.
pub struct Fetcher<T> {
    source: Arc<dyn TableSource<T>>,
    snapshot: Arc<RwLock<TableSnapshot<T>>>,
    generation: Arc<AtomicU64>,
    min_loading: Duration,
    cancel: CancellationToken,
}

impl<T> Clone for Fetcher<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            snapshot: self.snapshot.clone(),
            generation: self.generation.clone(),
            min_loading: self.min_loading,
            cancel: self.cancel.clone(),
        }
    }
}

impl<T> Fetcher<T> {
    /// Number of fetches issued so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Invalidates all in-flight fetches; later fetches return
    /// [`FetchOutcome::Cancelled`] immediately.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Takes the ticket of a new fetch and marks the table as loading.
    ///
    /// Issuing the ticket invalidates every earlier one. Call this where the
    /// query changes, not inside a spawned task: tickets must follow the order
    /// of the query changes, which spawned tasks do not preserve.
    pub fn begin(&self) -> u64 {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.cancel.is_cancelled()
            && let Ok(mut guard) = self.snapshot.write()
        {
            guard.status = LoadStatus::Loading;
        }
        ticket
    }
}

impl<T: Clone + Send + Sync + 'static> Fetcher<T> {
    /// Creates a fetcher with the default minimum loading time.
    pub fn new(source: Arc<dyn TableSource<T>>) -> Self {
        Self {
            source,
            snapshot: Arc::new(RwLock::new(TableSnapshot::default())),
            generation: Arc::new(AtomicU64::new(0)),
            min_loading: DEFAULT_MIN_LOADING,
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the minimum time the loading state stays visible.
    ///
    /// Results arriving sooner are held back for the remainder.
    pub fn with_min_loading(mut self, min_loading: Duration) -> Self {
        self.min_loading = min_loading;
        self
    }

    /// Returns a copy of the current snapshot.
    pub fn snapshot(&self) -> TableSnapshot<T> {
        self.snapshot
            .read()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    /// Reads the current snapshot without cloning it.
    pub fn with_snapshot<R>(&self, f: impl FnOnce(&TableSnapshot<T>) -> R) -> Option<R> {
        self.snapshot.read().ok().map(|g| f(&g))
    }

    /// Fetches `params` and applies the result unless it is stale.
    ///
    /// Shorthand for [`begin`](Self::begin) followed by
    /// [`fetch_with_ticket`](Self::fetch_with_ticket).
    pub async fn fetch(&self, params: FetchParams) -> FetchOutcome {
        let ticket = self.begin();
        self.fetch_with_ticket(ticket, params).await
    }

    /// Fetches `params` under a ticket from [`begin`](Self::begin).
    ///
    /// The result is applied only if no newer ticket was issued meanwhile.
    /// On failure the rows are cleared, totals reset to zero, the error is
    /// logged and the status becomes [`LoadStatus::Failed`].
    pub async fn fetch_with_ticket(&self, ticket: u64, params: FetchParams) -> FetchOutcome {
        if self.cancel.is_cancelled() {
            return FetchOutcome::Cancelled;
        }
        if self.generation.load(Ordering::SeqCst) != ticket {
            log::trace!("fetch #{}: superseded before it started", ticket);
            return FetchOutcome::Stale;
        }

        log::debug!(
            "fetch #{}: page {} size {} search {:?} sort {:?}",
            ticket,
            params.page,
            params.page_size,
            params.search,
            params.sort
        );

        let started = Instant::now();
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return FetchOutcome::Cancelled,
            result = self.fetch_with_min_loading(params, started) => result,
        };

        let Ok(mut guard) = self.snapshot.write() else {
            return FetchOutcome::Cancelled;
        };
        if self.generation.load(Ordering::SeqCst) != ticket {
            log::trace!("fetch #{}: discarding stale result", ticket);
            return FetchOutcome::Stale;
        }

        match result {
            Ok(page) => {
                log::debug!(
                    "fetch #{}: {} rows of {} ({} pages)",
                    ticket,
                    page.data.len(),
                    page.total,
                    page.total_pages
                );
                guard.rows = page.data;
                guard.total = page.total;
                guard.total_pages = page.total_pages;
                guard.status = LoadStatus::Ready;
            }
            Err(e) => {
                log::warn!("fetch #{} failed: {}", ticket, e);
                guard.rows = Vec::new();
                guard.total = 0;
                guard.total_pages = 0;
                guard.status = LoadStatus::Failed(LoadError::from(&e));
            }
        }

        FetchOutcome::Applied
    }

    async fn fetch_with_min_loading(
        &self,
        params: FetchParams,
        started: Instant,
    ) -> Result<TablePage<T>, Error> {
        let result = self.source.fetch(params).await;
        let elapsed = started.elapsed();
        if elapsed < self.min_loading {
            tokio::time::sleep(self.min_loading - elapsed).await;
        }
        result
    }
}
