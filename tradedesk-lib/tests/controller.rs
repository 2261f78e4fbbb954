//! Behaviour of a table controller against scripted sources.
//!
//! Most tests run on paused tokio time, so debounce windows and the minimum
//! loading time are measured on the virtual clock. Ordering across threads is
//! checked on the multi-thread runtime.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tradedesk_lib::error::Error;
use tradedesk_lib::table::ActionItem;
use tradedesk_lib::table::ColumnDescriptor;
use tradedesk_lib::table::FetchOutcome;
use tradedesk_lib::table::FetchParams;
use tradedesk_lib::table::FilterDescriptor;
use tradedesk_lib::table::InMemorySource;
use tradedesk_lib::table::KeyTranslator;
use tradedesk_lib::table::SelectionMode;
use tradedesk_lib::table::SortDirection;
use tradedesk_lib::table::TableController;
use tradedesk_lib::table::TableEvent;
use tradedesk_lib::table::TableOptions;
use tradedesk_lib::table::TablePage;
use tradedesk_lib::table::TableSource;
use tradedesk_lib::table::source_fn;

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Row {
    folio: String,
    commodity: String,
    quantity: u32,
}

fn row(folio: &str, commodity: &str, quantity: u32) -> Row {
    Row {
        folio: folio.to_string(),
        commodity: commodity.to_string(),
        quantity,
    }
}

fn columns() -> Vec<ColumnDescriptor<Row>> {
    vec![
        ColumnDescriptor::new("folio", "contracts.folio").sortable(),
        ColumnDescriptor::new("commodity", "contracts.commodity"),
        ColumnDescriptor::new("quantity", "contracts.quantity").sortable(),
    ]
}

type Calls = Arc<Mutex<Vec<FetchParams>>>;

/// A source returning `rows` for every request and recording the parameters.
fn recording(rows: Vec<Row>) -> (impl TableSource<Row> + 'static, Calls) {
    let calls: Calls = Arc::default();
    let recorded = calls.clone();
    let source = source_fn(move |params: FetchParams| {
        recorded.lock().unwrap().push(params.clone());
        let rows = rows.clone();
        async move {
            let total = rows.len() as u64;
            Ok::<_, Error>(TablePage::new(rows, total, params.page_size))
        }
    });
    (source, calls)
}

fn sample_rows() -> Vec<Row> {
    vec![
        row("C-1", "corn", 100),
        row("C-2", "wheat", 40),
        row("C-3", "corn", 75),
    ]
}

// =============================================================================
// Search debounce
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_typing_burst_issues_one_fetch_with_last_term() {
    let (source, calls) = recording(sample_rows());
    let table = TableController::builder(source)
        .columns(columns())
        .build()
        .unwrap();

    table.search_input("a");
    tokio::time::sleep(Duration::from_millis(100)).await;
    table.search_input("ab");
    tokio::time::sleep(Duration::from_millis(100)).await;
    table.search_input("abc");
    assert!(table.search_pending());

    tokio::time::sleep(Duration::from_millis(499)).await;
    assert!(calls.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(1000)).await;
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].search.as_deref(), Some("abc"));
    assert_eq!(calls[0].page, 1);
}

#[tokio::test(start_paused = true)]
async fn test_search_resets_page() {
    let (source, calls) = recording(sample_rows());
    let table = TableController::builder(source)
        .columns(columns())
        .build()
        .unwrap();

    table.set_page(4).await.unwrap();
    assert_eq!(table.query().page(), 4);

    table.set_search("  corn ").await.unwrap();
    assert_eq!(table.query().page(), 1);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.last().unwrap().search.as_deref(), Some("corn"));
    assert_eq!(calls.last().unwrap().page, 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_controller_cancels_pending_search() {
    let (source, calls) = recording(sample_rows());
    let table = TableController::builder(source)
        .columns(columns())
        .build()
        .unwrap();

    table.search_input("wheat");
    drop(table);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(calls.lock().unwrap().is_empty());
}

// =============================================================================
// Fetching
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded() {
    let source = source_fn(|params: FetchParams| async move {
        let term = params.search.clone().unwrap_or_default();
        let delay = if term == "slow" { 1_000 } else { 10 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok::<_, Error>(TablePage::new(vec![row(&term, "corn", 1)], 1, params.page_size))
    });
    let table = TableController::builder(source)
        .columns(columns())
        .build()
        .unwrap();

    let slow = table.set_search("slow");
    let fast = table.set_search("fast");

    assert_eq!(fast.await.unwrap(), FetchOutcome::Applied);
    assert_eq!(slow.await.unwrap(), FetchOutcome::Stale);

    let snapshot = table.snapshot();
    assert!(snapshot.status.is_ready());
    assert_eq!(snapshot.rows, vec![row("fast", "corn", 1)]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_latest_query_wins_across_threads() {
    let source = source_fn(|params: FetchParams| async move {
        let term = params.search.clone().unwrap_or_default();
        Ok::<_, Error>(TablePage::new(vec![row(&term, "corn", 1)], 1, params.page_size))
    });
    let table = TableController::builder(source)
        .columns(columns())
        .options(TableOptions::default().min_loading(Duration::ZERO))
        .build()
        .unwrap();

    for _ in 0..50 {
        let t = table.clone();
        let (old, new) = tokio::spawn(async move {
            let old = t.set_search("old");
            let new = t.set_search("new");
            (old, new)
        })
        .await
        .unwrap();

        assert_eq!(new.await.unwrap(), FetchOutcome::Applied);
        assert_eq!(old.await.unwrap(), FetchOutcome::Stale);

        let snapshot = table.snapshot();
        assert_eq!(table.query().search(), "new");
        assert_eq!(snapshot.rows, vec![row("new", "corn", 1)]);

        table.set_search("").await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_query_change_marks_loading_before_fetch_runs() {
    let (source, calls) = recording(sample_rows());
    let table = TableController::builder(source)
        .columns(columns())
        .build()
        .unwrap();

    let handle = table.set_page(2);
    assert!(table.snapshot().loading());
    assert!(calls.lock().unwrap().is_empty());

    handle.await.unwrap();
    assert!(table.snapshot().status.is_ready());
}

#[tokio::test(start_paused = true)]
async fn test_loading_stays_visible_for_minimum_time() {
    let (source, _calls) = recording(sample_rows());
    let table = TableController::builder(source)
        .columns(columns())
        .build()
        .unwrap();

    let started = Instant::now();
    let handle = table.refresh();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(table.snapshot().status.is_loading());
    assert!(table.view(&KeyTranslator).loading);

    assert_eq!(handle.await.unwrap(), FetchOutcome::Applied);
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert!(!table.snapshot().status.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_failure_is_distinguishable_from_empty() {
    let fail = Arc::new(AtomicBool::new(false));
    let flag = fail.clone();
    let source = source_fn(move |params: FetchParams| {
        let fail = flag.load(Ordering::SeqCst);
        async move {
            if fail {
                Err(Error::source("backend unavailable"))
            } else {
                Ok(TablePage::new(sample_rows(), 3, params.page_size))
            }
        }
    });
    let table = TableController::builder(source)
        .columns(columns())
        .build()
        .unwrap();

    table.refresh().await.unwrap();
    assert_eq!(table.snapshot().rows.len(), 3);

    fail.store(true, Ordering::SeqCst);
    table.refresh().await.unwrap();

    let snapshot = table.snapshot();
    assert!(snapshot.rows.is_empty());
    assert_eq!(snapshot.total, 0);
    let error = snapshot.status.as_error().unwrap();
    assert_eq!(error.message, "backend unavailable");

    let view = table.view(&KeyTranslator);
    assert_eq!(view.empty_message, None);
    let error_state = view.error.as_ref().unwrap();
    assert_eq!(error_state.retry_label.as_deref(), Some("table.retry"));
    assert_eq!(view.retry(), Some(TableEvent::Retry));

    fail.store(false, Ordering::SeqCst);
    table.handle(TableEvent::Retry).unwrap().await.unwrap();
    assert!(table.snapshot().status.is_ready());
    assert!(table.view(&KeyTranslator).error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_empty_result_shows_message_and_disables_pagination() {
    let (source, _calls) = recording(Vec::new());
    let table = TableController::builder(source)
        .columns(columns())
        .build()
        .unwrap();

    table.refresh().await.unwrap();

    let view = table.view(&KeyTranslator);
    assert!(view.is_blank());
    assert_eq!(view.empty_message.as_deref(), Some("table.empty"));
    assert!(view.error.is_none());
    assert!(view.pagination.first_disabled());
    assert!(view.pagination.prev_disabled());
    assert!(view.pagination.next_disabled());
    assert!(view.pagination.last_disabled());
    assert_eq!(view.pagination.range_label(), "0–0 of 0");
}

#[tokio::test(start_paused = true)]
async fn test_close_discards_in_flight_fetch() {
    let source = source_fn(|params: FetchParams| async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok::<_, Error>(TablePage::new(sample_rows(), 3, params.page_size))
    });
    let table = TableController::builder(source)
        .columns(columns())
        .build()
        .unwrap();

    let handle = table.refresh();
    tokio::time::sleep(Duration::from_millis(10)).await;
    table.close();

    assert_eq!(handle.await.unwrap(), FetchOutcome::Cancelled);
    assert!(table.is_closed());
    assert!(table.snapshot().rows.is_empty());
    assert_eq!(table.refresh().await.unwrap(), FetchOutcome::Cancelled);
}

// =============================================================================
// Sorting, filters, pagination
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_header_clicks_cycle_sort() {
    let (source, calls) = recording(sample_rows());
    let table = TableController::builder(source)
        .columns(columns())
        .build()
        .unwrap();

    table.handle(TableEvent::HeaderClicked("folio".into())).unwrap().await.unwrap();
    let sort = table.query().sort().cloned().unwrap();
    assert_eq!((sort.key.as_str(), sort.direction), ("folio", SortDirection::Asc));

    table.handle(TableEvent::HeaderClicked("folio".into())).unwrap().await.unwrap();
    assert_eq!(table.query().sort().unwrap().direction, SortDirection::Desc);

    table.handle(TableEvent::HeaderClicked("quantity".into())).unwrap().await.unwrap();
    let sort = table.query().sort().cloned().unwrap();
    assert_eq!((sort.key.as_str(), sort.direction), ("quantity", SortDirection::Asc));

    // Not sortable.
    assert!(table.handle(TableEvent::HeaderClicked("commodity".into())).is_none());
    assert_eq!(calls.lock().unwrap().len(), 3);

    let view = table.view(&KeyTranslator);
    let quantity = view.headers.iter().find(|h| h.key == "quantity").unwrap();
    assert_eq!(quantity.indicator(), "▲");
}

#[tokio::test(start_paused = true)]
async fn test_exclusive_all_filter_round_trip() {
    let (source, calls) = recording(sample_rows());
    let table = TableController::builder(source)
        .columns(columns())
        .filters(vec![
            FilterDescriptor::new("commodity", "filters.commodity")
                .options(["all", "corn", "wheat"])
                .selection_mode(SelectionMode::ExclusiveAll),
        ])
        .build()
        .unwrap();

    assert_eq!(table.query().filters().get("commodity"), ["all"]);

    table.set_page(2).await.unwrap();
    table.toggle_filter("commodity", "corn").await.unwrap();
    assert_eq!(table.query().filters().get("commodity"), ["corn"]);
    assert_eq!(table.query().page(), 1);

    table.toggle_filter("commodity", "corn").await.unwrap();
    assert_eq!(table.query().filters().get("commodity"), ["all"]);

    let calls = calls.lock().unwrap();
    assert_eq!(calls[1].filters.get("commodity"), ["corn"]);

    let view = table.view(&KeyTranslator);
    let chips = &view.filters[0].chips;
    assert!(chips.iter().find(|c| c.value == "all").unwrap().selected);
    assert!(!chips.iter().find(|c| c.value == "corn").unwrap().selected);
}

#[tokio::test(start_paused = true)]
async fn test_page_size_change_resets_page() {
    let source = InMemorySource::new((1..=60).map(|n| row(&format!("C-{n}"), "corn", n)).collect())
        .unwrap();
    let table = TableController::builder(source)
        .columns(columns())
        .build()
        .unwrap();

    table.set_page(3).await.unwrap();
    let view = table.view(&KeyTranslator);
    assert_eq!(view.pagination.range_label(), "51–60 of 60");
    assert!(view.pagination.next_disabled());

    let event = view.pick_page_size(50).unwrap();
    table.handle(event).unwrap().await.unwrap();

    let view = table.view(&KeyTranslator);
    assert_eq!(table.query().page(), 1);
    assert_eq!(view.rows.len(), 50);
    assert_eq!(view.pagination.total_pages, 2);
    assert_eq!(view.pagination.next(), Some(TableEvent::PageChanged(2)));
}

// =============================================================================
// Actions
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_row_action_receives_row() {
    let (source, _calls) = recording(sample_rows());
    let opened = Arc::new(Mutex::new(Vec::new()));
    let sink = opened.clone();
    let deletes = Arc::new(AtomicUsize::new(0));
    let delete_count = deletes.clone();

    let table = TableController::builder(source)
        .columns(columns())
        .actions(vec![
            ActionItem::new("open", "actions.open", move |row: &Row| {
                sink.lock().unwrap().push(row.folio.clone());
            }),
            ActionItem::new("delete", "actions.delete", move |_: &Row| {
                delete_count.fetch_add(1, Ordering::SeqCst);
            })
            .class_name("danger"),
        ])
        .build()
        .unwrap();

    table.refresh().await.unwrap();

    assert!(table.trigger_action(1, "open"));
    assert!(!table.trigger_action(9, "open"));
    assert!(!table.trigger_action(0, "archive"));
    assert_eq!(*opened.lock().unwrap(), vec!["C-2".to_string()]);
    assert_eq!(deletes.load(Ordering::SeqCst), 0);

    let view = table.view(&KeyTranslator);
    assert_eq!(view.headers.last().unwrap().key, "actions");
}
