//! Generic paginated, sortable, filterable table.
//!
//! The pieces, leaves first:
//!
//! - [`column`](ColumnDescriptor) - declarative columns, mapped to render-ready
//!   cells with [`map_columns`]
//! - [`filter`](FilterSet) - per-filter selection semantics and the pure
//!   [`toggle`] reducer
//! - [`QueryState`] - page, page size, sort, search and filter selection
//! - [`Fetcher`] - runs a [`TableSource`], discards stale responses and keeps
//!   the loading state visible for a minimum time
//! - [`TableController`] - ties everything together and debounces search
//! - [`TableView`] - what a renderer draws, and the [`TableEvent`]s it reports
//!
//! # Example
//!
//! ```ignore
//! let table = TableController::builder(source)
//!     .columns(vec![
//!         ColumnDescriptor::new("folio", "contracts.folio").sortable(),
//!         ColumnDescriptor::new("seller", "contracts.seller").mapping("participants[0].name"),
//!     ])
//!     .filters(vec![
//!         FilterDescriptor::new("commodity", "filters.commodity")
//!             .options(["all", "corn", "wheat"])
//!             .selection_mode(SelectionMode::ExclusiveAll),
//!     ])
//!     .build()?;
//!
//! table.refresh().await?;
//! table.handle(TableEvent::HeaderClicked("folio".into()));
//! let view = table.view(&KeyTranslator);
//! ```

mod column;
mod controller;
mod debounce;
mod fetch;
mod filter;
mod memory;
mod path;
mod query;
mod status;
mod view;

use serde::Serialize;

pub use column::*;
pub use controller::*;
pub use debounce::*;
pub use fetch::*;
pub use filter::*;
pub use memory::InMemorySource;
pub use path::get_nested_value;
pub use path::value_to_cell;
pub use query::*;
pub use status::*;
pub use view::*;

/// Rows a table can display.
///
/// Rows are serialised to JSON to resolve column paths.
pub trait TableRow: Serialize + Clone + Send + Sync + 'static {}

impl<T: Serialize + Clone + Send + Sync + 'static> TableRow for T {}
