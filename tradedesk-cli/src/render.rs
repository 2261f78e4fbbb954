//! Plain-text rendering of a table view.

use comfy_table::Attribute;
use comfy_table::Cell as TextCell;
use comfy_table::ContentArrangement;
use comfy_table::Table;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use tradedesk_lib::table::Cell;
use tradedesk_lib::table::TableView;

/// Renders `view` the way a terminal shows it: filters, the grid, then
/// either the error, the empty message or the pagination footer.
pub fn render_text(view: &TableView) -> String {
    let mut out = String::new();

    for control in &view.filters {
        let chips: Vec<String> = control
            .chips
            .iter()
            .map(|chip| {
                if chip.selected {
                    format!("[{}]", chip.label)
                } else {
                    chip.label.clone()
                }
            })
            .collect();
        out.push_str(&format!("{}: {}\n", control.title, chips.join(" ")));
    }
    if !view.search.trim().is_empty() {
        out.push_str(&format!("Search: {}\n", view.search.trim()));
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(view.headers.iter().map(|h| {
        let indicator = h.indicator();
        let title = if indicator.is_empty() {
            h.title.clone()
        } else {
            format!("{} {}", h.title, indicator)
        };
        TextCell::new(title).add_attribute(Attribute::Bold)
    }));
    for row in &view.rows {
        table.add_row(row.cells.iter().map(|cell| match cell {
            Cell::Text(text) => TextCell::new(text),
            Cell::Actions(actions) => TextCell::new(
                actions
                    .iter()
                    .map(|a| a.label.as_str())
                    .collect::<Vec<_>>()
                    .join(" | "),
            ),
        }));
    }
    out.push_str(&table.to_string());
    out.push('\n');

    if let Some(error) = &view.error {
        out.push_str(&format!("Error: {}\n", error.message));
        if let Some(retry) = &error.retry_label {
            out.push_str(&format!("{}\n", retry));
        }
        return out;
    }
    if let Some(message) = &view.empty_message {
        out.push_str(&format!("{}\n", message));
    }

    let pagination = &view.pagination;
    out.push_str(&format!(
        "{} · page {} of {} · {} per page\n",
        pagination.range_label(),
        pagination.page,
        pagination.total_pages.max(1),
        pagination.page_size
    ));
    out
}
