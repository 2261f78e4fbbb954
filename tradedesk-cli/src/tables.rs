//! Column and filter layouts of the entity lists, plus English labels.

use std::ops::Deref;

use tradedesk_lib::model::Contract;
use tradedesk_lib::model::Party;
use tradedesk_lib::table::ColumnDescriptor;
use tradedesk_lib::table::FilterDescriptor;
use tradedesk_lib::table::FilterKind;
use tradedesk_lib::table::FilterOption;
use tradedesk_lib::table::SelectionMode;
use tradedesk_lib::table::TableRow;

/// Columns shared by buyers, sellers and traders.
pub fn party_columns<P>() -> Vec<ColumnDescriptor<P>>
where
    P: Deref<Target = Party> + TableRow,
{
    vec![
        ColumnDescriptor::new("name", "parties.name").sortable(),
        ColumnDescriptor::new("email", "parties.email"),
        ColumnDescriptor::new("phone", "parties.phone"),
        ColumnDescriptor::new("location", "parties.location").render(|p: &P| p.location()),
        ColumnDescriptor::new("tax_id", "parties.taxId"),
    ]
}

pub fn contract_columns() -> Vec<ColumnDescriptor<Contract>> {
    vec![
        ColumnDescriptor::new("folio", "contracts.folio").sortable(),
        ColumnDescriptor::new("type", "contracts.type")
            .render(|c: &Contract| c.contract_type.as_str().to_string()),
        ColumnDescriptor::new("commodity", "contracts.commodity").mapping("commodity.name"),
        ColumnDescriptor::new("counterparty", "contracts.counterparty").render(|c: &Contract| {
            c.counterparty().map(|p| p.name.clone()).unwrap_or_default()
        }),
        ColumnDescriptor::new("quantity", "contracts.quantity")
            .sortable()
            .render(|c: &Contract| with_unit(&c.quantity.to_string(), c)),
        ColumnDescriptor::new("price", "contracts.price").render(|c: &Contract| {
            c.unit_price()
                .map(|p| p.round_dp(2).to_string())
                .unwrap_or_else(|| "-".to_string())
        }),
        ColumnDescriptor::new("openInventory", "contracts.open")
            .render(|c: &Contract| with_unit(&c.open_inventory().to_string(), c)),
        ColumnDescriptor::new("subContracts", "contracts.subContracts")
            .render(|c: &Contract| c.sub_contract_count().to_string()),
        ColumnDescriptor::new("status", "contracts.status"),
        ColumnDescriptor::new("createdAt", "contracts.created")
            .sortable()
            .render(|c: &Contract| {
                c.created_at
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            }),
    ]
}

pub fn contract_filters() -> Vec<FilterDescriptor> {
    vec![
        FilterDescriptor::new("type", "contracts.type")
            .options([
                FilterOption::new("all", "all", "filters.all"),
                FilterOption::new("purchase", "purchase", "contracts.purchase"),
                FilterOption::new("sale", "sale", "contracts.sale"),
            ])
            .selection_mode(SelectionMode::ExclusiveAll),
        FilterDescriptor::new("status", "contracts.status")
            .kind(FilterKind::Select)
            .options(["created", "active", "closed", "cancelled"]),
        FilterDescriptor::new("pricingType", "contracts.pricingType")
            .kind(FilterKind::Select)
            .options([
                FilterOption::new("fixed", "fixed", "contracts.fixed"),
                FilterOption::new("basis", "basis", "contracts.basis"),
            ])
            .selection_mode(SelectionMode::SingleSelect),
    ]
}

fn with_unit(amount: &str, contract: &Contract) -> String {
    match &contract.measurement_unit {
        Some(unit) => format!("{} {}", amount, unit),
        None => amount.to_string(),
    }
}

/// English text for an i18n key.
///
/// Unknown keys fall back to their last segment with the first letter
/// capitalised.
pub fn label(key: &str) -> String {
    let text = match key {
        "table.empty" => "No records found",
        "table.retry" => "Run the command again to retry",
        "table.actions" => "Actions",
        "filters.all" => "All",
        "parties.taxId" => "Tax ID",
        "contracts.open" => "Open",
        "contracts.subContracts" => "Sub-contracts",
        "contracts.pricingType" => "Pricing",
        _ => {
            let last = key.rsplit('.').next().unwrap_or(key);
            let mut chars = last.chars();
            return match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            };
        }
    };
    text.to_string()
}
