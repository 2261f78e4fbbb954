//! A table source over rows held in memory.
//!
//! Searches, filters, sorts and paginates client-side using the column paths
//! forwarded in [`FetchParams::columns`]. Handy for small reference lists and
//! as a stand-in backend in tests.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::TableRow;
use super::fetch::FetchParams;
use super::fetch::TablePage;
use super::fetch::TableSource;
use super::path::get_nested_value;
use super::path::value_to_cell;
use super::query::SortDirection;
use crate::error::Error;

/// Rows kept in memory together with their JSON form.
#[derive(Debug, Clone)]
pub struct InMemorySource<T> {
    rows: Arc<Vec<(T, Value)>>,
}

impl<T: Serialize> InMemorySource<T> {
    /// Creates a source over `rows`.
    ///
    /// # Errors
    ///
    /// Fails if a row cannot be serialised to JSON.
    pub fn new(rows: Vec<T>) -> Result<Self, Error> {
        let rows = rows
            .into_iter()
            .map(|row| {
                let json = serde_json::to_value(&row)
                    .map_err(|e| Error::source(format!("row is not serialisable: {}", e)))?;
                Ok((row, json))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self {
            rows: Arc::new(rows),
        })
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no rows are held.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T: Clone> InMemorySource<T> {
    /// Runs a query synchronously.
    pub fn query(&self, params: &FetchParams) -> TablePage<T> {
        let mut matched: Vec<&(T, Value)> = self
            .rows
            .iter()
            .filter(|(_, json)| matches_search(json, params))
            .filter(|(_, json)| matches_filters(json, params))
            .collect();

        if let Some(sort) = &params.sort {
            let path = params
                .columns
                .as_ref()
                .and_then(|cols| cols.iter().find(|c| c.key == sort.key))
                .map(|c| c.accessor().to_string())
                .unwrap_or_else(|| sort.key.clone());

            matched.sort_by(|(_, a), (_, b)| {
                let ordering = compare_cells(
                    &value_to_cell(get_nested_value(a, &path)),
                    &value_to_cell(get_nested_value(b, &path)),
                );
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let total = matched.len() as u64;
        let data = matched
            .into_iter()
            .skip(usize::try_from(params.offset()).unwrap_or(usize::MAX))
            .take(params.page_size as usize)
            .map(|(row, _)| row.clone())
            .collect();

        TablePage::new(data, total, params.page_size)
    }
}

#[async_trait]
impl<T: TableRow> TableSource<T> for InMemorySource<T> {
    async fn fetch(&self, params: FetchParams) -> Result<TablePage<T>, Error> {
        Ok(self.query(&params))
    }
}

fn matches_search(json: &Value, params: &FetchParams) -> bool {
    let Some(term) = params.search.as_deref() else {
        return true;
    };
    let term = term.to_lowercase();

    match &params.columns {
        Some(columns) => columns.iter().any(|c| {
            value_to_cell(get_nested_value(json, c.accessor()))
                .to_lowercase()
                .contains(&term)
        }),
        None => match json {
            Value::Object(map) => map.values().any(|v| {
                !v.is_object() && !v.is_array() && value_to_cell(Some(v)).to_lowercase().contains(&term)
            }),
            other => value_to_cell(Some(other)).to_lowercase().contains(&term),
        },
    }
}

fn matches_filters(json: &Value, params: &FetchParams) -> bool {
    params.filters.active().all(|(key, values)| {
        let cell = value_to_cell(get_nested_value(json, key));
        values.iter().any(|v| *v == cell)
    })
}

/// Numbers sort before text; numbers compare numerically, text
/// case-insensitively.
fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;
    use crate::table::ColumnRef;
    use crate::table::Filters;
    use crate::table::Sort;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Lot {
        folio: String,
        commodity: String,
        tons: u32,
        seller: Party,
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Party {
        name: String,
    }

    fn lot(folio: &str, commodity: &str, tons: u32, seller: &str) -> Lot {
        Lot {
            folio: folio.into(),
            commodity: commodity.into(),
            tons,
            seller: Party {
                name: seller.into(),
            },
        }
    }

    fn source() -> InMemorySource<Lot> {
        InMemorySource::new(vec![
            lot("PC-1", "corn", 120, "Acme"),
            lot("PC-2", "wheat", 80, "Borealis"),
            lot("PC-3", "corn", 40, "Cargill Bay"),
            lot("PC-4", "soy", 300, "acme farms"),
            lot("PC-5", "corn", 9, "Delta"),
        ])
        .unwrap()
    }

    fn folios(page: &TablePage<Lot>) -> Vec<&str> {
        page.data.iter().map(|l| l.folio.as_str()).collect()
    }

    #[test]
    fn test_paginates() {
        let page = source().query(&FetchParams::new(2, 2));
        assert_eq!(folios(&page), vec!["PC-3", "PC-4"]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);

        let beyond = source().query(&FetchParams::new(9, 2));
        assert!(beyond.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[test]
    fn test_search_uses_forwarded_columns() {
        let mut params = FetchParams::new(1, 10);
        params.search = Some("ACME".into());
        params.columns = Some(vec![ColumnRef {
            key: "seller".into(),
            data_mapping: Some("seller.name".into()),
        }]);
        assert_eq!(folios(&source().query(&params)), vec!["PC-1", "PC-4"]);

        params.columns = Some(vec![ColumnRef::new("folio")]);
        assert!(source().query(&params).is_empty());
    }

    #[test]
    fn test_search_without_columns_scans_top_level_fields() {
        let mut params = FetchParams::new(1, 10);
        params.search = Some("wheat".into());
        assert_eq!(folios(&source().query(&params)), vec!["PC-2"]);
    }

    #[test]
    fn test_filters_ignore_all_sentinel() {
        let mut params = FetchParams::new(1, 10);
        params.filters = Filters::new().with("commodity", ["all"]);
        assert_eq!(source().query(&params).total, 5);

        params.filters = Filters::new().with("commodity", ["corn", "soy"]);
        assert_eq!(
            folios(&source().query(&params)),
            vec!["PC-1", "PC-3", "PC-4", "PC-5"]
        );
    }

    #[test]
    fn test_sorts_numbers_numerically() {
        let mut params = FetchParams::new(1, 10);
        params.sort = Some(Sort::asc("tons"));
        assert_eq!(
            folios(&source().query(&params)),
            vec!["PC-5", "PC-3", "PC-2", "PC-1", "PC-4"]
        );

        params.sort = Some(Sort::desc("tons"));
        assert_eq!(folios(&source().query(&params))[0], "PC-4");
    }

    #[test]
    fn test_sort_follows_column_mapping() {
        let mut params = FetchParams::new(1, 10);
        params.sort = Some(Sort::desc("seller"));
        params.columns = Some(vec![ColumnRef {
            key: "seller".into(),
            data_mapping: Some("seller.name".into()),
        }]);
        assert_eq!(
            folios(&source().query(&params)),
            vec!["PC-5", "PC-3", "PC-2", "PC-4", "PC-1"]
        );
    }

    #[test]
    fn test_mixed_cells_order_numbers_first() {
        let mut cells = vec!["1a", "10", "Beans", "9", "apple", "-2.5"];
        cells.sort_by(|a, b| compare_cells(a, b));
        assert_eq!(cells, vec!["-2.5", "9", "10", "1a", "apple", "Beans"]);

        for a in &cells {
            for b in &cells {
                assert_eq!(compare_cells(a, b), compare_cells(b, a).reverse());
            }
        }
    }
}
