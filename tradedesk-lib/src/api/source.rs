//! Table sources backed by list endpoints.

use std::marker::PhantomData;

use async_trait::async_trait;

use super::query::Filter;
use super::query::OrderBy;
use crate::CrmClient;
use crate::error::Error;
use crate::model::Entity;
use crate::table::FetchParams;
use crate::table::TablePage;
use crate::table::TableSource;

/// Builds the backend filter document for `params`.
///
/// The trimmed search term becomes an `$or` of case-insensitive matches over
/// `search_fields`. Every active filter becomes an `$in` clause on the field
/// `field_for` maps its key to; `"all"` selections contribute nothing.
pub fn filter_for_params(
    params: &FetchParams,
    search_fields: &[&str],
    field_for: impl Fn(&str) -> String,
) -> Option<Filter> {
    let mut clauses = Vec::new();

    if let Some(term) = params.search.as_deref().map(str::trim)
        && !term.is_empty()
        && !search_fields.is_empty()
    {
        clauses.push(Filter::or(
            search_fields
                .iter()
                .map(|field| Filter::contains(*field, term)),
        ));
    }

    for (key, values) in params.filters.active() {
        if values.is_empty() {
            continue;
        }
        clauses.push(Filter::any_of(field_for(key), values));
    }

    Filter::all_of(clauses)
}

/// Builds the backend ordering for `params`.
pub fn order_for_params(params: &FetchParams, field_for: impl Fn(&str) -> String) -> Option<OrderBy> {
    params
        .sort
        .as_ref()
        .map(|sort| OrderBy::new(field_for(&sort.key), sort.direction))
}

/// A [`TableSource`] listing an [`Entity`] from its endpoint.
///
/// # Example
///
/// ```ignore
/// use tradedesk_lib::api::EntitySource;
/// use tradedesk_lib::model::Contract;
///
/// let source = EntitySource::<Contract>::new(client.clone())
///     .with_scope(Filter::eq("type", "purchase"));
/// let table = TableController::builder(source).columns(columns).build()?;
/// ```
pub struct EntitySource<E> {
    client: CrmClient,
    scope: Option<Filter>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> EntitySource<E> {
    /// Creates a source listing every record of `E`.
    pub fn new(client: CrmClient) -> Self {
        Self {
            client,
            scope: None,
            _marker: PhantomData,
        }
    }

    /// Restricts every request with an extra filter clause.
    pub fn with_scope(mut self, scope: Filter) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Filter document sent for `params`, including the scope.
    pub fn filter_for(&self, params: &FetchParams) -> Option<Filter> {
        let table_filter = filter_for_params(params, E::SEARCH_FIELDS, E::field);
        match (self.scope.clone(), table_filter) {
            (Some(scope), Some(filter)) => Some(scope.and_also(filter)),
            (scope, filter) => scope.or(filter),
        }
    }
}

impl<E> Clone for EntitySource<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            scope: self.scope.clone(),
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<E: Entity> TableSource<E> for EntitySource<E> {
    async fn fetch(&self, params: FetchParams) -> Result<TablePage<E>, Error> {
        self.client
            .list(E::PATH)
            .page(params.page)
            .limit(params.page_size)
            .filter_opt(self.filter_for(&params))
            .order_by_opt(order_for_params(&params, E::field))
            .execute::<E>()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Filters;
    use crate::table::Sort;
    use serde_json::json;

    fn identity(key: &str) -> String {
        key.to_string()
    }

    #[test]
    fn test_no_search_no_filters() {
        let params = FetchParams::new(1, 10);
        assert_eq!(filter_for_params(&params, &["name"], identity), None);
        assert_eq!(order_for_params(&params, identity), None);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let mut params = FetchParams::new(1, 10);
        params.search = Some("   ".to_string());
        assert_eq!(filter_for_params(&params, &["name"], identity), None);
    }

    #[test]
    fn test_search_and_filter_combined() {
        let mut params = FetchParams::new(1, 10);
        params.search = Some(" corn ".to_string());
        params.filters = Filters::new()
            .with("status", ["active", "closed"])
            .with("type", ["all"]);

        let filter = filter_for_params(&params, &["folio", "commodity.name"], identity).unwrap();
        assert_eq!(
            filter.to_json(),
            json!({"$and": [
                {"$or": [
                    {"folio": {"$regex": "corn", "$options": "i"}},
                    {"commodity.name": {"$regex": "corn", "$options": "i"}}
                ]},
                {"status": {"$in": ["active", "closed"]}}
            ]})
        );
    }

    #[test]
    fn test_filter_keys_are_mapped() {
        let mut params = FetchParams::new(1, 10);
        params.filters = Filters::new().with("commodity", ["Wheat"]);
        let filter =
            filter_for_params(&params, &[], <crate::model::Contract as Entity>::field).unwrap();
        assert_eq!(filter.to_json(), json!({"commodity.name": {"$in": ["Wheat"]}}));
    }

    #[test]
    fn test_sort_translation() {
        let mut params = FetchParams::new(1, 10);
        params.sort = Some(Sort::desc("createdAt"));
        let order = order_for_params(&params, <crate::model::Contract as Entity>::field).unwrap();
        assert_eq!(order.to_query_value(), r#"{"created_at":"-1"}"#);
    }
}
