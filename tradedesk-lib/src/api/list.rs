//! Paginated list queries.

use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::query::Filter;
use super::query::OrderBy;
use crate::CrmClient;
use crate::error::ApiError;
use crate::error::Error;
use crate::table::TablePage;
use crate::table::total_pages;

/// Builder for a `GET <path>?page=&limit=&filter=&sort=` request.
///
/// Created by [`CrmClient::list`].
#[derive(Debug, Clone)]
pub struct ListQuery<'a> {
    client: &'a CrmClient,
    path: String,
    page: u32,
    limit: u32,
    filter: Option<Filter>,
    order: Option<OrderBy>,
}

impl<'a> ListQuery<'a> {
    pub(crate) fn new(client: &'a CrmClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            page: 1,
            limit: 25,
            filter: None,
            order: None,
        }
    }

    /// Sets the 1-based page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the filter document.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets an optional filter document.
    pub fn filter_opt(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the ordering.
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets an optional ordering.
    pub fn order_by_opt(mut self, order: Option<OrderBy>) -> Self {
        self.order = order;
        self
    }

    /// Builds the request URL.
    pub fn build_url(&self) -> Result<Url, ApiError> {
        let mut url = self.client.endpoint(&self.path)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &self.page.to_string());
            pairs.append_pair("limit", &self.limit.to_string());
            if let Some(filter) = &self.filter {
                pairs.append_pair("filter", &filter.to_json().to_string());
            }
            if let Some(order) = &self.order {
                pairs.append_pair("sort", &order.to_query_value());
            }
        }
        Ok(url)
    }

    /// Executes the query and decodes one page of rows.
    pub async fn execute<T: DeserializeOwned>(self) -> Result<TablePage<T>, Error> {
        let url = self.build_url()?;
        log::debug!("GET {}", url);

        let response = self.client.request(Method::GET, url).await?;
        let body = response.text().await.map_err(ApiError::from)?;

        let decoded: ListResponse<T> = serde_json::from_str(&body)
            .map_err(|e| ApiError::parse_with_body(e.to_string(), body))?;

        Ok(decoded.into_page(self.limit))
    }
}

/// Raw list response body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    data: Vec<T>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    total_pages: Option<u32>,
}

impl<T> ListResponse<T> {
    fn into_page(self, limit: u32) -> TablePage<T> {
        let total = self.total.unwrap_or(self.data.len() as u64);
        let total_pages = self
            .total_pages
            .unwrap_or_else(|| total_pages(total, limit));
        TablePage {
            data: self.data,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticSession;

    fn client() -> CrmClient {
        CrmClient::builder()
            .url("https://crm.example.com/api")
            .session(StaticSession::new("t").with_partition_key("p"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_url_defaults() {
        let client = client();
        let url = client.list("buyers").build_url().unwrap();
        assert_eq!(url.as_str(), "https://crm.example.com/api/buyers?page=1&limit=25");
    }

    #[test]
    fn test_build_url_with_filter_and_sort() {
        let client = client();
        let url = client
            .list("contracts")
            .page(3)
            .limit(10)
            .filter(Filter::any_of("type", ["purchase"]))
            .order_by(OrderBy::desc("folio"))
            .build_url()
            .unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "3".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("filter".to_string(), r#"{"type":{"$in":["purchase"]}}"#.to_string()),
                ("sort".to_string(), r#"{"folio":"-1"}"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_total_pages_is_derived() {
        let response: ListResponse<u32> =
            serde_json::from_str(r#"{"data":[1,2],"total":45}"#).unwrap();
        let page = response.into_page(20);
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_explicit_total_pages_wins() {
        let response: ListResponse<u32> =
            serde_json::from_str(r#"{"data":[],"total":0,"totalPages":0}"#).unwrap();
        let page = response.into_page(20);
        assert_eq!(page.total_pages, 0);
        assert!(page.data.is_empty());
    }
}
