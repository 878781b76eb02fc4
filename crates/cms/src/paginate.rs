//! Retrieval of every page of a CMS collection endpoint.
//!
//! The first page is fetched alone to learn `totalCount`; the remaining pages
//! are then requested as one concurrent batch and joined. Results are always
//! concatenated in ascending page order, whatever order responses arrive in.

use futures_util::future::try_join_all;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::CmsError;
use crate::http::get_json_with_query;

pub const DEFAULT_PER_PAGE: u32 = 100;

/// One page of a collection. The integration API names the list `items`,
/// the public API names it `results`.
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Option::default", alias = "results")]
    items: Option<Vec<T>>,
    #[serde(default, rename = "totalCount")]
    total_count: Option<u64>,
}

pub fn page_count(total_count: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    u32::try_from(total_count.div_ceil(per_page)).unwrap_or(u32::MAX)
}

/// Fetch all pages of `base_url` with `perPage`/`page` query parameters.
///
/// A failed page fails the whole call; there is no retry.
pub async fn fetch_all_pages<T>(
    client: &Client,
    base_url: &str,
    headers: &HeaderMap,
    per_page: u32,
) -> Result<Vec<T>, CmsError>
where
    T: DeserializeOwned,
{
    let per_page = per_page.max(1);
    let first: Page<T> = fetch_page(client, base_url, headers, per_page, 1).await?;
    let total_pages = page_count(first.total_count.unwrap_or(0), per_page);
    let mut all = first.items.unwrap_or_default();

    if total_pages > 1 {
        debug!("fetching {} more pages from {base_url}", total_pages - 1);
        let rest = try_join_all(
            (2..=total_pages).map(|page| fetch_page::<T>(client, base_url, headers, per_page, page)),
        )
        .await?;
        for page in rest {
            all.extend(page.items.unwrap_or_default());
        }
    }

    Ok(all)
}

async fn fetch_page<T: DeserializeOwned>(
    client: &Client,
    base_url: &str,
    headers: &HeaderMap,
    per_page: u32,
    page: u32,
) -> Result<Page<T>, CmsError> {
    let query = [("perPage", per_page.to_string()), ("page", page.to_string())];
    get_json_with_query(client, base_url, headers, &query).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{PageLog, paged_router, spawn_server};
    use axum::http::StatusCode;
    use std::time::Duration;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 100), 0);
        assert_eq!(page_count(100, 100), 1);
        assert_eq!(page_count(250, 100), 3);
        assert_eq!(page_count(5, 0), 5);
    }

    #[tokio::test]
    async fn fetches_remaining_pages_in_page_order() {
        let log = PageLog::default();
        // Page 2 answers last so completion order differs from page order.
        let router = paged_router("items", 250, log.clone(), |page| match page {
            2 => Some(Duration::from_millis(150)),
            _ => None,
        });
        let base = spawn_server(router).await;

        let rows: Vec<serde_json::Value> = fetch_all_pages(
            &Client::new(),
            &format!("{base}/list"),
            &HeaderMap::new(),
            100,
        )
        .await
        .unwrap();

        assert_eq!(log.requested_pages(), vec![1, 2, 3]);
        assert_eq!(log.completed_pages().last(), Some(&2));
        assert_eq!(rows.len(), 250);
        let ids: Vec<u64> = rows.iter().map(|r| r["n"].as_u64().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn single_page_issues_one_request() {
        let log = PageLog::default();
        let base = spawn_server(paged_router("results", 42, log.clone(), |_| None)).await;

        let rows: Vec<serde_json::Value> =
            fetch_all_pages(&Client::new(), &format!("{base}/list"), &HeaderMap::new(), 100)
                .await
                .unwrap();

        assert_eq!(rows.len(), 42);
        assert_eq!(log.requested_pages(), vec![1]);
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        n: u64,
    }

    #[tokio::test]
    async fn decodes_rows_into_plain_structs() {
        let base = spawn_server(paged_router("items", 3, PageLog::default(), |_| None)).await;

        let rows: Vec<Row> =
            fetch_all_pages(&Client::new(), &format!("{base}/list"), &HeaderMap::new(), 100)
                .await
                .unwrap();

        let ns: Vec<u64> = rows.iter().map(|r| r.n).collect();
        assert_eq!(ns.len(), 3);
        assert!(ns.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn page_without_a_list_is_empty() {
        let router = axum::Router::new().route(
            "/list",
            crate::test_support::json_route(serde_json::json!({ "totalCount": 0 })),
        );
        let base = spawn_server(router).await;

        let rows: Vec<Row> =
            fetch_all_pages(&Client::new(), &format!("{base}/list"), &HeaderMap::new(), 100)
                .await
                .unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn failing_page_fails_the_resource() {
        let base = spawn_server(crate::test_support::status_router(StatusCode::BAD_GATEWAY)).await;

        let err = fetch_all_pages::<serde_json::Value>(
            &Client::new(),
            &format!("{base}/list"),
            &HeaderMap::new(),
            100,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CmsError::Status { status, .. } if status == StatusCode::BAD_GATEWAY));
    }
}
