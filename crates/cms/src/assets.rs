use std::collections::HashMap;

use records::Asset;
use reqwest::Client;
use reqwest::header::HeaderMap;

use crate::CmsError;
use crate::paginate::fetch_all_pages;

/// Asset id → URL lookup for one fetch cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetIndex {
    urls: HashMap<String, String>,
}

impl AssetIndex {
    /// Assets without a URL are left out so their ids fall through unresolved.
    pub fn from_assets(assets: impl IntoIterator<Item = Asset>) -> Self {
        let urls = assets
            .into_iter()
            .filter(|a| !a.url.is_empty())
            .map(|a| (a.id, a.url))
            .collect();
        Self { urls }
    }

    pub fn url(&self, id: &str) -> Option<&str> {
        self.urls.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Fetch every asset of a project (`{project_url}/assets`).
pub async fn fetch_assets(
    client: &Client,
    project_url: &str,
    headers: &HeaderMap,
    per_page: u32,
) -> Result<Vec<Asset>, CmsError> {
    fetch_all_pages(client, &format!("{project_url}/assets"), headers, per_page).await
}
