//! CMS data visualizer server: a proxy that already returns normalized items.

use records::Item;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::{BoxFuture, ItemSource};
use crate::http::{bearer_headers, get_json, join_url};
use crate::settings::require;
use crate::{ApiSettings, CmsError, DataSourceKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSource {
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ServerResponse {
    #[serde(default)]
    data: Option<ServerData>,
}

#[derive(Debug, Deserialize)]
struct ServerData {
    #[serde(default)]
    items: Option<Vec<Item>>,
}

impl ServerSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_settings(settings: &ApiSettings) -> Result<Self, CmsError> {
        let [base_url, api_key] = require(
            "the CMS data visualizer server",
            [
                ("server_base_url", &settings.server_base_url),
                ("server_api_key", &settings.server_api_key),
            ],
        )?;
        Ok(Self::new(base_url, api_key))
    }

    pub async fn fetch(&self, client: &Client) -> Result<Vec<Item>, CmsError> {
        let headers = bearer_headers(&self.api_key)?;
        let url = join_url(&self.base_url, "items");
        let resp: ServerResponse = get_json(client, &url, &headers).await?;
        let items = resp.data.and_then(|d| d.items).unwrap_or_default();
        info!("fetched {} items from {url}", items.len());
        Ok(items)
    }
}

impl ItemSource for ServerSource {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Server
    }

    fn fetch_items<'a>(&'a self, client: &'a Client) -> BoxFuture<'a, Result<Vec<Item>, CmsError>> {
        Box::pin(self.fetch(client))
    }
}
