//! CMS public API: anonymous, described by a published JSON schema.

use records::Item;
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info, warn};

use super::{BoxFuture, ItemSource};
use crate::assets::AssetIndex;
use crate::filter::ValueFilter;
use crate::http::json_headers;
use crate::normalize::Normalizer;
use crate::paginate::{DEFAULT_PER_PAGE, fetch_all_pages};
use crate::schema::{SchemaMap, TypeOverrides, fetch_public_schema};
use crate::settings::{optional, require};
use crate::{ApiSettings, CmsError, DataSourceKind};

#[derive(Debug, Clone, PartialEq)]
pub struct PublicSource {
    base_url: String,
    workspace_id: String,
    project_id: String,
    model_id: String,
    filter: ValueFilter,
    overrides: TypeOverrides,
    per_page: u32,
}

impl PublicSource {
    pub fn from_settings(settings: &ApiSettings) -> Result<Self, CmsError> {
        let [base_url, workspace_id, project_id, model_id] = require(
            "the CMS public API",
            [
                ("public_api_base_url", &settings.public_api_base_url),
                (
                    "cms_workspace_id_for_public_api",
                    &settings.cms_workspace_id_for_public_api,
                ),
                (
                    "cms_project_id_for_public_api",
                    &settings.cms_project_id_for_public_api,
                ),
                (
                    "cms_model_id_for_public_api",
                    &settings.cms_model_id_for_public_api,
                ),
            ],
        )?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            workspace_id: workspace_id.to_string(),
            project_id: project_id.to_string(),
            model_id: model_id.to_string(),
            filter: ValueFilter::from_setting(
                optional(&settings.value_filters_for_public_api).as_deref(),
            ),
            overrides: optional(&settings.field_type_overrides)
                .map(|s| TypeOverrides::parse(&s))
                .unwrap_or_default(),
            per_page: DEFAULT_PER_PAGE,
        })
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    fn model_url(&self) -> String {
        format!(
            "{}/p/{}/{}/{}",
            self.base_url, self.workspace_id, self.project_id, self.model_id
        )
    }

    pub async fn fetch(&self, client: &Client) -> Result<Vec<Item>, CmsError> {
        let headers = json_headers();
        let model_url = self.model_url();

        let schema_url = format!("{model_url}.schema.json");
        let schema = match fetch_public_schema(client, &schema_url, &headers).await {
            Ok(schema) => schema,
            Err(err) => {
                error!("Error fetching schema from Public API: {err}");
                SchemaMap::default()
            }
        };

        let results: Vec<Value> =
            match fetch_all_pages(client, &model_url, &headers, self.per_page).await {
                Ok(results) => results,
                Err(err) => {
                    error!("Error fetching data from Public API: {err}");
                    return Ok(Vec::new());
                }
            };

        // Public records embed their assets; nothing to look up.
        let assets = AssetIndex::default();
        let normalizer = Normalizer::new(&schema, &assets).with_overrides(&self.overrides);

        let mut items = Vec::with_capacity(results.len());
        for result in results {
            let Value::Object(record) = result else {
                warn!("Skipping public API result that is not an object");
                continue;
            };
            let item = normalizer.item_from_record(record);
            if !item.has_id() {
                warn!("Skipping public API record without an id");
                continue;
            }
            items.push(item);
        }

        let items = self.filter.apply(items);
        info!("fetched {} items from the public API", items.len());
        Ok(items)
    }
}

impl ItemSource for PublicSource {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Public
    }

    fn fetch_items<'a>(&'a self, client: &'a Client) -> BoxFuture<'a, Result<Vec<Item>, CmsError>> {
        Box::pin(self.fetch(client))
    }
}
