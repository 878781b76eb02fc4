//! CMS integration API: Bearer-authenticated, paginated, schema-described.

use records::Item;
use reqwest::Client;
use tracing::{error, info};

use super::{BoxFuture, ItemSource};
use crate::assets::{AssetIndex, fetch_assets};
use crate::filter::ValueFilter;
use crate::http::bearer_headers;
use crate::normalize::Normalizer;
use crate::paginate::{DEFAULT_PER_PAGE, fetch_all_pages};
use crate::schema::{SchemaMap, TypeOverrides, fetch_model_schema};
use crate::settings::{optional, require};
use crate::{ApiSettings, CmsError, DataSourceKind};

#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationSource {
    base_url: String,
    api_key: String,
    workspace_id: String,
    project_id: String,
    model_id: String,
    filter: ValueFilter,
    overrides: TypeOverrides,
    per_page: u32,
}

impl IntegrationSource {
    pub fn from_settings(settings: &ApiSettings) -> Result<Self, CmsError> {
        let [base_url, api_key, workspace_id, project_id, model_id] = require(
            "the CMS integration API",
            [
                ("integration_api_base_url", &settings.integration_api_base_url),
                ("integration_api_key", &settings.integration_api_key),
                ("cms_workspace_id", &settings.cms_workspace_id),
                ("cms_project_id", &settings.cms_project_id),
                ("cms_model_id", &settings.cms_model_id),
            ],
        )?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            workspace_id: workspace_id.to_string(),
            project_id: project_id.to_string(),
            model_id: model_id.to_string(),
            filter: ValueFilter::from_setting(optional(&settings.value_filters).as_deref()),
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

    fn project_url(&self) -> String {
        format!(
            "{}/{}/projects/{}",
            self.base_url, self.workspace_id, self.project_id
        )
    }

    fn model_url(&self) -> String {
        format!("{}/models/{}", self.project_url(), self.model_id)
    }

    /// Schema, then items, then assets when any field needs them.
    pub async fn fetch(&self, client: &Client) -> Result<Vec<Item>, CmsError> {
        let headers = bearer_headers(&self.api_key)?;

        let schema = match fetch_model_schema(client, &self.model_url(), &headers).await {
            Ok(schema) => schema,
            Err(err) => {
                error!("Error fetching schema: {err}");
                SchemaMap::default()
            }
        };

        let items_url = format!("{}/items", self.model_url());
        let raw: Vec<Item> = match fetch_all_pages(client, &items_url, &headers, self.per_page).await
        {
            Ok(items) => items,
            Err(err) => {
                error!("Error fetching items: {err}");
                return Ok(Vec::new());
            }
        };

        let assets = if self.needs_assets(&raw, &schema) {
            match fetch_assets(client, &self.project_url(), &headers, self.per_page).await {
                Ok(assets) => AssetIndex::from_assets(assets),
                Err(err) => {
                    error!("Error fetching assets: {err}");
                    AssetIndex::default()
                }
            }
        } else {
            AssetIndex::default()
        };

        let normalizer = Normalizer::new(&schema, &assets).with_overrides(&self.overrides);
        let items = self.filter.apply(normalizer.normalize_items(raw));
        info!("fetched {} items from the integration API", items.len());
        Ok(items)
    }

    /// Whether any field resolves to an asset, by override, by its own type
    /// or by the schema.
    fn needs_assets(&self, raw: &[Item], schema: &SchemaMap) -> bool {
        let no_assets = AssetIndex::default();
        let resolver = Normalizer::new(schema, &no_assets).with_overrides(&self.overrides);
        raw.iter().flat_map(|item| &item.fields).any(|field| {
            resolver
                .field_type(&field.key, field.field_type.clone())
                .is_some_and(|ty| ty.is_asset())
        })
    }
}

impl ItemSource for IntegrationSource {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Integration
    }

    fn fetch_items<'a>(&'a self, client: &'a Client) -> BoxFuture<'a, Result<Vec<Item>, CmsError>> {
        Box::pin(self.fetch(client))
    }
}
