//! The map-side visualizer extension and the panel that feeds it items.

use cms::{BoxFuture, source_from_settings};
use projection::project;
use records::Item;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::{
    Extension, ExtensionMessage, HostBridge, LayerSpec, Panel, UiMessage, WidgetProperty,
};

pub const VISUALIZER_HTML: &str = r#"<div id="cms-visualizer" hidden></div>"#;

/// Projects items received from its panel and adds them as one layer.
#[derive(Debug, Default)]
pub struct VisualizerExtension {
    marker: Map<String, Value>,
}

impl VisualizerExtension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&self) -> &Map<String, Value> {
        &self.marker
    }

    fn add_items(&self, host: &mut dyn HostBridge, items: Vec<Item>) {
        let config = &host.widget_property().visualization;
        let Some(collection) = project(&items, config) else {
            warn!("No layer added: the visualization configuration cannot locate items");
            return;
        };
        let features = collection.len();
        let id = host.add_layer(LayerSpec::geojson(collection, self.marker.clone()));
        info!(layer = %id, features, received = items.len(), "added CMS layer");
    }
}

impl Extension for VisualizerExtension {
    fn on_start(&mut self, host: &mut dyn HostBridge) {
        host.show(VISUALIZER_HTML);
        self.marker = host.widget_property().visualization.marker_style();
    }

    fn on_message(&mut self, host: &mut dyn HostBridge, message: UiMessage) {
        match message {
            UiMessage::Init => {
                let property = host.widget_property().clone();
                host.post_message(ExtensionMessage::Init(property));
            }
            UiMessage::AddLayer(items) => self.add_items(host, items),
            other => debug!("visualizer ignores {}", other.action()),
        }
    }
}

/// Fetches items for the configured data source once the extension hands
/// over the widget property.
#[derive(Debug, Clone, Default)]
pub struct VisualizerPanel {
    client: Client,
}

impl VisualizerPanel {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// `None` when the source is misconfigured or its items failed to load.
    pub async fn load(&self, property: &WidgetProperty) -> Option<Vec<Item>> {
        let source = match source_from_settings(&property.api) {
            Ok(source) => source,
            Err(err) => {
                warn!("Please check the data source in the widget properties: {err}");
                return None;
            }
        };
        match source.fetch_items(&self.client).await {
            Ok(items) => Some(items),
            Err(err) => {
                error!("Error fetching data from {}: {err}", source.kind().as_str());
                None
            }
        }
    }
}

impl Panel for VisualizerPanel {
    fn on_load(&self) -> Option<UiMessage> {
        Some(UiMessage::Init)
    }

    fn on_message<'a>(&'a self, message: ExtensionMessage) -> BoxFuture<'a, Option<UiMessage>> {
        Box::pin(async move {
            match message {
                ExtensionMessage::Init(property) => {
                    self.load(&property).await.map(UiMessage::AddLayer)
                }
                other => {
                    debug!("visualizer panel ignores {}", other.action());
                    None
                }
            }
        })
    }
}
