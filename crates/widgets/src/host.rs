use cms::BoxFuture;
use projection::{Feature, FeatureCollection};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ExtensionMessage, UiMessage, WidgetProperty};

/// What an extension may ask of the map host.
pub trait HostBridge {
    /// Mount the extension's panel.
    fn show(&mut self, html: &str);

    /// Send a message to the extension's panel.
    fn post_message(&mut self, message: ExtensionMessage);

    /// Add a layer, returning its id.
    fn add_layer(&mut self, layer: LayerSpec) -> String;

    fn selected_feature(&self) -> Option<&Feature>;

    fn widget_property(&self) -> &WidgetProperty;
}

/// Callbacks the host invokes on an extension.
pub trait Extension {
    fn on_start(&mut self, host: &mut dyn HostBridge);

    fn on_message(&mut self, host: &mut dyn HostBridge, message: UiMessage);

    /// A feature was selected (or deselected) on the map.
    fn on_select(&mut self, _host: &mut dyn HostBridge) {}
}

/// The UI side of an extension.
pub trait Panel: Send + Sync {
    /// Message sent once the panel is mounted.
    fn on_load(&self) -> Option<UiMessage> {
        None
    }

    /// Handle a message from the extension, optionally answering it.
    fn on_message<'a>(&'a self, message: ExtensionMessage) -> BoxFuture<'a, Option<UiMessage>>;
}

/// A simple layer as understood by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    #[serde(rename = "type")]
    pub layer_type: String,
    pub data: LayerData,
    #[serde(default)]
    pub marker: Map<String, Value>,
    pub infobox: Infobox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerData {
    #[serde(rename = "type")]
    pub data_type: String,
    pub value: FeatureCollection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Infobox {
    pub blocks: Vec<InfoboxBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoboxBlock {
    pub plugin_id: String,
    pub extension_id: String,
}

impl InfoboxBlock {
    pub const PLUGIN_ID: &'static str = "reearth";
    pub const INSPECTOR: &'static str = "inspector_block";

    pub fn inspector() -> Self {
        Self {
            plugin_id: Self::PLUGIN_ID.to_string(),
            extension_id: Self::INSPECTOR.to_string(),
        }
    }
}

impl LayerSpec {
    /// A GeoJSON layer whose info-box shows the inspector block.
    pub fn geojson(value: FeatureCollection, marker: Map<String, Value>) -> Self {
        Self {
            layer_type: "simple".to_string(),
            data: LayerData {
                data_type: "geojson".to_string(),
                value,
            },
            marker,
            infobox: Infobox {
                blocks: vec![InfoboxBlock::inspector()],
            },
        }
    }
}
