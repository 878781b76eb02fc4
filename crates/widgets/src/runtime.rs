//! In-process host: one extension, one panel, one message at a time.

use std::collections::VecDeque;

use projection::Feature;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    BridgeError, Extension, ExtensionMessage, HostBridge, LayerSpec, Panel, UiMessage,
    WidgetProperty,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AddedLayer {
    pub id: String,
    pub spec: LayerSpec,
}

/// Owns the widget property, the pending panel messages and every layer
/// added so far. Messages are handled strictly in arrival order and each
/// handler finishes before the next message is taken.
#[derive(Debug, Default)]
pub struct LocalHost {
    property: WidgetProperty,
    shown: Option<String>,
    pending: VecDeque<UiMessage>,
    outbox: VecDeque<ExtensionMessage>,
    layers: Vec<AddedLayer>,
    selected: Option<Feature>,
}

impl LocalHost {
    pub fn new(property: WidgetProperty) -> Self {
        Self {
            property,
            ..Default::default()
        }
    }

    pub fn shown(&self) -> Option<&str> {
        self.shown.as_deref()
    }

    pub fn layers(&self) -> &[AddedLayer] {
        &self.layers
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn enqueue(&mut self, message: UiMessage) {
        self.pending.push_back(message);
    }

    /// Validate and queue a raw panel message. Rejected messages are logged
    /// and dropped.
    pub fn enqueue_raw(&mut self, raw: Value) -> Result<(), BridgeError> {
        let message =
            UiMessage::from_value(raw).inspect_err(|err| warn!("Dropping message: {err}"))?;
        self.enqueue(message);
        Ok(())
    }

    /// Messages posted to the panel since the last call.
    pub fn take_outbox(&mut self) -> Vec<ExtensionMessage> {
        self.outbox.drain(..).collect()
    }

    /// Hand the oldest pending message to `extension`. `false` when idle.
    pub fn dispatch_next(&mut self, extension: &mut dyn Extension) -> bool {
        let Some(message) = self.pending.pop_front() else {
            return false;
        };
        debug!(action = message.action(), "dispatching panel message");
        extension.on_message(self, message);
        true
    }

    /// Start `extension`, mount `panel` and exchange messages until neither
    /// side has anything left to say.
    pub async fn run(&mut self, extension: &mut dyn Extension, panel: &dyn Panel) {
        extension.on_start(self);
        if let Some(first) = panel.on_load() {
            self.enqueue(first);
        }
        self.run_until_idle(extension, panel).await;
    }

    pub async fn run_until_idle(&mut self, extension: &mut dyn Extension, panel: &dyn Panel) {
        loop {
            if let Some(message) = self.outbox.pop_front() {
                debug!(action = message.action(), "delivering extension message");
                if let Some(reply) = panel.on_message(message).await {
                    self.enqueue(reply);
                }
                continue;
            }
            if !self.dispatch_next(extension) {
                break;
            }
        }
    }

    /// Select feature `index` of layer `layer_id` and notify `extension`.
    pub fn select_feature(
        &mut self,
        extension: &mut dyn Extension,
        layer_id: &str,
        index: usize,
    ) -> bool {
        let feature = self
            .layers
            .iter()
            .find(|layer| layer.id == layer_id)
            .and_then(|layer| layer.spec.data.value.features.get(index))
            .cloned();
        let found = feature.is_some();
        if !found {
            warn!("No feature {index} in layer {layer_id}");
        }
        self.selected = feature;
        extension.on_select(self);
        found
    }
}

impl HostBridge for LocalHost {
    fn show(&mut self, html: &str) {
        self.shown = Some(html.to_string());
    }

    fn post_message(&mut self, message: ExtensionMessage) {
        self.outbox.push_back(message);
    }

    fn add_layer(&mut self, layer: LayerSpec) -> String {
        let id = format!("layer-{}", self.layers.len() + 1);
        self.layers.push(AddedLayer {
            id: id.clone(),
            spec: layer,
        });
        id
    }

    fn selected_feature(&self) -> Option<&Feature> {
        self.selected.as_ref()
    }

    fn widget_property(&self) -> &WidgetProperty {
        &self.property
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InspectorBlock, PropertyPanel, VISUALIZER_HTML, VisualizerExtension};
    use cms::BoxFuture;
    use pretty_assertions::assert_eq;
    use projection::VisualizationConfig;
    use records::{Field, Item};
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers `init` with a fixed item list and records what it saw.
    #[derive(Default)]
    struct StaticPanel {
        items: Vec<Item>,
        seen: Mutex<Vec<&'static str>>,
    }

    impl Panel for StaticPanel {
        fn on_load(&self) -> Option<UiMessage> {
            Some(UiMessage::Init)
        }

        fn on_message<'a>(&'a self, message: ExtensionMessage) -> BoxFuture<'a, Option<UiMessage>> {
            Box::pin(async move {
                self.seen.lock().unwrap().push(message.action());
                match message {
                    ExtensionMessage::Init(_) => Some(UiMessage::AddLayer(self.items.clone())),
                    _ => None,
                }
            })
        }
    }

    fn property() -> WidgetProperty {
        WidgetProperty {
            visualization: VisualizationConfig {
                location_type: Some("lat_lng_fields".to_string()),
                latitude_field: Some("lat".to_string()),
                longitude_field: Some("lng".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item::new("a").with_fields(vec![
                Field::new("a1", "name", json!("Tower")),
                Field::new("a2", "lat", json!(35)),
                Field::new("a3", "lng", json!(139)),
            ]),
            Item::new("b").with_fields(vec![Field::new("b1", "name", json!("Nowhere"))]),
        ]
    }

    #[tokio::test]
    async fn full_exchange_adds_one_layer() {
        let mut host = LocalHost::new(property());
        let mut ext = VisualizerExtension::new();
        let panel = StaticPanel {
            items: items(),
            ..Default::default()
        };

        host.run(&mut ext, &panel).await;

        assert_eq!(host.shown(), Some(VISUALIZER_HTML));
        assert_eq!(*panel.seen.lock().unwrap(), vec!["init"]);
        assert_eq!(host.pending(), 0);
        assert_eq!(host.layers().len(), 1);
        assert_eq!(host.layers()[0].id, "layer-1");
        assert_eq!(host.layers()[0].spec.data.value.len(), 1);
    }

    #[tokio::test]
    async fn selection_feeds_the_inspector() {
        let mut host = LocalHost::new(property());
        let mut ext = VisualizerExtension::new();
        let panel = StaticPanel {
            items: items(),
            ..Default::default()
        };
        host.run(&mut ext, &panel).await;

        let mut inspector = InspectorBlock::new();
        assert!(host.select_feature(&mut inspector, "layer-1", 0));
        let outbox = host.take_outbox();
        assert_eq!(outbox.len(), 1);
        let panel = PropertyPanel::from_message(&outbox[0]).unwrap();
        assert_eq!(panel.render_text(), "name:\n  Tower\nlat:\n  35\nlng:\n  139\n");

        assert!(!host.select_feature(&mut inspector, "layer-1", 5));
        assert_eq!(host.take_outbox(), vec![ExtensionMessage::GetInspector(None)]);
    }

    #[test]
    fn messages_are_dispatched_in_order() {
        let mut host = LocalHost::new(property());
        let mut inspector = InspectorBlock::new();
        host.enqueue(UiMessage::GetProperties);
        host.enqueue_raw(json!({ "action": "getInspector" })).unwrap();
        assert!(host.enqueue_raw(json!({ "action": "explode" })).is_err());
        assert_eq!(host.pending(), 2);

        while host.dispatch_next(&mut inspector) {}

        assert_eq!(
            host.take_outbox(),
            vec![
                ExtensionMessage::GetProperties(None),
                ExtensionMessage::GetInspector(None)
            ]
        );
    }
}
