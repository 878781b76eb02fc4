//! Recording host double and mock CMS server for extension tests.

use axum::Router;
use projection::Feature;

use crate::{ExtensionMessage, HostBridge, LayerSpec, WidgetProperty};

#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    pub(crate) property: WidgetProperty,
    pub(crate) shown: Vec<String>,
    pub(crate) posted: Vec<ExtensionMessage>,
    pub(crate) layers: Vec<LayerSpec>,
    pub(crate) selected: Option<Feature>,
}

impl RecordingHost {
    pub(crate) fn new(property: WidgetProperty) -> Self {
        Self {
            property,
            ..Default::default()
        }
    }
}

impl HostBridge for RecordingHost {
    fn show(&mut self, html: &str) {
        self.shown.push(html.to_string());
    }

    fn post_message(&mut self, message: ExtensionMessage) {
        self.posted.push(message);
    }

    fn add_layer(&mut self, layer: LayerSpec) -> String {
        self.layers.push(layer);
        format!("layer-{}", self.layers.len())
    }

    fn selected_feature(&self) -> Option<&Feature> {
        self.selected.as_ref()
    }

    fn widget_property(&self) -> &WidgetProperty {
        &self.property
    }
}

pub(crate) async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
