//! Info-box block showing the fields stashed on the selected feature.

use projection::{Feature, ORIGINAL_FIELDS_KEY};
use records::Field;
use tracing::warn;

use crate::{Extension, ExtensionMessage, HostBridge, UiMessage};

pub const INSPECTOR_HTML: &str = r#"<div id="cms-inspector"></div>"#;

#[derive(Debug, Default)]
pub struct InspectorBlock;

impl InspectorBlock {
    pub fn new() -> Self {
        Self
    }
}

/// The field list a projected feature carries, if it can be read back.
pub fn original_fields(feature: &Feature) -> Option<Vec<Field>> {
    let stashed = feature.properties.get(ORIGINAL_FIELDS_KEY)?;
    match serde_json::from_value(stashed.clone()) {
        Ok(fields) => Some(fields),
        Err(err) => {
            warn!("Selected feature carries an unreadable field list: {err}");
            None
        }
    }
}

fn selected_fields(host: &dyn HostBridge) -> Option<Vec<Field>> {
    host.selected_feature().and_then(original_fields)
}

impl Extension for InspectorBlock {
    fn on_start(&mut self, host: &mut dyn HostBridge) {
        host.show(INSPECTOR_HTML);
    }

    fn on_message(&mut self, host: &mut dyn HostBridge, message: UiMessage) {
        let reply = match message {
            UiMessage::GetInspector => ExtensionMessage::GetInspector(selected_fields(host)),
            UiMessage::GetProperties => ExtensionMessage::GetProperties(selected_fields(host)),
            other => {
                warn!("inspector block ignores {}", other.action());
                return;
            }
        };
        host.post_message(reply);
    }

    fn on_select(&mut self, host: &mut dyn HostBridge) {
        let fields = selected_fields(host);
        host.post_message(ExtensionMessage::GetInspector(fields));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WidgetProperty;
    use crate::test_support::RecordingHost;
    use pretty_assertions::assert_eq;
    use projection::Geometry;
    use serde_json::{Map, json};

    fn feature() -> Feature {
        let mut properties = Map::new();
        properties.insert("name".to_string(), json!("Tower"));
        properties.insert(
            ORIGINAL_FIELDS_KEY.to_string(),
            json!([{ "id": "f1", "key": "name", "type": "text", "value": "Tower", "name": "Name" }]),
        );
        Feature {
            geometry: Geometry::point(139.0, 35.0),
            properties,
        }
    }

    #[test]
    fn select_posts_stashed_fields() {
        let mut host = RecordingHost::new(WidgetProperty::default());
        host.selected = Some(feature());
        let mut block = InspectorBlock::new();
        block.on_start(&mut host);
        block.on_select(&mut host);

        assert_eq!(host.shown, vec![INSPECTOR_HTML.to_string()]);
        let [ExtensionMessage::GetInspector(Some(fields))] = host.posted.as_slice() else {
            panic!("unexpected messages {:?}", host.posted);
        };
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].label(), "Name");
    }

    #[test]
    fn requests_are_answered_under_the_same_action() {
        let mut host = RecordingHost::new(WidgetProperty::default());
        let mut block = InspectorBlock::new();
        block.on_message(&mut host, UiMessage::GetProperties);
        host.selected = Some(feature());
        block.on_message(&mut host, UiMessage::GetInspector);
        block.on_message(&mut host, UiMessage::Init);

        assert_eq!(host.posted.len(), 2);
        assert_eq!(host.posted[0], ExtensionMessage::GetProperties(None));
        assert!(matches!(&host.posted[1], ExtensionMessage::GetInspector(Some(f)) if f.len() == 1));
    }

    #[test]
    fn features_without_stash_yield_nothing() {
        let mut f = feature();
        f.properties.remove(ORIGINAL_FIELDS_KEY);
        assert_eq!(original_fields(&f), None);

        f.properties.insert(ORIGINAL_FIELDS_KEY.to_string(), json!("garbage"));
        assert_eq!(original_fields(&f), None);
    }
}
