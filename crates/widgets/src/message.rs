//! `{action, payload}` messages exchanged between extensions and panels.

use cms::ApiSettings;
use projection::VisualizationConfig;
use records::{Field, Item};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::BridgeError;

/// The widget property as configured in the host: one group for the CMS
/// connection, one for how items are drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetProperty {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub visualization: VisualizationConfig,
}

/// Panel → extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
pub enum UiMessage {
    Init,
    AddLayer(Vec<Item>),
    GetInspector,
    GetProperties,
}

/// Extension → panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
pub enum ExtensionMessage {
    Init(WidgetProperty),
    /// Field list stashed on the selected feature, `None` without a selection.
    GetInspector(Option<Vec<Field>>),
    GetProperties(Option<Vec<Field>>),
}

impl UiMessage {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::AddLayer(_) => "addLayer",
            Self::GetInspector => "getInspector",
            Self::GetProperties => "getProperties",
        }
    }

    /// Validate a raw message. Payloads of actions that carry none are
    /// ignored.
    pub fn from_value(value: Value) -> Result<Self, BridgeError> {
        let (action, payload) = split(value)?;
        match action.as_str() {
            "init" => Ok(Self::Init),
            "addLayer" => Ok(Self::AddLayer(decode(&action, payload)?)),
            "getInspector" => Ok(Self::GetInspector),
            "getProperties" => Ok(Self::GetProperties),
            _ => Err(BridgeError::UnknownAction(action)),
        }
    }
}

impl ExtensionMessage {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::GetInspector(_) => "getInspector",
            Self::GetProperties(_) => "getProperties",
        }
    }

    pub fn from_value(value: Value) -> Result<Self, BridgeError> {
        let (action, payload) = split(value)?;
        match action.as_str() {
            "init" => Ok(Self::Init(decode(&action, payload)?)),
            "getInspector" => Ok(Self::GetInspector(decode(&action, payload)?)),
            "getProperties" => Ok(Self::GetProperties(decode(&action, payload)?)),
            _ => Err(BridgeError::UnknownAction(action)),
        }
    }
}

fn split(value: Value) -> Result<(String, Value), BridgeError> {
    let Value::Object(mut message) = value else {
        return Err(BridgeError::MissingAction);
    };
    let action = match message.remove("action") {
        Some(Value::String(action)) => action,
        _ => return Err(BridgeError::MissingAction),
    };
    let payload = message.remove("payload").unwrap_or(Value::Null);
    Ok((action, payload))
}

fn decode<T: DeserializeOwned>(action: &str, payload: Value) -> Result<T, BridgeError> {
    serde_json::from_value(payload).map_err(|source| BridgeError::Payload {
        action: action.to_string(),
        source,
    })
}
