//! Field-key → {name, type} resolution.
//!
//! The integration API exposes a model schema as a flat field array. The
//! public API publishes a JSON-schema document instead, whose nested group
//! properties are flattened into the same map: one entry per leaf or group
//! key, whatever the depth.

use std::collections::HashMap;

use records::FieldType;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::CmsError;
use crate::http::get_json;

/// One field of an integration model schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchemaField {
    #[serde(default)]
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub multiple: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaEntry {
    pub name: Option<String>,
    pub field_type: Option<FieldType>,
    pub required: bool,
    pub multiple: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaMap {
    entries: HashMap<String, SchemaEntry>,
}

impl SchemaMap {
    pub fn from_fields(fields: impl IntoIterator<Item = SchemaField>) -> Self {
        let entries = fields
            .into_iter()
            .map(|f| {
                (
                    f.key,
                    SchemaEntry {
                        name: f.name,
                        field_type: f.field_type,
                        required: f.required,
                        multiple: f.multiple,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Flatten a public JSON-schema document.
    pub fn from_json_schema(schema: &JsonSchema) -> Self {
        let mut map = Self::default();
        map.flatten(&schema.properties);
        map
    }

    fn flatten(&mut self, properties: &HashMap<String, SchemaProperty>) {
        for (key, prop) in properties {
            let nested = prop.items.as_ref().and_then(|i| i.properties.as_ref());
            if let Some(children) = nested {
                self.entries.insert(
                    key.clone(),
                    SchemaEntry {
                        name: prop.title.clone(),
                        field_type: Some(FieldType::Group),
                        ..Default::default()
                    },
                );
                self.flatten(children);
            } else {
                self.entries.insert(
                    key.clone(),
                    SchemaEntry {
                        name: prop.title.clone(),
                        field_type: prop.semantic_type(),
                        ..Default::default()
                    },
                );
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.get(key)
    }

    pub fn name(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|e| e.name.as_deref())
    }

    pub fn field_type(&self, key: &str) -> Option<&FieldType> {
        self.get(key).and_then(|e| e.field_type.as_ref())
    }

    pub fn has_type(&self, ty: &FieldType) -> bool {
        self.entries
            .values()
            .any(|e| e.field_type.as_ref() == Some(ty))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Public model schema document (`{model}.schema.json`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonSchema {
    #[serde(default)]
    pub properties: HashMap<String, SchemaProperty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaProperty {
    #[serde(default)]
    pub title: Option<String>,
    /// Usually a string; JSON schema also allows `["string", "null"]`.
    #[serde(rename = "type", default)]
    pub json_type: Option<Value>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub items: Option<SchemaItems>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaItems {
    #[serde(default)]
    pub properties: Option<HashMap<String, SchemaProperty>>,
}

impl SchemaProperty {
    fn type_tag(&self) -> Option<&str> {
        match self.json_type.as_ref()? {
            Value::String(tag) => Some(tag.as_str()),
            Value::Array(tags) => tags
                .iter()
                .filter_map(Value::as_str)
                .find(|tag| *tag != "null"),
            _ => None,
        }
    }

    /// Binary strings are CMS assets; every other tag passes through.
    pub fn semantic_type(&self) -> Option<FieldType> {
        let tag = self.type_tag()?;
        if tag == "string" && self.format.as_deref() == Some("binary") {
            return Some(FieldType::Asset);
        }
        Some(FieldType::from_tag(tag))
    }
}

/// `fieldKey:type` pairs that take precedence over any inferred type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeOverrides {
    types: HashMap<String, FieldType>,
}

impl TypeOverrides {
    /// Parse `key:type,key:type`. Entries lacking either side are ignored.
    pub fn parse(raw: &str) -> Self {
        let types = raw
            .split(',')
            .filter_map(|entry| {
                let (key, ty) = entry.split_once(':')?;
                let (key, ty) = (key.trim(), ty.trim());
                if key.is_empty() || ty.is_empty() {
                    debug!("ignoring malformed field type override {entry:?}");
                    return None;
                }
                Some((key.to_string(), FieldType::from_tag(ty)))
            })
            .collect();
        Self { types }
    }

    pub fn get(&self, key: &str) -> Option<&FieldType> {
        self.types.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct ModelResponse {
    #[serde(default)]
    schema: Option<ModelSchema>,
}

#[derive(Debug, Deserialize)]
struct ModelSchema {
    #[serde(default)]
    fields: Vec<SchemaField>,
}

/// Fetch an integration model (`.../models/{model}`) and index its fields.
pub async fn fetch_model_schema(
    client: &Client,
    model_url: &str,
    headers: &HeaderMap,
) -> Result<SchemaMap, CmsError> {
    let model: ModelResponse = get_json(client, model_url, headers).await?;
    let fields = model.schema.map(|s| s.fields).unwrap_or_default();
    Ok(SchemaMap::from_fields(fields))
}

/// Fetch a public `{model}.schema.json` document and flatten it.
pub async fn fetch_public_schema(
    client: &Client,
    schema_url: &str,
    headers: &HeaderMap,
) -> Result<SchemaMap, CmsError> {
    let schema: JsonSchema = get_json(client, schema_url, headers).await?;
    Ok(SchemaMap::from_json_schema(&schema))
}
