//! Merge raw CMS records, schema and assets into [`Item`]s.
//!
//! Two record shapes come in. Integration items already carry a flat field
//! list; public results are plain JSON objects whose keys become fields.
//! Both go through the same per-field rules: schema names, type overrides,
//! asset URL resolution and group expansion into a flat list with `group`
//! back-references.

use records::{Field, FieldType, Item};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::assets::AssetIndex;
use crate::schema::{SchemaMap, TypeOverrides};

/// Fresh opaque id for a synthesized field.
pub fn new_field_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub struct Normalizer<'a> {
    schema: &'a SchemaMap,
    assets: &'a AssetIndex,
    overrides: Option<&'a TypeOverrides>,
}

impl<'a> Normalizer<'a> {
    pub fn new(schema: &'a SchemaMap, assets: &'a AssetIndex) -> Self {
        Self {
            schema,
            assets,
            overrides: None,
        }
    }

    pub fn with_overrides(mut self, overrides: &'a TypeOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Override table first, then the type the record carried, then schema.
    pub fn field_type(&self, key: &str, raw: Option<FieldType>) -> Option<FieldType> {
        if let Some(ty) = self.overrides.and_then(|o| o.get(key)) {
            return Some(ty.clone());
        }
        raw.or_else(|| self.schema.field_type(key).cloned())
    }

    pub fn normalize_items(&self, items: Vec<Item>) -> Vec<Item> {
        items
            .into_iter()
            .map(|item| self.normalize_item(item))
            .collect()
    }

    /// Normalize an integration item: attach schema names and resolve assets.
    pub fn normalize_item(&self, item: Item) -> Item {
        let mut fields = Vec::with_capacity(item.fields.len());
        for raw in item.fields {
            let field_type = self.field_type(&raw.key, raw.field_type);
            let name = self.schema.name(&raw.key).map(str::to_string);
            let field = Field {
                id: if raw.id.is_empty() {
                    new_field_id()
                } else {
                    raw.id
                },
                key: raw.key,
                field_type,
                value: raw.value,
                name,
                group: raw.group,
            };
            self.push_field(&mut fields, field, Origin::Stored);
        }
        Item {
            id: item.id,
            fields,
        }
    }

    /// Build an item from one public API result object.
    ///
    /// The top-level `id` key becomes the item id; `id` keys inside groups
    /// are dropped. Names fall back to the key when the schema has no title.
    pub fn item_from_record(&self, record: Map<String, Value>) -> Item {
        let mut fields = Vec::new();
        let id = self.push_object(&mut fields, record, None);
        Item {
            id: id.unwrap_or_default(),
            fields,
        }
    }

    fn push_object(
        &self,
        fields: &mut Vec<Field>,
        object: Map<String, Value>,
        group: Option<&str>,
    ) -> Option<String> {
        let mut record_id = None;
        for (key, value) in object {
            if key == "id" {
                if group.is_none() {
                    record_id = record_id_from(&value);
                }
                continue;
            }

            let field_type = self.field_type(&key, None);
            let name = self.schema.name(&key).unwrap_or(&key).to_string();
            let field = Field {
                id: new_field_id(),
                key,
                field_type,
                value,
                name: Some(name),
                group: group.map(str::to_string),
            };
            self.push_field(fields, field, Origin::Record);
        }
        record_id
    }

    fn push_field(&self, fields: &mut Vec<Field>, mut field: Field, origin: Origin) {
        if field.is_group() {
            match std::mem::take(&mut field.value) {
                // Already flat: the CMS group id is what children point at.
                Value::String(group_id) if !group_id.is_empty() => {
                    field.id = group_id.clone();
                    field.value = Value::String(group_id);
                    fields.push(field);
                }
                // A multiple group lists one id per entry; each gets its own
                // placeholder so every entry keeps its children.
                Value::Array(ids) if !ids.is_empty() && ids.iter().all(Value::is_string) => {
                    for id in ids.into_iter().filter_map(|v| v.as_str().map(str::to_string)) {
                        let mut placeholder = field.clone();
                        placeholder.id = id.clone();
                        placeholder.value = Value::String(id);
                        fields.push(placeholder);
                    }
                }
                nested => {
                    let group_id = field.id.clone();
                    field.value = Value::String(group_id.clone());
                    fields.push(field);
                    self.push_children(fields, &group_id, nested);
                }
            }
            return;
        }

        let is_asset = field.field_type.as_ref().is_some_and(FieldType::is_asset);
        field.value = match origin {
            Origin::Stored if is_asset => self.resolve_asset_ids(field.value),
            Origin::Stored => field.value,
            Origin::Record => match inline_asset_urls(&field.value) {
                Some(urls) => urls,
                None if is_asset => embedded_asset_urls(field.value),
                None => field.value,
            },
        };
        fields.push(field);
    }

    fn push_children(&self, fields: &mut Vec<Field>, group_id: &str, nested: Value) {
        match nested {
            Value::Object(object) => {
                self.push_object(fields, object, Some(group_id));
            }
            Value::Array(entries) => {
                for entry in entries {
                    if let Value::Object(object) = entry {
                        self.push_object(fields, object, Some(group_id));
                    }
                }
            }
            _ => {}
        }
    }

    /// Replace asset ids with URLs, keeping ids that do not resolve.
    ///
    /// Arrays of ids come back in reverse order. Arrays holding asset
    /// objects are mapped to their URLs in place.
    pub fn resolve_asset_ids(&self, value: Value) -> Value {
        match value {
            Value::String(id) => Value::String(self.asset_url_or_id(id)),
            Value::Array(ids) if ids.iter().all(Value::is_string) => Value::Array(
                ids.into_iter()
                    .rev()
                    .map(|v| match v {
                        Value::String(id) => Value::String(self.asset_url_or_id(id)),
                        other => other,
                    })
                    .collect(),
            ),
            Value::Array(entries) => Value::Array(
                entries
                    .into_iter()
                    .map(|v| match v {
                        Value::String(id) => Value::String(self.asset_url_or_id(id)),
                        other => object_url(other),
                    })
                    .collect(),
            ),
            other => object_url(other),
        }
    }

    fn asset_url_or_id(&self, id: String) -> String {
        match self.assets.url(&id) {
            Some(url) => url.to_string(),
            None => id,
        }
    }
}

/// Where a field came from: a stored integration field referencing assets by
/// id, or a public record embedding its assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Stored,
    Record,
}

/// `url` of an asset object; anything else unchanged.
fn object_url(value: Value) -> Value {
    if let Some(Value::String(url)) = value.get("url") {
        return Value::String(url.clone());
    }
    value
}

/// Asset objects embedded in a record (`{ "type": "asset", "url": ... }`),
/// detected from the first element of an array or from a lone object.
fn inline_asset_urls(value: &Value) -> Option<Value> {
    fn is_asset_object(v: &Value) -> bool {
        v.get("type").and_then(Value::as_str) == Some("asset")
    }

    match value {
        Value::Array(entries) if entries.first().is_some_and(is_asset_object) => Some(
            Value::Array(entries.iter().cloned().map(object_url).collect()),
        ),
        Value::Object(_) if is_asset_object(value) && value.get("url").is_some() => {
            Some(object_url(value.clone()))
        }
        _ => None,
    }
}

/// Asset-typed record values: arrays keep their order, each object becomes
/// its `url`.
fn embedded_asset_urls(value: Value) -> Value {
    match value {
        Value::Array(entries) => Value::Array(entries.into_iter().map(object_url).collect()),
        other => object_url(other),
    }
}

fn record_id_from(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
