use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Semantic type of a CMS field.
///
/// The set of tags is driven by the remote schema and is open-ended: tags the
/// pipeline has no special handling for are kept verbatim in `Other` so they
/// survive a round trip through the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    TextArea,
    RichText,
    Markdown,
    Integer,
    Number,
    Bool,
    Date,
    Url,
    Asset,
    Select,
    Tag,
    Reference,
    GeometryObject,
    GeometryEditor,
    Object,
    Group,
    Other(String),
}

impl FieldType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "text" => Self::Text,
            "textArea" => Self::TextArea,
            "richText" => Self::RichText,
            "markdown" => Self::Markdown,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "bool" => Self::Bool,
            "date" => Self::Date,
            "url" => Self::Url,
            "asset" => Self::Asset,
            "select" => Self::Select,
            "tag" => Self::Tag,
            "reference" => Self::Reference,
            "geometryObject" => Self::GeometryObject,
            "geometryEditor" => Self::GeometryEditor,
            "object" => Self::Object,
            "group" => Self::Group,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::TextArea => "textArea",
            Self::RichText => "richText",
            Self::Markdown => "markdown",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Url => "url",
            Self::Asset => "asset",
            Self::Select => "select",
            Self::Tag => "tag",
            Self::Reference => "reference",
            Self::GeometryObject => "geometryObject",
            Self::GeometryEditor => "geometryEditor",
            Self::Object => "object",
            Self::Group => "group",
            Self::Other(tag) => tag,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group)
    }

    pub fn is_asset(&self) -> bool {
        matches!(self, Self::Asset)
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<FieldType> for String {
    fn from(ty: FieldType) -> Self {
        ty.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One key/value unit of an [`Item`](crate::Item).
///
/// Nested groups are not stored as a tree. A group is a placeholder field
/// whose `value` is its own `id`; its children are the fields whose `group`
/// points at that id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub id: String,
    pub key: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Field {
    pub fn new(id: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            field_type: None,
            value,
            name: None,
            group: None,
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn in_group(mut self, group_id: impl Into<String>) -> Self {
        self.group = Some(group_id.into());
        self
    }

    pub fn is_group(&self) -> bool {
        self.field_type.as_ref().is_some_and(FieldType::is_group)
    }

    pub fn is_asset(&self) -> bool {
        self.field_type.as_ref().is_some_and(FieldType::is_asset)
    }

    /// Label shown to users: the schema name when known, else the key.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}
