use serde::{Deserialize, Serialize};

use crate::Field;

/// One normalized source record.
///
/// An empty `id` means the primary key could not be resolved; callers treat
/// such items as unusable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// First field with the given key, in list order.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn top_level_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.group.is_none())
    }

    pub fn children<'a>(&'a self, group_id: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.group.as_deref() == Some(group_id))
    }
}
