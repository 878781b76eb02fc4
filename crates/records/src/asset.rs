use serde::{Deserialize, Serialize};

/// A remote file resource of a CMS project.
///
/// Only the identity and the public URL matter to the pipeline; the asset
/// endpoints return much more, which is ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub url: String,
}

impl Asset {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}
