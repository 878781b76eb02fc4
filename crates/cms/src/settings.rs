//! The `api` group of the visualizer widget property.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::CmsError;

/// Backend-selection and credential settings, as entered in the host's
/// widget property panel. Every value is optional; each adapter checks the
/// ones it needs before doing anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_type: Option<String>,

    // CMS data visualizer server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_api_key: Option<String>,

    // Integration API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_model_id: Option<String>,
    /// Example: `status===published|reviewed;category===news`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_filters: Option<String>,

    // Public API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_workspace_id_for_public_api: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_project_id_for_public_api: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_model_id_for_public_api: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_filters_for_public_api: Option<String>,

    /// `fieldKey:type` pairs, comma separated. Wins over schema types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type_overrides: Option<String>,
}

/// Which CMS backend a widget reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSourceKind {
    #[serde(rename = "cms_data_visualizer_server")]
    Server,
    #[serde(rename = "cms_integration_api")]
    Integration,
    #[serde(rename = "cms_public_api")]
    Public,
}

impl DataSourceKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "cms_data_visualizer_server" => Some(Self::Server),
            "cms_integration_api" => Some(Self::Integration),
            "cms_public_api" => Some(Self::Public),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "cms_data_visualizer_server",
            Self::Integration => "cms_integration_api",
            Self::Public => "cms_public_api",
        }
    }
}

impl ApiSettings {
    pub fn kind(&self) -> Result<DataSourceKind, CmsError> {
        let [tag] = require("widget", [("data_source_type", &self.data_source_type)])?;
        DataSourceKind::from_tag(tag).ok_or_else(|| CmsError::UnknownSource(tag.to_string()))
    }
}

/// Check that every named setting is present and not blank.
///
/// Missing settings are logged once, together, and reported as
/// [`CmsError::MissingSettings`]; on success the trimmed values are returned
/// in the order they were asked for.
pub(crate) fn require<'a, const N: usize>(
    source_name: &'static str,
    entries: [(&'static str, &'a Option<String>); N],
) -> Result<[&'a str; N], CmsError> {
    let missing: Vec<&'static str> = entries
        .iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if !missing.is_empty() {
        warn!(
            "Please set {} in the widget properties for {source_name}.",
            missing.join(", ")
        );
        return Err(CmsError::MissingSettings {
            source_name,
            missing,
        });
    }

    Ok(entries.map(|(_, value)| value.as_deref().map(str::trim).unwrap_or_default()))
}

/// Blank optional settings read as absent.
pub(crate) fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
