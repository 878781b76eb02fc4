use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, warn};

/// The `visualization` group of the widget property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualizationConfig {
    /// `lat_lng_fields`, `lat_lng_array_field` or `geojson_field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude_field: Option<String>,
    /// Field holding `[lng, lat]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geojson_field: Option<String>,
    /// Comma-separated allow-list of field keys shown in the info-box.
    #[serde(default, alias = "display_fields", skip_serializing_if = "Option::is_none")]
    pub infobox_fields: Option<String>,
    /// JSON object merged into the layer's marker style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_appearance: Option<String>,
}

/// Where an item's point comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationSource {
    FieldPair { latitude: String, longitude: String },
    ArrayField { field: String },
    GeoJsonField { field: String },
}

impl LocationSource {
    pub const FIELD_PAIR: &'static str = "lat_lng_fields";
    pub const ARRAY_FIELD: &'static str = "lat_lng_array_field";
    pub const GEOJSON_FIELD: &'static str = "geojson_field";
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl VisualizationConfig {
    /// Resolve the location mode and its field keys. A missing or unknown
    /// mode, or a missing key for the chosen mode, is logged and yields
    /// `None`.
    pub fn location(&self) -> Option<LocationSource> {
        let Some(mode) = non_blank(&self.location_type) else {
            warn!("Visualization configuration is missing or incomplete.");
            return None;
        };

        match mode.as_str() {
            LocationSource::FIELD_PAIR => {
                match (non_blank(&self.latitude_field), non_blank(&self.longitude_field)) {
                    (Some(latitude), Some(longitude)) => Some(LocationSource::FieldPair {
                        latitude,
                        longitude,
                    }),
                    _ => {
                        warn!(
                            "Please set the Latitude Field and Longitude Field in the visualization configuration."
                        );
                        None
                    }
                }
            }
            LocationSource::ARRAY_FIELD => match non_blank(&self.coordinates_field) {
                Some(field) => Some(LocationSource::ArrayField { field }),
                None => {
                    warn!("Please set the Coordinates Field in the visualization configuration.");
                    None
                }
            },
            LocationSource::GEOJSON_FIELD => match non_blank(&self.geojson_field) {
                Some(field) => Some(LocationSource::GeoJsonField { field }),
                None => {
                    warn!("Please set the GeoJSON Field in the visualization configuration.");
                    None
                }
            },
            other => {
                warn!("Unsupported location type {other:?} in the visualization configuration.");
                None
            }
        }
    }

    /// Allow-listed field keys, trimmed, blanks dropped. Empty means all.
    pub fn display_fields(&self) -> Vec<String> {
        self.infobox_fields
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Marker style object. Invalid or non-object JSON falls back to `{}`.
    pub fn marker_style(&self) -> Map<String, Value> {
        let Some(raw) = non_blank(&self.marker_appearance) else {
            return Map::new();
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(style)) => style,
            Ok(other) => {
                error!("Marker appearance must be a JSON object, got {other}");
                Map::new()
            }
            Err(err) => {
                error!("Failed to parse marker appearance: {err}");
                Map::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(location_type: &str) -> VisualizationConfig {
        VisualizationConfig {
            location_type: Some(location_type.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn field_pair_needs_both_keys() {
        let mut cfg = config("lat_lng_fields");
        cfg.latitude_field = Some("lat".to_string());
        assert_eq!(cfg.location(), None);

        cfg.longitude_field = Some("lng".to_string());
        assert_eq!(
            cfg.location(),
            Some(LocationSource::FieldPair {
                latitude: "lat".to_string(),
                longitude: "lng".to_string()
            })
        );
    }

    #[test]
    fn unknown_or_missing_mode_is_rejected() {
        assert_eq!(VisualizationConfig::default().location(), None);
        assert_eq!(config("polygon_field").location(), None);
        assert_eq!(config("geojson_field").location(), None);

        let mut cfg = config("lat_lng_array_field");
        cfg.coordinates_field = Some(" coords ".to_string());
        assert_eq!(
            cfg.location(),
            Some(LocationSource::ArrayField {
                field: "coords".to_string()
            })
        );
    }

    #[test]
    fn display_fields_accept_either_setting_name() {
        let cfg: VisualizationConfig =
            serde_json::from_value(json!({ "display_fields": "name, ,address " })).unwrap();
        assert_eq!(cfg.display_fields(), vec!["name", "address"]);
        assert!(VisualizationConfig::default().display_fields().is_empty());
    }

    #[test]
    fn marker_style_falls_back_to_empty() {
        let mut cfg = VisualizationConfig {
            marker_appearance: Some(r##"{"pointColor":"#ff0000","pointSize":12}"##.to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.marker_style().get("pointSize"), Some(&json!(12)));

        cfg.marker_appearance = Some("{not json".to_string());
        assert!(cfg.marker_style().is_empty());

        cfg.marker_appearance = Some("[1,2]".to_string());
        assert!(cfg.marker_style().is_empty());
    }
}
