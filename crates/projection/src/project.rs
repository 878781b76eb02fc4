//! Items → GeoJSON FeatureCollection.
//!
//! Projection is a pure function of its inputs. Items that cannot yield a
//! valid point are dropped (never replaced by placeholders) and logged with
//! their id; nothing here panics or returns an error.

use records::{Field, Item, as_coordinate};
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::{LocationSource, VisualizationConfig};
use crate::feature::{Feature, FeatureCollection, Geometry};

/// Property holding the projected field list for the inspector block.
pub const ORIGINAL_FIELDS_KEY: &str = "__original";

/// Project `items` with `config`. `None` means the configuration cannot
/// locate anything.
pub fn project(items: &[Item], config: &VisualizationConfig) -> Option<FeatureCollection> {
    let location = config.location()?;
    let display = config.display_fields();

    let features = items
        .iter()
        .filter_map(|item| project_item(item, &location, &display))
        .collect();

    Some(FeatureCollection { features })
}

/// Project one item; `display` is the allow-list, empty meaning every field.
pub fn project_item(item: &Item, location: &LocationSource, display: &[String]) -> Option<Feature> {
    let [lng, lat] = locate(item, location)?;
    Some(Feature {
        geometry: Geometry::point(lng, lat),
        properties: feature_properties(item, display),
    })
}

fn locate(item: &Item, location: &LocationSource) -> Option<[f64; 2]> {
    match location {
        LocationSource::FieldPair {
            latitude,
            longitude,
        } => {
            let lat = present_value(item, latitude);
            let lng = present_value(item, longitude);
            let (Some(lat), Some(lng)) = (lat, lng) else {
                warn!("No valid coordinates found for item {}", item.id);
                return None;
            };
            match (as_coordinate(lng), as_coordinate(lat)) {
                (Some(lng), Some(lat)) => Some([lng, lat]),
                _ => {
                    warn!("Latitude/longitude fields are not numeric for item {}", item.id);
                    None
                }
            }
        }
        LocationSource::ArrayField { field } => {
            let Some(value) = present_value(item, field) else {
                warn!("No valid coordinates found for item {}", item.id);
                return None;
            };
            let pair = match value {
                Value::Array(entries) if entries.len() >= 2 => {
                    as_coordinate(&entries[0]).zip(as_coordinate(&entries[1]))
                }
                _ => None,
            };
            if pair.is_none() {
                warn!("Coordinates field is not a [lng, lat] array for item {}", item.id);
            }
            pair.map(|(lng, lat)| [lng, lat])
        }
        LocationSource::GeoJsonField { field } => {
            let geojson = item.field(field).map(|f| &f.value);
            point_from_geojson(&item.id, geojson)
        }
    }
}

fn present_value<'a>(item: &'a Item, key: &str) -> Option<&'a Value> {
    item.field(key).map(|f| &f.value).filter(|v| !v.is_null())
}

fn point_from_geojson(item_id: &str, value: Option<&Value>) -> Option<[f64; 2]> {
    let parsed;
    let geometry = match value {
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(v) => {
                parsed = v;
                &parsed
            }
            Err(err) => {
                warn!("Error parsing GeoJSON for item {item_id}: {err}");
                return None;
            }
        },
        Some(obj @ Value::Object(_)) => obj,
        _ => {
            warn!("GeoJSON field is not a valid string or object for item {item_id}");
            return None;
        }
    };

    let is_point = geometry.get("type").and_then(Value::as_str) == Some("Point");
    let coords = geometry.get("coordinates").and_then(Value::as_array);
    let pair = match coords {
        Some(c) if is_point && c.len() >= 2 => c[0].as_f64().zip(c[1].as_f64()),
        _ => None,
    };
    match pair {
        Some((lng, lat)) if lng.is_finite() && lat.is_finite() => Some([lng, lat]),
        _ => {
            warn!("Unsupported GeoJSON type or invalid coordinates for item {item_id}");
            None
        }
    }
}

/// Field values keyed by field key, plus the same fields in full under
/// [`ORIGINAL_FIELDS_KEY`].
pub fn feature_properties(item: &Item, display: &[String]) -> Map<String, Value> {
    let selected: Vec<&Field> = if display.is_empty() {
        item.fields.iter().collect()
    } else {
        display.iter().filter_map(|key| item.field(key)).collect()
    };

    let mut properties = Map::new();
    for field in &selected {
        properties.insert(field.key.clone(), field.value.clone());
    }
    let original = selected
        .iter()
        .filter_map(|f| serde_json::to_value(f).ok())
        .collect();
    properties.insert(ORIGINAL_FIELDS_KEY.to_string(), Value::Array(original));
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use records::FieldType;
    use serde_json::json;

    fn item(id: &str, fields: Vec<(&str, Value)>) -> Item {
        Item::new(id).with_fields(
            fields
                .into_iter()
                .enumerate()
                .map(|(i, (key, value))| Field::new(format!("{id}-{i}"), key, value))
                .collect(),
        )
    }

    fn pair_config() -> VisualizationConfig {
        VisualizationConfig {
            location_type: Some("lat_lng_fields".to_string()),
            latitude_field: Some("lat".to_string()),
            longitude_field: Some("lng".to_string()),
            ..Default::default()
        }
    }

    fn geojson_config() -> VisualizationConfig {
        VisualizationConfig {
            location_type: Some("geojson_field".to_string()),
            geojson_field: Some("geo".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn field_pair_orders_lng_lat_and_drops_incomplete_items() {
        let items = vec![
            item("a", vec![("lat", json!(35.0)), ("lng", json!(139.0)), ("name", json!("A"))]),
            item("b", vec![("lng", json!(139.5)), ("name", json!("B"))]),
            item("c", vec![("lat", json!("34.5")), ("lng", json!("135.5"))]),
            item("d", vec![("lat", json!(null)), ("lng", json!(1.0))]),
            item("e", vec![("lat", json!("north")), ("lng", json!(1.0))]),
        ];

        let fc = project(&items, &pair_config()).unwrap();

        assert_eq!(fc.len(), 2);
        assert_eq!(fc.features[0].geometry.coordinates(), [139.0, 35.0]);
        assert_eq!(fc.features[1].geometry.coordinates(), [135.5, 34.5]);
    }

    #[test]
    fn array_field_uses_first_two_entries() {
        let config = VisualizationConfig {
            location_type: Some("lat_lng_array_field".to_string()),
            coordinates_field: Some("pos".to_string()),
            ..Default::default()
        };
        let items = vec![
            item("a", vec![("pos", json!([10.0, 20.0, 5.0]))]),
            item("b", vec![("pos", json!([10.0]))]),
            item("c", vec![("pos", json!("10,20"))]),
            item("d", vec![("other", json!(1))]),
        ];

        let fc = project(&items, &config).unwrap();

        assert_eq!(fc.len(), 1);
        assert_eq!(fc.features[0].geometry.coordinates(), [10.0, 20.0]);
    }

    #[test]
    fn geojson_field_accepts_points_only() {
        let items = vec![
            item("str", vec![("geo", json!(r#"{"type":"Point","coordinates":[10,20]}"#))]),
            item("obj", vec![("geo", json!({ "type": "Point", "coordinates": [1.5, 2.5] }))]),
            item(
                "poly",
                vec![("geo", json!(r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}"#))],
            ),
            item("bad", vec![("geo", json!("{oops"))]),
            item("num", vec![("geo", json!(12))]),
            item("none", vec![]),
            item("short", vec![("geo", json!({ "type": "Point", "coordinates": [1] }))]),
        ];

        let fc = project(&items, &geojson_config()).unwrap();

        let coords: Vec<[f64; 2]> = fc.features.iter().map(|f| f.geometry.coordinates()).collect();
        assert_eq!(coords, vec![[10.0, 20.0], [1.5, 2.5]]);
    }

    #[test]
    fn misconfiguration_returns_none() {
        let items = vec![item("a", vec![("lat", json!(1)), ("lng", json!(2))])];
        assert!(project(&items, &VisualizationConfig::default()).is_none());

        let mut config = pair_config();
        config.longitude_field = None;
        assert!(project(&items, &config).is_none());
    }

    #[test]
    fn all_fields_become_properties_without_allow_list() {
        let items = vec![item(
            "a",
            vec![("lat", json!(35)), ("lng", json!(139)), ("name", json!("Tower"))],
        )];

        let fc = project(&items, &pair_config()).unwrap();
        let props = &fc.features[0].properties;

        assert_eq!(props["name"], json!("Tower"));
        assert_eq!(props["lat"], json!(35));
        let original = props[ORIGINAL_FIELDS_KEY].as_array().unwrap();
        assert_eq!(original.len(), 3);
        assert_eq!(original[2]["key"], json!("name"));
    }

    #[test]
    fn allow_list_selects_in_list_order() {
        let mut config = pair_config();
        config.infobox_fields = Some("name, missing, lat".to_string());
        let mut it = item(
            "a",
            vec![("lat", json!(35)), ("lng", json!(139)), ("name", json!("Tower"))],
        );
        it.fields[2].field_type = Some(FieldType::Text);

        let fc = project(&[it], &config).unwrap();
        let props = &fc.features[0].properties;

        let keys: Vec<&str> = props.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "lat", ORIGINAL_FIELDS_KEY]);
        let original = props[ORIGINAL_FIELDS_KEY].as_array().unwrap();
        assert_eq!(original.len(), 2);
        assert_eq!(original[0]["key"], json!("name"));
        assert_eq!(original[0]["type"], json!("text"));
    }

    #[test]
    fn projection_is_idempotent() {
        let items = vec![
            item("a", vec![("lat", json!(35.0)), ("lng", json!(139.0))]),
            item("b", vec![("lat", json!(36.0)), ("lng", json!(140.0))]),
        ];
        let config = pair_config();
        assert_eq!(project(&items, &config), project(&items, &config));
    }
}
