//! Point features for the entrances and platforms inside a station.

use std::collections::BTreeMap;

use geojson::{Feature, FeatureCollection, Geometry};

use ridemap_transit::{LocationType, Stop, StopId};

use crate::map::style::properties::{FeaturePropertiesBuilder, keys};

pub const CHILD_STOP_SOURCE_ID: &str = "child-stop-source";

const ENTRANCE_SEPARATORS: [char; 2] = ['-', '–'];

/// Entrance names repeat the station name ("Park Street - Tremont St");
/// only the trimmed part after the last dash is shown.
fn entrance_label(name: &str) -> &str {
    name.rsplit_once(ENTRANCE_SEPARATORS)
        .map(|(_, label)| label.trim())
        .filter(|label| !label.is_empty())
        .unwrap_or(name)
}

fn child_stop_label(stop: &Stop) -> Option<&str> {
    match stop.location_type {
        LocationType::EntranceExit => Some(entrance_label(&stop.name)),
        LocationType::BoardingArea | LocationType::Stop => {
            Some(stop.platform_name.as_deref().unwrap_or(&stop.name))
        }
        LocationType::Station | LocationType::GenericNode => None,
    }
}

/// One feature per entrance, boarding area and platform; other location
/// types are skipped. `sortOrder` is the position in stop id order over all
/// inputs, skipped ones included.
pub fn generate_child_stop_features(child_stops: &BTreeMap<StopId, Stop>) -> FeatureCollection {
    let features = child_stops
        .values()
        .enumerate()
        .filter_map(|(index, stop)| {
            let label = child_stop_label(stop)?;
            let mut properties = FeaturePropertiesBuilder::new();
            properties
                .put(keys::NAME, label.to_string())
                .put(keys::LOCATION_TYPE, stop.location_type.name().to_string())
                .put(keys::SORT_ORDER, index as i64);
            Some(Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::Point(vec![
                    stop.position.x,
                    stop.position.y,
                ]))),
                id: Some(geojson::feature::Id::String(stop.id.to_string())),
                properties: Some(properties.build().into_object()),
                foreign_members: None,
            })
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
