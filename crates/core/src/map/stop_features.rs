//! Stop point features, snapped onto the route lines that serve them.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use geo::Coord;
use geojson::{Feature, FeatureCollection, Geometry};

use ridemap_transit::{MapStop, MapStopRoute, StopId, nearest_point_on_line};

use crate::map::route_features::RouteLineData;
use crate::map::style::properties::{FeatureProperties, FeaturePropertiesBuilder, keys};

pub const STOP_SOURCE_ID: &str = "stop-source";

/// What the stop source is being built for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StopSourceData {
    pub selected_stop_id: Option<StopId>,
    /// Only these stops are drawn when set, e.g. the stops of one trip.
    pub filtered_stop_ids: Option<BTreeSet<StopId>>,
}

impl StopSourceData {
    pub fn selected(stop_id: impl Into<StopId>) -> Self {
        Self {
            selected_stop_id: Some(stop_id.into()),
            filtered_stop_ids: None,
        }
    }

    fn allows(&self, stop_id: &StopId) -> bool {
        self.filtered_stop_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(stop_id))
    }
}

/// Symbol sort key of a stop. Higher values draw on top: transfer stations
/// get `1`, single category stops the negated category ordinal, and stops
/// without any category sort below all of them.
pub fn stop_sort_order(map_stop: &MapStop) -> i64 {
    match map_stop.route_types.as_slice() {
        [] => -(MapStopRoute::count() as i64),
        [only] => -(only.ordinal() as i64),
        _ => 1,
    }
}

pub fn stop_feature_properties(map_stop: &MapStop, selection: &StopSourceData) -> FeatureProperties {
    let stop = &map_stop.stop;
    let route_ids = map_stop
        .routes
        .iter()
        .map(|(category, routes)| {
            let ids = routes.iter().map(|route| route.id.to_string()).collect();
            (category.name().to_string(), ids)
        })
        .collect::<BTreeMap<_, Vec<_>>>();
    let service_status = map_stop
        .alerts
        .iter()
        .flatten()
        .map(|(category, state)| (category.name().to_string(), state.name().to_string()))
        .collect::<BTreeMap<_, _>>();

    let mut properties = FeaturePropertiesBuilder::new();
    properties
        .put(keys::ID, stop.id.to_string())
        .put(keys::NAME, stop.name.clone())
        .put(
            keys::IS_SELECTED,
            selection.selected_stop_id.as_ref() == Some(&stop.id),
        )
        .put(keys::IS_TERMINAL, map_stop.is_terminal)
        .put(
            keys::MAP_ROUTES,
            map_stop
                .route_types
                .iter()
                .map(|category| category.name().to_string())
                .collect(),
        )
        .put(keys::ROUTE_IDS, route_ids)
        .put(keys::SERVICE_STATUS, service_status)
        .put(keys::ALL_ROUTE_DIRECTIONS, map_stop.all_route_directions())
        .put(keys::SORT_ORDER, stop_sort_order(map_stop));
    properties.build()
}

fn stop_feature(map_stop: &MapStop, position: Coord, selection: &StopSourceData) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Point(vec![
            position.x, position.y,
        ]))),
        id: Some(geojson::feature::Id::String(map_stop.stop.id.to_string())),
        properties: Some(stop_feature_properties(map_stop, selection).into_object()),
        foreign_members: None,
    }
}

/// Build the stop source.
///
/// Stops served by a route line are resolved to their parent station and
/// snapped onto the first line that reaches them. Child stops never get a
/// feature of their own, even when their parent is missing. Every other top level stop
/// with at least one route category is placed at its own position. Each
/// stop appears at most once; unsnapped stops come first.
pub fn generate_stop_source(
    selection: &StopSourceData,
    stops: &BTreeMap<StopId, MapStop>,
    route_lines: &[RouteLineData],
) -> FeatureCollection {
    let stops: BTreeMap<&StopId, &MapStop> = stops
        .iter()
        .filter(|(stop_id, _)| selection.allows(stop_id))
        .collect();

    let mut touched: HashSet<StopId> = HashSet::new();
    let mut route_stops = Vec::new();
    for line in route_lines {
        for stop_id in &line.stop_ids {
            let Some(&on_route) = stops.get(stop_id) else {
                continue;
            };
            // Children only ever appear through their parent station.
            let map_stop = match &on_route.stop.parent_station_id {
                Some(parent_id) => match stops.get(parent_id) {
                    Some(&parent) => parent,
                    None => continue,
                },
                None => on_route,
            };
            if touched.contains(&map_stop.stop.id) || map_stop.route_types.is_empty() {
                continue;
            }

            let position = nearest_point_on_line(&line.line, map_stop.stop.position)
                .map_or(map_stop.stop.position, |nearest| nearest.coord);
            touched.insert(map_stop.stop.id.clone());
            route_stops.push(stop_feature(map_stop, position, selection));
        }
    }

    let mut features: Vec<Feature> = stops
        .values()
        .filter(|map_stop| {
            !touched.contains(&map_stop.stop.id)
                && !map_stop.route_types.is_empty()
                && !map_stop.stop.is_child()
        })
        .map(|map_stop| stop_feature(map_stop, map_stop.stop.position, selection))
        .collect();
    features.extend(route_stops);

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
