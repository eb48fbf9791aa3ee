//! Route line features: decoded shapes sliced into alert-aware segments.

use std::collections::{HashMap, HashSet};

use geo::LineString;
use geojson::{Feature, FeatureCollection, Geometry};
use tracing::{debug, warn};

use ridemap_transit::{
    AlertAssociatedStop, AlertAwareRouteSegment, MapStopRoute, Route, RouteId, RoutePatternId,
    RouteSegment, RouteWithSegmentedShapes, SegmentAlertState, SegmentedRouteShape,
    ShapeWithStops, Stop, StopDetailsFilter, StopId, line_slice, resolve_parent_id,
};

use crate::map::colors;
use crate::map::polyline;
use crate::map::style::properties::{FeaturePropertiesBuilder, keys};

pub const ROUTE_SOURCE_ID: &str = "route-source";

/// Stop details filter route id that stands for every Green Line branch.
pub const GREEN_LINE_FILTER_ID: &str = "line-Green";

pub fn route_source_id(route_id: &RouteId) -> String {
    format!("{ROUTE_SOURCE_ID}-{route_id}")
}

/// Sort key for routes without a configured sort order; below every real one.
pub const MISSING_SORT_KEY: i64 = i32::MIN as i64 - 1;

/// `-sort_order`, so routes configured with lower numbers draw on top.
pub fn route_sort_key(route: Option<&Route>) -> i64 {
    route
        .and_then(|route| route.sort_order)
        .map_or(MISSING_SORT_KEY, |sort_order| -i64::from(sort_order))
}

/// One drawable stretch of a route pattern between two stops.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteLineData {
    pub id: String,
    pub route_id: RouteId,
    pub route: Option<Route>,
    pub route_pattern_id: RoutePatternId,
    pub line: LineString,
    pub stop_ids: Vec<StopId>,
    pub alert_state: SegmentAlertState,
}

impl RouteLineData {
    pub fn sort_key(&self) -> i64 {
        route_sort_key(self.route.as_ref())
    }

    pub fn to_feature(&self) -> Feature {
        let mut properties = FeaturePropertiesBuilder::new();
        properties
            .put(keys::ROUTE_ID, self.route_id.to_string())
            .put(keys::ROUTE_SORT_KEY, self.sort_key() as f64)
            .put(keys::ALERT_STATE, self.alert_state.name().to_string());
        if let Some(route) = &self.route {
            properties
                .put(keys::ROUTE_TYPE, route.route_type.name().to_string())
                .put(keys::ROUTE_COLOR, route_color_hex(route));
        }

        let coords = self.line.coords().map(|c| vec![c.x, c.y]).collect();
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::LineString(coords))),
            id: Some(geojson::feature::Id::String(self.id.clone())),
            properties: Some(properties.build().into_object()),
            foreign_members: None,
        }
    }
}

/// `#RRGGBB`; colors that do not parse are passed through with a `#`.
fn route_color_hex(route: &Route) -> String {
    match colors::parse_hex(&route.color) {
        Ok(color) => colors::to_hex(color),
        Err(err) => {
            warn!("route {}: {err}", route.id);
            format!("#{}", route.color.trim_start_matches('#'))
        }
    }
}

/// Lines and features of a single route, drawn from `route-source-{route}`.
#[derive(Clone, Debug)]
pub struct RouteSourceData {
    pub route_id: RouteId,
    pub lines: Vec<RouteLineData>,
    pub features: FeatureCollection,
}

impl RouteSourceData {
    pub fn source_id(&self) -> String {
        route_source_id(&self.route_id)
    }
}

/// Decode every shape, split its segments by alert state and slice the
/// shape between each segment's end stops. Unusable shapes and segments are
/// left out.
pub fn generate_route_lines(
    route_shapes: &[SegmentedRouteShape],
    routes_by_id: &HashMap<RouteId, Route>,
    stops_by_id: &HashMap<StopId, Stop>,
    alerts_by_stop: &HashMap<StopId, AlertAssociatedStop>,
) -> Vec<RouteLineData> {
    route_shapes
        .iter()
        .flat_map(|shape| route_shape_to_lines(shape, routes_by_id, stops_by_id, alerts_by_stop))
        .collect()
}

fn route_shape_to_lines(
    route_shape: &SegmentedRouteShape,
    routes_by_id: &HashMap<RouteId, Route>,
    stops_by_id: &HashMap<StopId, Stop>,
    alerts_by_stop: &HashMap<StopId, AlertAssociatedStop>,
) -> Vec<RouteLineData> {
    let shape_id = &route_shape.shape.id;
    let Some(encoded) = route_shape.shape.polyline.as_deref() else {
        debug!("shape {shape_id} has no polyline");
        return Vec::new();
    };
    let full_line = match polyline::decode(encoded) {
        Ok(line) => line,
        Err(err) => {
            warn!("dropping shape {shape_id}: {err}");
            return Vec::new();
        }
    };
    let full_line = &full_line;

    route_shape
        .route_segments
        .iter()
        .flat_map(|segment| {
            let route = routes_by_id.get(&segment.source_route_id);
            if route.is_none() {
                debug!(
                    "segment {} references unknown route {}",
                    segment.id, segment.source_route_id
                );
            }
            let category = route.and_then(MapStopRoute::for_route);
            segment
                .split_alerting_segments(alerts_by_stop, category)
                .into_iter()
                .filter_map(move |segment| {
                    segment_to_line(segment, route, full_line, stops_by_id)
                })
        })
        .collect()
}

fn segment_to_line(
    segment: AlertAwareRouteSegment,
    route: Option<&Route>,
    full_line: &LineString,
    stops_by_id: &HashMap<StopId, Stop>,
) -> Option<RouteLineData> {
    let first = segment.stop_ids.first().and_then(|id| stops_by_id.get(id));
    let last = segment.stop_ids.last().and_then(|id| stops_by_id.get(id));
    let (Some(first), Some(last)) = (first, last) else {
        debug!("segment {} has an unknown end stop", segment.id);
        return None;
    };

    let line = line_slice(full_line, first.position, last.position)?;
    if line.0.len() < 2 {
        debug!("segment {} covers a single point of its shape", segment.id);
        return None;
    }
    Some(RouteLineData {
        id: segment.id,
        route_id: segment.source_route_id,
        route: route.cloned(),
        route_pattern_id: segment.source_route_pattern_id,
        line,
        stop_ids: segment.stop_ids,
        alert_state: segment.alert_state,
    })
}

pub fn generate_route_source(
    route_id: RouteId,
    route_shapes: &[SegmentedRouteShape],
    routes_by_id: &HashMap<RouteId, Route>,
    stops_by_id: &HashMap<StopId, Stop>,
    alerts_by_stop: &HashMap<StopId, AlertAssociatedStop>,
) -> RouteSourceData {
    let lines = generate_route_lines(route_shapes, routes_by_id, stops_by_id, alerts_by_stop);
    let features = FeatureCollection {
        bbox: None,
        features: lines.iter().map(RouteLineData::to_feature).collect(),
        foreign_members: None,
    };
    RouteSourceData {
        route_id,
        lines,
        features,
    }
}

/// One source per route, in input order.
pub fn generate_route_sources(
    route_data: &[RouteWithSegmentedShapes],
    routes_by_id: &HashMap<RouteId, Route>,
    stops_by_id: &HashMap<StopId, Stop>,
    alerts_by_stop: &HashMap<StopId, AlertAssociatedStop>,
) -> Vec<RouteSourceData> {
    route_data
        .iter()
        .map(|route| {
            generate_route_source(
                route.route_id.clone(),
                &route.segmented_shapes,
                routes_by_id,
                stops_by_id,
                alerts_by_stop,
            )
        })
        .collect()
}

/// Turn plain pattern shapes into single-segment shapes. Stop ids are
/// resolved to their parent stations; shapes that are missing are skipped.
pub fn shapes_with_stops_to_map_friendly(
    shapes_with_stops: &[ShapeWithStops],
    stops_by_id: Option<&HashMap<StopId, Stop>>,
) -> Vec<RouteWithSegmentedShapes> {
    shapes_with_stops
        .iter()
        .filter_map(|shape_with_stops| shape_with_stops_to_map_friendly(shape_with_stops, stops_by_id))
        .collect()
}

pub fn shape_with_stops_to_map_friendly(
    shape_with_stops: &ShapeWithStops,
    stops_by_id: Option<&HashMap<StopId, Stop>>,
) -> Option<RouteWithSegmentedShapes> {
    let shape = shape_with_stops.shape.as_ref()?;
    let stop_ids = shape_with_stops
        .stop_ids
        .iter()
        .map(|stop_id| match stops_by_id {
            Some(stops) => resolve_parent_id(stops, stop_id),
            None => stop_id.clone(),
        })
        .collect();

    let segment = RouteSegment::new(
        shape.id.as_str(),
        shape_with_stops.route_pattern_id.clone(),
        shape_with_stops.route_id.clone(),
        stop_ids,
    );
    Some(RouteWithSegmentedShapes {
        route_id: shape_with_stops.route_id.clone(),
        segmented_shapes: vec![SegmentedRouteShape {
            source_route_pattern_id: shape_with_stops.route_pattern_id.clone(),
            source_route_id: shape_with_stops.route_id.clone(),
            direction_id: shape_with_stops.direction_id,
            route_segments: vec![segment],
            shape: shape.clone(),
        }],
    })
}

/// Rail shapes for the rail routes that serve a stop.
pub fn for_rail_at_stop(
    stop_shapes: &[RouteWithSegmentedShapes],
    rail_shapes: &[RouteWithSegmentedShapes],
    routes_by_id: Option<&HashMap<RouteId, Route>>,
) -> Vec<RouteWithSegmentedShapes> {
    let stop_rail_route_ids: HashSet<&RouteId> = stop_shapes
        .iter()
        .filter(|shapes| {
            routes_by_id
                .and_then(|routes| routes.get(&shapes.route_id))
                .is_some_and(|route| route.route_type.is_rail())
        })
        .map(|shapes| &shapes.route_id)
        .collect();

    rail_shapes
        .iter()
        .filter(|shapes| stop_rail_route_ids.contains(&shapes.route_id))
        .cloned()
        .collect()
}

/// Shapes to draw while a route and direction are selected on a stop page.
///
/// `line-Green` selects every Green Line branch. When `route_pattern_ids` is
/// given, only those patterns are kept. If no route matches, a single empty
/// entry for the filter's route is returned so its source still exists.
pub fn filtered_route_shapes_for_stop(
    route_shapes: &[RouteWithSegmentedShapes],
    filter: &StopDetailsFilter,
    route_pattern_ids: Option<&HashSet<RoutePatternId>>,
) -> Vec<RouteWithSegmentedShapes> {
    let matches_filter = |route_id: &RouteId| {
        if filter.route_id.as_str() == GREEN_LINE_FILTER_ID {
            MapStopRoute::Green
                .branching_routes()
                .contains(&route_id.as_str())
        } else {
            *route_id == filter.route_id
        }
    };

    let filtered: Vec<_> = route_shapes
        .iter()
        .filter(|shapes| matches_filter(&shapes.route_id))
        .map(|shapes| RouteWithSegmentedShapes {
            route_id: shapes.route_id.clone(),
            segmented_shapes: shapes
                .segmented_shapes
                .iter()
                .filter(|shape| {
                    shape.direction_id == filter.direction_id
                        && route_pattern_ids
                            .is_none_or(|ids| ids.contains(&shape.source_route_pattern_id))
                })
                .cloned()
                .collect(),
        })
        .collect();

    if filtered.is_empty() {
        return vec![RouteWithSegmentedShapes {
            route_id: filter.route_id.clone(),
            segmented_shapes: Vec::new(),
        }];
    }
    filtered
}
