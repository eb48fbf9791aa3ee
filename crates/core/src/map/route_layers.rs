//! Line layers drawing the per-route sources.

use std::collections::HashMap;

use ridemap_transit::{Route, RouteId, RouteType, RouteWithSegmentedShapes, SegmentAlertState};
use tokio::task::JoinError;

use crate::map::colors::ColorPalette;
use crate::map::defaults::MapDefaults;
use crate::map::route_features::{route_sort_key, route_source_id};
use crate::map::style::exp::{self, Exp, lit_num, lit_str, lit_strings};
use crate::map::style::layer::{LineJoin, LineLayer};
use crate::map::style::properties::keys;

pub const ROUTE_LAYER_ID: &str = "route-layer";

const GREEN_OVERLAPPING_CR: &[&str] = &["CR-Lowell", "CR-Fitchburg"];
const RED_OVERLAPPING_CR: &[&str] = &[
    "CR-Greenbush",
    "CR-Kingston",
    "CR-Middleborough",
    "CR-NewBedford",
];

pub fn route_layer_id(route_id: &RouteId) -> String {
    format!("{ROUTE_LAYER_ID}-{route_id}")
}

pub fn route_layer_id_with_suffix(route_id: &RouteId, suffix: &str) -> String {
    format!("{ROUTE_LAYER_ID}-{route_id}-{suffix}")
}

fn width_by_zoom(wide: f64, close: f64) -> Exp<f64> {
    exp::step(
        exp::zoom(),
        lit_num(wide),
        vec![(MapDefaults::CLOSE_ZOOM_THRESHOLD, lit_num(close))],
    )
}

/// Fixed offsets that keep overlapping rail lines apart. Green Line is
/// pushed east through North Station, the commuter lines sharing its
/// corridor stay put, those sharing the Red Line corridor go west and the
/// rest go east.
fn line_offset(route: &Route) -> f64 {
    let id = route.id.as_str();
    if route.route_type == RouteType::CommuterRail {
        if GREEN_OVERLAPPING_CR.contains(&id) {
            0.0
        } else if RED_OVERLAPPING_CR.contains(&id) {
            MapDefaults::MAX_LINE_WIDTH * 1.5
        } else {
            -MapDefaults::MAX_LINE_WIDTH
        }
    } else if id.contains("Green") {
        MapDefaults::MAX_LINE_WIDTH
    } else {
        0.0
    }
}

pub fn base_route_layer(layer_id: String, route: &Route) -> LineLayer {
    let mut layer = LineLayer::new(layer_id, route_source_id(&route.id));
    layer.line_color = Some(exp::color(format!("#{}", route.color)));
    layer.line_join = Some(LineJoin::Round);
    layer.line_offset = Some(lit_num(line_offset(route)));
    layer
}

pub fn create_route_layer(route: &Route) -> LineLayer {
    let mut layer = base_route_layer(route_layer_id(&route.id), route);
    layer.line_width = Some(width_by_zoom(3.0, 4.0));
    layer
}

fn alert_state_is(state: SegmentAlertState) -> Exp<bool> {
    exp::eq(exp::get(keys::ALERT_STATE), lit_str(state.name()))
}

/// Background, shuttle and suspension layers for the disrupted parts of a
/// route. Dash patterns can't be data driven, hence one layer per state.
pub fn create_alerting_route_layers(route: &Route, palette: &ColorPalette) -> Vec<LineLayer> {
    let mut shuttled = base_route_layer(route_layer_id_with_suffix(&route.id, "shuttled"), route);
    shuttled.filter = Some(alert_state_is(SegmentAlertState::Shuttle));
    shuttled.line_width = Some(width_by_zoom(4.0, 6.0));
    shuttled.line_dasharray = Some(vec![2.0, 1.33]);

    let mut suspended = base_route_layer(route_layer_id_with_suffix(&route.id, "suspended"), route);
    suspended.filter = Some(alert_state_is(SegmentAlertState::Suspension));
    suspended.line_width = Some(width_by_zoom(4.0, 6.0));
    suspended.line_dasharray = Some(vec![1.33, 2.0]);
    suspended.line_color = Some(palette.deemphasized_exp());

    let mut background =
        base_route_layer(route_layer_id_with_suffix(&route.id, "alerting-bg"), route);
    background.filter = Some(exp::is_in(
        exp::get(keys::ALERT_STATE),
        lit_strings(&[
            SegmentAlertState::Suspension.name(),
            SegmentAlertState::Shuttle.name(),
        ]),
    ));
    background.line_width = Some(width_by_zoom(8.0, 10.0));
    background.line_color = Some(palette.fill3_exp());

    vec![background, shuttled, suspended]
}

/// Base layers for every known route, lowest priority first, followed by
/// all alert layers so no route line covers a disruption.
pub fn create_all_route_layers_sync(
    routes_with_shapes: &[RouteWithSegmentedShapes],
    routes_by_id: &HashMap<RouteId, Route>,
    palette: &ColorPalette,
) -> Vec<LineLayer> {
    let mut routes: Vec<&Route> = routes_with_shapes
        .iter()
        .filter_map(|shapes| routes_by_id.get(&shapes.route_id))
        .collect();
    routes.sort_by_key(|route| route_sort_key(Some(route)));

    let mut layers: Vec<LineLayer> = routes.iter().map(|route| create_route_layer(route)).collect();
    layers.extend(
        routes
            .iter()
            .flat_map(|route| create_alerting_route_layers(route, palette)),
    );
    layers
}

/// [`create_all_route_layers_sync`] on the blocking pool.
pub async fn create_all_route_layers(
    routes_with_shapes: Vec<RouteWithSegmentedShapes>,
    routes_by_id: HashMap<RouteId, Route>,
    palette: ColorPalette,
) -> Result<Vec<LineLayer>, JoinError> {
    tokio::task::spawn_blocking(move || {
        create_all_route_layers_sync(&routes_with_shapes, &routes_by_id, &palette)
    })
    .await
    .inspect_err(|err| tracing::warn!("route layer generation task failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::style::exp::JsonObject;
    use serde_json::json;

    fn routes() -> HashMap<RouteId, Route> {
        [
            Route::new("Red", RouteType::HeavyRail, "DA291C").with_sort_order(10010),
            Route::new("Green-B", RouteType::LightRail, "00843D").with_sort_order(10032),
            Route::new("CR-Lowell", RouteType::CommuterRail, "80276C").with_sort_order(20009),
            Route::new("CR-Kingston", RouteType::CommuterRail, "80276C").with_sort_order(20011),
            Route::new("CR-Providence", RouteType::CommuterRail, "80276C").with_sort_order(20012),
        ]
        .into_iter()
        .map(|route| (route.id.clone(), route))
        .collect()
    }

    fn shapes(ids: &[&str]) -> Vec<RouteWithSegmentedShapes> {
        ids.iter()
            .map(|id| RouteWithSegmentedShapes {
                route_id: RouteId::new(*id),
                segmented_shapes: vec![],
            })
            .collect()
    }

    fn segment(state: &str) -> JsonObject {
        json!({ "alertState": state }).as_object().cloned().unwrap()
    }

    #[test]
    fn test_route_layer() {
        let routes = routes();
        let layer = create_route_layer(&routes[&RouteId::new("Red")]);
        assert_eq!(
            layer.to_json(),
            json!({
                "id": "route-layer-Red",
                "type": "line",
                "source": "route-source-Red",
                "layout": { "line-join": "round" },
                "paint": {
                    "line-color": "#DA291C",
                    "line-offset": 0.0,
                    "line-width": ["step", ["zoom"], 3.0, 15.0, 4.0]
                }
            })
        );
    }

    #[test]
    fn test_line_offsets() {
        let routes = routes();
        let offset = |id: &str| line_offset(&routes[&RouteId::new(id)]);
        assert_eq!(offset("Red"), 0.0);
        assert_eq!(offset("Green-B"), 6.0);
        assert_eq!(offset("CR-Lowell"), 0.0);
        assert_eq!(offset("CR-Kingston"), 9.0);
        assert_eq!(offset("CR-Providence"), -6.0);
    }

    #[test]
    fn test_alerting_layers() {
        let routes = routes();
        let palette = ColorPalette::default();
        let layers = create_alerting_route_layers(&routes[&RouteId::new("Red")], &palette);
        let ids: Vec<&str> = layers.iter().map(|layer| layer.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "route-layer-Red-alerting-bg",
                "route-layer-Red-shuttled",
                "route-layer-Red-suspended"
            ]
        );

        let [background, shuttled, suspended] = &layers[..] else {
            panic!("expected three alert layers");
        };
        let matches = |layer: &LineLayer, state: &str| {
            layer
                .filter
                .as_ref()
                .unwrap()
                .evaluate(&segment(state), 12.0)
                .unwrap()
        };
        assert!(matches(background, "Shuttle"));
        assert!(matches(background, "Suspension"));
        assert!(!matches(background, "Normal"));
        assert!(matches(shuttled, "Shuttle"));
        assert!(!matches(shuttled, "Suspension"));
        assert!(matches(suspended, "Suspension"));

        assert_eq!(shuttled.line_dasharray, Some(vec![2.0, 1.33]));
        assert_eq!(suspended.line_dasharray, Some(vec![1.33, 2.0]));
        assert_eq!(suspended.line_color, Some(palette.deemphasized_exp()));
        assert_eq!(background.line_color, Some(palette.fill3_exp()));
        assert_eq!(
            background.line_width.as_ref().unwrap().evaluate(&segment("Shuttle"), 16.0),
            Ok(10.0)
        );
    }

    #[test]
    fn test_all_route_layers_sorted_with_alerts_on_top() {
        let layers = create_all_route_layers_sync(
            &shapes(&["Red", "Unknown", "CR-Lowell", "Green-B"]),
            &routes(),
            &ColorPalette::default(),
        );
        let ids: Vec<&str> = layers.iter().map(|layer| layer.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "route-layer-CR-Lowell",
                "route-layer-Green-B",
                "route-layer-Red",
                "route-layer-CR-Lowell-alerting-bg",
                "route-layer-CR-Lowell-shuttled",
                "route-layer-CR-Lowell-suspended",
                "route-layer-Green-B-alerting-bg",
                "route-layer-Green-B-shuttled",
                "route-layer-Green-B-suspended",
                "route-layer-Red-alerting-bg",
                "route-layer-Red-shuttled",
                "route-layer-Red-suspended",
            ]
        );
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let shapes = shapes(&["Red", "Green-B"]);
        let palette = ColorPalette::dark();
        let expected = create_all_route_layers_sync(&shapes, &routes(), &palette);
        assert_eq!(create_all_route_layers(shapes, routes(), palette).await.unwrap(), expected);
    }
}
