//! Expressions shared by the stop icon, alert icon and stop layer builders.
//!
//! Everything here reads the stop feature properties written by
//! [`crate::map::stop_features`], so the key names in
//! [`keys`](crate::map::style::properties::keys) are the only contract
//! between the two.

use ridemap_transit::MapStopRoute;

use crate::map::defaults::MapDefaults;
use crate::map::stop_layers::StopLayerState;
use crate::map::style::exp::{
    self, Exp, Interpolation, LetVariable, Offset, lit_bool, lit_num, lit_str, xy,
};
use crate::map::style::properties::keys;

/// Which of the two icon sets a stop is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoomBucket {
    /// Below [`MapDefaults::CLOSE_ZOOM_THRESHOLD`]
    Wide,
    Close,
}

impl ZoomBucket {
    pub const ALL: [ZoomBucket; 2] = [ZoomBucket::Close, ZoomBucket::Wide];

    /// Icon name infix, `close-` or `wide-`.
    pub fn prefix(self) -> &'static str {
        match self {
            ZoomBucket::Wide => "wide-",
            ZoomBucket::Close => "close-",
        }
    }

    pub fn offsets(self) -> &'static OffsetTable {
        match self {
            ZoomBucket::Wide => &OffsetTable::WIDE,
            ZoomBucket::Close => &OffsetTable::CLOSE,
        }
    }
}

/// Hand tuned pixel sizes of the stop icons in one zoom bucket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OffsetTable {
    /// Vertical distance of each icon from the center in a two route stack
    pub double_route_height: f64,
    pub triple_route_height: f64,

    pub rail_stop_width: f64,
    pub bus_stop_width: f64,
    /// Bus alerts sit this much higher to center on the sign, not the pole
    pub bus_height_adjust: f64,
    pub terminal_rail_stop_width: f64,
    pub terminal_ferry_width: f64,
    pub branch_terminal_width: f64,
    pub branch_stop_width: f64,

    pub pin_single_route: f64,
    pub pin_double_route: f64,
    pub pin_triple_route: f64,
    /// Extra pin lift over wide terminal pills
    pub pin_terminal_adjust: f64,
    pub pin_bus_adjust: f64,
}

const PILL_WIDTH: f64 = 26.0;
const BRANCH_PILL_WIDTH: f64 = 35.0;

impl OffsetTable {
    pub const WIDE: OffsetTable = OffsetTable {
        double_route_height: 8.0,
        triple_route_height: 16.0,
        rail_stop_width: 12.0,
        bus_stop_width: 12.0,
        bus_height_adjust: 0.0,
        terminal_rail_stop_width: 20.0,
        terminal_ferry_width: 15.0,
        branch_terminal_width: 26.0,
        branch_stop_width: 13.0,
        pin_single_route: 33.0,
        pin_double_route: 42.0,
        pin_triple_route: 50.0,
        pin_terminal_adjust: 2.0,
        pin_bus_adjust: 0.0,
    };

    pub const CLOSE: OffsetTable = OffsetTable {
        double_route_height: 13.0,
        triple_route_height: 26.0,
        rail_stop_width: PILL_WIDTH,
        bus_stop_width: 18.0,
        bus_height_adjust: 2.0,
        terminal_rail_stop_width: PILL_WIDTH,
        terminal_ferry_width: PILL_WIDTH,
        branch_terminal_width: BRANCH_PILL_WIDTH,
        branch_stop_width: BRANCH_PILL_WIDTH,
        pin_single_route: 38.0,
        pin_double_route: 52.0,
        pin_triple_route: 65.0,
        pin_terminal_adjust: 0.0,
        pin_bus_adjust: 2.0,
    };

    /// Vertical position of icon `index` in a stack of `count` icons.
    pub fn stack_height(&self, count: usize, index: usize) -> f64 {
        match (count, index) {
            (2, 0) => -self.double_route_height,
            (2, 1) => self.double_route_height,
            (3, 0) => -self.triple_route_height,
            (3, 2) => self.triple_route_height,
            _ => 0.0,
        }
    }
}

fn category(route: MapStopRoute) -> Exp<String> {
    lit_str(route.name())
}

/// `MapStopRoute` names served by the stop.
pub fn routes_exp() -> Exp<Vec<String>> {
    exp::get(keys::MAP_ROUTES)
}

fn route_count_exp() -> Exp<f64> {
    exp::length(routes_exp())
}

/// The stop serves exactly one route category.
pub fn single_route_type_exp() -> Exp<bool> {
    exp::eq(lit_num(1.0), route_count_exp())
}

/// First served category, or `""` when there is none.
pub fn top_route_exp() -> Exp<String> {
    exp::string(exp::case(
        vec![(exp::eq(route_count_exp(), lit_num(0.0)), lit_str(""))],
        exp::at(0, routes_exp()),
    ))
}

fn top_route_is(route: MapStopRoute) -> Exp<bool> {
    exp::eq(top_route_exp(), category(route))
}

/// One category and a single route id within it.
pub fn single_route_exp() -> Exp<bool> {
    let top_route_ids: Exp<Vec<String>> = exp::get_in(top_route_exp(), exp::get(keys::ROUTE_IDS));
    exp::all(vec![
        single_route_type_exp(),
        exp::eq(lit_num(1.0), exp::length(top_route_ids)),
    ])
}

/// The stop sits on a single branch of a branching category.
pub fn branched_route_exp() -> Exp<bool> {
    exp::all(vec![
        exp::any(vec![
            top_route_is(MapStopRoute::Green),
            top_route_is(MapStopRoute::Silver),
        ]),
        single_route_exp(),
    ])
}

pub fn route_at(index: usize) -> Exp<String> {
    exp::string(exp::at(index, routes_exp()))
}

pub fn selected_exp(state: &StopLayerState) -> Exp<bool> {
    match &state.selected_stop_id {
        Some(stop_id) => exp::eq(exp::get(keys::ID), lit_str(stop_id.as_str())),
        None => lit_bool(false),
    }
}

pub fn is_bus_exp() -> Exp<bool> {
    exp::all(vec![single_route_type_exp(), top_route_is(MapStopRoute::Bus)])
}

/// Multiplier for the top category, from `[bus, commuter rail, other]`.
pub fn mode_size_multiplier_exp(resize_with: [f64; 3]) -> Exp<f64> {
    exp::case(
        vec![
            (top_route_is(MapStopRoute::Bus), lit_num(resize_with[0])),
            (top_route_is(MapStopRoute::Commuter), lit_num(resize_with[1])),
        ],
        lit_num(resize_with[2]),
    )
}

pub fn with_multipliers(base: f64, mode_resize: [f64; 3], state: &StopLayerState) -> Exp<f64> {
    exp::product(vec![
        lit_num(base),
        mode_size_multiplier_exp(mode_resize),
        exp::case(vec![(selected_exp(state), lit_num(1.25))], lit_num(1.0)),
    ])
}

/// Icon size by zoom, scaled by mode and selection.
pub fn selected_size_exp(state: &StopLayerState) -> Exp<f64> {
    exp::interpolate(
        Interpolation::Exponential(1.5),
        exp::zoom(),
        vec![
            (
                MapDefaults::MID_ZOOM_THRESHOLD,
                with_multipliers(0.25, [0.5, 2.0, 1.75], state),
            ),
            (13.0, with_multipliers(0.625, [1.0, 1.5, 1.5], state)),
            (14.0, with_multipliers(1.0, [1.0, 1.0, 1.0], state)),
        ],
    )
}

/// Offset of alert icon `index`. Every branch ends in a literal pair.
pub fn offset_alert_exp(bucket: ZoomBucket, index: usize) -> Exp<Offset> {
    let table = bucket.offsets();
    exp::step(
        route_count_exp(),
        offset_alert_pair_exp(bucket, 0.0),
        vec![
            (
                2.0,
                if index < 2 {
                    offset_alert_pair_exp(bucket, table.stack_height(2, index))
                } else {
                    xy(0.0, 0.0)
                },
            ),
            (3.0, offset_alert_pair_exp(bucket, table.stack_height(3, index))),
        ],
    )
}

/// Horizontal alert offset for the icon shape the stop is drawn with.
pub fn offset_alert_pair_exp(bucket: ZoomBucket, height: f64) -> Exp<Offset> {
    let table = bucket.offsets();
    exp::step(
        route_count_exp(),
        exp::case(
            vec![
                (
                    branched_route_exp(),
                    exp::case(
                        vec![(
                            exp::get(keys::IS_TERMINAL),
                            xy(table.branch_terminal_width, height),
                        )],
                        xy(table.branch_stop_width, height),
                    ),
                ),
                (
                    exp::all(vec![
                        top_route_is(MapStopRoute::Ferry),
                        exp::get(keys::IS_TERMINAL),
                    ]),
                    xy(table.terminal_ferry_width, height),
                ),
                (
                    top_route_is(MapStopRoute::Bus),
                    xy(table.bus_stop_width, height - table.bus_height_adjust),
                ),
                (
                    exp::get(keys::IS_TERMINAL),
                    xy(table.terminal_rail_stop_width, height),
                ),
            ],
            xy(table.rail_stop_width, height),
        ),
        vec![(2.0, xy(table.rail_stop_width, height))],
    )
}

pub fn offset_transfer_exp(bucket: ZoomBucket, index: usize) -> Exp<Offset> {
    let table = bucket.offsets();
    exp::step(
        route_count_exp(),
        xy(0.0, 0.0),
        vec![
            (2.0, xy(0.0, table.stack_height(2, index))),
            (3.0, xy(0.0, table.stack_height(3, index))),
        ],
    )
}

pub fn offset_pin_exp(bucket: ZoomBucket) -> Exp<Offset> {
    let table = bucket.offsets();
    let single = -table.pin_single_route;
    exp::step(
        route_count_exp(),
        exp::case(
            vec![
                (
                    exp::all(vec![
                        top_route_is(MapStopRoute::Ferry),
                        exp::get(keys::IS_TERMINAL),
                    ]),
                    xy(0.0, single - table.pin_terminal_adjust),
                ),
                (
                    top_route_is(MapStopRoute::Bus),
                    xy(0.0, single - table.pin_bus_adjust),
                ),
                (
                    exp::get(keys::IS_TERMINAL),
                    xy(0.0, single - table.pin_terminal_adjust),
                ),
            ],
            xy(0.0, single),
        ),
        vec![
            (2.0, xy(0.0, -table.pin_double_route)),
            (3.0, xy(0.0, -table.pin_triple_route)),
        ],
    )
}

/// Wide table below close zoom, close table from it.
pub fn by_zoom_bucket<T>(build: impl Fn(ZoomBucket) -> Exp<T>) -> Exp<T> {
    exp::step(
        exp::zoom(),
        build(ZoomBucket::Wide),
        vec![(MapDefaults::CLOSE_ZOOM_THRESHOLD, build(ZoomBucket::Close))],
    )
}

/// Label offset in ems, next to whichever icon the stop uses.
pub fn label_offset_exp() -> Exp<Offset> {
    exp::interpolate(
        Interpolation::Exponential(1.5),
        exp::zoom(),
        vec![
            (
                MapDefaults::MID_ZOOM_THRESHOLD,
                exp::step(
                    route_count_exp(),
                    exp::case(
                        vec![
                            (branched_route_exp(), xy(1.15, 0.75)),
                            (exp::get(keys::IS_TERMINAL), xy(1.0, 0.75)),
                        ],
                        xy(0.75, 0.5),
                    ),
                    vec![(2.0, xy(0.5, 1.25)), (3.0, xy(0.5, 1.5))],
                ),
            ),
            (
                MapDefaults::CLOSE_ZOOM_THRESHOLD,
                exp::step(
                    route_count_exp(),
                    exp::case(vec![(branched_route_exp(), xy(2.5, 1.5))], xy(2.0, 1.5)),
                    vec![(2.0, xy(2.0, 2.0)), (3.0, xy(2.0, 2.5))],
                ),
            ),
        ],
    )
}

/// `result` on the layer that draws this stop, `""` on the other one. Bus
/// only stops are drawn by the bus layers.
pub fn bus_switch_exp(for_bus: bool, result: Exp<String>) -> Exp<String> {
    let empty = || exp::string(lit_str(""));
    let (bus, other) = if for_bus {
        (result, empty())
    } else {
        (empty(), result)
    };
    exp::case(vec![(is_bus_exp(), bus)], other)
}

/// `lhs` (read from the feature) differs from the fixed list `rhs`.
pub fn list_not_eq<T>(lhs: Exp<Vec<T>>, rhs: Vec<Exp<T>>) -> Exp<bool> {
    let lhs_var = LetVariable::<Vec<T>>::new("lhs");
    let mut clauses = vec![exp::not_eq(
        exp::length(exp::var(&lhs_var)),
        lit_num(rhs.len() as f64),
    )];
    clauses.extend(
        rhs.into_iter()
            .enumerate()
            .map(|(index, value)| exp::not_eq(exp::at(index, exp::var(&lhs_var)), value)),
    );
    exp::let_in(&lhs_var, lhs, exp::any(clauses))
}

/// Stop name label: terminals only at mid zoom, every non-bus stop at close
/// zoom, never for the selected stop (the pin carries that label).
pub fn stop_label_text_exp(for_bus: bool, state: &StopLayerState) -> Exp<String> {
    let name = || bus_switch_exp(for_bus, exp::get(keys::NAME));
    exp::step(
        exp::zoom(),
        lit_str(""),
        vec![
            (
                MapDefaults::MID_ZOOM_THRESHOLD,
                exp::case(
                    vec![
                        (selected_exp(state), lit_str("")),
                        (top_route_is(MapStopRoute::Ferry), lit_str("")),
                        (exp::get(keys::IS_TERMINAL), name()),
                    ],
                    lit_str(""),
                ),
            ),
            (
                MapDefaults::CLOSE_ZOOM_THRESHOLD,
                exp::case(
                    vec![
                        (selected_exp(state), lit_str("")),
                        (top_route_is(MapStopRoute::Bus), lit_str("")),
                    ],
                    name(),
                ),
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::style::exp::JsonObject;
    use ridemap_transit::StopId;
    use serde_json::json;

    fn props(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    fn single(route: &str, ids: &[&str], terminal: bool) -> JsonObject {
        let mut route_ids = JsonObject::new();
        route_ids.insert(route.to_string(), json!(ids));
        props(json!({
            "id": "stop",
            "name": "Stop",
            "mapRoutes": [route],
            "routeIds": route_ids,
            "isTerminal": terminal,
        }))
    }

    fn transfer(routes: &[&str]) -> JsonObject {
        props(json!({
            "id": "transfer",
            "name": "Transfer",
            "mapRoutes": routes,
            "routeIds": {},
            "isTerminal": false,
        }))
    }

    #[test]
    fn test_top_route_and_branching() {
        let empty = transfer(&[]);
        assert_eq!(top_route_exp().evaluate(&empty, 12.0).unwrap(), "");
        assert!(!branched_route_exp().evaluate(&empty, 12.0).unwrap());

        let green_b = single("GREEN", &["Green-B"], false);
        assert_eq!(top_route_exp().evaluate(&green_b, 12.0).unwrap(), "GREEN");
        assert!(branched_route_exp().evaluate(&green_b, 12.0).unwrap());

        let green_trunk = single("GREEN", &["Green-B", "Green-C"], false);
        assert!(!branched_route_exp().evaluate(&green_trunk, 12.0).unwrap());

        let red = single("RED", &["Red"], false);
        assert!(!branched_route_exp().evaluate(&red, 12.0).unwrap());
        assert!(is_bus_exp().evaluate(&single("BUS", &["1"], false), 12.0).unwrap());
    }

    #[test]
    fn test_stack_heights() {
        assert_eq!(OffsetTable::WIDE.stack_height(2, 0), -8.0);
        assert_eq!(OffsetTable::CLOSE.stack_height(2, 1), 13.0);
        assert_eq!(OffsetTable::CLOSE.stack_height(3, 1), 0.0);
        assert_eq!(OffsetTable::WIDE.stack_height(3, 2), 16.0);
        assert_eq!(OffsetTable::WIDE.stack_height(1, 0), 0.0);
    }

    #[test]
    fn test_alert_offsets() {
        let close = |p: &JsonObject, i| offset_alert_exp(ZoomBucket::Close, i).evaluate(p, 16.0).unwrap();
        let wide = |p: &JsonObject, i| offset_alert_exp(ZoomBucket::Wide, i).evaluate(p, 12.0).unwrap();

        assert_eq!(close(&single("RED", &["Red"], false), 0), vec![26.0, 0.0]);
        assert_eq!(wide(&single("RED", &["Red"], false), 0), vec![12.0, 0.0]);
        assert_eq!(wide(&single("RED", &["Red"], true), 0), vec![20.0, 0.0]);
        assert_eq!(wide(&single("FERRY", &["Boat-F1"], true), 0), vec![15.0, 0.0]);
        assert_eq!(close(&single("BUS", &["1"], false), 0), vec![18.0, -2.0]);
        assert_eq!(wide(&single("GREEN", &["Green-E"], true), 0), vec![26.0, 0.0]);
        assert_eq!(wide(&single("GREEN", &["Green-E"], false), 0), vec![13.0, 0.0]);

        let two = transfer(&["ORANGE", "GREEN"]);
        assert_eq!(wide(&two, 0), vec![12.0, -8.0]);
        assert_eq!(wide(&two, 1), vec![12.0, 8.0]);
        assert_eq!(wide(&two, 2), vec![0.0, 0.0]);

        let three = transfer(&["ORANGE", "GREEN", "COMMUTER"]);
        assert_eq!(close(&three, 0), vec![26.0, -26.0]);
        assert_eq!(close(&three, 1), vec![26.0, 0.0]);
        assert_eq!(close(&three, 2), vec![26.0, 26.0]);
    }

    #[test]
    fn test_transfer_and_pin_offsets() {
        let three = transfer(&["ORANGE", "GREEN", "COMMUTER"]);
        assert_eq!(
            offset_transfer_exp(ZoomBucket::Wide, 0).evaluate(&three, 12.0).unwrap(),
            vec![0.0, -16.0]
        );
        assert_eq!(
            offset_pin_exp(ZoomBucket::Close).evaluate(&three, 16.0).unwrap(),
            vec![0.0, -65.0]
        );

        let red_terminal = single("RED", &["Red"], true);
        assert_eq!(
            offset_pin_exp(ZoomBucket::Wide).evaluate(&red_terminal, 12.0).unwrap(),
            vec![0.0, -35.0]
        );
        let bus = single("BUS", &["1"], false);
        assert_eq!(
            offset_pin_exp(ZoomBucket::Close).evaluate(&bus, 16.0).unwrap(),
            vec![0.0, -40.0]
        );

        let pin = by_zoom_bucket(offset_pin_exp);
        assert_eq!(pin.evaluate(&bus, 12.0).unwrap(), vec![0.0, -33.0]);
        assert_eq!(pin.evaluate(&bus, 15.0).unwrap(), vec![0.0, -40.0]);
    }

    #[test]
    fn test_sizes_follow_mode_and_selection() {
        let bus = single("BUS", &["1"], false);
        let unselected = StopLayerState::default();
        let selected = StopLayerState {
            selected_stop_id: Some(StopId::new("stop")),
            stop_filter: None,
        };

        let size = selected_size_exp(&unselected);
        assert_eq!(size.evaluate(&bus, 11.0).unwrap(), 0.125);
        assert_eq!(size.evaluate(&bus, 20.0).unwrap(), 1.0);
        assert_eq!(selected_size_exp(&selected).evaluate(&bus, 20.0).unwrap(), 1.25);

        let commuter = single("COMMUTER", &["CR-Lowell"], false);
        assert_eq!(size.evaluate(&commuter, 11.0).unwrap(), 0.5);
    }

    #[test]
    fn test_bus_switch() {
        let bus = single("BUS", &["1"], false);
        let red = single("RED", &["Red"], false);
        let name = || exp::get(keys::NAME);

        assert_eq!(bus_switch_exp(true, name()).evaluate(&bus, 12.0).unwrap(), "Stop");
        assert_eq!(bus_switch_exp(false, name()).evaluate(&bus, 12.0).unwrap(), "");
        assert_eq!(bus_switch_exp(true, name()).evaluate(&red, 12.0).unwrap(), "");
        assert_eq!(bus_switch_exp(false, name()).evaluate(&red, 12.0).unwrap(), "Stop");
    }

    #[test]
    fn test_list_not_eq() {
        let only_bus = || list_not_eq(routes_exp(), vec![category(MapStopRoute::Bus)]);
        assert!(!only_bus().evaluate(&single("BUS", &["1"], false), 12.0).unwrap());
        assert!(only_bus().evaluate(&single("RED", &["Red"], false), 12.0).unwrap());
        assert!(only_bus().evaluate(&transfer(&["BUS", "RED"]), 12.0).unwrap());
        assert!(only_bus().evaluate(&transfer(&[]), 12.0).unwrap());
    }

    #[test]
    fn test_stop_label_text() {
        let state = StopLayerState::default();
        let terminal = single("RED", &["Red"], true);
        let plain = single("RED", &["Red"], false);
        let ferry = single("FERRY", &["Boat-F1"], true);
        let label = |p: &JsonObject, zoom| stop_label_text_exp(false, &state).evaluate(p, zoom).unwrap();

        assert_eq!(label(&terminal, 11.0), "");
        assert_eq!(label(&terminal, 12.0), "Stop");
        assert_eq!(label(&plain, 12.0), "");
        assert_eq!(label(&ferry, 12.0), "");
        assert_eq!(label(&plain, 15.0), "Stop");
        assert_eq!(label(&ferry, 15.0), "Stop");

        let selected = StopLayerState {
            selected_stop_id: Some(StopId::new("stop")),
            stop_filter: None,
        };
        assert_eq!(
            stop_label_text_exp(false, &selected).evaluate(&plain, 15.0).unwrap(),
            ""
        );
    }

    #[test]
    fn test_label_offset() {
        let plain = single("RED", &["Red"], false);
        assert_eq!(label_offset_exp().evaluate(&plain, 11.0).unwrap(), vec![0.75, 0.5]);
        assert_eq!(label_offset_exp().evaluate(&plain, 16.0).unwrap(), vec![2.0, 1.5]);
    }
}
