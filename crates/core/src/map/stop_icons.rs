//! Stop icon names.
//!
//! Icons are named `map-stop-{zoom}-{CATEGORY}` with optional terminal and
//! branch suffixes. Stops serving two or three categories get a container
//! icon and the transfer layers draw one category icon per slot.

use strum::IntoEnumIterator;

use ridemap_transit::MapStopRoute;

use crate::map::map_exp::{self, ZoomBucket};
use crate::map::style::exp::{self, Exp, ResolvedImage, lit_bool, lit_num, lit_str};
use crate::map::style::properties::keys;

pub const STOP_ICON_PREFIX: &str = "map-stop-";
pub const STOP_CONTAINER_PREFIX: &str = "map-stop-container-";
pub const STOP_TRANSFER_SUFFIX: &str = "-transfer";
pub const STOP_TERMINAL_SUFFIX: &str = "-terminal";

/// A single transparent pixel; only used to pad the tap target.
pub const STOP_DUMMY_ICON: &str = "map-stop-dummy-tap-pixel";
pub const STOP_PIN_ICON: &str = "map-stop-pin";

/// `{pre}close-{post}` and `{pre}wide-{post}`.
pub fn at_zooms(pre: &str, post: &str) -> Vec<String> {
    ZoomBucket::ALL
        .iter()
        .map(|bucket| format!("{pre}{}{post}", bucket.prefix()))
        .collect()
}

fn wide(post: impl std::fmt::Display) -> String {
    format!("{STOP_ICON_PREFIX}{}{post}", ZoomBucket::Wide.prefix())
}

/// Every stop icon the layers can ask for.
pub fn all() -> Vec<String> {
    let mut icons: Vec<String> = MapStopRoute::iter()
        .flat_map(|route| at_zooms(STOP_ICON_PREFIX, route.name()))
        .collect();

    for route in MapStopRoute::iter() {
        if route.has_branching_terminals() {
            icons.extend(route.branching_routes().iter().map(|route_id| {
                wide(format_args!("{}{STOP_TERMINAL_SUFFIX}-{route_id}", route.name()))
            }));
        } else {
            icons.push(wide(format_args!("{}{STOP_TERMINAL_SUFFIX}", route.name())));
        }
    }
    icons.push(wide(format_args!(
        "{}{STOP_TERMINAL_SUFFIX}",
        MapStopRoute::Silver.name()
    )));

    for route in MapStopRoute::iter().filter(|route| route.has_branching_terminals()) {
        icons.extend(route.branching_routes().iter().map(|route_id| {
            format!(
                "{STOP_ICON_PREFIX}{}{}-{route_id}",
                ZoomBucket::Close.prefix(),
                route.name()
            )
        }));
    }

    icons.extend(at_zooms(
        STOP_ICON_PREFIX,
        &format!("{}{STOP_TRANSFER_SUFFIX}", MapStopRoute::Bus.name()),
    ));
    icons.extend(at_zooms(STOP_CONTAINER_PREFIX, "2"));
    icons.extend(at_zooms(STOP_CONTAINER_PREFIX, "3"));
    icons.push(STOP_DUMMY_ICON.to_string());
    icons.push(STOP_PIN_ICON.to_string());
    icons
}

/// `-{route id}` for a stop on a single branch, otherwise empty.
fn branching_route_suffix_exp() -> Exp<String> {
    let top_route_ids: Exp<Vec<String>> =
        exp::get_in(map_exp::top_route_exp(), exp::get(keys::ROUTE_IDS));
    exp::case(
        vec![(
            map_exp::branched_route_exp(),
            exp::concat(vec![lit_str("-"), exp::at(0, top_route_ids)]),
        )],
        lit_str(""),
    )
}

/// Icon for the category at `index`. Single category terminals get their
/// own icon at wide zoom, branch stops at close zoom.
fn route_icon_name(bucket: ZoomBucket, index: usize) -> Exp<String> {
    exp::concat(vec![
        lit_str(STOP_ICON_PREFIX),
        lit_str(bucket.prefix()),
        map_exp::route_at(index),
        exp::case(
            vec![
                (
                    exp::all(vec![
                        exp::get(keys::IS_TERMINAL),
                        map_exp::single_route_type_exp(),
                        lit_bool(bucket == ZoomBucket::Wide),
                    ]),
                    exp::concat(vec![
                        lit_str(STOP_TERMINAL_SUFFIX),
                        branching_route_suffix_exp(),
                    ]),
                ),
                (lit_bool(bucket == ZoomBucket::Close), branching_route_suffix_exp()),
            ],
            lit_str(""),
        ),
    ])
}

pub fn stop_icon_name(bucket: ZoomBucket, for_bus: bool) -> Exp<ResolvedImage> {
    let container = |count: &str| lit_str(format!("{STOP_CONTAINER_PREFIX}{}{count}", bucket.prefix()));
    map_exp::bus_switch_exp(
        for_bus,
        exp::step(
            exp::length(map_exp::routes_exp()),
            lit_str(""),
            vec![
                (1.0, route_icon_name(bucket, 0)),
                (2.0, container("2")),
                (3.0, container("3")),
            ],
        ),
    )
    .downcast()
}

pub fn stop_layer_icon(for_bus: bool) -> Exp<ResolvedImage> {
    map_exp::by_zoom_bucket(|bucket| stop_icon_name(bucket, for_bus))
}

/// Category icon for transfer slot `index`; empty for single category stops
/// and for slots past the last category.
pub fn transfer_icon_name(bucket: ZoomBucket, index: usize) -> Exp<ResolvedImage> {
    let route_count = || exp::length(map_exp::routes_exp());
    let slot_icon = exp::case(
        vec![(exp::ge(lit_num(index as f64), route_count()), lit_str(""))],
        exp::concat(vec![
            route_icon_name(bucket, index),
            exp::case(
                vec![(
                    exp::eq(map_exp::route_at(index), lit_str(MapStopRoute::Bus.name())),
                    lit_str(STOP_TRANSFER_SUFFIX),
                )],
                lit_str(""),
            ),
        ]),
    );
    exp::step(route_count(), lit_str(""), vec![(2.0, slot_icon)]).downcast()
}

pub fn transfer_layer_icon(index: usize) -> Exp<ResolvedImage> {
    map_exp::by_zoom_bucket(|bucket| transfer_icon_name(bucket, index))
}
