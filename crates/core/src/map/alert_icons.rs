//! Alert badge icons drawn next to stop icons.

use strum::IntoEnumIterator;

use ridemap_transit::{MapStopRoute, StopAlertState};

use crate::map::defaults::MapDefaults;
use crate::map::map_exp::{self, ZoomBucket};
use crate::map::style::exp::{self, Exp, ResolvedImage, lit_num, lit_str};
use crate::map::style::properties::keys;

pub const ALERT_ICON_SMALL_PREFIX: &str = "alert-small-";
pub const ALERT_ICON_LARGE_PREFIX: &str = "alert-large-";

fn prefix(bucket: ZoomBucket) -> &'static str {
    match bucket {
        ZoomBucket::Wide => ALERT_ICON_SMALL_PREFIX,
        ZoomBucket::Close => ALERT_ICON_LARGE_PREFIX,
    }
}

/// Every alert icon the layers can ask for.
pub fn all() -> Vec<String> {
    let mut icons = Vec::new();
    for bucket in ZoomBucket::ALL {
        for route in MapStopRoute::iter() {
            for state in StopAlertState::iter().filter(|state| *state != StopAlertState::Normal) {
                icons.push(format!(
                    "{}{}-{}",
                    prefix(bucket),
                    route.name().to_lowercase(),
                    state.name().to_lowercase()
                ));
            }
        }
    }
    icons
}

/// `{prefix}{category}-{state}` for the category at `index`, or `""` when
/// there is no such category, no recorded status, or the status is normal.
fn alert_icon_name(bucket: ZoomBucket, index: usize) -> Exp<String> {
    let route = || map_exp::route_at(index);
    let status = || exp::get(keys::SERVICE_STATUS);
    let state = || exp::get_in::<String, _>(route(), status());

    exp::case(
        vec![
            (
                exp::ge(
                    lit_num(index as f64),
                    exp::length(map_exp::routes_exp()),
                ),
                lit_str(""),
            ),
            (exp::not(exp::has_in(route(), status())), lit_str("")),
            (
                exp::eq(state(), lit_str(StopAlertState::Normal.name())),
                lit_str(""),
            ),
        ],
        exp::concat(vec![
            lit_str(prefix(bucket)),
            exp::downcase(route()),
            lit_str("-"),
            exp::downcase(state()),
        ]),
    )
}

pub fn alert_layer_icon(index: usize, for_bus: bool) -> Exp<ResolvedImage> {
    exp::image(map_exp::bus_switch_exp(
        for_bus,
        exp::step(
            exp::zoom(),
            alert_icon_name(ZoomBucket::Wide, index),
            vec![(
                MapDefaults::CLOSE_ZOOM_THRESHOLD,
                alert_icon_name(ZoomBucket::Close, index),
            )],
        ),
    ))
}
