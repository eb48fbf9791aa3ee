//! Symbol layers drawing the stop source.
//!
//! Bus-only stops and everything else are drawn by separate layers so bus
//! stops can appear later and be hidden wholesale. Transfer and alert icons
//! get one layer per slot because a symbol layer draws one icon per feature.

use ridemap_transit::{MapStopRoute, StopDetailsFilter, StopId};
use tokio::task::JoinError;

use crate::map::alert_icons;
use crate::map::colors::ColorPalette;
use crate::map::defaults::MapDefaults;
use crate::map::map_exp;
use crate::map::stop_features::STOP_SOURCE_ID;
use crate::map::stop_icons;
use crate::map::style::exp::{self, lit_num, lit_str};
use crate::map::style::layer::{SymbolLayer, TextAnchor, TextJustify};
use crate::map::style::properties::keys;

pub const STOP_LAYER_ID: &str = "stop-layer";
pub const MAX_TRANSFER_LAYERS: usize = 3;

const STOP_FONT: &str = "Inter Regular";
const TOUCH_TARGET_PADDING: f64 = 22.0;

/// Selection state the stop layers are generated for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StopLayerState {
    pub selected_stop_id: Option<StopId>,
    /// Route and direction being shown in stop details; bus stops off that
    /// route are hidden until close zoom.
    pub stop_filter: Option<StopDetailsFilter>,
}

impl StopLayerState {
    pub fn selected(stop_id: impl Into<StopId>) -> Self {
        Self {
            selected_stop_id: Some(stop_id.into()),
            stop_filter: None,
        }
    }
}

pub fn touch_target_layer_id() -> String {
    format!("{STOP_LAYER_ID}-touch-target")
}

pub fn selected_pin_layer_id() -> String {
    format!("{STOP_LAYER_ID}-selected-pin")
}

pub fn bus_layer_id() -> String {
    format!("{STOP_LAYER_ID}-bus")
}

pub fn bus_alert_layer_id() -> String {
    format!("{STOP_LAYER_ID}-bus-alert")
}

pub fn alert_layer_id(index: usize) -> String {
    format!("{STOP_LAYER_ID}-alert-{index}")
}

pub fn transfer_layer_id(index: usize) -> String {
    format!("{STOP_LAYER_ID}-transfer-{index}")
}

fn include_shared_props(layer: &mut SymbolLayer, for_bus: bool, state: &StopLayerState) {
    layer.icon_size = Some(map_exp::selected_size_exp(state));
    layer.icon_allow_overlap = Some(true);
    layer.min_zoom = Some(if for_bus {
        MapDefaults::BUS_STOP_ZOOM_THRESHOLD
    } else {
        MapDefaults::STOP_ZOOM_THRESHOLD
    });
    layer.symbol_sort_key = Some(exp::get(keys::SORT_ORDER.as_number()));

    if let Some(filter) = &state.stop_filter {
        layer.filter = Some(exp::any(vec![
            map_exp::list_not_eq(
                map_exp::routes_exp(),
                vec![lit_str(MapStopRoute::Bus.name())],
            ),
            exp::is_in(
                lit_str(filter.route_direction()),
                exp::get(keys::ALL_ROUTE_DIRECTIONS),
            ),
            exp::ge(exp::zoom(), lit_num(MapDefaults::CLOSE_ZOOM_THRESHOLD)),
        ]));
    }
}

fn include_text_props(layer: &mut SymbolLayer, palette: &ColorPalette) {
    layer.text_color = Some(palette.text_exp());
    layer.text_font = Some(vec![STOP_FONT.to_string()]);
    layer.text_halo_color = Some(palette.fill3_exp());
    layer.text_halo_width = Some(2.0);
    layer.text_size = Some(13.0);
    layer.text_variable_anchor = Some(vec![
        TextAnchor::Right,
        TextAnchor::Bottom,
        TextAnchor::Top,
        TextAnchor::Left,
    ]);
    layer.text_justify = Some(TextJustify::Auto);
    layer.text_allow_overlap = Some(true);
    layer.text_optional = Some(true);
    layer.text_offset = Some(map_exp::label_offset_exp());
}

/// Invisible icon padded out so small stops are easy to tap.
fn touch_target_layer(state: &StopLayerState) -> SymbolLayer {
    let mut layer = SymbolLayer::new(touch_target_layer_id(), STOP_SOURCE_ID);
    layer.icon_image = Some(exp::image(lit_str(stop_icons::STOP_DUMMY_ICON)));
    layer.icon_padding = Some(TOUCH_TARGET_PADDING);
    include_shared_props(&mut layer, false, state);
    // Covers bus stops as well, so the minimum zoom moves into the filter.
    layer.filter = Some(exp::ge(
        exp::zoom(),
        exp::case(
            vec![(
                map_exp::is_bus_exp(),
                lit_num(MapDefaults::BUS_STOP_ZOOM_THRESHOLD),
            )],
            lit_num(MapDefaults::STOP_ZOOM_THRESHOLD),
        ),
    ));
    layer
}

fn stop_layer(id: String, for_bus: bool, palette: &ColorPalette, state: &StopLayerState) -> SymbolLayer {
    let mut layer = SymbolLayer::new(id, STOP_SOURCE_ID);
    layer.icon_image = Some(stop_icons::stop_layer_icon(for_bus));
    layer.text_field = Some(map_exp::stop_label_text_exp(for_bus, state));
    include_text_props(&mut layer, palette);
    layer.text_allow_overlap = Some(false);
    include_shared_props(&mut layer, for_bus, state);
    layer
}

fn alert_layer(id: String, index: usize, for_bus: bool, state: &StopLayerState) -> SymbolLayer {
    let mut layer = SymbolLayer::new(id, STOP_SOURCE_ID);
    layer.icon_image = Some(alert_icons::alert_layer_icon(index, for_bus));
    layer.icon_offset = Some(map_exp::by_zoom_bucket(|bucket| {
        map_exp::offset_alert_exp(bucket, index)
    }));
    include_shared_props(&mut layer, for_bus, state);
    layer
}

fn transfer_layer(index: usize, state: &StopLayerState) -> SymbolLayer {
    let mut layer = SymbolLayer::new(transfer_layer_id(index), STOP_SOURCE_ID);
    layer.icon_image = Some(stop_icons::transfer_layer_icon(index));
    layer.icon_offset = Some(map_exp::by_zoom_bucket(|bucket| {
        map_exp::offset_transfer_exp(bucket, index)
    }));
    include_shared_props(&mut layer, false, state);
    layer
}

/// Pin over the selected stop, carrying its label.
fn selected_pin_layer(palette: &ColorPalette, state: &StopLayerState) -> SymbolLayer {
    let mut layer = SymbolLayer::new(selected_pin_layer_id(), STOP_SOURCE_ID);
    layer.icon_image = Some(exp::case(
        vec![(
            map_exp::selected_exp(state),
            exp::image(lit_str(stop_icons::STOP_PIN_ICON)),
        )],
        exp::image(lit_str("")),
    ));
    layer.text_field = Some(exp::case(
        vec![(map_exp::selected_exp(state), exp::get(keys::NAME))],
        lit_str(""),
    ));
    include_text_props(&mut layer, palette);
    layer.icon_offset = Some(map_exp::by_zoom_bucket(map_exp::offset_pin_exp));
    include_shared_props(&mut layer, false, state);
    layer
}

/// All stop layers, bottom to top.
pub fn stop_layers(palette: &ColorPalette, state: &StopLayerState) -> Vec<SymbolLayer> {
    let mut layers = vec![
        touch_target_layer(state),
        stop_layer(bus_layer_id(), true, palette, state),
        alert_layer(bus_alert_layer_id(), 0, true, state),
        stop_layer(STOP_LAYER_ID.to_string(), false, palette, state),
    ];
    layers.extend((0..MAX_TRANSFER_LAYERS).map(|index| transfer_layer(index, state)));
    layers.extend(
        (0..MAX_TRANSFER_LAYERS).map(|index| alert_layer(alert_layer_id(index), index, false, state)),
    );
    layers.push(selected_pin_layer(palette, state));
    layers
}

/// [`stop_layers`] off the async runtime's worker threads.
pub async fn create_stop_layers(
    palette: ColorPalette,
    state: StopLayerState,
) -> Result<Vec<SymbolLayer>, JoinError> {
    tokio::task::spawn_blocking(move || stop_layers(&palette, &state))
        .await
        .inspect_err(|err| tracing::warn!("stop layer generation task failed: {err}"))
}
