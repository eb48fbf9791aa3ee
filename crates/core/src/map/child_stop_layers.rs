//! Symbol layer for station entrances and platforms, shown only close in.

use serde_json::Value;

use ridemap_transit::LocationType;
use tokio::task::JoinError;

use crate::map::child_stop_features::CHILD_STOP_SOURCE_ID;
use crate::map::colors::ColorPalette;
use crate::map::defaults::MapDefaults;
use crate::map::style::exp::{self, lit_str};
use crate::map::style::layer::{SymbolLayer, TextAnchor, TextJustify};
use crate::map::style::properties::keys;

pub const CHILD_STOP_LAYER_ID: &str = "child-stop-layer";

pub const CHILD_STOP_ENTRANCE_ICON: &str = "map-child-stop-entrance";
pub const CHILD_STOP_PLATFORM_ICON: &str = "map-child-stop-platform";

pub fn child_stop_layers(palette: &ColorPalette) -> Vec<SymbolLayer> {
    let mut layer = SymbolLayer::new(CHILD_STOP_LAYER_ID, CHILD_STOP_SOURCE_ID);
    layer.min_zoom = Some(MapDefaults::CHILD_STOP_ZOOM_THRESHOLD);
    layer.icon_image = Some(exp::image(exp::match_labels(
        exp::get(keys::LOCATION_TYPE),
        vec![
            (
                Value::from(LocationType::EntranceExit.name()),
                lit_str(CHILD_STOP_ENTRANCE_ICON),
            ),
            (
                Value::from(vec![
                    LocationType::BoardingArea.name(),
                    LocationType::Stop.name(),
                ]),
                lit_str(CHILD_STOP_PLATFORM_ICON),
            ),
        ],
        lit_str(""),
    )));
    layer.icon_allow_overlap = Some(true);
    layer.symbol_sort_key = Some(exp::get(keys::SORT_ORDER.as_number()));

    layer.text_field = Some(exp::get(keys::NAME));
    layer.text_color = Some(palette.text_exp());
    layer.text_halo_color = Some(palette.fill3_exp());
    layer.text_halo_width = Some(2.0);
    layer.text_size = Some(11.0);
    layer.text_variable_anchor = Some(vec![TextAnchor::Left, TextAnchor::Right]);
    layer.text_justify = Some(TextJustify::Auto);
    layer.text_optional = Some(true);
    layer.text_offset = Some(exp::xy(1.0, 0.0));

    vec![layer]
}

pub async fn create_child_stop_layers(
    palette: ColorPalette,
) -> Result<Vec<SymbolLayer>, JoinError> {
    tokio::task::spawn_blocking(move || child_stop_layers(&palette))
        .await
        .inspect_err(|err| tracing::warn!("child stop layer generation task failed: {err}"))
}
