//! Map feature sources and the style layers that draw them.
//!
//! Feature builders turn transit data into GeoJSON sources, layer
//! generators describe how the renderer should draw those sources. The two
//! halves only share the property keys in [`style::properties::keys`].

pub mod alert_icons;
pub mod child_stop_features;
pub mod child_stop_layers;
pub mod colors;
pub mod defaults;
pub mod map_exp;
pub mod polyline;
pub mod route_features;
pub mod route_layers;
pub mod stop_features;
pub mod stop_icons;
pub mod stop_layers;
pub mod style;

pub use colors::ColorPalette;
pub use defaults::MapDefaults;
