//! Line and symbol layer descriptions.
//!
//! Layers are plain data: every styling property is an optional [`Exp`] and
//! [`LineLayer::to_json`] / [`SymbolLayer::to_json`] emit only the ones that
//! are set, split into `layout` and `paint` the way the renderer expects.

use serde_json::{Map, Value, json};

use crate::map::style::exp::{Color, Exp, Offset, ResolvedImage};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum LineJoin {
    Bevel,
    Round,
    Miter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum TextAnchor {
    Center,
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum TextJustify {
    Auto,
    Left,
    Center,
    Right,
}

fn put<T>(section: &mut Map<String, Value>, key: &str, value: &Option<Exp<T>>) {
    if let Some(value) = value {
        section.insert(key.to_string(), value.to_json());
    }
}

fn put_plain(section: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        section.insert(key.to_string(), value);
    }
}

fn layer_json(
    id: &str,
    kind: &str,
    source: &str,
    filter: &Option<Exp<bool>>,
    min_zoom: Option<f64>,
    layout: Map<String, Value>,
    paint: Map<String, Value>,
) -> Value {
    let mut layer = Map::new();
    layer.insert("id".into(), json!(id));
    layer.insert("type".into(), json!(kind));
    layer.insert("source".into(), json!(source));
    put(&mut layer, "filter", filter);
    put_plain(&mut layer, "minzoom", min_zoom.map(Value::from));
    if !layout.is_empty() {
        layer.insert("layout".into(), Value::Object(layout));
    }
    if !paint.is_empty() {
        layer.insert("paint".into(), Value::Object(paint));
    }
    Value::Object(layer)
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineLayer {
    pub id: String,
    pub source: String,
    pub filter: Option<Exp<bool>>,
    pub min_zoom: Option<f64>,
    pub line_color: Option<Exp<Color>>,
    pub line_dasharray: Option<Vec<f64>>,
    pub line_join: Option<LineJoin>,
    pub line_offset: Option<Exp<f64>>,
    pub line_sort_key: Option<Exp<f64>>,
    pub line_width: Option<Exp<f64>>,
}

impl LineLayer {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            filter: None,
            min_zoom: None,
            line_color: None,
            line_dasharray: None,
            line_join: None,
            line_offset: None,
            line_sort_key: None,
            line_width: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut layout = Map::new();
        put_plain(
            &mut layout,
            "line-join",
            self.line_join.map(|join| Value::from(<&'static str>::from(join))),
        );
        put(&mut layout, "line-sort-key", &self.line_sort_key);

        let mut paint = Map::new();
        put(&mut paint, "line-color", &self.line_color);
        put_plain(
            &mut paint,
            "line-dasharray",
            self.line_dasharray.as_ref().map(|dashes| json!(["literal", dashes])),
        );
        put(&mut paint, "line-offset", &self.line_offset);
        put(&mut paint, "line-width", &self.line_width);

        layer_json(
            &self.id,
            "line",
            &self.source,
            &self.filter,
            self.min_zoom,
            layout,
            paint,
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SymbolLayer {
    pub id: String,
    pub source: String,
    pub filter: Option<Exp<bool>>,
    pub min_zoom: Option<f64>,

    pub icon_image: Option<Exp<ResolvedImage>>,
    pub icon_size: Option<Exp<f64>>,
    pub icon_offset: Option<Exp<Offset>>,
    pub icon_padding: Option<f64>,
    pub icon_allow_overlap: Option<bool>,
    pub symbol_sort_key: Option<Exp<f64>>,

    pub text_field: Option<Exp<String>>,
    pub text_color: Option<Exp<Color>>,
    pub text_font: Option<Vec<String>>,
    pub text_halo_color: Option<Exp<Color>>,
    pub text_halo_width: Option<f64>,
    pub text_size: Option<f64>,
    pub text_variable_anchor: Option<Vec<TextAnchor>>,
    pub text_justify: Option<TextJustify>,
    pub text_allow_overlap: Option<bool>,
    pub text_optional: Option<bool>,
    pub text_offset: Option<Exp<Offset>>,
}

impl SymbolLayer {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            filter: None,
            min_zoom: None,
            icon_image: None,
            icon_size: None,
            icon_offset: None,
            icon_padding: None,
            icon_allow_overlap: None,
            symbol_sort_key: None,
            text_field: None,
            text_color: None,
            text_font: None,
            text_halo_color: None,
            text_halo_width: None,
            text_size: None,
            text_variable_anchor: None,
            text_justify: None,
            text_allow_overlap: None,
            text_optional: None,
            text_offset: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut layout = Map::new();
        put(&mut layout, "icon-image", &self.icon_image);
        put(&mut layout, "icon-size", &self.icon_size);
        put(&mut layout, "icon-offset", &self.icon_offset);
        put_plain(&mut layout, "icon-padding", self.icon_padding.map(Value::from));
        put_plain(
            &mut layout,
            "icon-allow-overlap",
            self.icon_allow_overlap.map(Value::from),
        );
        put(&mut layout, "symbol-sort-key", &self.symbol_sort_key);
        put(&mut layout, "text-field", &self.text_field);
        put_plain(&mut layout, "text-font", self.text_font.clone().map(Value::from));
        put_plain(&mut layout, "text-size", self.text_size.map(Value::from));
        put_plain(
            &mut layout,
            "text-variable-anchor",
            self.text_variable_anchor.as_ref().map(|anchors| {
                anchors
                    .iter()
                    .map(|anchor| Value::from(<&'static str>::from(*anchor)))
                    .collect()
            }),
        );
        put_plain(
            &mut layout,
            "text-justify",
            self.text_justify
                .map(|justify| Value::from(<&'static str>::from(justify))),
        );
        put_plain(
            &mut layout,
            "text-allow-overlap",
            self.text_allow_overlap.map(Value::from),
        );
        put_plain(&mut layout, "text-optional", self.text_optional.map(Value::from));
        put(&mut layout, "text-offset", &self.text_offset);

        let mut paint = Map::new();
        put(&mut paint, "text-color", &self.text_color);
        put(&mut paint, "text-halo-color", &self.text_halo_color);
        put_plain(
            &mut paint,
            "text-halo-width",
            self.text_halo_width.map(Value::from),
        );

        layer_json(
            &self.id,
            "symbol",
            &self.source,
            &self.filter,
            self.min_zoom,
            layout,
            paint,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::style::exp::{self, lit_num};
    use crate::map::style::properties::keys;

    #[test]
    fn test_line_layer_json() {
        let mut layer = LineLayer::new("route-layer-Red", "route-source-Red");
        layer.line_color = Some(exp::color("#DA291C"));
        layer.line_join = Some(LineJoin::Round);
        layer.line_dasharray = Some(vec![2.0, 1.33]);
        layer.line_width = Some(exp::step(exp::zoom(), lit_num(3.0), vec![(15.0, lit_num(4.0))]));

        assert_eq!(
            layer.to_json(),
            json!({
                "id": "route-layer-Red",
                "type": "line",
                "source": "route-source-Red",
                "layout": { "line-join": "round" },
                "paint": {
                    "line-color": "#DA291C",
                    "line-dasharray": ["literal", [2.0, 1.33]],
                    "line-width": ["step", ["zoom"], 3.0, 15.0, 4.0]
                }
            })
        );
    }

    #[test]
    fn test_symbol_layer_json_skips_unset_properties() {
        let mut layer = SymbolLayer::new("stop-layer", "stop-source");
        layer.min_zoom = Some(11.0);
        layer.filter = Some(exp::get(keys::IS_SELECTED));
        layer.text_variable_anchor = Some(vec![TextAnchor::Right, TextAnchor::BottomLeft]);
        layer.text_justify = Some(TextJustify::Auto);
        layer.text_halo_width = Some(2.0);

        let json = layer.to_json();
        assert_eq!(json["minzoom"], json!(11.0));
        assert_eq!(json["filter"], json!(["get", "isSelected"]));
        assert_eq!(
            json["layout"],
            json!({
                "text-variable-anchor": ["right", "bottom-left"],
                "text-justify": "auto"
            })
        );
        assert_eq!(json["paint"], json!({ "text-halo-width": 2.0 }));
        assert!(json.get("icon-image").is_none());
    }
}
