//! Routes, route patterns, lines and shapes.

use std::sync::Arc;

use crate::identifiers::{LineId, RouteId, RoutePatternId, ShapeId, TripId};
use crate::models::types::RouteType;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub id: RouteId,
    pub route_type: RouteType,
    /// Hex color without the leading `#`
    pub color: String,
    pub text_color: String,
    /// Lower values are drawn on top. Routes without one draw below all others.
    pub sort_order: Option<i32>,
    pub short_name: String,
    pub long_name: String,
    pub direction_names: Vec<Option<String>>,
    pub direction_destinations: Vec<Option<String>>,
    pub line_id: Option<LineId>,
}

impl Route {
    pub fn new(id: impl Into<RouteId>, route_type: RouteType, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            route_type,
            color: color.into(),
            text_color: "FFFFFF".into(),
            sort_order: None,
            short_name: String::new(),
            long_name: String::new(),
            direction_names: Vec::new(),
            direction_destinations: Vec::new(),
            line_id: None,
        }
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    pub fn with_line(mut self, line_id: impl Into<LineId>) -> Self {
        self.line_id = Some(line_id.into());
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Typicality {
    #[default]
    Unknown,
    Typical,
    Deviation,
    Atypical,
    Diversion,
    CanonicalOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePattern {
    pub id: RoutePatternId,
    pub route_id: RouteId,
    pub direction_id: u8,
    pub name: String,
    pub sort_order: i32,
    pub typicality: Typicality,
    pub representative_trip_id: TripId,
}

/// Groups related routes, e.g. the Green Line branches, under one color.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub id: LineId,
    pub color: String,
    pub text_color: String,
    pub long_name: String,
    pub short_name: String,
    pub sort_order: i32,
}

/// A route pattern's geometry as an encoded polyline.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    pub id: ShapeId,
    pub polyline: Option<Arc<str>>,
}

impl Shape {
    pub fn new(id: impl Into<ShapeId>, polyline: Option<&str>) -> Self {
        Self {
            id: id.into(),
            polyline: polyline.map(Arc::from),
        }
    }
}
