//! Geometry helpers for placing stops and segments on route lines.

pub mod queries;

pub use queries::{haversine_distance, line_slice, nearest_point_on_line, NearestPoint};
