//! # ridemap-transit
//!
//! Immutable transit snapshots for the map pipeline.
//!
//! ## Features
//!
//! - **Identifiers**: cheap `Arc<str>` ids for stops, routes, patterns and shapes
//! - **Models**: stops, routes, shapes, route segments and alert association
//! - **Map stops**: stops grouped by the route categories that pick their icons
//! - **Spatial**: nearest-point snapping and line slicing
//!
//! ## Example
//!
//! ```
//! use ridemap_transit::prelude::*;
//! use std::collections::HashMap;
//!
//! let segment = RouteSegment::new(
//!     "Red-seg",
//!     "Red-1-0",
//!     "Red",
//!     vec![StopId::new("davis"), StopId::new("porter"), StopId::new("harvard")],
//! );
//!
//! let alerts: HashMap<StopId, AlertAssociatedStop> = ["davis", "porter"]
//!     .into_iter()
//!     .map(|id| {
//!         let stop = AlertAssociatedStop::new(id)
//!             .with_state(MapStopRoute::Red, StopAlertState::Shuttle);
//!         (StopId::new(id), stop)
//!     })
//!     .collect();
//!
//! let split = segment.split_alerting_segments(&alerts, Some(MapStopRoute::Red));
//! assert_eq!(split.len(), 2);
//! assert_eq!(split[0].alert_state, SegmentAlertState::Shuttle);
//! ```

pub mod identifiers;
pub mod models;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::*;
    pub use crate::spatial::{line_slice, nearest_point_on_line, NearestPoint};
}

pub use prelude::*;
