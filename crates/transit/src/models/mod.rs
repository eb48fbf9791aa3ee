//! Transit data models and types.

pub mod alerts;
pub mod map_stop;
pub mod route;
pub mod segment;
pub mod stop;
pub mod types;

// Re-exports for convenience
pub use alerts::{AlertAssociatedStop, SegmentAlertState, StopAlertState};
pub use map_stop::{MapStop, MapStopRoute};
pub use route::{Line, Route, RoutePattern, Shape, Typicality};
pub use segment::{
    AlertAwareRouteSegment, RoutePatternKey, RouteSegment, RouteWithSegmentedShapes,
    SegmentedRouteShape, ShapeWithStops,
};
pub use stop::{resolve_parent_id, Stop, StopDetailsFilter};
pub use types::{LocationType, Result, RouteType, TransitError, WheelchairBoardingStatus};
