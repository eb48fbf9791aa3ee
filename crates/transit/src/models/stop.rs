//! Stops and the parent-station tree.

use std::collections::HashMap;

use geo::Coord;

use crate::identifiers::{RouteId, StopId};
use crate::models::types::{LocationType, RouteType, WheelchairBoardingStatus};

/// A stop, station, entrance or boarding area.
///
/// `position` uses x = longitude, y = latitude, matching `geo`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub position: Coord,
    pub location_type: LocationType,
    pub parent_station_id: Option<StopId>,
    pub child_stop_ids: Vec<StopId>,
    pub platform_code: Option<String>,
    pub platform_name: Option<String>,
    pub description: Option<String>,
    pub vehicle_type: Option<RouteType>,
    pub wheelchair_boarding: WheelchairBoardingStatus,
}

impl Stop {
    pub fn new(id: impl Into<StopId>, name: impl Into<String>, position: Coord) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            location_type: LocationType::Stop,
            parent_station_id: None,
            child_stop_ids: Vec::new(),
            platform_code: None,
            platform_name: None,
            description: None,
            vehicle_type: None,
            wheelchair_boarding: WheelchairBoardingStatus::Unknown,
        }
    }

    pub fn with_location_type(mut self, location_type: LocationType) -> Self {
        self.location_type = location_type;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<StopId>) -> Self {
        self.parent_station_id = Some(parent.into());
        self
    }

    pub fn with_platform_name(mut self, platform_name: impl Into<String>) -> Self {
        self.platform_name = Some(platform_name.into());
        self
    }

    pub fn is_child(&self) -> bool {
        self.parent_station_id.is_some()
    }

    /// The parent station if it is present in `stops`, otherwise this stop.
    pub fn resolve_parent<'a>(&'a self, stops: &'a HashMap<StopId, Stop>) -> &'a Stop {
        self.parent_station_id
            .as_ref()
            .and_then(|parent_id| stops.get(parent_id))
            .unwrap_or(self)
    }
}

/// Maps a stop id to its parent station id when both are known, otherwise
/// returns the id unchanged.
pub fn resolve_parent_id(stops: &HashMap<StopId, Stop>, stop_id: &StopId) -> StopId {
    stops
        .get(stop_id)
        .map(|stop| stop.resolve_parent(stops).id.clone())
        .unwrap_or_else(|| stop_id.clone())
}

/// Selection made on the stop details page.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopDetailsFilter {
    pub route_id: RouteId,
    pub direction_id: u8,
}

impl StopDetailsFilter {
    pub fn new(route_id: impl Into<RouteId>, direction_id: u8) -> Self {
        Self {
            route_id: route_id.into(),
            direction_id,
        }
    }

    /// `"<route id>/<direction id>"`, the format stop features use for
    /// `allRouteDirections`.
    pub fn route_direction(&self) -> String {
        format!("{}/{}", self.route_id, self.direction_id)
    }
}
