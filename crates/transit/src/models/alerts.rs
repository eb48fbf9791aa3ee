//! Alert state attached to stops and route segments.

use std::collections::BTreeMap;

use crate::identifiers::StopId;
use crate::models::map_stop::MapStopRoute;

/// Service state of one route category at one stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopAlertState {
    Normal,
    Issue,
    Shuttle,
    Suspension,
}

impl StopAlertState {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Disruption state of a stretch of route between two stops.
///
/// Variants are ordered by severity.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentAlertState {
    #[default]
    Normal,
    Shuttle,
    Suspension,
}

impl SegmentAlertState {
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Only shuttles and suspensions change how a segment is drawn.
    pub fn from_stop_state(state: StopAlertState) -> Self {
        match state {
            StopAlertState::Shuttle => Self::Shuttle,
            StopAlertState::Suspension => Self::Suspension,
            StopAlertState::Normal | StopAlertState::Issue => Self::Normal,
        }
    }

    pub fn is_disrupted(self) -> bool {
        self != Self::Normal
    }
}

/// Result of associating realtime alerts with a stop: one state per route
/// category serving it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertAssociatedStop {
    pub stop_id: StopId,
    pub state_by_route: BTreeMap<MapStopRoute, StopAlertState>,
}

impl AlertAssociatedStop {
    pub fn new(stop_id: impl Into<StopId>) -> Self {
        Self {
            stop_id: stop_id.into(),
            state_by_route: BTreeMap::new(),
        }
    }

    pub fn with_state(mut self, category: MapStopRoute, state: StopAlertState) -> Self {
        self.state_by_route.insert(category, state);
        self
    }

    /// Segment state for one category. Without a category the most severe
    /// state recorded at the stop is used.
    pub fn segment_state(&self, category: Option<MapStopRoute>) -> SegmentAlertState {
        match category {
            Some(category) => self
                .state_by_route
                .get(&category)
                .copied()
                .map(SegmentAlertState::from_stop_state)
                .unwrap_or_default(),
            None => self
                .state_by_route
                .values()
                .copied()
                .map(SegmentAlertState::from_stop_state)
                .max()
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(SegmentAlertState::Suspension > SegmentAlertState::Shuttle);
        assert!(SegmentAlertState::Shuttle > SegmentAlertState::Normal);
        assert_eq!(
            SegmentAlertState::from_stop_state(StopAlertState::Issue),
            SegmentAlertState::Normal
        );
    }

    #[test]
    fn test_segment_state_for_category() {
        let stop = AlertAssociatedStop::new("place-north")
            .with_state(MapStopRoute::Orange, StopAlertState::Shuttle)
            .with_state(MapStopRoute::Green, StopAlertState::Suspension)
            .with_state(MapStopRoute::Commuter, StopAlertState::Normal);

        assert_eq!(
            stop.segment_state(Some(MapStopRoute::Orange)),
            SegmentAlertState::Shuttle
        );
        assert_eq!(
            stop.segment_state(Some(MapStopRoute::Commuter)),
            SegmentAlertState::Normal
        );
        assert_eq!(
            stop.segment_state(Some(MapStopRoute::Red)),
            SegmentAlertState::Normal
        );
        assert_eq!(stop.segment_state(None), SegmentAlertState::Suspension);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(StopAlertState::Suspension.name(), "Suspension");
        assert_eq!(SegmentAlertState::Shuttle.name(), "Shuttle");
    }
}
