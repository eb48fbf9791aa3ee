//! Route shapes cut into segments, and segments cut at alert boundaries.

use std::collections::{BTreeMap, HashMap};

use crate::identifiers::{RouteId, RoutePatternId, StopId};
use crate::models::alerts::{AlertAssociatedStop, SegmentAlertState};
use crate::models::map_stop::MapStopRoute;
use crate::models::route::Shape;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePatternKey {
    pub route_id: RouteId,
    pub route_pattern_id: RoutePatternId,
}

/// A contiguous run of stops along one route pattern's shape.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteSegment {
    pub id: String,
    pub source_route_pattern_id: RoutePatternId,
    pub source_route_id: RouteId,
    pub stop_ids: Vec<StopId>,
    /// Other patterns serving each stop, used to find transfer points.
    pub other_patterns_by_stop_id: BTreeMap<StopId, Vec<RoutePatternKey>>,
}

/// A [`RouteSegment`] run that shares a single alert state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertAwareRouteSegment {
    pub id: String,
    pub source_route_pattern_id: RoutePatternId,
    pub source_route_id: RouteId,
    pub stop_ids: Vec<StopId>,
    pub other_patterns_by_stop_id: BTreeMap<StopId, Vec<RoutePatternKey>>,
    pub alert_state: SegmentAlertState,
}

impl RouteSegment {
    pub fn new(
        id: impl Into<String>,
        source_route_pattern_id: impl Into<RoutePatternId>,
        source_route_id: impl Into<RouteId>,
        stop_ids: Vec<StopId>,
    ) -> Self {
        Self {
            id: id.into(),
            source_route_pattern_id: source_route_pattern_id.into(),
            source_route_id: source_route_id.into(),
            stop_ids,
            other_patterns_by_stop_id: BTreeMap::new(),
        }
    }

    /// Disrupted stops of this segment. Stops without an association, or
    /// whose state for `category` is not a disruption, are left out.
    pub fn alert_state_by_stop_id(
        &self,
        alerts_by_stop: &HashMap<StopId, AlertAssociatedStop>,
        category: Option<MapStopRoute>,
    ) -> HashMap<StopId, SegmentAlertState> {
        self.stop_ids
            .iter()
            .filter_map(|stop_id| {
                let state = alerts_by_stop.get(stop_id)?.segment_state(category);
                state
                    .is_disrupted()
                    .then(|| (stop_id.clone(), state))
            })
            .collect()
    }

    /// Groups consecutive stops into runs of equal alert state.
    ///
    /// A stretch between two stops is disrupted only when both ends are, and
    /// then takes the more severe of the two states. Neighbouring runs share
    /// their boundary stop.
    pub fn alerting_segments(
        stop_ids: &[StopId],
        state_by_stop: &HashMap<StopId, SegmentAlertState>,
    ) -> Vec<(SegmentAlertState, Vec<StopId>)> {
        if stop_ids.len() < 2 {
            return stop_ids
                .first()
                .map(|only| vec![(SegmentAlertState::Normal, vec![only.clone()])])
                .unwrap_or_default();
        }

        let mut runs: Vec<(SegmentAlertState, Vec<StopId>)> = Vec::new();
        for pair in stop_ids.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            let state = match (state_by_stop.get(from), state_by_stop.get(to)) {
                (Some(a), Some(b)) => (*a).max(*b),
                _ => SegmentAlertState::Normal,
            };
            match runs.last_mut() {
                Some((run_state, stops)) if *run_state == state => stops.push(to.clone()),
                _ => runs.push((state, vec![from.clone(), to.clone()])),
            }
        }
        runs
    }

    /// Splits the segment wherever the alert state changes. Resulting ids are
    /// `"{id}-{n}"`.
    pub fn split_alerting_segments(
        &self,
        alerts_by_stop: &HashMap<StopId, AlertAssociatedStop>,
        category: Option<MapStopRoute>,
    ) -> Vec<AlertAwareRouteSegment> {
        let state_by_stop = self.alert_state_by_stop_id(alerts_by_stop, category);
        Self::alerting_segments(&self.stop_ids, &state_by_stop)
            .into_iter()
            .enumerate()
            .map(|(index, (alert_state, stop_ids))| {
                let other_patterns_by_stop_id = self
                    .other_patterns_by_stop_id
                    .iter()
                    .filter(|(stop_id, _)| stop_ids.contains(stop_id))
                    .map(|(stop_id, patterns)| (stop_id.clone(), patterns.clone()))
                    .collect();
                AlertAwareRouteSegment {
                    id: format!("{}-{}", self.id, index),
                    source_route_pattern_id: self.source_route_pattern_id.clone(),
                    source_route_id: self.source_route_id.clone(),
                    stop_ids,
                    other_patterns_by_stop_id,
                    alert_state,
                }
            })
            .collect()
    }
}

/// One route pattern's shape together with the segments that subdivide it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentedRouteShape {
    pub source_route_pattern_id: RoutePatternId,
    pub source_route_id: RouteId,
    pub direction_id: u8,
    pub route_segments: Vec<RouteSegment>,
    pub shape: Shape,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteWithSegmentedShapes {
    pub route_id: RouteId,
    pub segmented_shapes: Vec<SegmentedRouteShape>,
}

/// A shape with the ordered stops of its route pattern, as returned for a
/// single trip or stop.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeWithStops {
    pub direction_id: u8,
    pub route_id: RouteId,
    pub route_pattern_id: RoutePatternId,
    pub shape: Option<Shape>,
    pub stop_ids: Vec<StopId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alerts::StopAlertState;

    fn ids(names: &[&str]) -> Vec<StopId> {
        names.iter().copied().map(StopId::new).collect()
    }

    fn states(entries: &[(&str, SegmentAlertState)]) -> HashMap<StopId, SegmentAlertState> {
        entries
            .iter()
            .map(|(id, state)| (StopId::new(id), *state))
            .collect()
    }

    fn red_line_segment() -> RouteSegment {
        let mut segment = RouteSegment::new(
            "id",
            "Red-1-0",
            "Red",
            ids(&["alewife", "davis", "porter", "harvard", "central"]),
        );
        segment.other_patterns_by_stop_id.insert(
            StopId::new("alewife"),
            vec![RoutePatternKey {
                route_id: RouteId::new("Red"),
                route_pattern_id: RoutePatternId::new("Red-3-0"),
            }],
        );
        segment
    }

    #[test]
    fn test_alert_state_by_stop_id_excludes_normal_and_other_routes() {
        let segment = red_line_segment();
        let alerts = HashMap::from([
            (
                StopId::new("davis"),
                AlertAssociatedStop::new("davis").with_state(MapStopRoute::Red, StopAlertState::Shuttle),
            ),
            (
                StopId::new("porter"),
                AlertAssociatedStop::new("porter").with_state(MapStopRoute::Red, StopAlertState::Issue),
            ),
            (
                StopId::new("harvard"),
                AlertAssociatedStop::new("harvard")
                    .with_state(MapStopRoute::Bus, StopAlertState::Suspension),
            ),
        ]);

        let by_stop = segment.alert_state_by_stop_id(&alerts, Some(MapStopRoute::Red));
        assert_eq!(by_stop, states(&[("davis", SegmentAlertState::Shuttle)]));
    }

    #[test]
    fn test_alerting_segments_in_the_middle() {
        let runs = RouteSegment::alerting_segments(
            &ids(&["alewife", "davis", "porter", "harvard", "central"]),
            &states(&[
                ("porter", SegmentAlertState::Shuttle),
                ("harvard", SegmentAlertState::Shuttle),
            ]),
        );

        assert_eq!(
            runs,
            vec![
                (SegmentAlertState::Normal, ids(&["alewife", "davis", "porter"])),
                (SegmentAlertState::Shuttle, ids(&["porter", "harvard"])),
                (SegmentAlertState::Normal, ids(&["harvard", "central"])),
            ]
        );
    }

    #[test]
    fn test_alerting_segments_lone_stop_does_not_alert() {
        let runs = RouteSegment::alerting_segments(
            &ids(&["alewife", "davis", "porter"]),
            &states(&[("davis", SegmentAlertState::Suspension)]),
        );
        assert_eq!(
            runs,
            vec![(SegmentAlertState::Normal, ids(&["alewife", "davis", "porter"]))]
        );
    }

    #[test]
    fn test_alerting_segments_three_stops() {
        let stop_ids = ids(&["s1", "s2", "s3"]);

        // s2 shares its state with s1 only: the run breaks at s2.
        let runs = RouteSegment::alerting_segments(
            &stop_ids,
            &states(&[
                ("s1", SegmentAlertState::Shuttle),
                ("s2", SegmentAlertState::Shuttle),
            ]),
        );
        assert_eq!(
            runs,
            vec![
                (SegmentAlertState::Shuttle, ids(&["s1", "s2"])),
                (SegmentAlertState::Normal, ids(&["s2", "s3"])),
            ]
        );

        // s2 differs from both neighbours: no stop pair is disrupted.
        let runs = RouteSegment::alerting_segments(
            &stop_ids,
            &states(&[("s2", SegmentAlertState::Shuttle)]),
        );
        assert_eq!(runs, vec![(SegmentAlertState::Normal, stop_ids.clone())]);

        // Severity changes at s2 between two disrupted pairs.
        let runs = RouteSegment::alerting_segments(
            &stop_ids,
            &states(&[
                ("s1", SegmentAlertState::Shuttle),
                ("s2", SegmentAlertState::Shuttle),
                ("s3", SegmentAlertState::Suspension),
            ]),
        );
        assert_eq!(
            runs,
            vec![
                (SegmentAlertState::Shuttle, ids(&["s1", "s2"])),
                (SegmentAlertState::Suspension, ids(&["s2", "s3"])),
            ]
        );
    }

    #[test]
    fn test_alerting_segments_ignores_alert_on_terminal_only() {
        let runs = RouteSegment::alerting_segments(
            &ids(&["alewife", "davis", "porter", "harvard", "central"]),
            &states(&[
                ("alewife", SegmentAlertState::Shuttle),
                ("davis", SegmentAlertState::Shuttle),
                ("central", SegmentAlertState::Shuttle),
            ]),
        );
        assert_eq!(
            runs,
            vec![
                (SegmentAlertState::Shuttle, ids(&["alewife", "davis"])),
                (SegmentAlertState::Normal, ids(&["davis", "porter", "harvard", "central"])),
            ]
        );
    }

    #[test]
    fn test_alerting_segments_takes_more_severe_state() {
        let runs = RouteSegment::alerting_segments(
            &ids(&["a", "b", "c"]),
            &states(&[
                ("a", SegmentAlertState::Shuttle),
                ("b", SegmentAlertState::Suspension),
                ("c", SegmentAlertState::Suspension),
            ]),
        );
        assert_eq!(
            runs,
            vec![(SegmentAlertState::Suspension, ids(&["a", "b", "c"]))]
        );
    }

    #[test]
    fn test_alerting_segments_reconstructs_stop_list() {
        let stop_ids = ids(&["s1", "s2", "s3", "s4"]);
        let choices = [
            None,
            Some(SegmentAlertState::Shuttle),
            Some(SegmentAlertState::Suspension),
        ];

        for assignment in 0..choices.len().pow(stop_ids.len() as u32) {
            let mut remaining = assignment;
            let mut by_stop = HashMap::new();
            for stop_id in &stop_ids {
                if let Some(state) = choices[remaining % choices.len()] {
                    by_stop.insert(stop_id.clone(), state);
                }
                remaining /= choices.len();
            }

            let runs = RouteSegment::alerting_segments(&stop_ids, &by_stop);
            let mut rebuilt: Vec<StopId> = Vec::new();
            for (index, (_, stops)) in runs.iter().enumerate() {
                assert!(stops.len() >= 2);
                if index > 0 {
                    assert_eq!(rebuilt.last(), stops.first());
                    rebuilt.extend(stops.iter().skip(1).cloned());
                } else {
                    rebuilt.extend(stops.iter().cloned());
                }
            }
            assert_eq!(rebuilt, stop_ids, "assignment {assignment}");

            for pair in runs.windows(2) {
                assert_ne!(pair[0].0, pair[1].0);
            }
        }
    }

    #[test]
    fn test_single_stop_segment() {
        let runs = RouteSegment::alerting_segments(&ids(&["only"]), &HashMap::new());
        assert_eq!(runs, vec![(SegmentAlertState::Normal, ids(&["only"]))]);
        assert!(RouteSegment::alerting_segments(&[], &HashMap::new()).is_empty());
    }

    #[test]
    fn test_split_alerting_segments() {
        let segment = red_line_segment();
        let alerts: HashMap<StopId, AlertAssociatedStop> = ["davis", "porter"]
            .into_iter()
            .map(|id| {
                (
                    StopId::new(id),
                    AlertAssociatedStop::new(id).with_state(MapStopRoute::Red, StopAlertState::Shuttle),
                )
            })
            .collect();

        let split = segment.split_alerting_segments(&alerts, Some(MapStopRoute::Red));

        assert_eq!(split.len(), 3);
        assert_eq!(split[0].id, "id-0");
        assert_eq!(split[0].stop_ids, ids(&["alewife", "davis"]));
        assert_eq!(split[0].alert_state, SegmentAlertState::Normal);
        assert_eq!(split[0].other_patterns_by_stop_id.len(), 1);

        assert_eq!(split[1].id, "id-1");
        assert_eq!(split[1].stop_ids, ids(&["davis", "porter"]));
        assert_eq!(split[1].alert_state, SegmentAlertState::Shuttle);
        assert!(split[1].other_patterns_by_stop_id.is_empty());

        assert_eq!(split[2].id, "id-2");
        assert_eq!(split[2].stop_ids, ids(&["porter", "harvard", "central"]));
        assert_eq!(split[2].alert_state, SegmentAlertState::Normal);
        assert_eq!(split[2].source_route_id, RouteId::new("Red"));
    }
}
