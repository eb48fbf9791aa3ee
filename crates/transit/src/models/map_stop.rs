//! Map-facing aggregation of stops and the routes they serve.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use strum::{EnumCount, IntoEnumIterator};

use crate::identifiers::RouteId;
use crate::models::alerts::StopAlertState;
use crate::models::route::Route;
use crate::models::stop::Stop;
use crate::models::types::{RouteType, TransitError};

const GREEN_BRANCHES: &[&str] = &["Green-B", "Green-C", "Green-D", "Green-E"];
const SILVER_BRANCHES: &[&str] = &["741", "742", "743", "746", "749", "751"];

/// Coarse route categories used to pick stop icons.
///
/// Declaration order matters: single-category stops sort by the negated
/// ordinal, so earlier categories are drawn above later ones.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::EnumIter,
    strum::EnumCount,
    strum::IntoStaticStr,
    strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum MapStopRoute {
    Red,
    Mattapan,
    Orange,
    Green,
    Blue,
    Silver,
    Commuter,
    Ferry,
    Bus,
}

impl MapStopRoute {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Concrete route ids that get their own branch icons.
    pub fn branching_routes(self) -> &'static [&'static str] {
        match self {
            Self::Green => GREEN_BRANCHES,
            Self::Silver => SILVER_BRANCHES,
            _ => &[],
        }
    }

    pub fn has_branching_terminals(self) -> bool {
        !self.branching_routes().is_empty()
    }

    fn matches(self, route: &Route) -> bool {
        let id = route.id.as_str();
        match self {
            Self::Red => id == "Red",
            Self::Mattapan => id == "Mattapan",
            Self::Orange => id == "Orange",
            Self::Green => id.starts_with("Green"),
            Self::Blue => id == "Blue",
            Self::Silver => SILVER_BRANCHES.contains(&id),
            Self::Commuter => route.route_type == RouteType::CommuterRail,
            Self::Ferry => route.route_type == RouteType::Ferry,
            Self::Bus => route.route_type == RouteType::Bus,
        }
    }

    /// The first category, in declaration order, that the route falls into.
    pub fn for_route(route: &Route) -> Option<Self> {
        Self::iter().find(|category| category.matches(route))
    }

    pub fn parse(name: &str) -> Result<Self, TransitError> {
        Self::from_str(name).map_err(|_| TransitError::UnknownMapStopRoute(name.to_string()))
    }

    pub const fn count() -> usize {
        Self::COUNT
    }
}

/// A stop as the map sees it: the stop plus the route categories it serves.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapStop {
    pub stop: Stop,
    pub routes: BTreeMap<MapStopRoute, Vec<Route>>,
    /// Served categories, most prominent first.
    pub route_types: Vec<MapStopRoute>,
    pub route_directions: BTreeMap<RouteId, BTreeSet<u8>>,
    pub is_terminal: bool,
    pub alerts: Option<BTreeMap<MapStopRoute, StopAlertState>>,
}

impl MapStop {
    pub fn new(stop: Stop) -> Self {
        Self {
            stop,
            routes: BTreeMap::new(),
            route_types: Vec::new(),
            route_directions: BTreeMap::new(),
            is_terminal: false,
            alerts: None,
        }
    }

    /// Registers a route served in the given directions. Categories are
    /// appended in the order routes are added.
    pub fn with_route(mut self, route: Route, directions: &[u8]) -> Self {
        let Some(category) = MapStopRoute::for_route(&route) else {
            return self;
        };
        if !self.route_types.contains(&category) {
            self.route_types.push(category);
        }
        self.route_directions
            .entry(route.id.clone())
            .or_default()
            .extend(directions.iter().copied());
        self.routes.entry(category).or_default().push(route);
        self
    }

    pub fn terminal(mut self) -> Self {
        self.is_terminal = true;
        self
    }

    pub fn with_alert(mut self, category: MapStopRoute, state: StopAlertState) -> Self {
        self.alerts
            .get_or_insert_with(BTreeMap::new)
            .insert(category, state);
        self
    }

    /// The category drawn first, if any.
    pub fn top_route(&self) -> Option<MapStopRoute> {
        self.route_types.first().copied()
    }

    /// `"<route id>/<direction id>"` for every served route direction.
    pub fn all_route_directions(&self) -> Vec<String> {
        self.route_directions
            .iter()
            .flat_map(|(route_id, directions)| {
                directions
                    .iter()
                    .map(move |direction| format!("{route_id}/{direction}"))
            })
            .collect()
    }
}
