//! Core enums and errors for transit data.

// ============================================================================
// Enums
// ============================================================================

/// Route types the map distinguishes between.
///
/// The string form (`LIGHT_RAIL`, `BUS`, ...) is what ends up in feature
/// properties, so it must stay stable.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::EnumIter, strum::IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RouteType {
    LightRail,
    HeavyRail,
    CommuterRail,
    Bus,
    Ferry,
}

impl RouteType {
    pub fn from_gtfs(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::LightRail),
            1 => Some(Self::HeavyRail),
            2 => Some(Self::CommuterRail),
            3 => Some(Self::Bus),
            4 => Some(Self::Ferry),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn is_rail(self) -> bool {
        matches!(self, Self::LightRail | Self::HeavyRail | Self::CommuterRail)
    }
}

impl TryFrom<u16> for RouteType {
    type Error = TransitError;

    fn try_from(value: u16) -> Result<Self> {
        Self::from_gtfs(value).ok_or(TransitError::UnknownRouteType(value))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum LocationType {
    Stop,
    Station,
    EntranceExit,
    GenericNode,
    BoardingArea,
}

impl LocationType {
    pub fn from_gtfs(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Stop),
            1 => Some(Self::Station),
            2 => Some(Self::EntranceExit),
            3 => Some(Self::GenericNode),
            4 => Some(Self::BoardingArea),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl TryFrom<u16> for LocationType {
    type Error = TransitError;

    fn try_from(value: u16) -> Result<Self> {
        Self::from_gtfs(value).ok_or(TransitError::UnknownLocationType(value))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum WheelchairBoardingStatus {
    #[default]
    Unknown,
    Accessible,
    Inaccessible,
}

impl WheelchairBoardingStatus {
    pub fn from_gtfs(value: u16) -> Self {
        match value {
            1 => Self::Accessible,
            2 => Self::Inaccessible,
            _ => Self::Unknown,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Unknown route type: {0}")]
    UnknownRouteType(u16),

    #[error("Unknown location type: {0}")]
    UnknownLocationType(u16),

    #[error("Unknown map route category: {0}")]
    UnknownMapStopRoute(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, TransitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_type_from_gtfs() {
        assert_eq!(RouteType::from_gtfs(1), Some(RouteType::HeavyRail));
        assert_eq!(RouteType::from_gtfs(3), Some(RouteType::Bus));
        assert_eq!(RouteType::from_gtfs(99), None);
        assert!(matches!(
            RouteType::try_from(7),
            Err(TransitError::UnknownRouteType(7))
        ));
    }

    #[test]
    fn test_route_type_names() {
        assert_eq!(RouteType::CommuterRail.name(), "COMMUTER_RAIL");
        assert_eq!(RouteType::LightRail.name(), "LIGHT_RAIL");
        assert_eq!(RouteType::Ferry.name(), "FERRY");
    }

    #[test]
    fn test_location_type_from_gtfs() {
        assert_eq!(LocationType::from_gtfs(2), Some(LocationType::EntranceExit));
        assert_eq!(LocationType::EntranceExit.name(), "ENTRANCE_EXIT");
        assert!(LocationType::try_from(5).is_err());
    }

    #[test]
    fn test_wheelchair_boarding_defaults_to_unknown() {
        assert_eq!(
            WheelchairBoardingStatus::from_gtfs(0),
            WheelchairBoardingStatus::Unknown
        );
        assert_eq!(
            WheelchairBoardingStatus::from_gtfs(1),
            WheelchairBoardingStatus::Accessible
        );
    }
}
