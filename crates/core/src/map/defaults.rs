/// Zoom thresholds shared by the feature builders and layer generators.
pub struct MapDefaults;

impl MapDefaults {
    /// Wide stop icons and offsets switch to their mid-zoom variants here.
    pub const MID_ZOOM_THRESHOLD: f64 = 11.5;
    /// Large icons, wider route lines and alert icon sizes.
    pub const CLOSE_ZOOM_THRESHOLD: f64 = 15.0;
    pub const STOP_ZOOM_THRESHOLD: f64 = 11.0;
    pub const BUS_STOP_ZOOM_THRESHOLD: f64 = 12.0;
    pub const CHILD_STOP_ZOOM_THRESHOLD: f64 = 16.0;

    /// Widest route line; route offsets are multiples of it.
    pub const MAX_LINE_WIDTH: f64 = 6.0;
}
