#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One settled reading from the touch controller, in sensor units.
///
/// A zero `pressure` means no contact; the coordinates then carry whatever
/// the last settled press left behind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SensorSample {
    pub x: i16,
    pub y: i16,
    pub pressure: i16,
}

impl SensorSample {
    pub const fn new(x: i16, y: i16, pressure: i16) -> Self {
        Self { x, y, pressure }
    }

    pub const fn point(&self) -> SensorPoint {
        SensorPoint {
            x: self.x,
            y: self.y,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorPoint {
    pub x: i16,
    pub y: i16,
}

impl SensorPoint {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// A point in display pixel space. Mapping results are not clamped, so a
/// `PixelPoint` may lie outside the panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelPoint {
    pub x: i16,
    pub y: i16,
}

impl PixelPoint {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    pub fn is_within(&self, width: i16, height: i16) -> bool {
        (0..width).contains(&self.x) && (0..height).contains(&self.y)
    }
}

#[cfg(feature = "graphics")]
impl From<PixelPoint> for embedded_graphics::geometry::Point {
    fn from(value: PixelPoint) -> Self {
        Self::new(value.x as i32, value.y as i32)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Display orientation in 90 degree steps, counter-clockwise from upright
/// portrait. Must match the orientation the touch controller is read in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rotation {
    Portrait,
    #[default]
    Landscape,
    PortraitFlipped,
    LandscapeFlipped,
}

impl Rotation {
    /// Wraps like the controller's own rotation register: `n % 4`.
    pub const fn from_index(n: u8) -> Self {
        match n % 4 {
            0 => Self::Portrait,
            1 => Self::Landscape,
            2 => Self::PortraitFlipped,
            _ => Self::LandscapeFlipped,
        }
    }

    pub const fn index(self) -> u8 {
        match self {
            Self::Portrait => 0,
            Self::Landscape => 1,
            Self::PortraitFlipped => 2,
            Self::LandscapeFlipped => 3,
        }
    }
}

/// Sensor-space values that line up with the display's upper-left pixel
/// `(0, 0)` and its far corner `(width, height)`.
///
/// On a correctly wired panel `ul_x > lr_x` and `ul_y > lr_y`. Nothing here
/// enforces that; swapped bounds just mirror the mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationBounds {
    pub ul_x: i16,
    pub ul_y: i16,
    pub lr_x: i16,
    pub lr_y: i16,
}

impl CalibrationBounds {
    pub const fn new(ul_x: i16, ul_y: i16, lr_x: i16, lr_y: i16) -> Self {
        Self {
            ul_x,
            ul_y,
            lr_x,
            lr_y,
        }
    }

    /// At least one axis spans no sensor range, so that axis cannot map.
    pub fn is_degenerate(&self) -> bool {
        self.ul_x == self.lr_x || self.ul_y == self.lr_y
    }

    /// Upper-left reads larger than lower-right on both axes, which is how
    /// the panel's plates are wired.
    pub fn is_native_orientation(&self) -> bool {
        self.ul_x > self.lr_x && self.ul_y > self.lr_y
    }
}

/// Result of one debounce poll: either a level reading or a one-shot edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchEventKind {
    /// Pressure left the confirmed state for the hysteresis band while a
    /// transition was pending.
    Uncertain,
    NoTouch,
    TouchPresent,
    /// Debounced touch. The next edge is always `Release`.
    Touch,
    /// Debounced release. The next edge is always `Touch`.
    Release,
}

impl TouchEventKind {
    pub const fn is_edge(self) -> bool {
        matches!(self, Self::Touch | Self::Release)
    }

    /// Whether this output implies a finger on the panel.
    pub const fn is_contact(self) -> bool {
        matches!(self, Self::Touch | Self::TouchPresent)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Uncertain => "uncertain",
            Self::NoTouch => "no_touch",
            Self::TouchPresent => "touch_present",
            Self::Touch => "touch",
            Self::Release => "release",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchReport {
    pub kind: TouchEventKind,
    pub pixel: PixelPoint,
    pub pressure: i16,
    pub sensor: SensorPoint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_index_wraps_like_the_controller() {
        assert_eq!(Rotation::from_index(0), Rotation::Portrait);
        assert_eq!(Rotation::from_index(3), Rotation::LandscapeFlipped);
        assert_eq!(Rotation::from_index(5), Rotation::Landscape);
        for n in 0..4 {
            assert_eq!(Rotation::from_index(n).index(), n);
        }
    }

    #[test]
    fn native_orientation_requires_both_axes_inverted() {
        assert!(CalibrationBounds::new(3800, 3800, 275, 275).is_native_orientation());
        assert!(!CalibrationBounds::new(275, 3800, 3800, 275).is_native_orientation());
        assert!(CalibrationBounds::new(100, 5, 100, 9).is_degenerate());
    }

    #[test]
    fn edges_and_levels_are_distinguished() {
        assert!(TouchEventKind::Touch.is_edge());
        assert!(TouchEventKind::Release.is_edge());
        assert!(!TouchEventKind::TouchPresent.is_edge());
        assert!(TouchEventKind::TouchPresent.is_contact());
        assert!(!TouchEventKind::Uncertain.is_contact());
    }
}
