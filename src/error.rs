use core::fmt;

use crate::touch::types::Axis;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The two calibration reference points share a coordinate on `axis`.
    DegenerateCalibration { axis: Axis },
    /// `min_touch_pressure` must be strictly above `max_release_pressure`.
    HysteresisCollapsed {
        min_touch_pressure: i16,
        max_release_pressure: i16,
    },
    /// The interrupt re-arm threshold must sit strictly below the press
    /// threshold.
    InvalidThresholds { press: i16, interrupt: i16 },
    EmptyDisplay { width: i16, height: i16 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateCalibration { axis } => write!(
                f,
                "calibration reference points coincide on the {} axis",
                match axis {
                    Axis::X => "x",
                    Axis::Y => "y",
                }
            ),
            Self::HysteresisCollapsed {
                min_touch_pressure,
                max_release_pressure,
            } => write!(
                f,
                "min touch pressure {min_touch_pressure} must exceed max release pressure {max_release_pressure}"
            ),
            Self::InvalidThresholds { press, interrupt } => write!(
                f,
                "interrupt threshold {interrupt} must be below press threshold {press}"
            ),
            Self::EmptyDisplay { width, height } => {
                write!(f, "display extent {width}x{height} is empty")
            }
        }
    }
}

impl core::error::Error for Error {}
