#![cfg_attr(not(test), no_std)]

//! Resistive touch panel support: debounced touch/release detection,
//! sensor-to-pixel mapping and two-point calibration.
//!
//! The hardware is injected through [`platform`]: a [`SensorTransport`]
//! for the controller, a [`Clock`] for debounce timing and a
//! [`DisplayGeometry`] for the panel the touches map onto.

pub mod drivers;
pub mod error;
pub mod platform;
pub mod touch;

pub use error::Error;
pub use platform::{
    Clock, DisplayGeometry, FnClock, ManualClock, PanelGeometry, SampleBurst, SensorTransport,
};
pub use touch::{
    config::{DebounceConfig, FilterConfig},
    core::DebounceStateMachine,
    mapping::CoordinateMapper,
    normalize::RawSampleFilter,
    types::{
        Axis, CalibrationBounds, PixelPoint, Rotation, SensorPoint, SensorSample, TouchEventKind,
        TouchReport,
    },
    wizard::{CalibrationSession, SessionPhase, SessionStep},
    TouchScreen,
};

#[cfg(feature = "embassy-time")]
pub use platform::EmbassyClock;
