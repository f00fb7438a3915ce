#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_DEBOUNCE_MS: u32 = 20;
pub const DEFAULT_MIN_TOUCH_PRESSURE: i16 = 5;
pub const DEFAULT_MAX_RELEASE_PRESSURE: i16 = 0;

// Controller-side pressure gates. Below the press threshold a conversion is
// treated as idle; below the interrupt threshold the pen IRQ flag re-arms.
pub const DEFAULT_PRESS_THRESHOLD: i16 = 400;
pub const DEFAULT_INTERRUPT_THRESHOLD: i16 = 75;
// A press younger than this may still be moving.
pub const DEFAULT_SETTLE_MS: u32 = 3;

pub const ADC_FULL_SCALE: i16 = 4095;

// Factory-ish calibration seeds. SHORT/LONG name the physically shorter and
// longer panel axis; the rotation decides which pixel axis each lands on.
pub const CAL_UL_SHORT: i16 = 3800;
pub const CAL_UL_LONG: i16 = 3700;
pub const CAL_LR_SHORT: i16 = 275;
pub const CAL_LR_LONG: i16 = 165;
pub const CAL_OFFSET: i16 = ADC_FULL_SCALE;

pub const DEFAULT_REFERENCE_INSET_PX: i16 = 10;
pub const CALIBRATION_SAMPLE_CAPACITY: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DebounceConfig {
    pub debounce_ms: u32,
    pub min_touch_pressure: i16,
    pub max_release_pressure: i16,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min_touch_pressure: DEFAULT_MIN_TOUCH_PRESSURE,
            max_release_pressure: DEFAULT_MAX_RELEASE_PRESSURE,
        }
    }
}

impl DebounceConfig {
    pub fn new(
        debounce_ms: u32,
        min_touch_pressure: i16,
        max_release_pressure: i16,
    ) -> Result<Self, Error> {
        let config = Self {
            debounce_ms,
            min_touch_pressure,
            max_release_pressure,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects a collapsed hysteresis band. Fields are public, so a config
    /// built by hand is checked again wherever it is installed.
    pub fn validate(&self) -> Result<(), Error> {
        if self.min_touch_pressure <= self.max_release_pressure {
            return Err(Error::HysteresisCollapsed {
                min_touch_pressure: self.min_touch_pressure,
                max_release_pressure: self.max_release_pressure,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterConfig {
    pub press_threshold: i16,
    pub interrupt_threshold: i16,
    pub settle_ms: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            press_threshold: DEFAULT_PRESS_THRESHOLD,
            interrupt_threshold: DEFAULT_INTERRUPT_THRESHOLD,
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }
}

impl FilterConfig {
    pub fn new(press_threshold: i16, interrupt_threshold: i16, settle_ms: u32) -> Result<Self, Error> {
        let config = Self {
            press_threshold,
            interrupt_threshold,
            settle_ms,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.interrupt_threshold >= self.press_threshold {
            return Err(Error::InvalidThresholds {
                press: self.press_threshold,
                interrupt: self.interrupt_threshold,
            });
        }
        Ok(())
    }
}
