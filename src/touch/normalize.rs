use crate::{
    error::Error,
    platform::{SampleBurst, SensorTransport},
};

use super::{
    config::{FilterConfig, ADC_FULL_SCALE},
    types::{Rotation, SensorSample},
};

/// Turns raw controller conversions into one settled [`SensorSample`] per
/// poll.
///
/// Mirrors how the controller's own driver behaves: an idle conversion keeps
/// the last coordinates and reports zero pressure, a press is averaged over
/// the two closest of three conversions per axis and rotated into display
/// orientation, and the transport is left alone for `settle_ms` after each
/// accepted press.
pub struct RawSampleFilter {
    config: FilterConfig,
    rotation: Rotation,
    last: SensorSample,
    last_press_ms: Option<u32>,
    interrupt_pending: bool,
    transport_failed: bool,
}

impl Default for RawSampleFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default(), Rotation::default())
    }
}

impl RawSampleFilter {
    pub fn new(config: FilterConfig, rotation: Rotation) -> Self {
        Self {
            config,
            rotation,
            last: SensorSample::default(),
            last_press_ms: None,
            interrupt_pending: true,
            transport_failed: false,
        }
    }

    pub fn config(&self) -> FilterConfig {
        self.config
    }

    pub fn set_config(&mut self, config: FilterConfig) -> Result<(), Error> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_thresholds(&mut self, press: i16, interrupt: i16) -> Result<(), Error> {
        self.set_config(FilterConfig {
            press_threshold: press,
            interrupt_threshold: interrupt,
            ..self.config
        })
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn last_sample(&self) -> SensorSample {
        self.last
    }

    /// Reads the transport unless a press is still settling, and returns the
    /// current sample. Transport failures read as "no contact".
    pub fn poll_raw<T: SensorTransport>(&mut self, now_ms: u32, transport: &mut T) -> SensorSample {
        if self.is_settling(now_ms) {
            return self.last;
        }

        match transport.read_burst() {
            Ok(burst) => {
                if self.transport_failed {
                    self.transport_failed = false;
                    log::info!("touch: transport recovered");
                }
                self.accept(now_ms, burst)
            }
            Err(err) => {
                // Logged once per outage.
                if !self.transport_failed {
                    self.transport_failed = true;
                    log::warn!("touch: transport read failed err={:?}", err);
                }
                self.last.pressure = 0;
                self.last
            }
        }
    }

    /// True from a failed read until the next successful one.
    pub fn transport_failed(&self) -> bool {
        self.transport_failed
    }

    /// Folds one conversion burst into the filter state.
    pub fn accept(&mut self, now_ms: u32, burst: SampleBurst) -> SensorSample {
        let z = burst_pressure(&burst);
        if z < self.config.press_threshold as i32 {
            self.last.pressure = 0;
            if z < self.config.interrupt_threshold as i32 {
                self.interrupt_pending = false;
            }
            return self.last;
        }

        let x = best_two_average(burst.x);
        let y = best_two_average(burst.y);
        let (x, y) = rotate(self.rotation, x, y);
        self.last = SensorSample {
            x,
            y,
            pressure: z.min(i16::MAX as i32) as i16,
        };
        self.last_press_ms = Some(now_ms);
        self.last
    }

    /// True while the most recent press is younger than `settle_ms`; such a
    /// reading may still be moving.
    pub fn is_settling(&self, now_ms: u32) -> bool {
        self.last_press_ms
            .is_some_and(|t_ms| now_ms.wrapping_sub(t_ms) < self.config.settle_ms)
    }

    pub fn is_touched(&self) -> bool {
        self.last.pressure >= self.config.press_threshold
    }

    /// Call from the pen-IRQ handler. Cleared again once pressure drops
    /// under the interrupt threshold.
    pub fn note_interrupt(&mut self) {
        self.interrupt_pending = true;
    }

    pub fn interrupt_pending(&self) -> bool {
        self.interrupt_pending
    }
}

fn burst_pressure(burst: &SampleBurst) -> i32 {
    burst.z1 as i32 + ADC_FULL_SCALE as i32 - burst.z2 as i32
}

/// Average of the two conversions that agree best; the third is treated as
/// noise.
fn best_two_average(values: [i16; 3]) -> i16 {
    let [a, b, c] = values.map(i32::from);
    let d_ab = (a - b).abs();
    let d_ac = (a - c).abs();
    let d_bc = (b - c).abs();

    let avg = if d_ab <= d_ac && d_ab <= d_bc {
        (a + b) >> 1
    } else if d_ac <= d_ab && d_ac <= d_bc {
        (a + c) >> 1
    } else {
        (b + c) >> 1
    };
    avg as i16
}

fn rotate(rotation: Rotation, x: i16, y: i16) -> (i16, i16) {
    let flip = |v: i16| ADC_FULL_SCALE.wrapping_sub(v);
    match rotation {
        Rotation::Portrait => (flip(y), x),
        Rotation::Landscape => (x, y),
        Rotation::PortraitFlipped => (y, flip(x)),
        Rotation::LandscapeFlipped => (flip(x), flip(y)),
    }
}
