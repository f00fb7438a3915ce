use core::cell::Cell;

use crate::touch::types::Rotation;

/// Monotonic millisecond time source. Values wrap at `u32::MAX`; consumers
/// compare with `wrapping_sub`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Adapts a bare `Fn() -> u32`, e.g. a HAL's uptime function.
#[derive(Clone, Copy, Debug)]
pub struct FnClock<F>(pub F);

impl<F> Clock for FnClock<F>
where
    F: Fn() -> u32,
{
    fn now_ms(&self) -> u32 {
        (self.0)()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Clock that only moves when told to. Share it by reference between the
/// code under test and the driver loop.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u32>,
}

impl ManualClock {
    pub const fn new(start_ms: u32) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: u32) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: u32) {
        self.now_ms.set(self.now_ms.get().wrapping_add(delta_ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now_ms.get()
    }
}

#[cfg(feature = "embassy-time")]
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy-time")]
impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the wrap the debounce timer expects.
        embassy_time::Instant::now().as_millis() as u32
    }
}

/// One conversion cycle from a resistive touch controller, in its native
/// (unrotated) axes. The three X and Y conversions let the filter drop the
/// outlier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleBurst {
    pub z1: i16,
    pub z2: i16,
    pub x: [i16; 3],
    pub y: [i16; 3],
}

pub trait SensorTransport {
    type Error: core::fmt::Debug;

    fn read_burst(&mut self) -> Result<SampleBurst, Self::Error>;
}

impl<T: SensorTransport + ?Sized> SensorTransport for &mut T {
    type Error = T::Error;

    fn read_burst(&mut self) -> Result<SampleBurst, Self::Error> {
        (**self).read_burst()
    }
}

/// What the mapper needs to know about the panel it maps onto. Read once,
/// when the mapper is built.
pub trait DisplayGeometry {
    fn pixel_width(&self) -> i16;
    fn pixel_height(&self) -> i16;
    fn rotation(&self) -> Rotation;
}

/// Plain-value geometry for callers without a display driver object at hand.
/// `width`/`height` are as seen in `rotation`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelGeometry {
    pub width: i16,
    pub height: i16,
    pub rotation: Rotation,
}

impl PanelGeometry {
    pub const fn new(width: i16, height: i16, rotation: Rotation) -> Self {
        Self {
            width,
            height,
            rotation,
        }
    }
}

impl DisplayGeometry for PanelGeometry {
    fn pixel_width(&self) -> i16 {
        self.width
    }

    fn pixel_height(&self) -> i16 {
        self.height
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_wraps() {
        let clock = ManualClock::new(u32::MAX - 1);
        clock.advance(3);
        assert_eq!(clock.now_ms(), 1);
        let by_ref: &ManualClock = &clock;
        assert_eq!(Clock::now_ms(&by_ref), 1);
    }

    #[test]
    fn closures_are_clocks() {
        let clock = FnClock(|| 42u32);
        assert_eq!(clock.now_ms(), 42);
    }
}
