pub mod calibration;
pub mod config;
pub mod core;
pub mod mapping;
pub mod normalize;
pub mod types;
pub mod wizard;

use crate::{
    error::Error,
    platform::{Clock, DisplayGeometry, SensorTransport},
};

use self::{
    config::DebounceConfig,
    core::DebounceStateMachine,
    mapping::CoordinateMapper,
    normalize::RawSampleFilter,
    types::{CalibrationBounds, PixelPoint, SensorPoint, TouchReport},
};

/// A resistive touch panel paired with the display it sits on.
///
/// Each [`poll_touch_event`](Self::poll_touch_event) reads the transport
/// once (unless the last press is still settling), debounces the pressure
/// and maps the settled coordinate into pixel space.
pub struct TouchScreen<T, C> {
    transport: T,
    clock: C,
    filter: RawSampleFilter,
    debouncer: DebounceStateMachine,
    mapper: CoordinateMapper,
}

impl<T, C> TouchScreen<T, C>
where
    T: SensorTransport,
    C: Clock,
{
    /// Sizes the mapper from `display`, seeds the rotation's default
    /// calibration, reads the transport in the same rotation and starts
    /// the debounce timer now.
    pub fn new<D>(transport: T, clock: C, display: &D) -> Result<Self, Error>
    where
        D: DisplayGeometry + ?Sized,
    {
        let mapper = CoordinateMapper::from_display(display)?;
        let mut filter = RawSampleFilter::default();
        filter.set_rotation(mapper.rotation());
        let debouncer = DebounceStateMachine::new(DebounceConfig::default(), clock.now_ms())?;

        log::info!(
            "touch: init {}x{} rotation={}",
            mapper.pixel_width(),
            mapper.pixel_height(),
            mapper.rotation().index()
        );

        Ok(Self {
            transport,
            clock,
            filter,
            debouncer,
            mapper,
        })
    }

    pub fn poll_touch_event(&mut self) -> TouchReport {
        let now_ms = self.clock.now_ms();
        let sample = self.filter.poll_raw(now_ms, &mut self.transport);
        let kind = self.debouncer.poll(now_ms, sample.pressure);
        let sensor = sample.point();
        TouchReport {
            kind,
            pixel: self.mapper.to_pixel(sensor),
            pressure: sample.pressure,
            sensor,
        }
    }

    pub fn map_sensor_to_pixel(&self, sensor: SensorPoint) -> PixelPoint {
        self.mapper.to_pixel(sensor)
    }

    pub fn map_pixel_to_sensor(&self, pixel: PixelPoint) -> SensorPoint {
        self.mapper.to_sensor(pixel)
    }

    pub fn calibration(&self) -> CalibrationBounds {
        self.mapper.calibration()
    }

    pub fn set_calibration(&mut self, bounds: CalibrationBounds) {
        log::info!(
            "touch: calibration ul=({}, {}) lr=({}, {})",
            bounds.ul_x,
            bounds.ul_y,
            bounds.lr_x,
            bounds.lr_y
        );
        if bounds.is_degenerate() {
            log::warn!("touch: degenerate calibration installed");
        }
        self.mapper.set_calibration(bounds);
    }

    pub fn reference_points(&self, pixel_offset: i16) -> (PixelPoint, PixelPoint) {
        self.mapper.reference_points(pixel_offset)
    }

    pub fn solve_calibration(
        &self,
        pixel_ul: PixelPoint,
        pixel_lr: PixelPoint,
        sensor_ul: SensorPoint,
        sensor_lr: SensorPoint,
    ) -> Result<CalibrationBounds, Error> {
        self.mapper
            .solve_calibration(pixel_ul, pixel_lr, sensor_ul, sensor_lr)
    }

    pub fn set_touch_release_params(
        &mut self,
        debounce_ms: u32,
        min_touch_pressure: i16,
        max_release_pressure: i16,
    ) -> Result<(), Error> {
        self.debouncer.set_config(DebounceConfig {
            debounce_ms,
            min_touch_pressure,
            max_release_pressure,
        })
    }

    pub fn set_thresholds(&mut self, press: i16, interrupt: i16) -> Result<(), Error> {
        self.filter.set_thresholds(press, interrupt).inspect_err(|err| {
            log::warn!("touch: thresholds rejected err={}", err);
        })
    }

    pub fn is_settling(&self) -> bool {
        self.filter.is_settling(self.clock.now_ms())
    }

    pub fn note_interrupt(&mut self) {
        self.filter.note_interrupt();
    }

    pub fn interrupt_pending(&self) -> bool {
        self.filter.interrupt_pending()
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn debouncer(&self) -> &DebounceStateMachine {
        &self.debouncer
    }

    pub fn filter(&self) -> &RawSampleFilter {
        &self.filter
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn release(self) -> (T, C) {
        (self.transport, self.clock)
    }
}
