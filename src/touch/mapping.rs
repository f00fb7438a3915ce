use crate::{error::Error, platform::DisplayGeometry};

use super::{
    calibration,
    config::{CAL_LR_LONG, CAL_LR_SHORT, CAL_OFFSET, CAL_UL_LONG, CAL_UL_SHORT},
    types::{CalibrationBounds, PixelPoint, Rotation, SensorPoint},
};

/// Per-axis affine map between sensor space and pixel space.
///
/// Results are never clamped: a sensor value outside the calibration bounds
/// extrapolates to a pixel outside the panel and is returned as such.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinateMapper {
    pixels_x: i16,
    pixels_y: i16,
    rotation: Rotation,
    bounds: CalibrationBounds,
}

impl CoordinateMapper {
    /// Captures the panel extents and seeds the rotation's default
    /// calibration.
    pub fn new(pixel_width: i16, pixel_height: i16, rotation: Rotation) -> Result<Self, Error> {
        if pixel_width <= 0 || pixel_height <= 0 {
            return Err(Error::EmptyDisplay {
                width: pixel_width,
                height: pixel_height,
            });
        }
        Ok(Self {
            pixels_x: pixel_width,
            pixels_y: pixel_height,
            rotation,
            bounds: default_bounds(rotation),
        })
    }

    pub fn from_display<D: DisplayGeometry + ?Sized>(display: &D) -> Result<Self, Error> {
        Self::new(display.pixel_width(), display.pixel_height(), display.rotation())
    }

    pub fn pixel_width(&self) -> i16 {
        self.pixels_x
    }

    pub fn pixel_height(&self) -> i16 {
        self.pixels_y
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn calibration(&self) -> CalibrationBounds {
        self.bounds
    }

    /// No validation: degenerate or mirrored bounds are the caller's call.
    pub fn set_calibration(&mut self, bounds: CalibrationBounds) {
        self.bounds = bounds;
    }

    pub fn reset_calibration(&mut self) {
        self.bounds = default_bounds(self.rotation);
    }

    pub fn to_pixel(&self, sensor: SensorPoint) -> PixelPoint {
        PixelPoint {
            x: sensor_to_pixel(sensor.x, self.bounds.ul_x, self.bounds.lr_x, self.pixels_x),
            y: sensor_to_pixel(sensor.y, self.bounds.ul_y, self.bounds.lr_y, self.pixels_y),
        }
    }

    pub fn to_sensor(&self, pixel: PixelPoint) -> SensorPoint {
        SensorPoint {
            x: pixel_to_sensor(pixel.x, self.bounds.ul_x, self.bounds.lr_x, self.pixels_x),
            y: pixel_to_sensor(pixel.y, self.bounds.ul_y, self.bounds.lr_y, self.pixels_y),
        }
    }

    /// Calibration targets inset `pixel_offset` from the upper-left and
    /// lower-right corners.
    pub fn reference_points(&self, pixel_offset: i16) -> (PixelPoint, PixelPoint) {
        (
            PixelPoint::new(pixel_offset, pixel_offset),
            PixelPoint::new(
                self.pixels_x
                    .saturating_sub(pixel_offset)
                    .saturating_sub(1),
                self.pixels_y
                    .saturating_sub(pixel_offset)
                    .saturating_sub(1),
            ),
        )
    }

    /// Fits new bounds through two measured correspondences. The result is
    /// only returned; install it with [`Self::set_calibration`].
    pub fn solve_calibration(
        &self,
        pixel_ul: PixelPoint,
        pixel_lr: PixelPoint,
        sensor_ul: SensorPoint,
        sensor_lr: SensorPoint,
    ) -> Result<CalibrationBounds, Error> {
        calibration::solve(
            (self.pixels_x, self.pixels_y),
            pixel_ul,
            pixel_lr,
            sensor_ul,
            sensor_lr,
        )
    }
}

/// Rotation-dependent starting calibration. The sensor reads largest at the
/// display's upper-left whatever the rotation; the offset flips the axes the
/// controller reports mirrored.
pub fn default_bounds(rotation: Rotation) -> CalibrationBounds {
    match rotation {
        Rotation::Portrait => CalibrationBounds::new(
            CAL_OFFSET - CAL_LR_SHORT,
            CAL_OFFSET - CAL_LR_LONG,
            CAL_OFFSET - CAL_UL_SHORT,
            CAL_OFFSET - CAL_UL_LONG,
        ),
        Rotation::Landscape => CalibrationBounds::new(
            CAL_OFFSET - CAL_LR_SHORT,
            CAL_UL_SHORT,
            CAL_OFFSET - CAL_UL_SHORT,
            CAL_LR_SHORT,
        ),
        Rotation::PortraitFlipped => {
            CalibrationBounds::new(CAL_UL_SHORT, CAL_UL_SHORT, CAL_LR_SHORT, CAL_LR_SHORT)
        }
        Rotation::LandscapeFlipped => CalibrationBounds::new(
            CAL_UL_SHORT,
            CAL_OFFSET - CAL_LR_LONG,
            CAL_LR_SHORT,
            CAL_OFFSET - CAL_UL_LONG,
        ),
    }
}

fn sensor_to_pixel(value: i16, ul: i16, lr: i16, pixels: i16) -> i16 {
    let num = (value as i64 - ul as i64) * pixels as i64;
    let den = lr as i64 - ul as i64;
    saturate_i16(div_round(num, den))
}

fn pixel_to_sensor(value: i16, ul: i16, lr: i16, pixels: i16) -> i16 {
    let num = value as i64 * (lr as i64 - ul as i64);
    saturate_i16(ul as i64 + div_round(num, pixels as i64))
}

/// Rounds half away from zero. A zero divisor yields 0 rather than a panic;
/// only hand-installed degenerate bounds can get here.
pub(crate) fn div_round(num: i64, den: i64) -> i64 {
    if den == 0 {
        return 0;
    }
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    if num >= 0 {
        (num + den / 2) / den
    } else {
        (num - den / 2) / den
    }
}

pub(crate) fn saturate_i16(value: i64) -> i16 {
    value.clamp(i16::MIN as i64, i16::MAX as i64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PanelGeometry;

    fn mapper(rotation: Rotation) -> CoordinateMapper {
        let (w, h) = match rotation {
            Rotation::Portrait | Rotation::PortraitFlipped => (240, 320),
            Rotation::Landscape | Rotation::LandscapeFlipped => (320, 240),
        };
        CoordinateMapper::new(w, h, rotation).expect("valid extents")
    }

    #[test]
    fn rotation_seeds_match_the_factory_table() {
        assert_eq!(
            default_bounds(Rotation::PortraitFlipped),
            CalibrationBounds::new(3800, 3800, 275, 275)
        );
        assert_eq!(
            default_bounds(Rotation::Portrait),
            CalibrationBounds::new(3820, 3930, 295, 395)
        );
        assert_eq!(
            default_bounds(Rotation::Landscape),
            CalibrationBounds::new(3820, 3800, 295, 275)
        );
        assert_eq!(
            default_bounds(Rotation::LandscapeFlipped),
            CalibrationBounds::new(3800, 3930, 275, 395)
        );
        for n in 0..4 {
            assert!(default_bounds(Rotation::from_index(n)).is_native_orientation());
        }
    }

    #[test]
    fn reference_points_are_inset_from_corners() {
        let m = CoordinateMapper::from_display(&PanelGeometry::new(320, 240, Rotation::Landscape))
            .expect("valid extents");
        let (ul, lr) = m.reference_points(10);
        assert_eq!(ul, PixelPoint::new(10, 10));
        assert_eq!(lr, PixelPoint::new(309, 229));
    }

    #[test]
    fn bounds_map_to_the_panel_corners() {
        let m = mapper(Rotation::PortraitFlipped);
        let b = m.calibration();
        assert_eq!(m.to_pixel(SensorPoint::new(b.ul_x, b.ul_y)), PixelPoint::new(0, 0));
        assert_eq!(
            m.to_pixel(SensorPoint::new(b.lr_x, b.lr_y)),
            PixelPoint::new(240, 320)
        );
        assert_eq!(m.to_sensor(PixelPoint::new(0, 0)), SensorPoint::new(3800, 3800));
        assert_eq!(m.to_sensor(PixelPoint::new(240, 320)), SensorPoint::new(275, 275));
    }

    #[test]
    fn out_of_bounds_sensor_values_extrapolate() {
        let m = mapper(Rotation::PortraitFlipped);
        let p = m.to_pixel(SensorPoint::new(4095, 0));
        assert!(p.x < 0);
        assert!(p.y > 320);
        assert!(!p.is_within(m.pixel_width(), m.pixel_height()));
    }

    #[test]
    fn pixel_round_trip_is_exact_within_one() {
        for n in 0..4 {
            let m = mapper(Rotation::from_index(n));
            for x in (0..m.pixel_width()).step_by(7) {
                for y in (0..m.pixel_height()).step_by(11) {
                    let back = m.to_pixel(m.to_sensor(PixelPoint::new(x, y)));
                    assert!((back.x - x).abs() <= 1, "x {x} -> {}", back.x);
                    assert!((back.y - y).abs() <= 1, "y {y} -> {}", back.y);
                }
            }
        }
    }

    #[test]
    fn sensor_round_trip_is_within_one_pixel_step() {
        let m = mapper(Rotation::Landscape);
        let b = m.calibration();
        // One pixel spans this many sensor units on each axis, rounded up.
        let step_x = ((b.ul_x - b.lr_x) as i32 + m.pixel_width() as i32 - 1) / m.pixel_width() as i32;
        let step_y =
            ((b.ul_y - b.lr_y) as i32 + m.pixel_height() as i32 - 1) / m.pixel_height() as i32;

        for sx in (300..3800).step_by(97) {
            for sy in (300..3800).step_by(89) {
                let back = m.to_sensor(m.to_pixel(SensorPoint::new(sx, sy)));
                assert!((back.x as i32 - sx as i32).abs() <= step_x, "x {sx} -> {}", back.x);
                assert!((back.y as i32 - sy as i32).abs() <= step_y, "y {sy} -> {}", back.y);
            }
        }
    }

    #[test]
    fn degenerate_bounds_do_not_panic() {
        let mut m = mapper(Rotation::Landscape);
        m.set_calibration(CalibrationBounds::new(1000, 1000, 1000, 1000));
        assert_eq!(m.to_pixel(SensorPoint::new(5, 4000)), PixelPoint::new(0, 0));
        assert_eq!(m.to_sensor(PixelPoint::new(100, 100)), SensorPoint::new(1000, 1000));
    }

    #[test]
    fn extreme_inputs_saturate() {
        let mut m = mapper(Rotation::Landscape);
        m.set_calibration(CalibrationBounds::new(1, 1, 0, 0));
        let p = m.to_pixel(SensorPoint::new(i16::MIN, i16::MAX));
        assert_eq!(p, PixelPoint::new(i16::MAX, i16::MIN));
    }

    #[test]
    fn empty_display_is_rejected() {
        assert_eq!(
            CoordinateMapper::new(0, 240, Rotation::Landscape),
            Err(Error::EmptyDisplay {
                width: 0,
                height: 240
            })
        );
    }

    #[test]
    fn div_round_rounds_half_away_from_zero() {
        assert_eq!(div_round(5, 2), 3);
        assert_eq!(div_round(-5, 2), -3);
        assert_eq!(div_round(5, -2), -3);
        assert_eq!(div_round(4, 3), 1);
        assert_eq!(div_round(7, 0), 0);
    }
}
