use crate::error::Error;

use super::{
    mapping::{div_round, saturate_i16},
    types::{Axis, CalibrationBounds, PixelPoint, SensorPoint},
};

/// Fits the per-axis affine map through two (pixel, sensor) correspondences
/// and extrapolates it to pixel `(0, 0)` and `(width, height)`.
///
/// Reference points that share a coordinate on either axis leave that axis
/// underdetermined and are rejected before any division happens.
pub fn solve(
    (pixels_x, pixels_y): (i16, i16),
    pixel_ul: PixelPoint,
    pixel_lr: PixelPoint,
    sensor_ul: SensorPoint,
    sensor_lr: SensorPoint,
) -> Result<CalibrationBounds, Error> {
    if pixel_ul.x == pixel_lr.x {
        return Err(Error::DegenerateCalibration { axis: Axis::X });
    }
    if pixel_ul.y == pixel_lr.y {
        return Err(Error::DegenerateCalibration { axis: Axis::Y });
    }

    let (ul_x, lr_x) = solve_axis(pixels_x, pixel_ul.x, pixel_lr.x, sensor_ul.x, sensor_lr.x);
    let (ul_y, lr_y) = solve_axis(pixels_y, pixel_ul.y, pixel_lr.y, sensor_ul.y, sensor_lr.y);
    Ok(CalibrationBounds::new(ul_x, ul_y, lr_x, lr_y))
}

/// Sensor values at pixel 0 and at `pixels` on one axis. The slope stays a
/// ratio until the final rounding division.
fn solve_axis(pixels: i16, p_ul: i16, p_lr: i16, s_ul: i16, s_lr: i16) -> (i16, i16) {
    let ds = s_lr as i64 - s_ul as i64;
    let dp = p_lr as i64 - p_ul as i64;
    let at = |pixel: i64| s_ul as i64 + div_round((pixel - p_ul as i64) * ds, dp);
    (saturate_i16(at(0)), saturate_i16(at(pixels as i64)))
}
