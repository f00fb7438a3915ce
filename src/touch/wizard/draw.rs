use embedded_graphics::{
    prelude::*,
    primitives::{Line, PrimitiveStyle},
};

use super::CalibrationSession;
use crate::touch::types::PixelPoint;

/// Draws a "+" of half-width `arm` centred on `center`.
pub fn draw_target_marker<D, C>(
    display: &mut D,
    center: PixelPoint,
    arm: i32,
    color: C,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = C>,
    C: PixelColor,
{
    let c: Point = center.into();
    let style = PrimitiveStyle::with_stroke(color, 1);
    Line::new(Point::new(c.x - arm, c.y), Point::new(c.x + arm, c.y))
        .into_styled(style)
        .draw(display)?;
    Line::new(Point::new(c.x, c.y - arm), Point::new(c.x, c.y + arm))
        .into_styled(style)
        .draw(display)
}

const MARKER_ARM_PX: i32 = 10;

impl CalibrationSession {
    /// Marks the target the user should touch next. Draws nothing once the
    /// session is complete.
    pub fn draw<D, C>(&self, display: &mut D, color: C) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = C>,
        C: PixelColor,
    {
        match self.target() {
            Some(target) => draw_target_marker(display, target, MARKER_ARM_PX, color),
            None => Ok(()),
        }
    }
}
