#[cfg(feature = "graphics")]
mod draw;

use heapless::Vec;

use crate::error::Error;

use super::{
    config::CALIBRATION_SAMPLE_CAPACITY,
    mapping::CoordinateMapper,
    types::{CalibrationBounds, PixelPoint, SensorPoint, TouchEventKind, TouchReport},
};

#[cfg(feature = "graphics")]
pub use draw::draw_target_marker;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    UpperLeft,
    LowerRight,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStep {
    /// Nothing to act on.
    Idle,
    /// Contact on the current target; `samples` collected so far.
    Sampling { samples: usize },
    /// The upper-left target was captured; the lower-right one is next.
    Captured { target: PixelPoint, sensor: SensorPoint },
    /// Both targets captured. Preview, then install with
    /// `CoordinateMapper::set_calibration` if acceptable.
    Solved(CalibrationBounds),
    /// The fit failed; the session is back at the upper-left target.
    Rejected(Error),
    /// Released without a usable sample; the same target is asked again.
    Ignored,
}

/// Two-target calibration flow over debounced touch reports.
///
/// Sensor coordinates are collected while the finger is down on a target and
/// averaged when it lifts. The solved bounds are handed back, never applied.
pub struct CalibrationSession {
    mapper: CoordinateMapper,
    targets: (PixelPoint, PixelPoint),
    phase: SessionPhase,
    samples: Vec<SensorPoint, CALIBRATION_SAMPLE_CAPACITY>,
    // A Touch edge was seen for the current target.
    touch_confirmed: bool,
    sensor_ul: Option<SensorPoint>,
}

impl CalibrationSession {
    pub fn new(mapper: &CoordinateMapper, inset_px: i16) -> Self {
        Self {
            mapper: *mapper,
            targets: mapper.reference_points(inset_px),
            phase: SessionPhase::UpperLeft,
            samples: Vec::new(),
            touch_confirmed: false,
            sensor_ul: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn targets(&self) -> (PixelPoint, PixelPoint) {
        self.targets
    }

    /// Pixel position the user should touch now, if any.
    pub fn target(&self) -> Option<PixelPoint> {
        match self.phase {
            SessionPhase::UpperLeft => Some(self.targets.0),
            SessionPhase::LowerRight => Some(self.targets.1),
            SessionPhase::Complete => None,
        }
    }

    pub fn restart(&mut self) {
        self.phase = SessionPhase::UpperLeft;
        self.samples.clear();
        self.touch_confirmed = false;
        self.sensor_ul = None;
    }

    pub fn handle(&mut self, report: &TouchReport) -> SessionStep {
        if self.phase == SessionPhase::Complete {
            return SessionStep::Idle;
        }

        match report.kind {
            TouchEventKind::Touch | TouchEventKind::TouchPresent => {
                if report.kind == TouchEventKind::Touch {
                    self.touch_confirmed = true;
                }
                // Full: the average is already stable, later samples drop.
                if self.samples.push(report.sensor).is_err() {
                    log::trace!("touch: calibration sample buffer full");
                }
                SessionStep::Sampling {
                    samples: self.samples.len(),
                }
            }
            TouchEventKind::Release => self.finish_target(),
            TouchEventKind::NoTouch | TouchEventKind::Uncertain => {
                // A press that lifts before it confirms is a bounce, not a target.
                if !self.touch_confirmed {
                    self.samples.clear();
                }
                SessionStep::Idle
            }
        }
    }

    fn finish_target(&mut self) -> SessionStep {
        self.touch_confirmed = false;
        let Some(sensor) = average(&self.samples) else {
            log::warn!("touch: calibration target released without samples");
            return SessionStep::Ignored;
        };
        self.samples.clear();

        match (self.phase, self.sensor_ul) {
            (SessionPhase::UpperLeft, _) => {
                log::debug!(
                    "touch: calibration upper-left sensor=({}, {})",
                    sensor.x,
                    sensor.y
                );
                self.sensor_ul = Some(sensor);
                self.phase = SessionPhase::LowerRight;
                SessionStep::Captured {
                    target: self.targets.0,
                    sensor,
                }
            }
            (SessionPhase::LowerRight, Some(sensor_ul)) => {
                log::debug!(
                    "touch: calibration lower-right sensor=({}, {})",
                    sensor.x,
                    sensor.y
                );
                let (pixel_ul, pixel_lr) = self.targets;
                match self
                    .mapper
                    .solve_calibration(pixel_ul, pixel_lr, sensor_ul, sensor)
                {
                    Ok(bounds) => {
                        self.phase = SessionPhase::Complete;
                        SessionStep::Solved(bounds)
                    }
                    Err(err) => {
                        log::warn!("touch: calibration rejected err={}", err);
                        self.restart();
                        SessionStep::Rejected(err)
                    }
                }
            }
            _ => {
                self.restart();
                SessionStep::Ignored
            }
        }
    }
}

fn average(points: &[SensorPoint]) -> Option<SensorPoint> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as i32;
    let (sx, sy) = points
        .iter()
        .fold((0i32, 0i32), |(sx, sy), p| (sx + p.x as i32, sy + p.y as i32));
    Some(SensorPoint::new((sx / n) as i16, (sy / n) as i16))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch::types::Rotation;
    use std::vec::Vec;

    fn report(kind: TouchEventKind, sensor: SensorPoint) -> TouchReport {
        TouchReport {
            kind,
            pixel: PixelPoint::default(),
            pressure: if kind.is_contact() { 600 } else { 0 },
            sensor,
        }
    }

    fn tap(session: &mut CalibrationSession, sensor: SensorPoint) -> Vec<SessionStep> {
        let mut steps = Vec::new();
        steps.push(session.handle(&report(TouchEventKind::TouchPresent, sensor)));
        steps.push(session.handle(&report(TouchEventKind::Touch, sensor)));
        steps.push(session.handle(&report(TouchEventKind::TouchPresent, sensor)));
        steps.push(session.handle(&report(TouchEventKind::NoTouch, sensor)));
        steps.push(session.handle(&report(TouchEventKind::Release, sensor)));
        steps
    }

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(320, 240, Rotation::Landscape).expect("valid extents")
    }

    #[test]
    fn two_taps_solve_to_the_current_calibration() {
        let m = mapper();
        let mut session = CalibrationSession::new(&m, 10);
        let (pul, plr) = session.targets();
        assert_eq!(session.target(), Some(pul));

        let steps = tap(&mut session, m.to_sensor(pul));
        assert_eq!(steps[2], SessionStep::Sampling { samples: 3 });
        assert_eq!(steps[3], SessionStep::Idle);
        assert_eq!(
            steps[4],
            SessionStep::Captured {
                target: pul,
                sensor: m.to_sensor(pul)
            }
        );
        assert_eq!(session.phase(), SessionPhase::LowerRight);
        assert_eq!(session.target(), Some(plr));

        let steps = tap(&mut session, m.to_sensor(plr));
        let SessionStep::Solved(bounds) = steps[4] else {
            panic!("expected a solved calibration, got {:?}", steps[4]);
        };
        let expected = m.calibration();
        assert!((bounds.ul_x - expected.ul_x).abs() <= 3);
        assert!((bounds.lr_y - expected.lr_y).abs() <= 3);
        assert_eq!(session.phase(), SessionPhase::Complete);
        assert_eq!(session.target(), None);

        // Solving never installs the result.
        assert_eq!(m.calibration(), expected);
        assert_eq!(
            session.handle(&report(TouchEventKind::Touch, SensorPoint::default())),
            SessionStep::Idle
        );
    }

    #[test]
    fn samples_are_averaged() {
        let mut session = CalibrationSession::new(&mapper(), 10);
        session.handle(&report(TouchEventKind::TouchPresent, SensorPoint::new(3700, 3600)));
        session.handle(&report(TouchEventKind::Touch, SensorPoint::new(3710, 3620)));
        let step = session.handle(&report(TouchEventKind::Release, SensorPoint::new(0, 0)));
        let SessionStep::Captured { sensor, .. } = step else {
            panic!("expected capture, got {step:?}");
        };
        assert_eq!(sensor, SensorPoint::new(3705, 3610));
    }

    #[test]
    fn sample_buffer_is_bounded() {
        let mut session = CalibrationSession::new(&mapper(), 10);
        let mut last = SessionStep::Idle;
        for _ in 0..(CALIBRATION_SAMPLE_CAPACITY + 5) {
            last = session.handle(&report(TouchEventKind::TouchPresent, SensorPoint::new(1, 1)));
        }
        assert_eq!(
            last,
            SessionStep::Sampling {
                samples: CALIBRATION_SAMPLE_CAPACITY
            }
        );
    }

    #[test]
    fn bounce_before_a_tap_is_not_averaged_in() {
        let mut session = CalibrationSession::new(&mapper(), 10);
        session.handle(&report(TouchEventKind::TouchPresent, SensorPoint::new(1000, 1000)));
        session.handle(&report(TouchEventKind::NoTouch, SensorPoint::new(1000, 1000)));

        let steps = tap(&mut session, SensorPoint::new(3700, 3700));
        assert_eq!(steps[0], SessionStep::Sampling { samples: 1 });
        assert_eq!(
            steps[4],
            SessionStep::Captured {
                target: session.targets().0,
                sensor: SensorPoint::new(3700, 3700)
            }
        );
    }

    #[test]
    fn band_reading_after_touch_keeps_samples() {
        let mut session = CalibrationSession::new(&mapper(), 10);
        session.handle(&report(TouchEventKind::Touch, SensorPoint::new(3600, 3500)));
        session.handle(&report(TouchEventKind::Uncertain, SensorPoint::new(3600, 3500)));
        let step = session.handle(&report(TouchEventKind::Release, SensorPoint::default()));
        assert_eq!(
            step,
            SessionStep::Captured {
                target: session.targets().0,
                sensor: SensorPoint::new(3600, 3500)
            }
        );
    }

    #[test]
    fn release_without_samples_is_ignored() {
        let mut session = CalibrationSession::new(&mapper(), 10);
        assert_eq!(
            session.handle(&report(TouchEventKind::Release, SensorPoint::default())),
            SessionStep::Ignored
        );
        assert_eq!(session.phase(), SessionPhase::UpperLeft);
    }

    #[test]
    fn degenerate_targets_reject_and_restart() {
        // A one-pixel panel puts both targets on the same pixel.
        let m = CoordinateMapper::new(1, 1, Rotation::Landscape).expect("valid extents");
        let mut session = CalibrationSession::new(&m, 0);
        let (pul, plr) = session.targets();
        assert_eq!(pul, plr);

        tap(&mut session, SensorPoint::new(3000, 3000));
        let steps = tap(&mut session, SensorPoint::new(500, 500));
        assert!(matches!(steps[4], SessionStep::Rejected(Error::DegenerateCalibration { .. })));
        assert_eq!(session.phase(), SessionPhase::UpperLeft);
    }

    #[test]
    fn restart_discards_progress() {
        let mut session = CalibrationSession::new(&mapper(), 10);
        tap(&mut session, SensorPoint::new(3700, 3700));
        session.handle(&report(TouchEventKind::Touch, SensorPoint::new(400, 400)));
        session.restart();
        assert_eq!(session.phase(), SessionPhase::UpperLeft);
        assert_eq!(
            session.handle(&report(TouchEventKind::Release, SensorPoint::default())),
            SessionStep::Ignored
        );
    }
}
