use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::error::Error;

use super::{config::DebounceConfig, types::TouchEventKind};

#[derive(Clone, Copy, Debug)]
enum DebounceHsmEvent {
    Pressure { now_ms: u32, pressure: i16 },
    Configure(DebounceConfig),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reading {
    Touch,
    NoTouch,
    /// Between the release and touch thresholds.
    Band,
}

#[derive(Clone, Copy, Debug, Default)]
struct DispatchContext {
    output: Option<TouchEventKind>,
}

impl DispatchContext {
    fn emit(&mut self, kind: TouchEventKind) {
        self.output = Some(kind);
    }
}

/// Debounces pressure readings into level states and one-shot
/// touch/release edges.
///
/// A change of classification has to persist for `debounce_ms`, measured
/// from the last poll that agreed with the confirmed state, before the edge
/// fires. Edges strictly alternate, starting from a confirmed "no touch".
pub struct DebounceStateMachine {
    machine: statig::blocking::StateMachine<DebounceHsm>,
}

impl DebounceStateMachine {
    /// Starts confirmed as "no touch" with the dwell timer running from
    /// `now_ms`.
    pub fn new(config: DebounceConfig, now_ms: u32) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            machine: DebounceHsm::new(config, now_ms).state_machine(),
        })
    }

    pub fn poll(&mut self, now_ms: u32, pressure: i16) -> TouchEventKind {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(
            &DebounceHsmEvent::Pressure { now_ms, pressure },
            &mut context,
        );
        context.output.unwrap_or(TouchEventKind::Uncertain)
    }

    /// Swaps thresholds and dwell time without touching the confirmed state
    /// or the running timer. A rejected config leaves the old one in place.
    pub fn set_config(&mut self, config: DebounceConfig) -> Result<(), Error> {
        if let Err(err) = config.validate() {
            log::warn!("touch: debounce config rejected: {}", err);
            return Err(err);
        }
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&DebounceHsmEvent::Configure(config), &mut context);
        Ok(())
    }

    pub fn config(&self) -> DebounceConfig {
        self.machine.inner().config
    }

    /// Last confirmed state, ignoring any pending transition.
    pub fn is_touched(&self) -> bool {
        self.machine.inner().touched
    }
}

struct DebounceHsm {
    config: DebounceConfig,
    timer_start_ms: u32,
    touched: bool,
}

impl DebounceHsm {
    fn new(config: DebounceConfig, now_ms: u32) -> Self {
        Self {
            config,
            timer_start_ms: now_ms,
            touched: false,
        }
    }

    fn classify(&self, pressure: i16) -> Reading {
        if pressure >= self.config.min_touch_pressure {
            Reading::Touch
        } else if pressure <= self.config.max_release_pressure {
            Reading::NoTouch
        } else {
            Reading::Band
        }
    }

    fn restart_timer(&mut self, now_ms: u32) {
        self.timer_start_ms = now_ms;
    }

    fn dwell_elapsed(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.timer_start_ms) >= self.config.debounce_ms
    }

    fn confirm(&mut self, context: &mut DispatchContext, now_ms: u32, touched: bool) {
        log::debug!(
            "touch: {} confirmed after {} ms",
            if touched { "touch" } else { "release" },
            now_ms.wrapping_sub(self.timer_start_ms)
        );
        self.touched = touched;
        self.timer_start_ms = now_ms;
        context.emit(if touched {
            TouchEventKind::Touch
        } else {
            TouchEventKind::Release
        });
    }
}

#[state_machine(initial = "State::released()")]
impl DebounceHsm {
    #[state]
    fn released(&mut self, context: &mut DispatchContext, event: &DebounceHsmEvent) -> Outcome<State> {
        match event {
            DebounceHsmEvent::Pressure { now_ms, pressure } => match self.classify(*pressure) {
                Reading::Touch => {
                    if self.dwell_elapsed(*now_ms) {
                        self.confirm(context, *now_ms, true);
                        Transition(State::touched())
                    } else {
                        context.emit(TouchEventKind::TouchPresent);
                        Transition(State::touch_pending())
                    }
                }
                Reading::NoTouch | Reading::Band => {
                    self.restart_timer(*now_ms);
                    context.emit(TouchEventKind::NoTouch);
                    Handled
                }
            },
            DebounceHsmEvent::Configure(config) => {
                self.config = *config;
                Handled
            }
        }
    }

    #[state]
    fn touch_pending(
        &mut self,
        context: &mut DispatchContext,
        event: &DebounceHsmEvent,
    ) -> Outcome<State> {
        match event {
            DebounceHsmEvent::Pressure { now_ms, pressure } => match self.classify(*pressure) {
                Reading::Touch => {
                    if self.dwell_elapsed(*now_ms) {
                        self.confirm(context, *now_ms, true);
                        Transition(State::touched())
                    } else {
                        context.emit(TouchEventKind::TouchPresent);
                        Handled
                    }
                }
                Reading::NoTouch => {
                    self.restart_timer(*now_ms);
                    context.emit(TouchEventKind::NoTouch);
                    Transition(State::released())
                }
                Reading::Band => {
                    // Neither confirms nor refutes the pending touch.
                    self.restart_timer(*now_ms);
                    context.emit(TouchEventKind::Uncertain);
                    Transition(State::released())
                }
            },
            DebounceHsmEvent::Configure(config) => {
                self.config = *config;
                Handled
            }
        }
    }

    #[state]
    fn touched(&mut self, context: &mut DispatchContext, event: &DebounceHsmEvent) -> Outcome<State> {
        match event {
            DebounceHsmEvent::Pressure { now_ms, pressure } => match self.classify(*pressure) {
                Reading::NoTouch => {
                    if self.dwell_elapsed(*now_ms) {
                        self.confirm(context, *now_ms, false);
                        Transition(State::released())
                    } else {
                        context.emit(TouchEventKind::NoTouch);
                        Transition(State::release_pending())
                    }
                }
                Reading::Touch | Reading::Band => {
                    self.restart_timer(*now_ms);
                    context.emit(TouchEventKind::TouchPresent);
                    Handled
                }
            },
            DebounceHsmEvent::Configure(config) => {
                self.config = *config;
                Handled
            }
        }
    }

    #[state]
    fn release_pending(
        &mut self,
        context: &mut DispatchContext,
        event: &DebounceHsmEvent,
    ) -> Outcome<State> {
        match event {
            DebounceHsmEvent::Pressure { now_ms, pressure } => match self.classify(*pressure) {
                Reading::NoTouch => {
                    if self.dwell_elapsed(*now_ms) {
                        self.confirm(context, *now_ms, false);
                        Transition(State::released())
                    } else {
                        context.emit(TouchEventKind::NoTouch);
                        Handled
                    }
                }
                Reading::Touch => {
                    self.restart_timer(*now_ms);
                    context.emit(TouchEventKind::TouchPresent);
                    Transition(State::touched())
                }
                Reading::Band => {
                    self.restart_timer(*now_ms);
                    context.emit(TouchEventKind::Uncertain);
                    Transition(State::touched())
                }
            },
            DebounceHsmEvent::Configure(config) => {
                self.config = *config;
                Handled
            }
        }
    }
}
