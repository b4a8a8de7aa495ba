use statebtn_core::config::Config;
use statebtn_core::state::{ButtonState, Mode, Snapshot};
use std::time::{Duration, Instant};
use tracing::debug;

/// Per-instance behavioural phases. The timed phases carry their entry
/// timestamp; external reads flatten to [`ButtonState`] via [`Machine::state`].
#[derive(Debug, Clone, PartialEq)]
enum Phase {
    /// Ready for activation.
    Idle,
    /// Indeterminate wait; the wrapped action's resolution finishes the cycle.
    Loading,
    /// Determinate wait; a reported value of 100 finishes the cycle.
    Progress,
    /// Success feedback is visible, awaiting the idle-return timer.
    Success { entered: Instant },
    /// Error feedback is visible, awaiting the idle-return timer.
    Error { entered: Instant },
}

/// Events delivered to the machine, one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// User activation.
    Trigger,
    /// Externally computed progress value.
    Report(i32),
    /// The wrapped action resolved.
    Finish,
    /// The wrapped action failed.
    Fail,
}

/// Effects the machine wants the caller to perform after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Success was entered; fire the completion callback.
    Complete,
    /// State or progress changed; the presentation adapter should re-render.
    Render,
}

pub struct Machine {
    phase: Phase,
    progress: u8,
    mode: Mode,
    idle_return: Duration,
}

impl Machine {
    pub fn new(config: &Config) -> Self {
        Self {
            phase: Phase::Idle,
            progress: 0,
            mode: config.button.mode,
            idle_return: Duration::from_millis(config.button.idle_return_ms),
        }
    }

    pub fn state(&self) -> ButtonState {
        match self.phase {
            Phase::Idle => ButtonState::Idle,
            Phase::Loading => ButtonState::Loading,
            Phase::Progress => ButtonState::Progress,
            Phase::Success { .. } => ButtonState::Success,
            Phase::Error { .. } => ButtonState::Error,
        }
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state(),
            progress: self.progress,
        }
    }

    /// Process one event, returning effects for the caller. Events not
    /// accepted by the current phase are ignored.
    pub fn handle_event(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Trigger => self.handle_trigger(),
            Event::Report(value) => self.handle_report(value),
            Event::Finish => self.handle_finish(),
            Event::Fail => self.handle_fail(),
        }
    }

    fn handle_trigger(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Idle {
            debug!(state = ?self.state(), "trigger ignored outside idle");
            return Vec::new();
        }
        match self.mode {
            Mode::Spinner => {
                self.phase = Phase::Loading;
            }
            Mode::Progress => {
                self.progress = 0;
                self.phase = Phase::Progress;
            }
        }
        vec![Effect::Render]
    }

    fn handle_report(&mut self, value: i32) -> Vec<Effect> {
        if self.phase != Phase::Progress {
            debug!(state = ?self.state(), value, "progress report ignored");
            return Vec::new();
        }
        let clamped = value.clamp(0, 100) as u8;
        if i32::from(clamped) != value {
            debug!(value, clamped, "out-of-range progress value clamped");
        }
        // Regression is accepted: last write wins.
        self.progress = clamped;
        if clamped >= 100 {
            self.phase = Phase::Success {
                entered: Instant::now(),
            };
            vec![Effect::Complete, Effect::Render]
        } else {
            vec![Effect::Render]
        }
    }

    fn handle_finish(&mut self) -> Vec<Effect> {
        // Only meaningful while the spinner is shown. A progress-mode cycle
        // completes when the reported value reaches 100, not when the
        // wrapped action resolves.
        if self.phase != Phase::Loading {
            debug!(state = ?self.state(), "finish ignored");
            return Vec::new();
        }
        self.phase = Phase::Success {
            entered: Instant::now(),
        };
        vec![Effect::Complete, Effect::Render]
    }

    fn handle_fail(&mut self) -> Vec<Effect> {
        match self.phase {
            Phase::Loading | Phase::Progress => {
                self.phase = Phase::Error {
                    entered: Instant::now(),
                };
                // The last reported progress value stays frozen while the
                // error feedback is visible.
                vec![Effect::Render]
            }
            _ => {
                debug!(state = ?self.state(), "fail ignored");
                Vec::new()
            }
        }
    }

    /// Perform the timed return to idle if the feedback delay has elapsed.
    pub fn check_timer(&mut self) -> Vec<Effect> {
        match &self.phase {
            Phase::Success { entered } | Phase::Error { entered } => {
                if entered.elapsed() >= self.idle_return {
                    debug!(state = ?self.state(), "feedback delay elapsed, returning to idle");
                    self.progress = 0;
                    self.phase = Phase::Idle;
                    vec![Effect::Render]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    /// Return the next `Instant` at which `check_timer()` needs to run, or
    /// `None` if no timed transition is pending. Leaving a timed phase drops
    /// its deadline, so a stale timer can never fire.
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.phase {
            Phase::Success { entered } | Phase::Error { entered } => {
                Some(*entered + self.idle_return)
            }
            _ => None,
        }
    }
}
