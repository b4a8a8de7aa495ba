use serde::{Deserialize, Serialize};

/// Behavioural states of a widget instance. Exactly one is active at any
/// instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    /// Ready for activation. The only state that accepts a new trigger.
    Idle,
    /// Indeterminate wait (spinner), entered on activation in spinner mode.
    Loading,
    /// Determinate wait, driven by externally reported progress values.
    Progress,
    /// The cycle finished; shown briefly before returning to idle.
    Success,
    /// The wrapped action failed; shown briefly before returning to idle.
    Error,
}

impl Default for ButtonState {
    fn default() -> Self {
        ButtonState::Idle
    }
}

/// Which branch activation takes out of idle, fixed for the lifetime of one
/// instance. Spinner-mode cycles complete when the wrapped action resolves;
/// progress-mode cycles complete when the reported value reaches 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Spinner,
    Progress,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Spinner
    }
}

/// Everything the presentation adapter needs to render.
///
/// `progress` is meaningful in the progress state, holds its terminal value
/// through success, stays frozen at the last reported value through error,
/// and resets to 0 on every return to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: ButtonState,
    pub progress: u8,
}

impl Snapshot {
    pub fn idle() -> Self {
        Self {
            state: ButtonState::Idle,
            progress: 0,
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::idle()
    }
}
