//! Runtime for a stateful button widget whose action has an unknown
//! completion time.
//!
//! One [`StatefulButton`] instance owns one state machine driving the
//! idle → loading/progress → success/error → idle cycle. The machine itself
//! is synchronous ([`machine`]); the [`widget`] module wraps it in a
//! per-instance event loop that bridges asynchronous actions, externally
//! reported progress values, and the timed return to idle. The presentation
//! layer renders from [`Snapshot`]s and never touches state directly.

pub mod machine;
mod runner;
pub mod widget;

pub use statebtn_core::config::{ButtonConfig, Config};
pub use statebtn_core::state::{ButtonState, Mode, Snapshot};
pub use widget::StatefulButton;
