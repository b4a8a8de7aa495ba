use crate::machine::{Effect, Event, Machine};
use crate::runner::{self, BoxAction, ErrorCallback};
use anyhow::Error;
use statebtn_core::config::Config;
use statebtn_core::state::{ButtonState, Snapshot};
use std::future::Future;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Inputs consumed by the per-instance event loop, one at a time.
pub(crate) enum Command {
    /// User activation carrying the wrapped action.
    Activate {
        action: BoxAction,
        on_error: Option<ErrorCallback>,
    },
    /// Externally computed progress value.
    Report { value: i32 },
    /// The wrapped action resolved.
    Finish,
    /// The wrapped action failed.
    Fail,
}

/// Completion callback, fixed at construction, fired on every entry into
/// the success state.
type CompleteCallback = Box<dyn Fn() + Send>;

/// Handle to one widget instance.
///
/// Every operation is forwarded to a single-consumer event loop, so state
/// transitions for one instance never interleave: a delivered failure takes
/// effect before any later progress report. Reads go through a watch channel
/// and are side-effect free. Dropping the handle tears the instance down and
/// cancels any pending idle-return timer.
pub struct StatefulButton {
    tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<Snapshot>,
    driver: JoinHandle<()>,
}

impl StatefulButton {
    /// Create an instance without a completion callback.
    pub fn new(config: &Config) -> Self {
        Self::spawn(config, None)
    }

    /// Create an instance whose `on_complete` fires exactly once per
    /// successful cycle, at the moment the success state is entered.
    pub fn with_on_complete(config: &Config, on_complete: impl Fn() + Send + 'static) -> Self {
        Self::spawn(config, Some(Box::new(on_complete)))
    }

    fn spawn(config: &Config, on_complete: Option<CompleteCallback>) -> Self {
        let machine = Machine::new(config);
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());
        let weak_tx = tx.downgrade();
        let driver = tokio::spawn(drive(machine, rx, weak_tx, snapshot_tx, on_complete));
        Self {
            tx,
            snapshot_rx,
            driver,
        }
    }

    /// Run `action` through one busy cycle. No-op while the widget is not
    /// idle: the running cycle keeps its action and the new one is dropped
    /// without being invoked. Failures without an error handler are logged.
    pub fn activate<F>(&self, action: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.send(Command::Activate {
            action: Box::pin(action),
            on_error: None,
        });
    }

    /// Like [`StatefulButton::activate`], with a callback receiving the
    /// normalized error if the action fails. Within one cycle the error
    /// callback and `on_complete` are mutually exclusive.
    pub fn activate_with_handler<F, E>(&self, action: F, on_error: E)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        self.send(Command::Activate {
            action: Box::pin(action),
            on_error: Some(Box::new(on_error)),
        });
    }

    /// Feed an externally computed progress value. Ignored outside the
    /// progress state; values outside `0..=100` are clamped.
    pub fn report_progress(&self, value: i32) {
        self.send(Command::Report { value });
    }

    /// Current behavioural state.
    pub fn state(&self) -> ButtonState {
        self.snapshot_rx.borrow().state
    }

    /// Current progress value.
    pub fn progress(&self) -> u8 {
        self.snapshot_rx.borrow().progress
    }

    /// Subscribe to render updates: a fresh snapshot on every state or
    /// progress change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// Tear the instance down, cancelling any pending idle-return timer.
    /// An in-flight action is not cancelled; its settlement is discarded.
    pub fn destroy(self) {
        self.driver.abort();
    }

    fn send(&self, cmd: Command) {
        // The loop outlives every sender, so this only fails after abort.
        let _ = self.tx.send(cmd);
    }
}

impl Drop for StatefulButton {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// Single-consumer event loop for one instance: user activation, progress
/// reports, action settlement, and the timed return to idle, serialized.
/// Timing is deadline-driven: the loop sleeps exactly until the machine's
/// next deadline, with no idle wakeups.
async fn drive(
    mut machine: Machine,
    mut rx: mpsc::UnboundedReceiver<Command>,
    tx: mpsc::WeakUnboundedSender<Command>,
    snapshot_tx: watch::Sender<Snapshot>,
    on_complete: Option<CompleteCallback>,
) {
    loop {
        let deadline = machine.next_deadline();
        let has_deadline = deadline.is_some();
        let sleep_fut = match deadline {
            Some(dl) => tokio::time::sleep_until(tokio::time::Instant::from_std(dl)),
            None => tokio::time::sleep_until(tokio::time::Instant::now()),
        };

        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(cmd) => {
                    let effects = handle_command(&mut machine, cmd, &tx);
                    apply_effects(&machine, effects, &snapshot_tx, &on_complete);
                }
                None => break,
            },
            _ = sleep_fut, if has_deadline => {
                let effects = machine.check_timer();
                apply_effects(&machine, effects, &snapshot_tx, &on_complete);
            }
        }
    }
}

fn handle_command(
    machine: &mut Machine,
    cmd: Command,
    tx: &mpsc::WeakUnboundedSender<Command>,
) -> Vec<Effect> {
    match cmd {
        Command::Activate { action, on_error } => {
            if machine.state() != ButtonState::Idle {
                debug!(state = ?machine.state(), "activation ignored: widget busy");
                return Vec::new();
            }
            let effects = machine.handle_event(Event::Trigger);
            // The runner gets its own sender so a settlement arriving after
            // the handle is dropped still has somewhere to go.
            if let Some(tx) = tx.upgrade() {
                tokio::spawn(runner::run_action(action, on_error, tx));
            }
            effects
        }
        Command::Report { value } => machine.handle_event(Event::Report(value)),
        Command::Finish => machine.handle_event(Event::Finish),
        Command::Fail => machine.handle_event(Event::Fail),
    }
}

fn apply_effects(
    machine: &Machine,
    effects: Vec<Effect>,
    snapshot_tx: &watch::Sender<Snapshot>,
    on_complete: &Option<CompleteCallback>,
) {
    for effect in effects {
        match effect {
            Effect::Complete => {
                if let Some(callback) = on_complete {
                    callback();
                }
            }
            Effect::Render => {
                let _ = snapshot_tx.send(machine.snapshot());
            }
        }
    }
}
