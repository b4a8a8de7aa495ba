use crate::widget::Command;
use anyhow::Error;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A user action boxed for delivery to the event loop.
pub(crate) type BoxAction = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Per-activation error callback, invoked at most once with the normalized
/// failure.
pub(crate) type ErrorCallback = Box<dyn FnOnce(Error) + Send>;

/// Drive a user action to its single settlement and feed the outcome back
/// into the instance's event queue. The queue is the only path into the
/// machine, so a settlement racing a progress report is still applied in
/// delivery order.
pub(crate) async fn run_action(
    action: BoxAction,
    on_error: Option<ErrorCallback>,
    tx: mpsc::UnboundedSender<Command>,
) {
    match action.await {
        Ok(()) => {
            // A closed queue means the instance was destroyed mid-flight;
            // the settlement is simply discarded.
            if tx.send(Command::Finish).is_err() {
                debug!("instance gone before action resolved");
            }
        }
        Err(err) => {
            match on_error {
                Some(callback) => callback(err),
                None => warn!(error = %err, "action failed"),
            }
            let _ = tx.send(Command::Fail);
        }
    }
}
