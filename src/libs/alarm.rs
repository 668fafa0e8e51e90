//! Console rendering of an interruption.
//!
//! The same routine backs the in-process `watch` mode and the short-lived
//! `alarm` process spawned by the service, so both agree on what counts as
//! a user close:
//!
//! - **primary**: closes on Enter (user) or after `auto_close_after` (timeout)
//! - **secondary**: ignores Enter for `unclosable_for`, then closes on Enter
//!   (user) or after `auto_close_after` counted from that moment (timeout)
//!
//! `ergonomy dismiss` counts the same as Enter, for alarms that have no
//! terminal to type into.

use crate::libs::data_storage::DataStorage;
use crate::libs::escalation::{InterruptionRequest, Level, OutcomeKind};
use crate::libs::messages::Message;
use crate::{msg_info, msg_print, msg_warning};
use anyhow::Result;
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;

/// Stream of "the user asked to close" signals.
pub type DismissReceiver = mpsc::UnboundedReceiver<()>;

/// File in the data directory whose appearance is a close request. Written
/// by `ergonomy dismiss`, consumed by whichever alarm is on screen.
pub const DISMISS_REQUEST_FILE: &str = "alarm-dismiss";

const DISMISS_POLL: Duration = Duration::from_millis(200);

/// Every way a user can close an alarm: a line typed on stdin, or a dismiss
/// request left in the data directory.
///
/// The stdin reader matters when the alarm owns a terminal. The request
/// file is what reaches an alarm launched by a detached service, whose
/// stdin is not connected to anything. The channel stays open while either
/// source is alive.
pub fn user_dismissals() -> DismissReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    forward_stdin(tx.clone());
    match DataStorage::new().get_path(DISMISS_REQUEST_FILE) {
        Ok(path) => watch_dismiss_requests(path, tx),
        Err(e) => msg_warning!(Message::DismissRequestsUnavailable(e.to_string())),
    }
    rx
}

/// Leaves a close request for the alarm currently on screen.
pub fn request_dismissal() -> Result<PathBuf> {
    let path = DataStorage::new().get_path(DISMISS_REQUEST_FILE)?;
    fs::write(&path, b"")?;
    Ok(path)
}

/// Forwards every line typed on stdin as a dismissal.
///
/// The reader runs on a plain thread: a blocked stdin read must never hold
/// the async runtime open at shutdown.
fn forward_stdin(tx: mpsc::UnboundedSender<()>) {
    // If the thread cannot start, the sender is dropped with the closure
    let _ = std::thread::Builder::new().name("ergonomy-stdin".to_string()).spawn(move || {
        for line in io::stdin().lock().lines() {
            if line.is_err() || tx.send(()).is_err() {
                break;
            }
        }
    });
}

/// Polls `path` and turns each appearance of the file into a dismissal.
/// A request left over from before the watcher started is discarded.
fn watch_dismiss_requests(path: PathBuf, tx: mpsc::UnboundedSender<()>) {
    let _ = fs::remove_file(&path);
    let _ = std::thread::Builder::new().name("ergonomy-dismiss".to_string()).spawn(move || {
        while !tx.is_closed() {
            if fs::remove_file(&path).is_ok() && tx.send(()).is_err() {
                break;
            }
            std::thread::sleep(DISMISS_POLL);
        }
    });
}

/// Shows `request` and waits for it to close. Returns how it closed.
pub async fn show(request: &InterruptionRequest, dismissals: &mut DismissReceiver) -> OutcomeKind {
    // Key presses from before the alarm appeared do not close it
    while dismissals.try_recv().is_ok() {}

    let kind = match request.level {
        Level::Primary => {
            msg_print!(Message::PrimaryAlarmTitle, true);
            if let Some(image) = &request.auxiliary_content {
                msg_print!(Message::AlarmImage(image.display().to_string()));
            }
            msg_print!(Message::PrimaryAlarmHint(request.auto_close_after.as_secs()));
            wait_for_dismissal(request.auto_close_after, dismissals).await
        }
        Level::Secondary => {
            let unclosable = request.unclosable_for.unwrap_or_default();
            msg_print!(Message::SecondaryAlarmTitle, true);
            msg_print!(Message::SecondaryAlarmLocked(unclosable.as_secs()));
            hold_closed(unclosable, dismissals).await;

            msg_print!(Message::SecondaryAlarmUnlocked(request.auto_close_after.as_secs()));
            wait_for_dismissal(request.auto_close_after, dismissals).await
        }
    };

    match kind {
        OutcomeKind::UserDismissed => msg_info!(Message::AlarmClosedByUser),
        OutcomeKind::TimedOut => msg_info!(Message::AlarmClosedAutomatically),
    }
    kind
}

/// Swallows close requests until `duration` has passed.
async fn hold_closed(duration: Duration, dismissals: &mut DismissReceiver) {
    let unlock = time::sleep(duration);
    tokio::pin!(unlock);
    loop {
        tokio::select! {
            _ = &mut unlock => return,
            received = dismissals.recv() => match received {
                Some(()) => msg_warning!(Message::SecondaryAlarmNotClosableYet),
                None => {
                    (&mut unlock).await;
                    return;
                }
            },
        }
    }
}

async fn wait_for_dismissal(timeout: Duration, dismissals: &mut DismissReceiver) -> OutcomeKind {
    let dismissed = async {
        match dismissals.recv().await {
            Some(()) => {}
            None => std::future::pending::<()>().await,
        }
    };
    match time::timeout(timeout, dismissed).await {
        Ok(()) => OutcomeKind::UserDismissed,
        Err(_) => OutcomeKind::TimedOut,
    }
}
