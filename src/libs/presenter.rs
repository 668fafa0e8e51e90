//! Where interruptions get shown.
//!
//! The monitor never talks to a UI directly. It hands each request to a
//! [`Presenter`] together with a sender, and the presenter reports back
//! exactly one [`InterruptionOutcome`] for every request it accepts.

use crate::libs::alarm::{self, DismissReceiver};
use crate::libs::escalation::{InterruptionOutcome, InterruptionRequest};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

pub type OutcomeSender = mpsc::UnboundedSender<InterruptionOutcome>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// The request was accepted; an outcome will follow on the sender.
    Shown,
    /// A previous interruption is still on screen; nothing was shown and
    /// no outcome will follow.
    Busy,
}

pub trait Presenter: Send {
    /// Starts showing `request` without waiting for it to close.
    fn present(&mut self, request: InterruptionRequest, outcomes: OutcomeSender) -> Presentation;

    /// Closes anything still on screen. Called once when the monitor stops.
    fn shutdown(&mut self) {}
}

/// Renders interruptions in the monitor's own terminal.
pub struct ConsolePresenter {
    dismissals: Arc<Mutex<DismissReceiver>>,
    active: Option<JoinHandle<()>>,
}

impl ConsolePresenter {
    pub fn new(dismissals: DismissReceiver) -> Self {
        Self {
            dismissals: Arc::new(Mutex::new(dismissals)),
            active: None,
        }
    }

    /// Presenter closed by Enter in this terminal or by `ergonomy dismiss`.
    pub fn interactive() -> Self {
        Self::new(alarm::user_dismissals())
    }
}

impl Presenter for ConsolePresenter {
    fn present(&mut self, request: InterruptionRequest, outcomes: OutcomeSender) -> Presentation {
        if self.active.as_ref().is_some_and(|task| !task.is_finished()) {
            return Presentation::Busy;
        }

        let dismissals = self.dismissals.clone();
        self.active = Some(tokio::spawn(async move {
            let mut dismissals = dismissals.lock().await;
            let kind = alarm::show(&request, &mut dismissals).await;
            let _ = outcomes.send(InterruptionOutcome::answering(&request, kind));
        }));
        Presentation::Shown
    }

    fn shutdown(&mut self) {
        if let Some(task) = self.active.take() {
            task.abort();
        }
    }
}
