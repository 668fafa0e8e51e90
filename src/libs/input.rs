//! Global keyboard and mouse event sources.
//!
//! The monitor only needs to know *that* something happened on a channel,
//! so a source exposes two payload-free subscriptions. [`RdevInputSource`]
//! is the system-wide hook.

use crate::libs::messages::Message;
use crate::{msg_debug, msg_error};
use rdev::{listen, Event, EventType};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use thiserror::Error;

/// Callback invoked for every raw event on a channel. It runs on the
/// listener thread and must return immediately.
pub type InputCallback = Arc<dyn Fn() + Send + Sync>;

/// How long `start` waits for the hook to report an immediate failure.
const ATTACH_GRACE: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input listener could not be attached: {0}")]
    AttachFailed(String),
    #[error("input source is already started")]
    AlreadyStarted,
}

pub trait RawInputSource: Send {
    fn on_keyboard_event(&mut self, callback: InputCallback);
    fn on_mouse_event(&mut self, callback: InputCallback);

    /// Attaches to the underlying event source. Failing here is fatal for
    /// the monitor: without input there is nothing to measure.
    fn start(&mut self) -> Result<(), InputError>;

    /// Detaches so that no further callbacks fire. Idempotent.
    fn stop(&mut self);
}

/// System-wide hook backed by `rdev`.
///
/// `rdev::listen` blocks its thread forever and cannot be cancelled, so the
/// listener runs on a dedicated thread and `stop` flips a flag that turns
/// every later event into a no-op.
pub struct RdevInputSource {
    keyboard: Option<InputCallback>,
    mouse: Option<InputCallback>,
    attached: Arc<AtomicBool>,
    started: bool,
}

impl RdevInputSource {
    pub fn new() -> Self {
        Self {
            keyboard: None,
            mouse: None,
            attached: Arc::new(AtomicBool::new(false)),
            started: false,
        }
    }
}

impl Default for RdevInputSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RawInputSource for RdevInputSource {
    fn on_keyboard_event(&mut self, callback: InputCallback) {
        self.keyboard = Some(callback);
    }

    fn on_mouse_event(&mut self, callback: InputCallback) {
        self.mouse = Some(callback);
    }

    fn start(&mut self) -> Result<(), InputError> {
        if self.started {
            return Err(InputError::AlreadyStarted);
        }

        let (error_tx, error_rx) = mpsc::channel::<String>();
        let attached = self.attached.clone();
        let keyboard = self.keyboard.clone();
        let mouse = self.mouse.clone();
        attached.store(true, Ordering::Release);

        std::thread::Builder::new()
            .name("ergonomy-input".to_string())
            .spawn(move || {
                let gate = attached.clone();
                let result = listen(move |event: Event| {
                    if !gate.load(Ordering::Acquire) {
                        return;
                    }
                    match event.event_type {
                        EventType::KeyPress(_) => {
                            if let Some(callback) = &keyboard {
                                callback();
                            }
                        }
                        EventType::ButtonPress(_) | EventType::MouseMove { .. } | EventType::Wheel { .. } => {
                            if let Some(callback) = &mouse {
                                callback();
                            }
                        }
                        _ => {}
                    }
                });

                attached.store(false, Ordering::Release);
                let error = match result {
                    Ok(()) => "listener returned unexpectedly".to_string(),
                    Err(e) => format!("{:?}", e),
                };
                // Nobody is waiting any more once start() has returned
                if let Err(mpsc::SendError(error)) = error_tx.send(error) {
                    msg_error!(Message::InputListenerError(error));
                }
            })
            .map_err(|e| InputError::AttachFailed(e.to_string()))?;

        match error_rx.recv_timeout(ATTACH_GRACE) {
            Ok(error) => {
                self.attached.store(false, Ordering::Release);
                Err(InputError::AttachFailed(error))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                self.started = true;
                Ok(())
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                self.attached.store(false, Ordering::Release);
                Err(InputError::AttachFailed("listener thread exited".to_string()))
            }
        }
    }

    fn stop(&mut self) {
        if self.attached.swap(false, Ordering::AcqRel) {
            msg_debug!(Message::InputListenerStopped);
        }
    }
}
