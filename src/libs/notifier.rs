//! Cross-process alarm launcher used by the service.
//!
//! A background service cannot put anything on the user's screen itself, so
//! every interruption is delegated to a fresh `ergonomy alarm` process:
//!
//! ```text
//! ergonomy alarm primary [IMAGE]
//! ergonomy alarm secondary
//! ```
//!
//! The user closes it with Enter in the terminal it inherits, or with
//! `ergonomy dismiss` from anywhere. The process exit code is the whole
//! return channel: `1` means the user closed the alarm, anything else
//! (including being killed) means it closed by itself. Exit codes carry no
//! level, so the level and request id of the launched alarm are tracked
//! next to the process.

use crate::libs::escalation::{InterruptionOutcome, InterruptionRequest, Level, OutcomeKind};
use crate::libs::messages::Message;
use crate::libs::presenter::{OutcomeSender, Presentation, Presenter};
use crate::{msg_debug, msg_error_anyhow, msg_info, msg_warning};
use anyhow::Result;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Subcommand the service passes to its own executable.
pub const ALARM_SUBCOMMAND: &str = "alarm";

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("alarm process for interruption #{0} is still running")]
    Busy(u64),
    #[error("failed to launch alarm process: {0}")]
    Spawn(#[from] io::Error),
}

/// A launched alarm process and the request it is answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    pub pid: Option<u32>,
    pub request_id: u64,
    pub level: Level,
}

struct RunningAlarm {
    handle: ProcessHandle,
    waiter: JoinHandle<()>,
    kill: Option<oneshot::Sender<()>>,
}

pub struct ProcessNotifier {
    program: PathBuf,
    base_args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
    running: Option<RunningAlarm>,
}

impl ProcessNotifier {
    /// `program base_args.. <level> [image]` is what gets launched.
    pub fn new(program: impl Into<PathBuf>, base_args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            base_args,
            envs: Vec::new(),
            running: None,
        }
    }

    /// Extra environment for every launched alarm, on top of the inherited one.
    pub fn with_env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Launches alarms through this very executable.
    pub fn for_current_exe() -> Result<Self> {
        let program = std::env::current_exe().map_err(|_| msg_error_anyhow!(Message::FailedToGetCurrentExecutable))?;
        Ok(Self::new(program, vec![OsString::from(ALARM_SUBCOMMAND)]))
    }

    pub fn command_args(&self, request: &InterruptionRequest) -> Vec<OsString> {
        let mut args = self.base_args.clone();
        args.push(OsString::from(request.level.token()));
        if request.level == Level::Primary {
            if let Some(image) = &request.auxiliary_content {
                args.push(image.clone().into_os_string());
            }
        }
        args
    }

    pub fn is_running(&self) -> bool {
        self.running.as_ref().is_some_and(|running| !running.waiter.is_finished())
    }

    pub fn running(&self) -> Option<&ProcessHandle> {
        self.running.as_ref().filter(|running| !running.waiter.is_finished()).map(|running| &running.handle)
    }

    /// Starts the alarm process for `request`. Its outcome is delivered on
    /// `outcomes` once the process exits.
    ///
    /// # Errors
    ///
    /// - [`NotifierError::Busy`] if the previously launched alarm is still open
    /// - [`NotifierError::Spawn`] if the process could not be started
    pub fn launch(&mut self, request: &InterruptionRequest, outcomes: OutcomeSender) -> Result<ProcessHandle, NotifierError> {
        if let Some(running) = self.running() {
            return Err(NotifierError::Busy(running.request_id));
        }

        // The alarm shares the service's terminal, if it has one, so Enter
        // reaches it. A detached service has none and relies on `dismiss`.
        let mut child = Command::new(&self.program)
            .args(self.command_args(request))
            .envs(self.envs.iter().map(|(key, value)| (key, value)))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let handle = ProcessHandle {
            pid: child.id(),
            request_id: request.id,
            level: request.level,
        };
        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let answering = handle.clone();

        let waiter = tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => status,
                _ = kill_rx => {
                    if child.kill().await.is_ok() {
                        msg_info!(Message::AlarmProcessKilled);
                    }
                    return;
                }
            };

            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    msg_warning!(Message::AlarmProcessWaitFailed(e.to_string()));
                    None
                }
            };
            msg_debug!(Message::AlarmProcessExited {
                level: answering.level.to_string(),
                code,
            });

            let _ = outcomes.send(InterruptionOutcome {
                request_id: answering.request_id,
                level: answering.level,
                kind: OutcomeKind::from_exit_code(code),
            });
        });

        self.running = Some(RunningAlarm {
            handle: handle.clone(),
            waiter,
            kill: Some(kill_tx),
        });
        Ok(handle)
    }
}

impl Presenter for ProcessNotifier {
    fn present(&mut self, request: InterruptionRequest, outcomes: OutcomeSender) -> Presentation {
        match self.launch(&request, outcomes.clone()) {
            Ok(handle) => {
                if let Some(pid) = handle.pid {
                    msg_info!(Message::AlarmProcessLaunched {
                        pid,
                        level: handle.level.to_string(),
                    });
                }
                Presentation::Shown
            }
            Err(NotifierError::Busy(_)) => Presentation::Busy,
            Err(e @ NotifierError::Spawn(_)) => {
                // Never leave the controller waiting on a process that does not exist
                msg_warning!(Message::AlarmProcessLaunchFailed(e.to_string()));
                let _ = outcomes.send(InterruptionOutcome::answering(&request, OutcomeKind::TimedOut));
                Presentation::Shown
            }
        }
    }

    fn shutdown(&mut self) {
        if let Some(mut running) = self.running.take() {
            if let Some(kill) = running.kill.take() {
                let _ = kill.send(());
            }
        }
    }
}
