//! Text for every [`Message`] variant.
//!
//! This is the only place user-visible wording is written down, so wording
//! changes never touch the modules that emit the messages.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigInvalid(error) => format!("Invalid configuration: {}", error),
            Message::ConfigModuleAlarm => "Alarm settings".to_string(),
            Message::ConfigModuleAssets => "Alarm images".to_string(),
            Message::ConfigModuleReport => "Activity reports".to_string(),
            Message::PromptSelectModules => "Select modules to configure (space to select, enter to confirm)".to_string(),
            Message::PromptActivityThreshold => "Seconds of continuous activity before a reminder".to_string(),
            Message::PromptPrimaryAutoClose => "Seconds before a reminder closes by itself".to_string(),
            Message::PromptSessionCloseLimit => "Reminders you may close in a row before the warning".to_string(),
            Message::PromptSecondaryUnclosable => "Seconds the warning cannot be closed".to_string(),
            Message::PromptSecondaryAutoClose => "Seconds the warning stays open once closable".to_string(),
            Message::PromptLoggingInterval => "Hours between activity reports".to_string(),
            Message::PromptNotificationInterval => "Seconds between reminders in service mode".to_string(),
            Message::PromptAssetsDirectory => "Directory with reminder images (.png, .gif)".to_string(),
            Message::PromptImageSelection => "Image selection".to_string(),
            Message::PromptReportDirectory => "Directory for activity reports".to_string(),
            Message::PromptReportFormat => "Report file format".to_string(),

            // === MONITOR MESSAGES ===
            Message::WatchStarted {
                activity_threshold,
                session_close_limit,
            } => format!(
                "Watching activity: reminder after {}s of activity, warning after {} skipped reminders",
                activity_threshold, session_close_limit
            ),
            Message::ServiceStarted {
                notification_interval,
                session_close_limit,
            } => format!(
                "Service running: reminder every {}s, warning after {} skipped reminders",
                notification_interval, session_close_limit
            ),
            Message::MonitorStopped => "Monitor stopped".to_string(),
            Message::MonitorShuttingDown => "Shutting down monitor...".to_string(),
            Message::MonitorExitedNormally => "Monitor exited normally".to_string(),
            Message::MonitorError(error) => format!("Monitor error: {}", error),
            Message::MonitorTaskPanicked(error) => format!("Monitor task panicked: {}", error),
            Message::InputListenerError(error) => format!("Input listener error: {}", error),
            Message::InputListenerStopped => "Input listener detached".to_string(),

            // === ESCALATION MESSAGES ===
            Message::InterruptionRaised { id, level } => format!("Raising {} interruption #{}", level, id),
            Message::InterruptionResolved {
                id,
                level,
                outcome,
                session_close_count,
                total_close_count,
            } => format!(
                "{} interruption #{} {} (session closes: {}, total closes: {})",
                level, id, outcome, session_close_count, total_close_count
            ),
            Message::InterruptionOverdue(id) => format!("Interruption #{} never reported back, treating it as timed out", id),
            Message::InterruptionWithdrawn(id) => format!("Interruption #{} withdrawn", id),
            Message::OutcomeRejected(error) => format!("Ignoring interruption outcome: {}", error),
            Message::PresenterBusy(id) => format!("Previous alarm is still open, interruption #{} not shown", id),

            // === ALARM PROCESS MESSAGES ===
            Message::AlarmProcessLaunched { pid, level } => format!("Launched {} alarm process (PID: {})", level, pid),
            Message::AlarmProcessLaunchFailed(error) => format!("Failed to launch alarm process: {}", error),
            Message::AlarmProcessExited { level, code } => match code {
                Some(code) => format!("{} alarm process exited with code {}", level, code),
                None => format!("{} alarm process terminated without an exit code", level),
            },
            Message::AlarmProcessWaitFailed(error) => format!("Failed to wait for alarm process: {}", error),
            Message::AlarmProcessKilled => "Closed the running alarm process".to_string(),

            // === ALARM PRESENTATION MESSAGES ===
            Message::PrimaryAlarmTitle => "Time for a short break: stand up, stretch and rest your eyes.".to_string(),
            Message::PrimaryAlarmHint(seconds) => format!("Press Enter (or run `ergonomy dismiss`) to close. Closes by itself in {}s.", seconds),
            Message::AlarmImage(path) => format!("Exercise: {}", path),
            Message::SecondaryAlarmTitle => "You have skipped your break reminders several times in a row.".to_string(),
            Message::SecondaryAlarmLocked(seconds) => format!("This warning cannot be closed for {}s.", seconds),
            Message::SecondaryAlarmUnlocked(seconds) => format!("Press Enter (or run `ergonomy dismiss`) to close. Closes by itself in {}s.", seconds),
            Message::SecondaryAlarmNotClosableYet => "This warning cannot be closed yet.".to_string(),
            Message::DismissRequested => "Close request sent to the open alarm".to_string(),
            Message::DismissRequestsUnavailable(error) => format!("`ergonomy dismiss` will not reach this alarm: {}", error),
            Message::AlarmClosedByUser => "Alarm closed".to_string(),
            Message::AlarmClosedAutomatically => "Alarm closed automatically".to_string(),

            // === IMAGE MESSAGES ===
            Message::ImagesLoaded(count) => format!("Loaded {} reminder image(s)", count),
            Message::AssetsDirectoryUnreadable(error) => format!("Cannot read images directory: {}", error),

            // === REPORT MESSAGES ===
            Message::ReportWritten(path) => format!("Activity report written to {}", path),
            Message::ReportWriteFailed(error) => format!("Failed to write activity report, keeping totals for the next one: {}", error),

            // === SERVICE/DAEMON MESSAGES ===
            Message::ServiceDetached(pid) => format!("Service started in background (PID: {})", pid),
            Message::ServiceLogFile(path) => format!("Alarm output goes to {}", path),
            Message::ServiceStopped(pid) => format!("Service stopped (PID: {})", pid),
            Message::ServiceNotRunning => "Service is not running".to_string(),
            Message::ServiceNotRunningPidNotFound => "Service is not running (PID file not found)".to_string(),
            Message::ServiceStoppingExisting(pid) => format!("Stopping existing service (PID: {})...", pid),
            Message::ServiceFailedToStopExisting(error) => format!("Failed to stop existing service: {}", error),
            Message::ServiceFailedToStop(pid) => format!("Failed to stop service (PID: {})", pid),
            Message::ReceivedSigterm => "Received SIGTERM, shutting down gracefully...".to_string(),
            Message::ReceivedSigint => "Received SIGINT, shutting down gracefully...".to_string(),
            Message::ReceivedCtrlC => "Received Ctrl+C, shutting down gracefully...".to_string(),
            Message::CtrlCListenFailed(error) => format!("Failed to listen for Ctrl+C: {}", error),
            Message::SignalHandlingNotSupported => "Signal handling not supported on this platform".to_string(),
            Message::DaemonModeNotSupported => "Background mode is not supported on this platform".to_string(),
            Message::FailedToGetCurrentExecutable => "Failed to get current executable path".to_string(),
            Message::FailedToCreateSigtermHandler => "Failed to create SIGTERM handler".to_string(),
            Message::FailedToCreateSigintHandler => "Failed to create SIGINT handler".to_string(),
            Message::InvalidPidFileContent => "Invalid PID file content".to_string(),
            Message::FailedToOpenProcess(code) => format!("Failed to open process, error code: {}", code),
            Message::FailedToTerminateProcess(code) => format!("Failed to terminate process, error code: {}", code),
            Message::ProcessTerminationNotSupported => "Process termination not supported on this platform".to_string(),
        };
        write!(f, "{}", text)
    }
}
