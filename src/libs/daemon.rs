//! Hosting of the monitor: foreground runs with signal handling, and the
//! detached background service tracked through a PID file.

use crate::libs::config::Config;
use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::monitor::{Deployment, Monitor, MonitorHandle};
use crate::{msg_bail_anyhow, msg_error, msg_error_anyhow, msg_info, msg_warning};
use anyhow::Result;
use std::time::Duration;

const PID_FILE: &str = "ergonomy-service.pid";
const LOG_FILE: &str = "ergonomy-service.log";

/// Runs the monitor in the foreground until SIGINT/SIGTERM (or Ctrl+C).
///
/// The configuration is loaded and validated first, so a broken file stops
/// the program before any input hook is installed.
pub async fn run_with_signal_handling(deployment: Deployment) -> Result<()> {
    let config = Config::load_validated().map_err(|e| msg_error_anyhow!(Message::ConfigInvalid(e.to_string())))?;
    let monitor = Monitor::from_config(&config, deployment)?;
    let alarm = config.alarm_config();
    match deployment {
        Deployment::InProcess => msg_info!(Message::WatchStarted {
            activity_threshold: alarm.activity_threshold_seconds,
            session_close_limit: alarm.session_close_limit,
        }),
        Deployment::Service => msg_info!(Message::ServiceStarted {
            notification_interval: alarm.notification_interval_seconds,
            session_close_limit: alarm.session_close_limit,
        }),
    }

    let handle = monitor.handle();
    spawn_signal_listener(handle.clone());

    let monitor_task = tokio::spawn(monitor.run());
    let result = match monitor_task.await {
        Ok(Ok(_)) => {
            msg_info!(Message::MonitorExitedNormally);
            Ok(())
        }
        Ok(Err(e)) => {
            msg_error!(Message::MonitorError(e.to_string()));
            Err(e)
        }
        Err(e) => {
            msg_error!(Message::MonitorTaskPanicked(e.to_string()));
            Err(e.into())
        }
    };

    if deployment == Deployment::Service {
        remove_pid_file();
    }
    result
}

fn spawn_signal_listener(handle: MonitorHandle) {
    #[cfg(unix)]
    {
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let (mut sigterm, mut sigint) = match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                (Err(_), _) => {
                    msg_error!(Message::FailedToCreateSigtermHandler);
                    return;
                }
                (_, Err(_)) => {
                    msg_error!(Message::FailedToCreateSigintHandler);
                    return;
                }
            };

            tokio::select! {
                _ = sigterm.recv() => msg_info!(Message::ReceivedSigterm),
                _ = sigint.recv() => msg_info!(Message::ReceivedSigint),
            }
            msg_info!(Message::MonitorShuttingDown);
            handle.shutdown();
        });
    }

    #[cfg(windows)]
    {
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    msg_info!(Message::ReceivedCtrlC);
                    msg_info!(Message::MonitorShuttingDown);
                    handle.shutdown();
                }
                Err(e) => msg_error!(Message::CtrlCListenFailed(e.to_string())),
            }
        });
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = handle;
        msg_warning!(Message::SignalHandlingNotSupported);
    }
}

fn remove_pid_file() {
    if let Ok(pid_path) = DataStorage::new().get_path(PID_FILE) {
        if pid_path.exists() {
            let _ = std::fs::remove_file(&pid_path);
        }
    }
}

/// Starts the service as a detached background process. A service that is
/// already running is stopped first.
pub fn spawn() -> Result<()> {
    let pid_path = DataStorage::new().get_path(PID_FILE)?;

    if pid_path.exists() {
        if let Ok(pid_str) = std::fs::read_to_string(&pid_path) {
            msg_info!(Message::ServiceStoppingExisting(pid_str.trim().to_string()));
            if let Err(e) = stop_internal() {
                msg_warning!(Message::ServiceFailedToStopExisting(e.to_string()));
                let _ = std::fs::remove_file(&pid_path);
            }
            std::thread::sleep(Duration::from_millis(1000));
        }
    }

    let current_exe = std::env::current_exe().map_err(|_| msg_error_anyhow!(Message::FailedToGetCurrentExecutable))?;
    // Alarms inherit this output, so it has to land somewhere readable
    let log_path = DataStorage::new().get_path(LOG_FILE)?;
    let log = std::fs::OpenOptions::new().create(true).append(true).open(&log_path)?;
    let mut command = std::process::Command::new(current_exe);
    command
        .arg("service")
        .stdin(std::process::Stdio::null())
        .stdout(log.try_clone()?)
        .stderr(log);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // SAFETY: setsid is async-signal-safe and touches no parent state.
        unsafe {
            command.pre_exec(|| {
                nix::unistd::setsid()?;
                Ok(())
            });
        }
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        const DETACHED_PROCESS: u32 = 0x00000008;
        command.creation_flags(CREATE_NO_WINDOW | DETACHED_PROCESS);
    }

    #[cfg(not(any(unix, windows)))]
    {
        msg_bail_anyhow!(Message::DaemonModeNotSupported);
    }

    let child = command.spawn()?;
    let pid = child.id();
    std::fs::write(pid_path, pid.to_string())?;
    msg_info!(Message::ServiceDetached(pid));
    msg_info!(Message::ServiceLogFile(log_path.display().to_string()));
    Ok(())
}

/// Stops the background service. Not running is not an error.
pub fn stop() -> Result<()> {
    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    if !pid_path.exists() {
        msg_info!(Message::ServiceNotRunning);
        return Ok(());
    }
    stop_internal()
}

fn stop_internal() -> Result<()> {
    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    if !pid_path.exists() {
        msg_bail_anyhow!(Message::ServiceNotRunningPidNotFound);
    }

    let pid_str = std::fs::read_to_string(&pid_path)?;
    let pid: u32 = pid_str.trim().parse().map_err(|_| msg_error_anyhow!(Message::InvalidPidFileContent))?;

    let killed = kill_process(pid)?;
    std::fs::remove_file(pid_path)?;

    if killed {
        msg_info!(Message::ServiceStopped(pid));
    } else {
        // Stale PID file: the process is already gone
        msg_info!(Message::ServiceNotRunning);
    }
    Ok(())
}

/// Terminates `pid`. Returns `false` when no such process exists.
#[cfg(unix)]
fn kill_process(pid: u32) -> Result<bool> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pid = Pid::from_raw(pid as i32);
    match kill(pid, None) {
        Err(Errno::ESRCH) => return Ok(false),
        Err(e) => return Err(e.into()),
        Ok(()) => {}
    }

    // Graceful first, so the service can kill its alarm process
    kill(pid, Signal::SIGTERM)?;
    for _ in 0..20 {
        std::thread::sleep(Duration::from_millis(100));
        if kill(pid, None) == Err(Errno::ESRCH) {
            return Ok(true);
        }
    }

    match kill(pid, Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(true),
        Err(_) => msg_bail_anyhow!(Message::ServiceFailedToStop(pid.as_raw() as u32)),
    }
}

#[cfg(windows)]
fn kill_process(pid: u32) -> Result<bool> {
    use winapi::um::errhandlingapi::GetLastError;
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::{OpenProcess, TerminateProcess};
    use winapi::um::winnt::PROCESS_TERMINATE;

    const ERROR_INVALID_PARAMETER: u32 = 87;

    // SAFETY: the handle is checked for null and closed on every path.
    unsafe {
        let handle = OpenProcess(PROCESS_TERMINATE, 0, pid);
        if handle.is_null() {
            let error = GetLastError();
            if error == ERROR_INVALID_PARAMETER {
                return Ok(false);
            }
            msg_bail_anyhow!(Message::FailedToOpenProcess(error));
        }

        let result = TerminateProcess(handle, 0);
        let error = GetLastError();
        CloseHandle(handle);

        if result == 0 {
            msg_bail_anyhow!(Message::FailedToTerminateProcess(error));
        }
        std::thread::sleep(Duration::from_millis(100));
        Ok(true)
    }
}

#[cfg(not(any(unix, windows)))]
fn kill_process(_pid: u32) -> Result<bool> {
    msg_bail_anyhow!(Message::ProcessTerminationNotSupported);
}
