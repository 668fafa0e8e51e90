/// Every piece of text the application shows or logs.
#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigInvalid(String),
    ConfigModuleAlarm,
    ConfigModuleAssets,
    ConfigModuleReport,
    PromptSelectModules,
    PromptActivityThreshold,
    PromptPrimaryAutoClose,
    PromptSessionCloseLimit,
    PromptSecondaryUnclosable,
    PromptSecondaryAutoClose,
    PromptLoggingInterval,
    PromptNotificationInterval,
    PromptAssetsDirectory,
    PromptImageSelection,
    PromptReportDirectory,
    PromptReportFormat,

    // === MONITOR MESSAGES ===
    WatchStarted {
        activity_threshold: u64,
        session_close_limit: u32,
    },
    ServiceStarted {
        notification_interval: u64,
        session_close_limit: u32,
    },
    MonitorStopped,
    MonitorShuttingDown,
    MonitorExitedNormally,
    MonitorError(String),
    MonitorTaskPanicked(String),
    InputListenerError(String),
    InputListenerStopped,

    // === ESCALATION MESSAGES ===
    InterruptionRaised {
        id: u64,
        level: String,
    },
    InterruptionResolved {
        id: u64,
        level: String,
        outcome: String,
        session_close_count: u32,
        total_close_count: u64,
    },
    InterruptionOverdue(u64),   // request id
    InterruptionWithdrawn(u64), // request id
    OutcomeRejected(String),    // error
    PresenterBusy(u64),         // request id

    // === ALARM PROCESS MESSAGES ===
    AlarmProcessLaunched {
        pid: u32,
        level: String,
    },
    AlarmProcessLaunchFailed(String), // error
    AlarmProcessExited {
        level: String,
        code: Option<i32>,
    },
    AlarmProcessWaitFailed(String), // error
    AlarmProcessKilled,

    // === ALARM PRESENTATION MESSAGES ===
    PrimaryAlarmTitle,
    PrimaryAlarmHint(u64), // seconds
    AlarmImage(String),    // path
    SecondaryAlarmTitle,
    SecondaryAlarmLocked(u64),   // seconds
    SecondaryAlarmUnlocked(u64), // seconds
    SecondaryAlarmNotClosableYet,
    DismissRequested,
    DismissRequestsUnavailable(String),
    AlarmClosedByUser,
    AlarmClosedAutomatically,

    // === IMAGE MESSAGES ===
    ImagesLoaded(usize),
    AssetsDirectoryUnreadable(String),

    // === REPORT MESSAGES ===
    ReportWritten(String),     // path
    ReportWriteFailed(String), // error

    // === SERVICE/DAEMON MESSAGES ===
    ServiceDetached(u32), // PID
    ServiceLogFile(String),
    ServiceStopped(u32),  // PID
    ServiceNotRunning,
    ServiceNotRunningPidNotFound,
    ServiceStoppingExisting(String),     // PID
    ServiceFailedToStopExisting(String), // error
    ServiceFailedToStop(u32),            // PID
    ReceivedSigterm,
    ReceivedSigint,
    ReceivedCtrlC,
    CtrlCListenFailed(String), // error
    SignalHandlingNotSupported,
    DaemonModeNotSupported,
    FailedToGetCurrentExecutable,
    FailedToCreateSigtermHandler,
    FailedToCreateSigintHandler,
    InvalidPidFileContent,
    FailedToOpenProcess(u32),
    FailedToTerminateProcess(u32),
    ProcessTerminationNotSupported,
}
