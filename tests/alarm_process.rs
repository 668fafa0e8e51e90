#[cfg(test)]
mod tests {
    use ergonomy::libs::alarm::DISMISS_REQUEST_FILE;
    use ergonomy::libs::config::{AlarmConfig, Config, CONFIG_FILE_NAME};
    use ergonomy::libs::data_storage::{APP_NAME, VENDOR_NAME};
    use ergonomy::libs::escalation::{InterruptionOutcome, InterruptionRequest, Level, OutcomeKind};
    use ergonomy::libs::notifier::ProcessNotifier;
    use std::ffi::OsString;
    use std::path::{Path, PathBuf};
    use std::process::Stdio;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use tokio::process::Command;
    use tokio::sync::mpsc;
    use tokio::time::{self, timeout};

    const ERGONOMY: &str = env!("CARGO_BIN_EXE_ergonomy");

    /// A private home directory for the launched processes. The test process
    /// environment is left alone, so these tests can run in parallel.
    struct AlarmProcessContext {
        home: TempDir,
    }

    impl AsyncTestContext for AlarmProcessContext {
        async fn setup() -> Self {
            AlarmProcessContext {
                home: tempfile::tempdir().unwrap(),
            }
        }
    }

    impl AlarmProcessContext {
        /// Where `DataStorage` resolves to for a process given this home.
        fn data_dir(&self) -> PathBuf {
            let home = self.home.path();
            let base = if cfg!(windows) {
                home.to_path_buf()
            } else if cfg!(target_os = "macos") {
                home.join("Library").join("Application Support")
            } else {
                home.join(".local").join("share")
            };
            base.join(VENDOR_NAME).join(APP_NAME)
        }

        fn write_alarm_config(&self, alarm: AlarmConfig) {
            let dir = self.data_dir();
            std::fs::create_dir_all(&dir).unwrap();
            let config = Config {
                alarm: Some(alarm),
                ..Default::default()
            };
            config.save_to(&dir.join(CONFIG_FILE_NAME)).unwrap();
        }

        fn notifier(&self) -> ProcessNotifier {
            ProcessNotifier::new(ERGONOMY, vec![OsString::from("alarm")])
                .with_env("HOME", self.home.path())
                .with_env("LOCALAPPDATA", self.home.path())
        }
    }

    fn short_alarms(primary_auto_close: u64, unclosable: u64, secondary_auto_close: u64) -> AlarmConfig {
        AlarmConfig {
            primary_alarm_auto_close_seconds: primary_auto_close,
            secondary_alarm_unclosable_seconds: unclosable,
            secondary_alarm_auto_close_seconds: secondary_auto_close,
            ..Default::default()
        }
    }

    /// Runs `ergonomy dismiss` the way a user in another terminal would.
    async fn run_dismiss(home: &Path) {
        let status = Command::new(ERGONOMY)
            .arg("dismiss")
            .env("HOME", home)
            .env("LOCALAPPDATA", home)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .await
            .unwrap();
        assert!(status.success());
    }

    /// Keeps asking the alarm to close until it reports back. Requests made
    /// before the alarm is listening are discarded by it, hence the repeats.
    async fn dismiss_until_closed(home: &Path, outcomes: &mut mpsc::UnboundedReceiver<InterruptionOutcome>) -> InterruptionOutcome {
        loop {
            tokio::select! {
                outcome = outcomes.recv() => return outcome.unwrap(),
                _ = time::sleep(Duration::from_millis(300)) => run_dismiss(home).await,
            }
        }
    }

    #[test_context(AlarmProcessContext)]
    #[tokio::test]
    async fn test_dismissed_primary_exits_as_user_dismissed(ctx: &mut AlarmProcessContext) {
        ctx.write_alarm_config(short_alarms(60, 1, 60));
        let mut notifier = ctx.notifier();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = InterruptionRequest::primary(7, Duration::from_secs(60), Some(PathBuf::from("1.png")));

        let handle = notifier.launch(&request, tx).unwrap();
        assert!(handle.pid.is_some());

        let outcome = timeout(Duration::from_secs(30), dismiss_until_closed(ctx.home.path(), &mut rx))
            .await
            .unwrap();
        assert_eq!(outcome.request_id, 7);
        assert_eq!(outcome.level, Level::Primary);
        assert_eq!(outcome.kind, OutcomeKind::UserDismissed);
    }

    #[test_context(AlarmProcessContext)]
    #[tokio::test]
    async fn test_dismissed_secondary_waits_out_unclosable_period(ctx: &mut AlarmProcessContext) {
        ctx.write_alarm_config(short_alarms(60, 2, 60));
        let mut notifier = ctx.notifier();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = InterruptionRequest::secondary(8, Duration::from_secs(2), Duration::from_secs(60));
        let started = Instant::now();

        notifier.launch(&request, tx).unwrap();
        let outcome = timeout(Duration::from_secs(30), dismiss_until_closed(ctx.home.path(), &mut rx))
            .await
            .unwrap();

        // Requests during the first two seconds are ignored by the alarm
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(outcome.request_id, 8);
        assert_eq!(outcome.level, Level::Secondary);
        assert_eq!(outcome.kind, OutcomeKind::UserDismissed);
    }

    #[test_context(AlarmProcessContext)]
    #[tokio::test]
    async fn test_unanswered_alarms_exit_as_timed_out(ctx: &mut AlarmProcessContext) {
        ctx.write_alarm_config(short_alarms(1, 1, 1));
        let mut notifier = ctx.notifier();

        let requests = [
            InterruptionRequest::primary(1, Duration::from_secs(1), None),
            InterruptionRequest::secondary(2, Duration::from_secs(1), Duration::from_secs(1)),
        ];
        for request in requests {
            let (tx, mut rx) = mpsc::unbounded_channel();
            notifier.launch(&request, tx).unwrap();

            let outcome = timeout(Duration::from_secs(30), rx.recv()).await.unwrap().unwrap();
            assert_eq!(outcome.request_id, request.id);
            assert_eq!(outcome.level, request.level);
            assert_eq!(outcome.kind, OutcomeKind::TimedOut);
            // The waiter task finishes right after sending
            time::sleep(Duration::from_millis(50)).await;
        }
    }

    #[test_context(AlarmProcessContext)]
    #[tokio::test]
    async fn test_request_left_before_alarm_opened_is_ignored(ctx: &mut AlarmProcessContext) {
        ctx.write_alarm_config(short_alarms(2, 1, 1));
        run_dismiss(ctx.home.path()).await;
        assert!(ctx.data_dir().join(DISMISS_REQUEST_FILE).exists());

        let mut notifier = ctx.notifier();
        let (tx, mut rx) = mpsc::unbounded_channel();
        notifier.launch(&InterruptionRequest::primary(3, Duration::from_secs(2), None), tx).unwrap();

        let outcome = timeout(Duration::from_secs(30), rx.recv()).await.unwrap().unwrap();
        assert_eq!(outcome.kind, OutcomeKind::TimedOut);
        assert!(!ctx.data_dir().join(DISMISS_REQUEST_FILE).exists());
    }
}
