#[cfg(test)]
mod tests {
    use ergonomy::libs::accrual::{ActivityTracker, Channel};
    use ergonomy::libs::config::{AlarmConfig, ImageSelection};
    use ergonomy::libs::escalation::{
        ControllerState, EscalationController, EscalationError, EscalationSettings, InterruptionOutcome, InterruptionRequest, Level, OutcomeKind,
        TriggerPolicy, OUTCOME_GRACE,
    };
    use ergonomy::libs::images::ImageCatalog;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn settings(threshold: u64, limit: u32) -> EscalationSettings {
        EscalationSettings {
            activity_threshold: secs(threshold),
            session_close_limit: limit,
            primary_auto_close: secs(30),
            secondary_unclosable: secs(10),
            secondary_auto_close: secs(7),
            outcome_grace: OUTCOME_GRACE,
        }
    }

    /// Controller over a tracker that the test feeds with explicit timestamps.
    struct Harness {
        t0: Instant,
        clock: Duration,
        tracker: Arc<ActivityTracker>,
        controller: EscalationController,
    }

    impl Harness {
        fn new(settings: EscalationSettings, policy: TriggerPolicy) -> Self {
            let t0 = Instant::now();
            let tracker = Arc::new(ActivityTracker::with_debounce(Duration::from_secs(1), t0));
            let controller = EscalationController::new(settings, policy, tracker.clone());
            Self {
                t0,
                clock: Duration::ZERO,
                tracker,
                controller,
            }
        }

        fn now(&self) -> Instant {
            self.t0 + self.clock
        }

        /// Types continuously (every 500ms) for `seconds`.
        fn type_for(&mut self, seconds: u64) {
            for _ in 0..seconds * 2 {
                self.clock += Duration::from_millis(500);
                self.tracker.record_at(Channel::Keyboard, self.now());
            }
        }

        fn check(&mut self) -> Option<InterruptionRequest> {
            self.controller.check(self.now())
        }

        fn raise(&mut self) -> InterruptionRequest {
            self.type_for(self.threshold_secs());
            self.check().expect("interruption due")
        }

        fn threshold_secs(&self) -> u64 {
            5
        }

        fn answer(&mut self, request: &InterruptionRequest, kind: OutcomeKind) {
            self.controller.resolve(InterruptionOutcome::answering(request, kind)).unwrap();
        }
    }

    #[test]
    fn test_threshold_raises_once_and_resets_alarm_window() {
        let mut h = Harness::new(settings(5, 3), TriggerPolicy::ActivityThreshold);

        h.type_for(4);
        assert!(h.check().is_none());

        h.type_for(1);
        let request = h.check().expect("threshold reached");
        assert_eq!(request.id, 1);
        assert_eq!(request.level, Level::Primary);
        assert_eq!(request.auto_close_after, secs(30));
        assert_eq!(h.tracker.snapshot().alarm_total(), Duration::ZERO);
        // Report window is not the controller's to reset
        assert_eq!(h.tracker.report_window(Channel::Keyboard), secs(5));

        assert!(h.check().is_none());
        assert_eq!(h.controller.state(), ControllerState::InterruptionActive(Level::Primary));
        assert!(h.controller.alarm_in_flight());
    }

    #[test]
    fn test_mouse_and_keyboard_count_together() {
        let mut h = Harness::new(settings(5, 3), TriggerPolicy::ActivityThreshold);

        h.type_for(3);
        for _ in 0..4 {
            h.clock += Duration::from_millis(500);
            h.tracker.record_at(Channel::Mouse, h.now());
        }
        // First mouse event is 3.5s after the channel start, so only 1.5s counts
        assert!(h.check().is_none());

        h.clock += Duration::from_millis(500);
        h.tracker.record_at(Channel::Mouse, h.now());
        assert!(h.check().is_some());
    }

    #[test]
    fn test_session_limit_escalates_to_secondary() {
        let mut h = Harness::new(settings(5, 3), TriggerPolicy::ActivityThreshold);

        for expected in 1..=3 {
            let request = h.raise();
            assert_eq!(request.level, Level::Primary);
            h.answer(&request, OutcomeKind::UserDismissed);
            assert_eq!(h.controller.session_close_count(), expected);
        }

        let request = h.raise();
        assert_eq!(request.level, Level::Secondary);
        assert_eq!(request.unclosable_for, Some(secs(10)));
        assert_eq!(request.auto_close_after, secs(7));
        assert_eq!(request.auxiliary_content, None);
    }

    #[test]
    fn test_secondary_outcome_resets_session_only() {
        for kind in [OutcomeKind::UserDismissed, OutcomeKind::TimedOut] {
            let mut h = Harness::new(settings(5, 1), TriggerPolicy::ActivityThreshold);

            let primary = h.raise();
            h.answer(&primary, OutcomeKind::UserDismissed);
            let secondary = h.raise();
            assert_eq!(secondary.level, Level::Secondary);

            h.answer(&secondary, kind);
            assert_eq!(h.controller.session_close_count(), 0);
            assert_eq!(h.controller.total_close_count(), 1);
            assert_eq!(h.controller.state(), ControllerState::Monitoring);

            assert_eq!(h.raise().level, Level::Primary);
        }
    }

    #[test]
    fn test_timed_out_primary_changes_nothing() {
        let mut h = Harness::new(settings(5, 2), TriggerPolicy::ActivityThreshold);

        let request = h.raise();
        h.answer(&request, OutcomeKind::TimedOut);

        let state = h.controller.escalation_state();
        assert_eq!(state.session_close_count(), 0);
        assert_eq!(state.total_close_count(), 0);
        assert!(!state.alarm_in_flight());
    }

    #[test]
    fn test_total_close_count_spans_sessions() {
        let mut h = Harness::new(settings(5, 2), TriggerPolicy::ActivityThreshold);

        for _ in 0..3 {
            for _ in 0..2 {
                let primary = h.raise();
                h.answer(&primary, OutcomeKind::UserDismissed);
            }
            let secondary = h.raise();
            h.answer(&secondary, OutcomeKind::UserDismissed);
        }

        assert_eq!(h.controller.total_close_count(), 6);
        assert_eq!(h.controller.session_close_count(), 0);
    }

    #[test]
    fn test_zero_session_limit_always_escalates() {
        let mut h = Harness::new(settings(5, 0), TriggerPolicy::ActivityThreshold);
        assert_eq!(h.raise().level, Level::Secondary);
    }

    #[test]
    fn test_activity_during_interruption_does_not_raise_another() {
        let mut h = Harness::new(settings(5, 3), TriggerPolicy::ActivityThreshold);
        let request = h.raise();

        h.type_for(20);
        assert!(h.check().is_none());

        h.answer(&request, OutcomeKind::TimedOut);
        // Activity accrued while the alarm was up still counts afterwards
        let next = h.check().expect("accrued activity is over the threshold");
        assert_eq!(next.id, 2);
    }

    #[test]
    fn test_stale_and_mismatched_outcomes_are_rejected() {
        let mut h = Harness::new(settings(5, 3), TriggerPolicy::ActivityThreshold);

        let orphan = InterruptionOutcome {
            request_id: 7,
            level: Level::Primary,
            kind: OutcomeKind::UserDismissed,
        };
        assert_eq!(h.controller.resolve(orphan), Err(EscalationError::NothingInFlight(7)));

        let request = h.raise();
        assert_eq!(
            h.controller.resolve(orphan),
            Err(EscalationError::UnknownRequest { expected: request.id, got: 7 })
        );
        let wrong_level = InterruptionOutcome {
            request_id: request.id,
            level: Level::Secondary,
            kind: OutcomeKind::UserDismissed,
        };
        assert_eq!(
            h.controller.resolve(wrong_level),
            Err(EscalationError::LevelMismatch {
                expected: Level::Primary,
                got: Level::Secondary,
            })
        );
        assert!(h.controller.alarm_in_flight());

        h.answer(&request, OutcomeKind::UserDismissed);
        // A duplicate of an outcome that was already applied
        assert!(h.controller.resolve(InterruptionOutcome::answering(&request, OutcomeKind::UserDismissed)).is_err());
        assert_eq!(h.controller.total_close_count(), 1);
    }

    #[test]
    fn test_overdue_interruption_times_out() {
        let mut h = Harness::new(settings(5, 3), TriggerPolicy::ActivityThreshold);
        let request = h.raise();
        let raised_at = h.now();

        let bound = request.display_bound() + OUTCOME_GRACE;
        assert!(h.controller.expire_overdue(raised_at + bound - Duration::from_millis(1)).is_none());

        let expired = h.controller.expire_overdue(raised_at + bound).expect("deadline passed");
        assert_eq!(expired.request_id, request.id);
        assert_eq!(expired.kind, OutcomeKind::TimedOut);
        assert_eq!(h.controller.state(), ControllerState::Monitoring);
        assert_eq!(h.controller.session_close_count(), 0);

        // The real outcome arriving late is stale now
        assert!(h.controller.resolve(InterruptionOutcome::answering(&request, OutcomeKind::UserDismissed)).is_err());
        assert_eq!(h.controller.total_close_count(), 0);
    }

    #[test]
    fn test_secondary_deadline_includes_unclosable_period() {
        let request = InterruptionRequest::secondary(1, secs(10), secs(7));
        assert_eq!(request.display_bound(), secs(17));
        assert_eq!(InterruptionRequest::primary(1, secs(30), None).display_bound(), secs(30));
    }

    #[test]
    fn test_withdraw_clears_without_counting() {
        let mut h = Harness::new(settings(5, 3), TriggerPolicy::ActivityThreshold);
        let request = h.raise();

        assert_eq!(
            h.controller.withdraw(request.id + 1),
            Err(EscalationError::UnknownRequest {
                expected: request.id,
                got: request.id + 1,
            })
        );
        h.controller.withdraw(request.id).unwrap();

        assert_eq!(h.controller.state(), ControllerState::Monitoring);
        assert_eq!(h.controller.session_close_count(), 0);
        assert_eq!(h.controller.withdraw(request.id), Err(EscalationError::NothingInFlight(request.id)));
    }

    #[test]
    fn test_fixed_interval_ignores_activity() {
        let mut h = Harness::new(settings(3600, 1), TriggerPolicy::FixedInterval);

        let first = h.check().expect("fires without activity");
        assert_eq!(first.level, Level::Primary);
        assert!(h.check().is_none());

        h.answer(&first, OutcomeKind::UserDismissed);
        let second = h.check().expect("fires again once resolved");
        assert_eq!(second.level, Level::Secondary);
    }

    #[test]
    fn test_primary_carries_rotating_images() {
        let images = ImageCatalog::from_paths(vec![PathBuf::from("1.png"), PathBuf::from("2.gif")], ImageSelection::Rotate);
        let mut h = Harness::new(settings(5, 10), TriggerPolicy::ActivityThreshold);
        h.controller = EscalationController::new(settings(5, 10), TriggerPolicy::ActivityThreshold, h.tracker.clone()).with_images(images);

        let mut shown = Vec::new();
        for _ in 0..3 {
            let request = h.raise();
            shown.push(request.auxiliary_content.clone());
            h.answer(&request, OutcomeKind::TimedOut);
        }

        assert_eq!(
            shown,
            vec![Some(PathBuf::from("1.png")), Some(PathBuf::from("2.gif")), Some(PathBuf::from("1.png"))]
        );
    }

    #[test]
    fn test_settings_from_alarm_config() {
        let settings = EscalationSettings::from(&AlarmConfig::default());
        assert_eq!(settings.activity_threshold, secs(3600));
        assert_eq!(settings.session_close_limit, 3);
        assert_eq!(settings.primary_auto_close, secs(30));
        assert_eq!(settings.secondary_unclosable, secs(10));
        assert_eq!(settings.secondary_auto_close, secs(7));
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(OutcomeKind::from_exit_code(Some(1)), OutcomeKind::UserDismissed);
        assert_eq!(OutcomeKind::from_exit_code(Some(0)), OutcomeKind::TimedOut);
        assert_eq!(OutcomeKind::from_exit_code(Some(2)), OutcomeKind::TimedOut);
        assert_eq!(OutcomeKind::from_exit_code(Some(-1)), OutcomeKind::TimedOut);
        assert_eq!(OutcomeKind::from_exit_code(None), OutcomeKind::TimedOut);
        assert_eq!(OutcomeKind::UserDismissed.exit_code(), 1);
        assert_eq!(OutcomeKind::TimedOut.exit_code(), 0);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("primary".parse::<Level>(), Ok(Level::Primary));
        assert_eq!("SECONDARY".parse::<Level>(), Ok(Level::Secondary));
        assert!("tertiary".parse::<Level>().is_err());
        assert_eq!(Level::Secondary.to_string(), "secondary");
    }
}
