//! The monitor loop.
//!
//! One task owns the escalation controller and multiplexes everything that
//! can change it:
//!
//! - the periodic check (1 s in `watch` mode, the notification interval in
//!   service mode)
//! - interruption outcomes coming back from the presenter
//! - the activity report timer
//! - the shutdown signal
//!
//! Because all of these are handled in one `select!` loop, state
//! transitions are applied strictly one at a time. The only state shared
//! with another thread is the [`ActivityTracker`], which the input listener
//! writes to directly.

use crate::libs::accrual::{ActivityTracker, Channel};
use crate::libs::config::Config;
use crate::libs::escalation::{EscalationController, EscalationSettings, EscalationState, InterruptionOutcome, TriggerPolicy};
use crate::libs::images::ImageCatalog;
use crate::libs::input::{RawInputSource, RdevInputSource};
use crate::libs::messages::Message;
use crate::libs::notifier::ProcessNotifier;
use crate::libs::presenter::{ConsolePresenter, OutcomeSender, Presentation, Presenter};
use crate::libs::report::ActivityReporter;
use crate::{msg_info, msg_warning};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Cadence of threshold checks in `watch` mode.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// How the monitor is hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    /// Interruptions are rendered in the monitor's own terminal and raised
    /// when the activity threshold is reached.
    InProcess,
    /// Interruptions are delegated to spawned alarm processes and raised on
    /// the fixed notification interval.
    Service,
}

/// Stops a running [`Monitor`]. Cloneable and safe to trigger repeatedly.
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    stop: Arc<watch::Sender<bool>>,
}

impl MonitorHandle {
    pub fn shutdown(&self) {
        self.stop.send_replace(true);
    }

    pub fn is_shut_down(&self) -> bool {
        *self.stop.borrow()
    }
}

pub struct Monitor {
    tracker: Arc<ActivityTracker>,
    source: Box<dyn RawInputSource>,
    controller: EscalationController,
    presenter: Box<dyn Presenter>,
    reporter: Option<ActivityReporter>,
    check_interval: Duration,
    handle: MonitorHandle,
}

impl Monitor {
    pub fn new(source: Box<dyn RawInputSource>, controller: EscalationController, presenter: Box<dyn Presenter>) -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            tracker: controller.tracker().clone(),
            source,
            controller,
            presenter,
            reporter: None,
            check_interval: CHECK_INTERVAL,
            handle: MonitorHandle { stop: Arc::new(stop) },
        }
    }

    /// Assembles a monitor for `deployment` from the configuration, hooked
    /// to the real input devices.
    ///
    /// # Errors
    ///
    /// Fails on invalid settings, or when the service cannot resolve its own
    /// executable for launching alarms.
    pub fn from_config(config: &Config, deployment: Deployment) -> Result<Self> {
        config.validate()?;
        let alarm = config.alarm_config();
        let tracker = Arc::new(ActivityTracker::new());

        let (policy, check_interval, presenter) = match deployment {
            Deployment::InProcess => (
                TriggerPolicy::ActivityThreshold,
                CHECK_INTERVAL,
                Box::new(ConsolePresenter::interactive()) as Box<dyn Presenter>,
            ),
            Deployment::Service => (
                TriggerPolicy::FixedInterval,
                alarm.notification_interval(),
                Box::new(ProcessNotifier::for_current_exe()?) as Box<dyn Presenter>,
            ),
        };

        let mut controller = EscalationController::new(EscalationSettings::from(&alarm), policy, tracker);
        if let Some(assets) = &config.assets {
            match ImageCatalog::from_config(assets) {
                Ok(images) => {
                    msg_info!(Message::ImagesLoaded(images.len()));
                    controller = controller.with_images(images);
                }
                // Reminders still work without pictures
                Err(e) => msg_warning!(Message::AssetsDirectoryUnreadable(e.to_string())),
            }
        }

        let reporter = ActivityReporter::from_config(&config.report_config(), alarm.logging_interval())?;

        Ok(Self::new(Box::new(RdevInputSource::new()), controller, presenter)
            .with_check_interval(check_interval)
            .with_reporter(reporter))
    }

    pub fn with_check_interval(mut self, check_interval: Duration) -> Self {
        self.check_interval = check_interval;
        self
    }

    pub fn with_reporter(mut self, reporter: ActivityReporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn handle(&self) -> MonitorHandle {
        self.handle.clone()
    }

    pub fn tracker(&self) -> Arc<ActivityTracker> {
        self.tracker.clone()
    }

    /// Runs until the handle is shut down and returns the final escalation
    /// state.
    ///
    /// # Errors
    ///
    /// Returns an error only if the input source cannot be attached.
    pub async fn run(mut self) -> Result<EscalationState> {
        let mut stop = self.handle.stop.subscribe();
        if *stop.borrow_and_update() {
            return Ok(self.controller.escalation_state());
        }

        let keyboard = self.tracker.clone();
        self.source.on_keyboard_event(Arc::new(move || keyboard.record(Channel::Keyboard)));
        let mouse = self.tracker.clone();
        self.source.on_mouse_event(Arc::new(move || mouse.record(Channel::Mouse)));
        self.source.start()?;

        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<InterruptionOutcome>();

        let mut checks = time::interval_at(Instant::now() + self.check_interval, self.check_interval);
        checks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut reports = self.reporter.as_ref().map(|reporter| {
            let mut reports = time::interval_at(Instant::now() + reporter.interval(), reporter.interval());
            reports.set_missed_tick_behavior(MissedTickBehavior::Delay);
            reports
        });

        loop {
            tokio::select! {
                _ = checks.tick() => self.on_check(&outcome_tx),
                Some(outcome) = outcome_rx.recv() => self.on_outcome(outcome),
                _ = next_tick(&mut reports) => self.on_report(),
                _ = stop.changed() => break,
            }
        }

        // Detach first so nothing is credited after this point. Accumulated
        // activity is discarded, not reported.
        self.source.stop();
        self.tracker.stop();
        self.presenter.shutdown();
        msg_info!(Message::MonitorStopped);

        Ok(self.controller.escalation_state())
    }

    fn on_check(&mut self, outcomes: &OutcomeSender) {
        let now = Instant::now();
        if let Some(expired) = self.controller.expire_overdue(now) {
            msg_warning!(Message::InterruptionOverdue(expired.request_id));
        }

        let Some(request) = self.controller.check(now) else {
            return;
        };
        msg_info!(Message::InterruptionRaised {
            id: request.id,
            level: request.level.to_string(),
        });

        let id = request.id;
        if self.presenter.present(request, outcomes.clone()) == Presentation::Busy {
            msg_warning!(Message::PresenterBusy(id));
            if self.controller.withdraw(id).is_ok() {
                msg_info!(Message::InterruptionWithdrawn(id));
            }
        }
    }

    fn on_outcome(&mut self, outcome: InterruptionOutcome) {
        match self.controller.resolve(outcome) {
            Ok(state) => msg_info!(Message::InterruptionResolved {
                id: outcome.request_id,
                level: outcome.level.to_string(),
                outcome: outcome.kind.to_string(),
                session_close_count: state.session_close_count(),
                total_close_count: state.total_close_count(),
            }),
            Err(e) => msg_warning!(Message::OutcomeRejected(e.to_string())),
        }
    }

    fn on_report(&mut self) {
        if let Some(reporter) = self.reporter.as_mut() {
            // Failures are logged by the reporter and retried next interval
            let _ = reporter.report(&self.tracker, self.controller.total_close_count());
        }
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
