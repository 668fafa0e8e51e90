//! Escalation state machine.
//!
//! The controller is polled on a fixed cadence by the monitor loop. When the
//! combined alarm-window activity reaches the threshold it raises an
//! interruption and waits for its outcome:
//!
//! ```text
//!              threshold reached, session < limit
//!   Monitoring ───────────────────────────────────▶ InterruptionActive(Primary)
//!       ▲  │       threshold reached, session ≥ limit          │
//!       │  └──────────────────────────────────▶ InterruptionActive(Secondary)
//!       │                                                      │
//!       └──────────────── outcome (or deadline) ───────────────┘
//! ```
//!
//! - a user-dismissed primary bumps both the session and the total count
//! - a timed-out primary changes nothing
//! - any secondary outcome resets the session count and never touches the
//!   total
//!
//! Only one interruption is ever in flight. If its outcome never arrives the
//! controller times it out on its own once the interruption's display bound
//! plus a grace period has passed.

use crate::libs::accrual::ActivityTracker;
use crate::libs::config::AlarmConfig;
use crate::libs::images::ImageCatalog;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Exit code of an alarm process the user closed.
pub const EXIT_USER_DISMISSED: i32 = 1;
/// Exit code of an alarm process that closed by itself.
pub const EXIT_TIMED_OUT: i32 = 0;

/// Slack on top of an interruption's own timeouts before the controller
/// stops waiting for its outcome. Covers process start-up and teardown.
pub const OUTCOME_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Primary,
    Secondary,
}

impl Level {
    /// Mode token used on the alarm process command line.
    pub fn token(&self) -> &'static str {
        match self {
            Level::Primary => "primary",
            Level::Secondary => "secondary",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown alarm level '{0}', expected 'primary' or 'secondary'")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Ok(Level::Primary),
            "secondary" => Ok(Level::Secondary),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    UserDismissed,
    TimedOut,
}

impl OutcomeKind {
    /// Decodes an alarm process exit status. Only `1` is a dismissal;
    /// every other code, and a missing one (killed by a signal), is a
    /// timeout.
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(EXIT_USER_DISMISSED) => OutcomeKind::UserDismissed,
            _ => OutcomeKind::TimedOut,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            OutcomeKind::UserDismissed => EXIT_USER_DISMISSED,
            OutcomeKind::TimedOut => EXIT_TIMED_OUT,
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::UserDismissed => f.write_str("dismissed by user"),
            OutcomeKind::TimedOut => f.write_str("timed out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptionRequest {
    pub id: u64,
    pub level: Level,
    /// Image shown with a primary reminder, if any are configured.
    pub auxiliary_content: Option<PathBuf>,
    pub auto_close_after: Duration,
    /// Secondary only: how long close requests are ignored.
    pub unclosable_for: Option<Duration>,
}

impl InterruptionRequest {
    pub fn primary(id: u64, auto_close_after: Duration, auxiliary_content: Option<PathBuf>) -> Self {
        Self {
            id,
            level: Level::Primary,
            auxiliary_content,
            auto_close_after,
            unclosable_for: None,
        }
    }

    pub fn secondary(id: u64, unclosable_for: Duration, auto_close_after: Duration) -> Self {
        Self {
            id,
            level: Level::Secondary,
            auxiliary_content: None,
            auto_close_after,
            unclosable_for: Some(unclosable_for),
        }
    }

    /// Longest time the interruption can stay on screen.
    pub fn display_bound(&self) -> Duration {
        self.unclosable_for.unwrap_or_default() + self.auto_close_after
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptionOutcome {
    pub request_id: u64,
    pub level: Level,
    pub kind: OutcomeKind,
}

impl InterruptionOutcome {
    pub fn answering(request: &InterruptionRequest, kind: OutcomeKind) -> Self {
        Self {
            request_id: request.id,
            level: request.level,
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Monitoring,
    InterruptionActive(Level),
}

/// What makes a check raise an interruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPolicy {
    /// Raise when combined alarm-window activity reaches the threshold.
    ActivityThreshold,
    /// Raise on every check while nothing is in flight. Used by the service,
    /// whose check cadence is the notification interval.
    FixedInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EscalationState {
    session_close_count: u32,
    total_close_count: u64,
    alarm_in_flight: bool,
}

impl EscalationState {
    pub fn session_close_count(&self) -> u32 {
        self.session_close_count
    }

    pub fn total_close_count(&self) -> u64 {
        self.total_close_count
    }

    pub fn alarm_in_flight(&self) -> bool {
        self.alarm_in_flight
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EscalationSettings {
    pub activity_threshold: Duration,
    pub session_close_limit: u32,
    pub primary_auto_close: Duration,
    pub secondary_unclosable: Duration,
    pub secondary_auto_close: Duration,
    pub outcome_grace: Duration,
}

impl From<&AlarmConfig> for EscalationSettings {
    fn from(config: &AlarmConfig) -> Self {
        Self {
            activity_threshold: config.activity_threshold(),
            session_close_limit: config.session_close_limit,
            primary_auto_close: config.primary_auto_close(),
            secondary_unclosable: config.secondary_unclosable(),
            secondary_auto_close: config.secondary_auto_close(),
            outcome_grace: OUTCOME_GRACE,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EscalationError {
    #[error("no interruption is in flight (outcome for #{0})")]
    NothingInFlight(u64),
    #[error("outcome for #{got} does not answer in-flight interruption #{expected}")]
    UnknownRequest { expected: u64, got: u64 },
    #[error("outcome level '{got}' does not match in-flight level '{expected}'")]
    LevelMismatch { expected: Level, got: Level },
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    request_id: u64,
    level: Level,
    deadline: Instant,
}

pub struct EscalationController {
    settings: EscalationSettings,
    policy: TriggerPolicy,
    tracker: Arc<ActivityTracker>,
    images: Option<ImageCatalog>,
    state: EscalationState,
    in_flight: Option<InFlight>,
    next_request_id: u64,
}

impl EscalationController {
    pub fn new(settings: EscalationSettings, policy: TriggerPolicy, tracker: Arc<ActivityTracker>) -> Self {
        Self {
            settings,
            policy,
            tracker,
            images: None,
            state: EscalationState::default(),
            in_flight: None,
            next_request_id: 1,
        }
    }

    pub fn with_images(mut self, images: ImageCatalog) -> Self {
        self.images = Some(images);
        self
    }

    pub fn state(&self) -> ControllerState {
        match self.in_flight {
            Some(in_flight) => ControllerState::InterruptionActive(in_flight.level),
            None => ControllerState::Monitoring,
        }
    }

    pub fn escalation_state(&self) -> EscalationState {
        self.state
    }

    pub fn session_close_count(&self) -> u32 {
        self.state.session_close_count
    }

    pub fn total_close_count(&self) -> u64 {
        self.state.total_close_count
    }

    pub fn alarm_in_flight(&self) -> bool {
        self.state.alarm_in_flight
    }

    pub fn tracker(&self) -> &Arc<ActivityTracker> {
        &self.tracker
    }

    /// Periodic check. Returns the interruption to show, if one is due.
    ///
    /// Nothing is raised while another interruption is in flight, however
    /// much activity has accrued in the meantime.
    pub fn check(&mut self, now: Instant) -> Option<InterruptionRequest> {
        if self.in_flight.is_some() {
            return None;
        }

        if self.policy == TriggerPolicy::ActivityThreshold && self.tracker.snapshot().alarm_total() < self.settings.activity_threshold {
            return None;
        }

        self.tracker.reset_alarm_window();
        Some(self.raise(now))
    }

    fn raise(&mut self, now: Instant) -> InterruptionRequest {
        let id = self.next_request_id;
        self.next_request_id += 1;

        let request = if self.state.session_close_count < self.settings.session_close_limit {
            let image = self.images.as_mut().and_then(ImageCatalog::next_image);
            InterruptionRequest::primary(id, self.settings.primary_auto_close, image)
        } else {
            InterruptionRequest::secondary(id, self.settings.secondary_unclosable, self.settings.secondary_auto_close)
        };

        self.in_flight = Some(InFlight {
            request_id: id,
            level: request.level,
            deadline: now + request.display_bound() + self.settings.outcome_grace,
        });
        self.state.alarm_in_flight = true;
        request
    }

    /// Applies the outcome of the in-flight interruption.
    ///
    /// Outcomes that do not answer the current request (stale, duplicated
    /// or for the wrong level) are rejected and leave the state untouched.
    pub fn resolve(&mut self, outcome: InterruptionOutcome) -> Result<EscalationState, EscalationError> {
        let in_flight = self.in_flight.ok_or(EscalationError::NothingInFlight(outcome.request_id))?;
        if in_flight.request_id != outcome.request_id {
            return Err(EscalationError::UnknownRequest {
                expected: in_flight.request_id,
                got: outcome.request_id,
            });
        }
        if in_flight.level != outcome.level {
            return Err(EscalationError::LevelMismatch {
                expected: in_flight.level,
                got: outcome.level,
            });
        }

        self.apply(in_flight.level, outcome.kind);
        Ok(self.state)
    }

    fn apply(&mut self, level: Level, kind: OutcomeKind) {
        match (level, kind) {
            (Level::Primary, OutcomeKind::UserDismissed) => {
                self.state.session_close_count += 1;
                self.state.total_close_count += 1;
            }
            (Level::Primary, OutcomeKind::TimedOut) => {}
            (Level::Secondary, _) => self.state.session_close_count = 0,
        }
        self.in_flight = None;
        self.state.alarm_in_flight = false;
    }

    /// Times out the in-flight interruption if its outcome is overdue.
    /// Returns the synthesized outcome when that happens.
    pub fn expire_overdue(&mut self, now: Instant) -> Option<InterruptionOutcome> {
        let in_flight = self.in_flight.filter(|in_flight| now >= in_flight.deadline)?;
        self.apply(in_flight.level, OutcomeKind::TimedOut);
        Some(InterruptionOutcome {
            request_id: in_flight.request_id,
            level: in_flight.level,
            kind: OutcomeKind::TimedOut,
        })
    }

    /// Drops an in-flight request that was never shown, without counting
    /// it either way.
    pub fn withdraw(&mut self, request_id: u64) -> Result<(), EscalationError> {
        let in_flight = self.in_flight.ok_or(EscalationError::NothingInFlight(request_id))?;
        if in_flight.request_id != request_id {
            return Err(EscalationError::UnknownRequest {
                expected: in_flight.request_id,
                got: request_id,
            });
        }
        self.in_flight = None;
        self.state.alarm_in_flight = false;
        Ok(())
    }
}
