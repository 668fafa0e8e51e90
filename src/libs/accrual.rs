//! Activity accrual per input channel.
//!
//! Raw keyboard and mouse events arrive in bursts. The tracker turns them
//! into "continuous activity" durations using edge-triggered delta accrual:
//! on every event the time since the previous event on the same channel is
//! credited, but only when it is shorter than the debounce window. A single
//! key press after a long idle period therefore credits nothing, while a
//! steady stream of input credits real elapsed time.
//!
//! Each channel keeps two counters that always receive the same credit:
//!
//! - the **alarm window**, reset by the escalation controller whenever an
//!   interruption is raised
//! - the **report window**, reset by the activity reporter after a report
//!   has been written
//!
//! The event path runs on the input listener thread and must never stall
//! it, so a record is one short critical section of arithmetic.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Longest gap between two events on a channel that still counts as
/// continuous activity.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Keyboard,
    Mouse,
}

impl Channel {
    fn index(self) -> usize {
        match self {
            Channel::Keyboard => 0,
            Channel::Mouse => 1,
        }
    }
}

/// Accrual state of a single channel.
#[derive(Debug, Clone, Copy)]
pub struct ActivityAccumulator {
    last_event: Instant,
    alarm_window: Duration,
    report_window: Duration,
}

impl ActivityAccumulator {
    pub fn new(now: Instant) -> Self {
        Self {
            last_event: now,
            alarm_window: Duration::ZERO,
            report_window: Duration::ZERO,
        }
    }

    /// Registers an event at `now` and returns the credited duration.
    pub fn record(&mut self, now: Instant, debounce: Duration) -> Duration {
        let elapsed = now.saturating_duration_since(self.last_event);
        let credit = if elapsed < debounce { elapsed } else { Duration::ZERO };

        self.alarm_window += credit;
        self.report_window += credit;
        self.last_event = self.last_event.max(now);
        credit
    }

    pub fn last_event(&self) -> Instant {
        self.last_event
    }

    pub fn alarm_window(&self) -> Duration {
        self.alarm_window
    }

    pub fn report_window(&self) -> Duration {
        self.report_window
    }

    pub fn reset_alarm_window(&mut self) {
        self.alarm_window = Duration::ZERO;
    }

    pub fn reset_report_window(&mut self) {
        self.report_window = Duration::ZERO;
    }
}

/// Both windows of one channel at the moment of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelTotals {
    pub alarm_window: Duration,
    pub report_window: Duration,
}

/// A consistent read of both channels taken under a single lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivitySnapshot {
    pub keyboard: ChannelTotals,
    pub mouse: ChannelTotals,
}

impl ActivitySnapshot {
    /// Combined keyboard + mouse alarm-window activity.
    pub fn alarm_total(&self) -> Duration {
        self.keyboard.alarm_window + self.mouse.alarm_window
    }
}

/// Thread-safe pair of accumulators shared between the input listener and
/// the monitor loop.
#[derive(Debug)]
pub struct ActivityTracker {
    channels: Mutex<[ActivityAccumulator; 2]>,
    debounce: Duration,
    attached: AtomicBool,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::with_debounce(DEBOUNCE_WINDOW, Instant::now())
    }

    /// Creates a tracker whose channels both start counting from `start`.
    pub fn with_debounce(debounce: Duration, start: Instant) -> Self {
        Self {
            channels: Mutex::new([ActivityAccumulator::new(start); 2]),
            debounce,
            attached: AtomicBool::new(true),
        }
    }

    /// Event callback for the input listener.
    pub fn record(&self, channel: Channel) {
        if !self.is_attached() {
            return;
        }
        let mut channels = self.channels.lock();
        channels[channel.index()].record(Instant::now(), self.debounce);
    }

    /// Registers an event with an explicit timestamp.
    pub fn record_at(&self, channel: Channel, now: Instant) -> Duration {
        if !self.is_attached() {
            return Duration::ZERO;
        }
        self.channels.lock()[channel.index()].record(now, self.debounce)
    }

    pub fn snapshot(&self) -> ActivitySnapshot {
        let channels = self.channels.lock();
        let totals = |acc: &ActivityAccumulator| ChannelTotals {
            alarm_window: acc.alarm_window(),
            report_window: acc.report_window(),
        };
        ActivitySnapshot {
            keyboard: totals(&channels[Channel::Keyboard.index()]),
            mouse: totals(&channels[Channel::Mouse.index()]),
        }
    }

    pub fn alarm_window(&self, channel: Channel) -> Duration {
        self.channels.lock()[channel.index()].alarm_window()
    }

    pub fn report_window(&self, channel: Channel) -> Duration {
        self.channels.lock()[channel.index()].report_window()
    }

    pub fn last_event(&self, channel: Channel) -> Instant {
        self.channels.lock()[channel.index()].last_event()
    }

    /// Zeroes the alarm window of every channel.
    pub fn reset_alarm_window(&self) {
        self.channels.lock().iter_mut().for_each(ActivityAccumulator::reset_alarm_window);
    }

    /// Zeroes the report window of every channel.
    pub fn reset_report_window(&self) {
        self.channels.lock().iter_mut().for_each(ActivityAccumulator::reset_report_window);
    }

    /// Stops accepting events. Accumulated values are left as they are and
    /// calling this more than once is harmless.
    pub fn stop(&self) {
        self.attached.store(false, Ordering::Release);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}
