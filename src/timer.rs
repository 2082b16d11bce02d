//! The rest timer shown between sets.
//!
//! [`RestTimer`] is a plain state machine advanced by [`RestTimer::tick`];
//! [`TimerDriver`] owns one and ticks it once a second from a tokio
//! task. The driver never has more than one task alive: anything that
//! schedules aborts the previous task first.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, o, Logger};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::errors::TrackerError;

pub const DEFAULT_PRESET_SECONDS: u32 = 90;

/// The presets offered next to the countdown.
pub const PRESETS: [u32; 4] = [60, 90, 120, 180];

const TICK: Duration = Duration::from_secs(1);

/// Called once when a countdown reaches zero.
pub type Notifier = dyn Fn() -> Result<(), TrackerError> + Send + Sync;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TimerState {
    Idle { remaining: u32 },
    Running { remaining: u32 },
    Expired,
}

impl TimerState {
    pub fn remaining(self) -> u32 {
        match self {
            TimerState::Idle { remaining } | TimerState::Running { remaining } => remaining,
            TimerState::Expired => 0,
        }
    }

    pub fn is_running(self) -> bool {
        matches!(self, TimerState::Running { .. })
    }
}

pub struct RestTimer {
    logger: Logger,
    preset: u32,
    state: TimerState,
    notifier: Option<Arc<Notifier>>,
}

impl RestTimer {
    pub fn new(logger: Logger) -> Self {
        Self::idle_at(logger, DEFAULT_PRESET_SECONDS)
    }

    /// Like [`new`](Self::new) with another preset. A zero preset could
    /// never start, so it is refused the same way [`set_preset`](Self::set_preset)
    /// refuses it.
    pub fn with_preset(logger: Logger, preset: u32) -> Result<Self, TrackerError> {
        check_preset(preset)?;

        Ok(Self::idle_at(logger, preset))
    }

    fn idle_at(logger: Logger, preset: u32) -> Self {
        RestTimer {
            logger: logger.new(o!("component" => "rest_timer")),
            preset,
            state: TimerState::Idle { remaining: preset },
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining(&self) -> u32 {
        self.state.remaining()
    }

    pub fn preset(&self) -> u32 {
        self.preset
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Starts counting down from `Idle`. Does nothing otherwise, or when
    /// there is nothing left to count.
    pub fn start(&mut self) {
        if let TimerState::Idle { remaining } = self.state {
            if remaining > 0 {
                self.state = TimerState::Running { remaining };
            }
        }
    }

    pub fn pause(&mut self) {
        if let TimerState::Running { remaining } = self.state {
            self.state = TimerState::Idle { remaining };
        }
    }

    /// Advances a running countdown by one second.
    pub fn tick(&mut self) {
        let remaining = match self.state {
            TimerState::Running { remaining } => remaining.saturating_sub(1),
            _ => return,
        };

        if remaining > 0 {
            self.state = TimerState::Running { remaining };
            return;
        }

        self.state = TimerState::Expired;
        debug!(self.logger, "Rest is over");
        self.notify();
    }

    /// Picks a new preset and rewinds to it. Refused mid-countdown.
    pub fn set_preset(&mut self, seconds: u32) -> Result<(), TrackerError> {
        if self.state.is_running() {
            return Err(TrackerError::TimerRunning);
        }
        check_preset(seconds)?;

        self.preset = seconds;
        self.state = TimerState::Idle { remaining: seconds };

        Ok(())
    }

    pub fn reset(&mut self) {
        self.state = TimerState::Idle {
            remaining: self.preset,
        };
    }

    fn notify(&self) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier() {
                debug!(self.logger, "Failed to deliver rest notification"; "error" => %e);
            }
        }
    }
}

/// Drives a [`RestTimer`] from the tokio runtime. Must be used from
/// within a runtime.
pub struct TimerDriver {
    timer: Arc<Mutex<RestTimer>>,
    task: Option<JoinHandle<()>>,
}

impl TimerDriver {
    pub fn new(timer: RestTimer) -> Self {
        TimerDriver {
            timer: Arc::new(Mutex::new(timer)),
            task: None,
        }
    }

    pub fn start(&mut self) {
        self.clear();

        let running = {
            let mut timer = lock(&self.timer);
            timer.start();
            timer.is_running()
        };

        if running {
            self.schedule();
        }
    }

    pub fn pause(&mut self) {
        self.clear();
        lock(&self.timer).pause();
    }

    pub fn reset(&mut self) {
        self.clear();
        lock(&self.timer).reset();
    }

    pub fn set_preset(&mut self, seconds: u32) -> Result<(), TrackerError> {
        let mut timer = lock(&self.timer);
        timer.set_preset(seconds)?;
        drop(timer);

        self.clear();
        Ok(())
    }

    pub fn state(&self) -> TimerState {
        lock(&self.timer).state()
    }

    pub fn remaining(&self) -> u32 {
        lock(&self.timer).remaining()
    }

    pub fn preset(&self) -> u32 {
        lock(&self.timer).preset()
    }

    /// Whether a tick task is alive.
    pub fn is_scheduled(&self) -> bool {
        self.task.as_ref().map_or(false, |task| !task.is_finished())
    }

    fn schedule(&mut self) {
        let timer = self.timer.clone();
        let mut interval = time::interval_at(Instant::now() + TICK, TICK);

        self.task = Some(tokio::spawn(async move {
            loop {
                interval.tick().await;

                let running = {
                    let mut timer = lock(&timer);
                    timer.tick();
                    timer.is_running()
                };

                if !running {
                    break;
                }
            }
        }));
    }

    fn clear(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Renders seconds as `m:ss`.
pub fn format_remaining(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn check_preset(seconds: u32) -> Result<(), TrackerError> {
    if seconds == 0 {
        return Err(TrackerError::invalid("preset", "must be at least one second"));
    }

    Ok(())
}

fn lock(timer: &Mutex<RestTimer>) -> MutexGuard<'_, RestTimer> {
    timer.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn counting_notifier(count: Arc<AtomicUsize>) -> Arc<Notifier> {
        Arc::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn new_timer_is_idle_at_the_preset() {
        let timer = RestTimer::new(log::discard());

        assert_eq!(timer.state(), TimerState::Idle { remaining: 90 });
        assert_eq!(timer.preset(), DEFAULT_PRESET_SECONDS);
        assert!(PRESETS.contains(&timer.preset()));
    }

    #[test]
    fn ninety_ticks_expire_and_notify_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut timer = RestTimer::new(log::discard()).with_notifier(counting_notifier(count.clone()));

        timer.start();
        for _ in 0..89 {
            timer.tick();
        }
        assert_eq!(timer.state(), TimerState::Running { remaining: 1 });
        assert_eq!(count.load(Ordering::SeqCst), 0);

        timer.tick();
        assert_eq!(timer.state(), TimerState::Expired);

        timer.tick();
        timer.start();
        assert_eq!(timer.state(), TimerState::Expired);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_notifier_still_expires() {
        let mut timer = RestTimer::with_preset(log::discard(), 1)
            .expect("valid preset")
            .with_notifier(Arc::new(|| Err(TrackerError::Notification("denied".to_owned()))));

        timer.start();
        timer.tick();

        assert_eq!(timer.state(), TimerState::Expired);
    }

    #[test]
    fn pause_keeps_remaining_and_ticks_do_nothing() {
        let mut timer = RestTimer::with_preset(log::discard(), 60).expect("valid preset");

        timer.tick();
        assert_eq!(timer.remaining(), 60);

        timer.start();
        timer.tick();
        timer.tick();
        timer.pause();
        timer.tick();

        assert_eq!(timer.state(), TimerState::Idle { remaining: 58 });

        timer.start();
        assert_eq!(timer.state(), TimerState::Running { remaining: 58 });
    }

    #[test]
    fn preset_changes_are_refused_while_running() {
        let mut timer = RestTimer::new(log::discard());
        timer.start();

        assert!(matches!(timer.set_preset(120), Err(TrackerError::TimerRunning)));
        assert_eq!(timer.state(), TimerState::Running { remaining: 90 });

        timer.pause();
        timer.set_preset(120).expect("set preset while idle");
        assert_eq!(timer.state(), TimerState::Idle { remaining: 120 });
        assert!(timer.set_preset(0).is_err());
    }

    #[test]
    fn reset_rewinds_from_any_state() {
        let mut timer = RestTimer::with_preset(log::discard(), 2).expect("valid preset");
        timer.start();
        timer.tick();
        timer.tick();
        assert_eq!(timer.state(), TimerState::Expired);

        timer.reset();
        assert_eq!(timer.state(), TimerState::Idle { remaining: 2 });

        timer.start();
        timer.tick();
        timer.reset();
        assert_eq!(timer.state(), TimerState::Idle { remaining: 2 });
    }

    #[test]
    fn zero_preset_is_refused_up_front() {
        assert!(matches!(
            RestTimer::with_preset(log::discard(), 0),
            Err(TrackerError::InvalidField { field: "preset", .. })
        ));
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_remaining(90), "1:30");
        assert_eq!(format_remaining(5), "0:05");
        assert_eq!(format_remaining(180), "3:00");
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn driver_starting_twice_ticks_once_per_second() {
        tokio::time::pause();

        let mut driver = TimerDriver::new(RestTimer::new(log::discard()));
        driver.start();
        driver.start();

        tokio::time::advance(Duration::from_millis(1500)).await;
        settle().await;

        assert_eq!(driver.state(), TimerState::Running { remaining: 89 });
        assert!(driver.is_scheduled());
    }

    #[tokio::test]
    async fn driver_pause_stops_the_countdown() {
        tokio::time::pause();

        let mut driver = TimerDriver::new(RestTimer::with_preset(log::discard(), 60).expect("valid preset"));
        driver.start();

        tokio::time::advance(Duration::from_millis(2500)).await;
        settle().await;
        driver.pause();

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;

        assert_eq!(driver.state(), TimerState::Idle { remaining: 58 });
        assert!(!driver.is_scheduled());
    }

    #[tokio::test]
    async fn driver_runs_to_expiry() {
        tokio::time::pause();

        let count = Arc::new(AtomicUsize::new(0));
        let timer = RestTimer::with_preset(log::discard(), 3)
            .expect("valid preset")
            .with_notifier(counting_notifier(count.clone()));
        let mut driver = TimerDriver::new(timer);
        driver.start();

        for _ in 0..5 {
            tokio::time::advance(TICK).await;
            settle().await;
        }

        assert_eq!(driver.state(), TimerState::Expired);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!driver.is_scheduled());
    }
}
