use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    Tick(u64),
    Warning,
    TimeExpired,
}

/// Countdown state stepped once per elapsed second.
///
/// Emits `D, D-1, ..., 0` and fires `TimeExpired` exactly once. After expiry
/// or `stop`, no further events are produced.
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u64,
    warn_at: Option<u64>,
    warned: bool,
    expired: bool,
    stopped: bool,
}

impl Countdown {
    pub fn new(secs: u64, warn_at: Option<u64>) -> Self {
        Self {
            remaining: secs,
            warn_at,
            warned: false,
            expired: false,
            stopped: false,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        !self.expired && !self.stopped
    }

    /// Events for the initial value, before any second has elapsed.
    pub fn begin(&mut self) -> Vec<TimerEvent> {
        if !self.is_running() {
            return Vec::new();
        }
        // A countdown starting inside the warning window is not warned about.
        if self.warn_at.is_some_and(|w| self.remaining <= w) {
            self.warned = true;
        }
        self.emit()
    }

    pub fn tick(&mut self) -> Vec<TimerEvent> {
        if !self.is_running() {
            return Vec::new();
        }
        self.remaining = self.remaining.saturating_sub(1);
        self.emit()
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    fn emit(&mut self) -> Vec<TimerEvent> {
        let mut events = vec![TimerEvent::Tick(self.remaining)];
        if self.remaining == 0 {
            self.expired = true;
            events.push(TimerEvent::TimeExpired);
            return events;
        }
        if let Some(w) = self.warn_at {
            if !self.warned && self.remaining <= w {
                self.warned = true;
                events.push(TimerEvent::Warning);
            }
        }
        events
    }
}

/// Owner of a running countdown thread. Stops the thread when stopped or dropped.
#[derive(Debug)]
pub struct TimerHandle {
    stop: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn spawn_countdown(
    secs: u64,
    warn_at: Option<u64>,
) -> (TimerHandle, mpsc::Receiver<TimerEvent>) {
    spawn_countdown_with_period(secs, warn_at, Duration::from_secs(1))
}

pub fn spawn_countdown_with_period(
    secs: u64,
    warn_at: Option<u64>,
    period: Duration,
) -> (TimerHandle, mpsc::Receiver<TimerEvent>) {
    let (tx, rx) = mpsc::channel();
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();

    thread::spawn(move || {
        let mut countdown = Countdown::new(secs, warn_at);
        let mut events = countdown.begin();

        loop {
            for ev in events {
                if flag.load(Ordering::SeqCst) || tx.send(ev).is_err() {
                    return;
                }
            }
            if !countdown.is_running() {
                return;
            }

            thread::sleep(period);

            if flag.load(Ordering::SeqCst) {
                return;
            }
            events = countdown.tick();
        }
    });

    (TimerHandle { stop }, rx)
}

pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
