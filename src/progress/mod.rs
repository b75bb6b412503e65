//! # Progress Monitor
//!
//! Periodic throughput reporting for the frame loop, in the style of an
//! encoder status line. Every three seconds (by default) the monitor samples
//! a shared frame counter, derives instantaneous fps, an estimated bitrate
//! and a speed multiplier, advances an elapsed-time odometer, and rewrites a
//! single status line on stderr.
//!
//! The loop owns a [`ProgressCounter`] and bumps it once per completed frame;
//! the monitor task only ever reads it. [`ProgressMonitor::finish`] stops the
//! timer and performs one explicit final firing so the line always shows the
//! true final frame count, however the run's length relates to the cadence.

use std::fmt;
use std::io::Write as _;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::error::{IvrayError, Result};

/// Frame-index counter shared between the processing loop and the monitor.
///
/// The loop is the only writer and the monitor the only reader, and the
/// counter is a lone scalar with no memory published through it, so relaxed
/// ordering is enough.
#[derive(Debug, Default)]
pub struct ProgressCounter(AtomicU32);

impl ProgressCounter {
    pub fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Mark one more frame as completed.
    pub fn advance(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of frames completed so far.
    pub fn position(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Tuning for one monitor instance.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Wall-clock reporting cadence.
    pub interval: Duration,
    /// Estimated raw size of one source frame in bytes; scales the reported
    /// bitrate. Fixed for the lifetime of the monitor.
    pub frame_bytes: u64,
    /// Nominal playback rate the speed multiplier is measured against.
    pub reference_fps: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            frame_bytes: 0,
            reference_fps: 24.0,
        }
    }
}

/// One report computed at a firing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub frame_index: u32,
    pub fps: f32,
    pub kbits_per_sec: f32,
    pub speed: f32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame= {} fps= {:.1} time={:02}:{:02}:{:02} bitrate={:.1}kbits/s speed={:.2}x",
            self.frame_index,
            self.fps,
            self.hours,
            self.minutes,
            self.seconds,
            self.kbits_per_sec,
            self.speed
        )
    }
}

/// The state carried between firings: the frame index seen at the previous
/// firing and the elapsed-time odometer.
#[derive(Debug)]
pub struct ProgressTracker {
    interval: Duration,
    frame_bytes: u64,
    reference_fps: f32,
    prev_index: u32,
    hours: u32,
    minutes: u32,
    seconds: u32,
}

impl ProgressTracker {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            interval: config.interval,
            frame_bytes: config.frame_bytes,
            reference_fps: config.reference_fps,
            prev_index: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// Fold one firing into the tracker and return the derived report.
    ///
    /// Rates are instantaneous: they cover only the frames completed since
    /// the previous firing, so stalls show up as fps 0.0 rather than being
    /// smoothed away. The odometer advances by one cadence per firing and
    /// rolls seconds and minutes over at 60.
    pub fn tick(&mut self, frame_index: u32) -> ProgressSnapshot {
        let fps =
            frame_index.saturating_sub(self.prev_index) as f32 / self.interval.as_secs_f32();
        let kbits_per_sec = fps * self.frame_bytes as f32 / 1000.0;
        let speed = fps / self.reference_fps;
        self.prev_index = frame_index;

        self.seconds += self.interval.as_secs() as u32;
        while self.seconds >= 60 {
            self.seconds -= 60;
            self.minutes += 1;
        }
        while self.minutes >= 60 {
            self.minutes -= 60;
            self.hours += 1;
        }

        ProgressSnapshot {
            frame_index,
            fps,
            kbits_per_sec,
            speed,
            hours: self.hours,
            minutes: self.minutes,
            seconds: self.seconds,
        }
    }
}

/// Handle to the spawned reporting task.
///
/// Dropping the handle without calling [`finish`](Self::finish) aborts the
/// final report; the task itself stops once its shutdown channel closes.
pub struct ProgressMonitor {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<ProgressTracker>,
    counter: Arc<ProgressCounter>,
}

impl ProgressMonitor {
    /// Arm the monitor: report every `config.interval` until `finish`.
    pub fn spawn(counter: Arc<ProgressCounter>, config: MonitorConfig) -> Self {
        let (shutdown, mut stop) = oneshot::channel();
        let shared = Arc::clone(&counter);

        let handle = tokio::spawn(async move {
            let mut tracker = ProgressTracker::new(&config);
            let mut timer = tokio::time::interval(config.interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately; consume
            // it so the first report lands one full cadence in.
            timer.tick().await;

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let snapshot = tracker.tick(shared.position());
                        render(&snapshot);
                    }
                    _ = &mut stop => break,
                }
            }

            tracker
        });

        debug!("progress monitor armed");
        Self {
            shutdown,
            handle,
            counter,
        }
    }

    /// Disarm the timer, then perform the explicit final firing.
    ///
    /// The final report is rendered exactly once, after the periodic timer
    /// can no longer fire, and reflects the counter's final value.
    pub async fn finish(self) -> Result<ProgressSnapshot> {
        // A closed receiver means the task is already winding down.
        let _ = self.shutdown.send(());
        let mut tracker = self
            .handle
            .await
            .map_err(|e| IvrayError::generic(format!("progress monitor task failed: {e}")))?;

        let snapshot = tracker.tick(self.counter.position());
        render(&snapshot);
        let mut err = std::io::stderr();
        let _ = writeln!(err);

        debug!("progress monitor disarmed");
        Ok(snapshot)
    }
}

/// Rewrite the status line in place. Raw stderr rather than a tracing event:
/// the `\r` keeps a single live line, which a log formatter would break up.
fn render(snapshot: &ProgressSnapshot) {
    let mut err = std::io::stderr();
    let _ = write!(err, "\r{snapshot}");
    let _ = err.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(interval_secs: u64, frame_bytes: u64) -> ProgressTracker {
        ProgressTracker::new(&MonitorConfig {
            interval: Duration::from_secs(interval_secs),
            frame_bytes,
            reference_fps: 24.0,
        })
    }

    #[test]
    fn test_tick_computes_instantaneous_rates() {
        let mut tracker = tracker(3, 1_000_000);
        let snapshot = tracker.tick(72);

        assert_eq!(snapshot.frame_index, 72);
        assert_eq!(snapshot.fps, 24.0);
        assert_eq!(snapshot.kbits_per_sec, 24_000.0);
        assert_eq!(snapshot.speed, 1.0);
        assert_eq!((snapshot.hours, snapshot.minutes, snapshot.seconds), (0, 0, 3));
    }

    #[test]
    fn test_stalled_interval_reports_zero_fps() {
        let mut tracker = tracker(3, 500);
        tracker.tick(10);
        let snapshot = tracker.tick(10);

        assert_eq!(snapshot.frame_index, 10);
        assert_eq!(snapshot.fps, 0.0);
        assert_eq!(snapshot.kbits_per_sec, 0.0);
        assert_eq!((snapshot.minutes, snapshot.seconds), (0, 6));
    }

    #[test]
    fn test_counter_regression_clamps_to_zero() {
        let mut tracker = tracker(3, 500);
        tracker.tick(10);
        let snapshot = tracker.tick(4);

        assert_eq!(snapshot.fps, 0.0);
    }

    #[test]
    fn test_odometer_rolls_seconds_into_minutes() {
        let mut tracker = tracker(3, 0);
        let mut last = tracker.tick(0);
        for i in 1..20 {
            last = tracker.tick(i);
        }

        // 20 firings at 3s: exactly one minute.
        assert_eq!((last.hours, last.minutes, last.seconds), (0, 1, 0));
    }

    #[test]
    fn test_odometer_rolls_minutes_into_hours() {
        let mut tracker = tracker(3, 0);
        let mut last = tracker.tick(0);
        for i in 1..1200 {
            last = tracker.tick(i);
        }

        assert_eq!((last.hours, last.minutes, last.seconds), (1, 0, 0));
    }

    #[test]
    fn test_status_line_format() {
        let snapshot = ProgressSnapshot {
            frame_index: 240,
            fps: 24.0,
            kbits_per_sec: 1382.4,
            speed: 1.0,
            hours: 0,
            minutes: 1,
            seconds: 3,
        };

        assert_eq!(
            snapshot.to_string(),
            "frame= 240 fps= 24.0 time=00:01:03 bitrate=1382.4kbits/s speed=1.00x"
        );
    }

    #[test]
    fn test_counter_advances_by_one() {
        let counter = ProgressCounter::new();
        assert_eq!(counter.position(), 0);

        counter.advance();
        counter.advance();
        counter.advance();
        assert_eq!(counter.position(), 3);
    }

    #[tokio::test]
    async fn test_finish_reports_final_position() {
        let counter = Arc::new(ProgressCounter::new());
        let monitor = ProgressMonitor::spawn(
            Arc::clone(&counter),
            MonitorConfig {
                interval: Duration::from_millis(10),
                frame_bytes: 100,
                reference_fps: 24.0,
            },
        );

        for _ in 0..5 {
            counter.advance();
        }
        tokio::time::sleep(Duration::from_millis(35)).await;

        let snapshot = monitor.finish().await.unwrap();
        assert_eq!(snapshot.frame_index, 5);
    }

    #[tokio::test]
    async fn test_finish_fires_even_before_first_interval() {
        let counter = Arc::new(ProgressCounter::new());
        let monitor = ProgressMonitor::spawn(
            Arc::clone(&counter),
            MonitorConfig {
                interval: Duration::from_secs(3600),
                frame_bytes: 0,
                reference_fps: 24.0,
            },
        );

        counter.advance();
        counter.advance();

        let snapshot = monitor.finish().await.unwrap();
        assert_eq!(snapshot.frame_index, 2);
    }
}
