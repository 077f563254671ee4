use serde::{Deserialize, Serialize};

/// Level-run stopwatch advanced by the simulation's own `dt`, never by the
/// wall clock, so replays and paused frames stay deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTimer {
    elapsed: f32,
    final_time: f32,
    running: bool,
    paused: bool,
    started: bool,
}

impl RunTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting. A timer only starts once per run; later calls are ignored.
    pub fn start(&mut self) {
        if !self.started {
            self.started = true;
            self.running = true;
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.running && !self.paused && dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
    }

    pub fn pause(&mut self) {
        if self.running {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.running {
            self.paused = false;
        }
    }

    /// Freeze the timer and return the final time. Returns 0 if it was not running.
    pub fn stop(&mut self) -> f32 {
        if !self.running {
            return 0.0;
        }
        self.running = false;
        self.paused = false;
        self.final_time = self.elapsed;
        self.final_time
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Final time once stopped, live time while running.
    pub fn display_time(&self) -> f32 {
        if self.running {
            self.elapsed
        } else {
            self.final_time
        }
    }

    pub fn formatted(&self) -> String {
        format_time(self.display_time())
    }
}

/// Format seconds as `MM:SS.mmm`.
pub fn format_time(seconds: f32) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let minutes = total_ms / 60_000;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{minutes:02}:{secs:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn does_not_count_before_start() {
        let mut timer = RunTimer::new();
        timer.tick(1.0);
        assert_eq!(timer.display_time(), 0.0);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let mut timer = RunTimer::new();
        timer.start();
        timer.tick(0.5);
        timer.pause();
        timer.tick(10.0);
        assert_eq!(timer.display_time(), 0.5);
        timer.resume();
        timer.tick(0.25);
        assert_eq!(timer.display_time(), 0.75);
    }

    #[test]
    fn stop_reports_final_time_once() {
        let mut timer = RunTimer::new();
        timer.start();
        timer.tick(2.0);
        assert_eq!(timer.stop(), 2.0);
        timer.tick(5.0);
        assert_eq!(timer.display_time(), 2.0);
        assert_eq!(timer.stop(), 0.0);
    }

    #[test]
    fn start_is_idempotent_after_stop() {
        let mut timer = RunTimer::new();
        timer.start();
        timer.tick(1.0);
        timer.stop();
        timer.start();
        assert!(!timer.is_running(), "a stopped run must not restart");
        timer.reset();
        timer.start();
        assert!(timer.is_running());
    }

    #[test]
    fn fixed_steps_accumulate_to_seconds() {
        let mut timer = RunTimer::new();
        timer.start();
        crate::test_helpers::tick_frames(&mut timer, 120, 60.0);
        assert!((timer.display_time() - 2.0).abs() < 1e-4);
        assert_eq!(timer.formatted(), "00:02.000");
    }

    #[test]
    fn format_minutes_seconds_millis() {
        assert_eq!(format_time(0.0), "00:00.000");
        assert_eq!(format_time(61.5), "01:01.500");
        assert_eq!(format_time(3599.999), "59:59.999");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn elapsed_never_decreases(steps in proptest::collection::vec(-1.0f32..1.0, 1..60)) {
                let mut timer = RunTimer::new();
                timer.start();
                let mut last = timer.display_time();
                for dt in steps {
                    timer.tick(dt);
                    prop_assert!(timer.display_time() >= last);
                    last = timer.display_time();
                }
            }
        }
    }
}
