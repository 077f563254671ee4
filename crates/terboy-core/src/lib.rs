pub mod audio;
pub mod geometry;
pub mod session;
pub mod timer;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::audio::{AudioEvent, AudioEventQueue};
    use crate::timer::RunTimer;

    /// Assert the queue holds exactly `expected`, in order.
    pub fn assert_played(queue: &AudioEventQueue, expected: &[AudioEvent]) {
        assert_eq!(
            queue.pending(),
            expected,
            "audio triggers differ from expected sequence"
        );
    }

    /// Advance `timer` by `frames` fixed steps at `hz`.
    pub fn tick_frames(timer: &mut RunTimer, frames: u32, hz: f32) {
        for _ in 0..frames {
            timer.tick(1.0 / hz);
        }
    }
}
