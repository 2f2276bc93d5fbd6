//! Common utilities shared across game modes

use std::time::{Duration, Instant};

use crate::config::Config;

/// Frame duration derived from the configured target FPS
pub fn frame_duration(config: &Config) -> Duration {
    Duration::from_millis(1000 / config.display.target_fps.max(1))
}

/// Apply frame rate limiting to keep the loop from spinning.
/// Call at the end of each game loop iteration with the iteration's start
/// Instant; sleeps for whatever is left of the frame budget.
pub fn limit_frame_rate(frame_start: Instant, frame_budget: Duration) {
    let elapsed = frame_start.elapsed();
    if elapsed < frame_budget {
        std::thread::sleep(frame_budget - elapsed);
    }
}
