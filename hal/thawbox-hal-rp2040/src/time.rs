//! Monotonic clock on the Embassy time driver

use embassy_time::Instant;
use thawbox_hal::Clock;

/// Milliseconds since boot
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
