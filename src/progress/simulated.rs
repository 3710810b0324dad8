//! Timer-driven synthetic progress.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::ProgressSource;
use crate::controller::StatusChannel;

/// Default delay between synthetic ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Default percent added per tick.
pub const DEFAULT_PROGRESS_STEP: u8 = 5;

/// Synthetic progress never passes this value. The final points are reserved
/// for the real terminal event so the bar never looks done before the backend
/// actually finishes.
pub const DEFAULT_PROGRESS_CEILING: u8 = 90;

/// Manufactures a perceived-progress signal on a fixed timer.
///
/// Each tick advances the bar by a fixed step up to a ceiling and attaches a
/// randomized speed/ETA pair. The pair is purely decorative: nothing is
/// measured, and consumers must not treat it as authoritative.
#[derive(Debug, Clone)]
pub struct SimulatedProgressSource {
    tick_interval: Duration,
    step: u8,
    ceiling: u8,
}

impl SimulatedProgressSource {
    /// Creates a source with custom tick interval and step. The ceiling stays
    /// at [`DEFAULT_PROGRESS_CEILING`].
    #[must_use]
    pub fn new(tick_interval: Duration, step: u8) -> Self {
        Self {
            tick_interval,
            step,
            ceiling: DEFAULT_PROGRESS_CEILING,
        }
    }

    fn estimates() -> (String, String) {
        let mut rng = rand::thread_rng();
        let speed = format!("{:.1} MB/s", rng.gen_range(2.0..7.0));
        let eta = format!("{}s", rng.gen_range(0..60));
        (speed, eta)
    }
}

impl Default for SimulatedProgressSource {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL, DEFAULT_PROGRESS_STEP)
    }
}

#[async_trait]
impl ProgressSource for SimulatedProgressSource {
    async fn drive(&self, status: StatusChannel, stop: Arc<AtomicBool>) {
        loop {
            tokio::time::sleep(self.tick_interval).await;
            if stop.load(Ordering::SeqCst) {
                break;
            }
            let (speed, eta) = Self::estimates();
            status.advance(self.step, self.ceiling, speed, eta);
        }
    }
}
