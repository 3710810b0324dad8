//! Perceived-progress reporting for in-flight requests.
//!
//! The backend executor settles with success or failure and nothing in
//! between, so progress shown to observers has to come from somewhere else.
//! [`ProgressSource`] is that seam: the controller spawns one driver task per
//! accepted request and injects whichever source it was built with.
//!
//! [`SimulatedProgressSource`] manufactures the signal on a timer. A
//! `StreamedProgressSource` fed by real executor events is the intended
//! second implementation once an executor exposes an event channel; nothing
//! in the controller needs to change for it.

mod simulated;

pub use simulated::{
    DEFAULT_PROGRESS_CEILING, DEFAULT_PROGRESS_STEP, DEFAULT_TICK_INTERVAL, SimulatedProgressSource,
};

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use async_trait::async_trait;

use crate::controller::StatusChannel;

/// Produces progress updates for one in-flight request.
#[async_trait]
pub trait ProgressSource: Send + Sync {
    /// Publishes updates into `status` until `stop` is set or the driving
    /// task is aborted. The controller guarantees the task is stopped and
    /// awaited before any terminal status is published.
    async fn drive(&self, status: StatusChannel, stop: Arc<AtomicBool>);
}
