//! Progress reporting between pipeline stages.
//!
//! A bake calls the progress callback synchronously, on the caller's thread,
//! once after every stage. The callback's return value doubles as the
//! cancellation signal.
//!
//! # Example
//!
//! ```
//! use navmesh_bake::progress::{Progress, ProgressCallback};
//!
//! let callback: ProgressCallback = Box::new(|progress: &Progress| {
//!     println!("{}% {}", progress.percent(), progress.phase);
//!     true // Continue baking (return false to cancel)
//! });
//! # let _ = callback;
//! ```

use std::time::{Duration, Instant};

use crate::pipeline::BakeStage;

/// Progress information passed to callbacks.
#[derive(Debug, Clone)]
pub struct Progress {
    /// Stage that just completed.
    pub stage: BakeStage,

    /// Overall completion in `[0, 1]`.
    pub fraction: f64,

    /// Human-readable phase name.
    pub phase: String,

    /// Time since the bake started.
    pub elapsed: Duration,
}

impl Progress {
    /// Create a progress report for a completed stage.
    pub fn new(stage: BakeStage, phase: impl Into<String>) -> Self {
        Self {
            stage,
            fraction: stage.fraction(),
            phase: phase.into(),
            elapsed: Duration::ZERO,
        }
    }

    /// Get progress as a percentage (0 to 100).
    #[inline]
    pub fn percent(&self) -> u32 {
        (self.fraction * 100.0).round() as u32
    }

    /// Check if the bake is complete.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.stage == BakeStage::Done
    }
}

/// Callback function for progress reporting.
///
/// Returns `true` to continue, `false` to request cancellation.
pub type ProgressCallback = Box<dyn Fn(&Progress) -> bool + Send + Sync>;

/// Tracks elapsed time and forwards stage completions to an optional callback.
pub(crate) struct ProgressReporter<'a> {
    callback: Option<&'a ProgressCallback>,
    start_time: Instant,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(callback: Option<&'a ProgressCallback>) -> Self {
        Self {
            callback,
            start_time: Instant::now(),
        }
    }

    /// Report that `stage` finished. Returns `false` if the caller cancelled.
    pub(crate) fn stage_completed(&self, stage: BakeStage) -> bool {
        let Some(callback) = self.callback else {
            return true;
        };
        let mut progress = Progress::new(stage, stage.phase_name());
        progress.elapsed = self.start_time.elapsed();
        callback(&progress)
    }
}
