//! Progress reporting types for dataset rebuilds.

use cxr_prep_core::RunTally;

/// Phase of the class currently being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassPhase {
    /// The class is about to be copied.
    Started,
    /// Every file of the class has been handled.
    Finished,
}

/// Progress information for an ongoing rebuild.
#[derive(Debug, Clone)]
pub struct RebuildProgress {
    /// Class currently being processed.
    pub class: String,
    /// Whether the class is starting or done.
    pub phase: ClassPhase,
    /// Classes fully processed so far.
    pub classes_done: usize,
    /// Total number of classes in the run.
    pub classes_total: usize,
    /// Running tally across all classes so far.
    pub tally: RunTally,
}

impl RebuildProgress {
    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.classes_total > 0 {
            (self.classes_done as f64 / self.classes_total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Per-class result of a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ClassTally {
    /// Class name.
    pub class: String,
    /// Counters for this class only.
    pub tally: RunTally,
}
