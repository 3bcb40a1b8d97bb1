//! Completion aggregation over a project's units.

use super::{Unit, UnitState};
use serde::{Deserialize, Serialize};

/// Returns `true` when `units` is non-empty and every unit is done.
///
/// Completion is always recomputed from the full unit set rather than kept
/// as a running counter.
#[must_use]
pub fn all_units_done(units: &[Unit]) -> bool {
    !units.is_empty() && units.iter().all(Unit::is_done)
}

/// Per-state unit counts for a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KhatimaProgress {
    /// Units in the project.
    pub total: usize,
    /// Units nobody has claimed yet.
    pub open: usize,
    /// Units claimed but not finished.
    pub claimed: usize,
    /// Finished units.
    pub done: usize,
}

impl KhatimaProgress {
    /// Tallies the states of `units`.
    #[must_use]
    pub fn from_units(units: &[Unit]) -> Self {
        units
            .iter()
            .fold(Self::default(), |mut progress, unit| {
                progress.total += 1;
                match unit.state() {
                    UnitState::Open => progress.open += 1,
                    UnitState::Claimed { .. } => progress.claimed += 1,
                    UnitState::Done { .. } => progress.done += 1,
                }
                progress
            })
    }

    /// Returns the number of units still to finish.
    #[must_use]
    pub const fn remaining(self) -> usize {
        self.total.saturating_sub(self.done)
    }
}
