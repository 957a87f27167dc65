use serde::{Deserialize, Serialize};

use crate::cir::StaffId;

/// Fixed timing resolution of the grading timeline.
pub const TICKS_PER_QUARTER: u32 = 480;

/// Converts a position in quarter notes to ticks, rounding to nearest.
pub fn quarters_to_ticks(quarters: f64) -> u64 {
    (quarters * TICKS_PER_QUARTER as f64).round_ties_even().max(0.0) as u64
}

/// Pitches attacked at an event and pitches carried over from earlier ones.
/// Both lists are sorted ascending without duplicates.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StaffOnsets {
    pub new_onsets: Vec<i32>,
    pub holds_from_previous: Vec<i32>,
}

impl StaffOnsets {
    pub fn new(new_onsets: Vec<i32>, holds_from_previous: Vec<i32>) -> Self {
        Self {
            new_onsets: normalized(new_onsets),
            holds_from_previous: normalized(holds_from_previous),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new_onsets.is_empty() && self.holds_from_previous.is_empty()
    }
}

fn normalized(mut pitches: Vec<i32>) -> Vec<i32> {
    pitches.sort_unstable();
    pitches.dedup();
    pitches
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerStaff {
    pub treble: StaffOnsets,
    pub bass: StaffOnsets,
}

impl PerStaff {
    pub fn get(&self, id: StaffId) -> &StaffOnsets {
        match id {
            StaffId::Treble => &self.treble,
            StaffId::Bass => &self.bass,
        }
    }

    pub fn get_mut(&mut self, id: StaffId) -> &mut StaffOnsets {
        match id {
            StaffId::Treble => &mut self.treble,
            StaffId::Bass => &mut self.bass,
        }
    }
}

/// One distinct onset time of the grading timeline.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Ticks from the start of the piece.
    pub start: u64,
    pub per_staff: PerStaff,
}
