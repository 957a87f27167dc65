use serde::{Deserialize, Serialize};

/// Tolerance used when testing a rounded duration against the table.
const EXACT_EPSILON: f64 = 1e-6;

/// Inputs are snapped to this grid (in quarter notes) before matching.
const GRID_PER_QUARTER: f64 = 16.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DurationType {
    #[serde(rename = "w")]
    Whole,
    #[serde(rename = "h")]
    Half,
    #[serde(rename = "q")]
    Quarter,
    #[serde(rename = "8")]
    Eighth,
    #[serde(rename = "16")]
    Sixteenth,
}

impl DurationType {
    /// Undotted length in quarter notes.
    pub fn quarter_length(self) -> f64 {
        match self {
            DurationType::Whole => 4.0,
            DurationType::Half => 2.0,
            DurationType::Quarter => 1.0,
            DurationType::Eighth => 0.5,
            DurationType::Sixteenth => 0.25,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SymbolicDuration {
    #[serde(rename = "type")]
    pub kind: DurationType,
    #[serde(default)]
    pub dots: u8,
}

impl SymbolicDuration {
    pub const fn new(kind: DurationType, dots: u8) -> Self {
        Self { kind, dots }
    }

    pub const fn plain(kind: DurationType) -> Self {
        Self::new(kind, 0)
    }

    pub const fn dotted(kind: DurationType) -> Self {
        Self::new(kind, 1)
    }

    /// Length in quarter notes. Double dots are accepted on input even though
    /// the quantizer never produces them.
    pub fn quarter_length(&self) -> f64 {
        let base = self.kind.quarter_length();
        match self.dots {
            0 => base,
            1 => base * 1.5,
            _ => base * 1.75,
        }
    }
}

/// The closed duration vocabulary, longest first. Order matters: it breaks
/// ties in the nearest-match fallback and drives greedy rest filling.
pub const DURATION_TABLE: [(f64, SymbolicDuration); 9] = [
    (4.0, SymbolicDuration::plain(DurationType::Whole)),
    (3.0, SymbolicDuration::dotted(DurationType::Half)),
    (2.0, SymbolicDuration::plain(DurationType::Half)),
    (1.5, SymbolicDuration::dotted(DurationType::Quarter)),
    (1.0, SymbolicDuration::plain(DurationType::Quarter)),
    (0.75, SymbolicDuration::dotted(DurationType::Eighth)),
    (0.5, SymbolicDuration::plain(DurationType::Eighth)),
    (0.375, SymbolicDuration::dotted(DurationType::Sixteenth)),
    (0.25, SymbolicDuration::plain(DurationType::Sixteenth)),
];

/// Maps a quarter-length onto the symbolic vocabulary. Never fails; values
/// outside the table (tuplets, very long notes) take the closest entry.
pub fn quantize(quarter_length: f64) -> SymbolicDuration {
    let rounded = snap_to_grid(quarter_length);
    exact_match(rounded).unwrap_or_else(|| nearest_match(rounded))
}

/// Rounds to the nearest sixteenth of a quarter note, ties to even.
pub fn snap_to_grid(quarter_length: f64) -> f64 {
    (quarter_length * GRID_PER_QUARTER).round_ties_even() / GRID_PER_QUARTER
}

pub fn exact_match(quarter_length: f64) -> Option<SymbolicDuration> {
    DURATION_TABLE
        .iter()
        .find(|(value, _)| (quarter_length - value).abs() < EXACT_EPSILON)
        .map(|(_, duration)| *duration)
}

/// Entry with the smallest absolute difference; the earlier entry wins a tie.
pub fn nearest_match(quarter_length: f64) -> SymbolicDuration {
    let mut best = DURATION_TABLE[0];
    for entry in &DURATION_TABLE[1..] {
        if (quarter_length - entry.0).abs() < (quarter_length - best.0).abs() {
            best = *entry;
        }
    }
    best.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn table_values_quantize_exactly() {
        for (value, expected) in DURATION_TABLE {
            let got = quantize(value);
            assert_eq!(got, expected);
            assert_relative_eq!(got.quarter_length(), value);
        }
    }

    #[test]
    fn float_noise_is_absorbed() {
        assert_eq!(
            quantize(1.0 / 3.0 + 2.0 / 3.0 + 1e-9),
            SymbolicDuration::plain(DurationType::Quarter)
        );
        assert_eq!(
            quantize(0.7499999),
            SymbolicDuration::dotted(DurationType::Eighth)
        );
    }

    #[test]
    fn off_table_values_take_the_nearest_entry() {
        // triplet eighth snaps to 0.3125, equidistant from 0.375 and 0.25
        assert_eq!(
            quantize(1.0 / 3.0),
            SymbolicDuration::dotted(DurationType::Sixteenth)
        );
        assert_eq!(quantize(8.0), SymbolicDuration::plain(DurationType::Whole));
        assert_eq!(quantize(0.0), SymbolicDuration::plain(DurationType::Sixteenth));
        assert_eq!(quantize(2.5), SymbolicDuration::dotted(DurationType::Half));
    }

    #[test]
    fn nearest_match_prefers_table_order_on_ties() {
        assert_eq!(nearest_match(3.5), SymbolicDuration::plain(DurationType::Whole));
        assert_eq!(nearest_match(1.25), SymbolicDuration::dotted(DurationType::Quarter));
    }

    #[test]
    fn grid_rounding_ties_to_even() {
        assert_relative_eq!(snap_to_grid(0.28125), 0.25);
        assert_relative_eq!(snap_to_grid(0.34375), 0.375);
    }

    #[test]
    fn duration_json_shape() {
        let json = serde_json::to_string(&SymbolicDuration::dotted(DurationType::Eighth)).unwrap();
        assert_eq!(json, r#"{"type":"8","dots":1}"#);
        let back: SymbolicDuration = serde_json::from_str(r#"{"type":"h"}"#).unwrap();
        assert_eq!(back, SymbolicDuration::plain(DurationType::Half));
    }
}
