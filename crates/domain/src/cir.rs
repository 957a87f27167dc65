//! Canonical internal representation: the staff/voice-oriented score
//! document that is rendered, stored, and graded against.

use serde::{Deserialize, Serialize};

use crate::duration::SymbolicDuration;
use crate::pitch::Pitch;
use crate::signature::{self, TimeSignature};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Independent tie flags. A note in the middle of a tied chain carries both.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tie {
    #[serde(default, skip_serializing_if = "is_false")]
    pub start: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub stop: bool,
}

impl Tie {
    pub const NONE: Tie = Tie {
        start: false,
        stop: false,
    };

    pub fn new(start: bool, stop: bool) -> Self {
        Self { start, stop }
    }

    pub fn is_none(&self) -> bool {
        !self.start && !self.stop
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChordMember {
    pub pitch: Pitch,
    #[serde(default, skip_serializing_if = "Tie::is_none")]
    pub tie: Tie,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScoreItem {
    Rest {
        duration: SymbolicDuration,
    },
    Note {
        pitch: Pitch,
        duration: SymbolicDuration,
        #[serde(default, skip_serializing_if = "Tie::is_none")]
        tie: Tie,
    },
    /// All members share one duration; ties are tracked per member.
    Chord {
        notes: Vec<ChordMember>,
        duration: SymbolicDuration,
    },
}

impl ScoreItem {
    pub fn rest(duration: SymbolicDuration) -> Self {
        ScoreItem::Rest { duration }
    }

    pub fn note(pitch: Pitch, duration: SymbolicDuration) -> Self {
        ScoreItem::Note {
            pitch,
            duration,
            tie: Tie::NONE,
        }
    }

    pub fn duration(&self) -> SymbolicDuration {
        match self {
            ScoreItem::Rest { duration }
            | ScoreItem::Note { duration, .. }
            | ScoreItem::Chord { duration, .. } => *duration,
        }
    }

    pub fn quarter_length(&self) -> f64 {
        self.duration().quarter_length()
    }

    /// Sounding pitches with their tie flags; empty for rests.
    pub fn sounding(&self) -> Vec<(Pitch, Tie)> {
        match self {
            ScoreItem::Rest { .. } => Vec::new(),
            ScoreItem::Note { pitch, tie, .. } => vec![(*pitch, *tie)],
            ScoreItem::Chord { notes, .. } => notes.iter().map(|n| (n.pitch, n.tie)).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StemDirection {
    Up,
    Down,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Voice {
    pub direction: StemDirection,
    #[serde(default)]
    pub items: Vec<ScoreItem>,
}

impl Voice {
    pub fn new(direction: StemDirection, items: Vec<ScoreItem>) -> Self {
        Self { direction, items }
    }

    pub fn quarter_length(&self) -> f64 {
        total_quarter_length(&self.items)
    }
}

pub fn total_quarter_length(items: &[ScoreItem]) -> f64 {
    items.iter().map(ScoreItem::quarter_length).sum()
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    Treble,
    Bass,
}

/// Key of a staff within a measure.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum StaffId {
    Treble,
    Bass,
}

impl StaffId {
    pub const ALL: [StaffId; 2] = [StaffId::Treble, StaffId::Bass];

    pub fn clef(self) -> Clef {
        match self {
            StaffId::Treble => Clef::Treble,
            StaffId::Bass => Clef::Bass,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StaffId::Treble => "treble",
            StaffId::Bass => "bass",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Staff {
    pub clef: Clef,
    #[serde(default)]
    pub voices: Vec<Voice>,
}

impl Staff {
    pub fn new(clef: Clef, voices: Vec<Voice>) -> Self {
        Self { clef, voices }
    }

    pub fn empty(clef: Clef) -> Self {
        Self::new(clef, Vec::new())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Staves {
    pub treble: Staff,
    pub bass: Staff,
}

impl Staves {
    pub fn get(&self, id: StaffId) -> &Staff {
        match id {
            StaffId::Treble => &self.treble,
            StaffId::Bass => &self.bass,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StaffId, &Staff)> {
        StaffId::ALL.into_iter().map(move |id| (id, self.get(id)))
    }
}

impl Default for Staves {
    fn default() -> Self {
        Self {
            treble: Staff::empty(Clef::Treble),
            bass: Staff::empty(Clef::Bass),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Measure {
    /// 1-based, contiguous.
    pub number: u32,
    pub staves: Staves,
}

impl Measure {
    /// Length of the longest voice on either staff, in quarter notes.
    pub fn longest_voice(&self) -> f64 {
        self.staves
            .iter()
            .flat_map(|(_, staff)| staff.voices.iter())
            .map(Voice::quarter_length)
            .fold(0.0, f64::max)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meta {
    /// Tonic letter, suffixed `m` for minor keys.
    pub key: Option<String>,
    #[serde(with = "signature::as_fraction")]
    pub time: TimeSignature,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CirDocument {
    pub meta: Meta,
    #[serde(default)]
    pub measures: Vec<Measure>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::{DurationType, SymbolicDuration};
    use crate::pitch::Step;

    fn quarter() -> SymbolicDuration {
        SymbolicDuration::plain(DurationType::Quarter)
    }

    #[test]
    fn items_serialize_with_kind_tags() {
        let note = ScoreItem::Note {
            pitch: Pitch::new(Step::D, 0, 5),
            duration: quarter(),
            tie: Tie::new(true, false),
        };
        assert_eq!(
            serde_json::to_string(&note).unwrap(),
            r#"{"kind":"note","pitch":{"step":"D","alter":0,"octave":5},"duration":{"type":"q","dots":0},"tie":{"start":true}}"#
        );
        let rest = ScoreItem::rest(SymbolicDuration::dotted(DurationType::Half));
        assert_eq!(
            serde_json::to_string(&rest).unwrap(),
            r#"{"kind":"rest","duration":{"type":"h","dots":1}}"#
        );
        let plain = serde_json::to_value(ScoreItem::note(Pitch::new(Step::C, 0, 4), quarter())).unwrap();
        assert!(plain.get("tie").is_none());
    }

    #[test]
    fn unknown_item_kind_is_rejected() {
        let json = r#"{"kind":"grace","duration":{"type":"q","dots":0}}"#;
        assert!(serde_json::from_str::<ScoreItem>(json).is_err());
    }

    #[test]
    fn chord_members_keep_their_own_ties() {
        let chord = ScoreItem::Chord {
            notes: vec![
                ChordMember {
                    pitch: Pitch::new(Step::C, 0, 4),
                    tie: Tie::new(false, true),
                },
                ChordMember {
                    pitch: Pitch::new(Step::E, 0, 4),
                    tie: Tie::NONE,
                },
            ],
            duration: quarter(),
        };
        let sounding = chord.sounding();
        assert_eq!(sounding.len(), 2);
        assert!(sounding[0].1.stop);
        assert!(sounding[1].1.is_none());
        let back: ScoreItem = serde_json::from_str(&serde_json::to_string(&chord).unwrap()).unwrap();
        assert_eq!(back, chord);
    }

    #[test]
    fn meta_serializes_time_as_fraction_and_null_key() {
        let meta = Meta {
            key: None,
            time: TimeSignature::new(3, 4).unwrap(),
        };
        assert_eq!(serde_json::to_string(&meta).unwrap(), r#"{"key":null,"time":"3/4"}"#);
    }

    #[test]
    fn longest_voice_spans_both_staves() {
        let mut staves = Staves::default();
        staves.treble.voices.push(Voice::new(StemDirection::Up, vec![ScoreItem::rest(quarter())]));
        staves.bass.voices.push(Voice::new(
            StemDirection::Down,
            vec![ScoreItem::rest(quarter()), ScoreItem::rest(quarter())],
        ));
        let measure = Measure { number: 1, staves };
        assert_eq!(measure.longest_voice(), 2.0);
    }
}
