//! The walked, already-parsed score handed over by the notation parser.
//!
//! Pitches, quarter-length durations, ties, and part structure are resolved
//! upstream; this crate never reads raw notation formats.

use serde::{Deserialize, Serialize};

use crate::pitch::Pitch;
use crate::signature::TimeSignature;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TieType {
    Start,
    Continue,
    Stop,
}

impl TieType {
    /// Splits a tie position into independent (start, stop) flags.
    pub fn flags(tie: Option<TieType>) -> (bool, bool) {
        match tie {
            None => (false, false),
            Some(TieType::Start) => (true, false),
            Some(TieType::Continue) => (true, true),
            Some(TieType::Stop) => (false, true),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SourceChordNote {
    pub pitch: Pitch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie: Option<TieType>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceElement {
    Rest {
        #[serde(rename = "quarterLength")]
        quarter_length: f64,
    },
    Note {
        pitch: Pitch,
        #[serde(rename = "quarterLength")]
        quarter_length: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tie: Option<TieType>,
    },
    Chord {
        notes: Vec<SourceChordNote>,
        #[serde(rename = "quarterLength")]
        quarter_length: f64,
    },
}

impl SourceElement {
    pub fn quarter_length(&self) -> f64 {
        match self {
            SourceElement::Rest { quarter_length }
            | SourceElement::Note { quarter_length, .. }
            | SourceElement::Chord { quarter_length, .. } => *quarter_length,
        }
    }

    /// Pitch used to locate a part's register: the note itself, or the lowest
    /// member of a chord.
    pub fn register_pitch(&self) -> Option<i32> {
        match self {
            SourceElement::Rest { .. } => None,
            SourceElement::Note { pitch, .. } => Some(pitch.number()),
            SourceElement::Chord { notes, .. } => notes.iter().map(|n| n.pitch.number()).min(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    Major,
    Minor,
}

/// Key signature as a count of sharps (negative for flats).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceKey {
    pub sharps: i8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<KeyMode>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceMeasure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<SourceKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeSignature>,
    #[serde(default)]
    pub elements: Vec<SourceElement>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SourcePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub measures: Vec<SourceMeasure>,
}

impl SourcePart {
    pub fn named(name: impl Into<String>, measures: Vec<SourceMeasure>) -> Self {
        Self {
            name: Some(name.into()),
            measures,
            ..Self::default()
        }
    }

    pub fn unnamed(measures: Vec<SourceMeasure>) -> Self {
        Self {
            measures,
            ..Self::default()
        }
    }

    /// First non-blank of name, abbreviation, id.
    pub fn declared_name(&self) -> Option<&str> {
        [&self.name, &self.abbreviation, &self.id]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|value| !value.trim().is_empty())
    }

    /// Pitched elements in score order, rests skipped.
    pub fn pitched_elements(&self) -> impl Iterator<Item = &SourceElement> {
        self.measures
            .iter()
            .flat_map(|m| m.elements.iter())
            .filter(|el| !matches!(el, SourceElement::Rest { .. }))
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceScore {
    #[serde(default)]
    pub parts: Vec<SourcePart>,
}

impl SourceScore {
    pub fn new(parts: Vec<SourcePart>) -> Self {
        Self { parts }
    }

    fn measures(&self) -> impl Iterator<Item = &SourceMeasure> {
        self.parts.iter().flat_map(|p| p.measures.iter())
    }

    /// First key signature anywhere in the score, parts in order then
    /// measures in order.
    pub fn first_key(&self) -> Option<SourceKey> {
        self.measures().find_map(|m| m.key)
    }

    pub fn first_time_signature(&self) -> Option<TimeSignature> {
        self.measures().find_map(|m| m.time)
    }

    pub fn max_measure_count(&self) -> usize {
        self.parts.iter().map(|p| p.measures.len()).max().unwrap_or(0)
    }
}
