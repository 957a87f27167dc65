use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// When a sounded pitch stops being reported as held.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseMode {
    /// Once sounded, a pitch stays held for the rest of the piece.
    #[default]
    Sustain,
    /// A pitch is released when its notated duration has elapsed.
    Notated,
}

/// How a note closing a tie is reported.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TiedOnsetMode {
    /// Every written note is a new onset, tied or not.
    #[default]
    Attack,
    /// A tie continuation whose pitch is still active counts as a hold.
    Hold,
}

/// Where each measure begins on the absolute timeline.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MeasureStartMode {
    /// Measures are spaced by the time signature's length, pickups included.
    #[default]
    Nominal,
    /// Measures follow the longest voice of the previous measure.
    Actual,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct TimelineOptions {
    pub release: ReleaseMode,
    pub tied_onsets: TiedOnsetMode,
    pub measure_start: MeasureStartMode,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExportConfig {
    pub out_dir: PathBuf,
    pub limit: usize,
    pub corpus_id: String,
    pub source_type: String,
    pub tags: Vec<String>,
    pub timeline: TimelineOptions,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("data/corpus/bach"),
            limit: 5,
            corpus_id: "music21-bach-chorales".to_string(),
            source_type: "musicxml-corpus".to_string(),
            tags: ["corpus:bach-chorales", "chorale", "polyphonic", "4-part"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeline: TimelineOptions::default(),
        }
    }
}

impl ExportConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, DomainError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}
