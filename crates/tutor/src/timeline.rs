use serde::{Deserialize, Serialize};

use chorale_domain::{quarters_to_ticks, CirDocument, ScoreItem, StaffId};

fn ticks(item: &ScoreItem) -> u64 {
    quarters_to_ticks(item.quarter_length())
}

/// One notehead the performer is expected to play.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoteOccurrence {
    pub id: usize,
    /// Ticks from the start of the excerpt, cumulative across measures.
    pub onset: u64,
    pub duration: u64,
    pub midi: i32,
    pub staff: StaffId,
    pub voice_index: usize,
    pub measure_index: usize,
    pub item_index: usize,
    pub head_index: usize,
}

impl NoteOccurrence {
    pub fn sounds_at(&self, tick: u64) -> bool {
        self.onset <= tick && tick < self.onset + self.duration
    }
}

/// Voices to grade on each staff; `None` means every voice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoiceSelection {
    #[serde(default)]
    pub treble: Option<Vec<usize>>,
    #[serde(default)]
    pub bass: Option<Vec<usize>>,
}

impl VoiceSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn includes(&self, staff: StaffId, voice: usize) -> bool {
        let selected = match staff {
            StaffId::Treble => &self.treble,
            StaffId::Bass => &self.bass,
        };
        selected.as_ref().map_or(true, |voices| voices.contains(&voice))
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoteTimelineOptions {
    pub select: VoiceSelection,
    pub max_measures: Option<usize>,
}

/// Flattens a score into noteheads ordered by measure, staff, voice, item.
/// Each measure lasts as long as its longest voice.
pub fn build_note_timeline(score: &CirDocument, options: &NoteTimelineOptions) -> Vec<NoteOccurrence> {
    let count = options
        .max_measures
        .map_or(score.measures.len(), |max| max.min(score.measures.len()));
    let mut timeline = Vec::new();
    let mut measure_start = 0u64;
    for (measure_index, measure) in score.measures.iter().take(count).enumerate() {
        let mut longest = 0u64;
        for (staff, contents) in measure.staves.iter() {
            for (voice_index, voice) in contents.voices.iter().enumerate() {
                let length: u64 = voice.items.iter().map(ticks).sum();
                longest = longest.max(length);
                if !options.select.includes(staff, voice_index) {
                    continue;
                }
                let mut local = 0u64;
                for (item_index, item) in voice.items.iter().enumerate() {
                    let duration = ticks(item);
                    for (head_index, (pitch, _)) in item.sounding().into_iter().enumerate() {
                        timeline.push(NoteOccurrence {
                            id: timeline.len(),
                            onset: measure_start + local,
                            duration,
                            midi: pitch.number(),
                            staff,
                            voice_index,
                            measure_index,
                            item_index,
                            head_index,
                        });
                    }
                    local += duration;
                }
            }
        }
        measure_start += longest;
    }
    timeline
}

/// Groups timeline indices by onset, in order of first appearance.
pub fn onset_windows(timeline: &[NoteOccurrence]) -> Vec<Vec<usize>> {
    let mut windows: Vec<(u64, Vec<usize>)> = Vec::new();
    for (index, note) in timeline.iter().enumerate() {
        match windows.iter_mut().find(|(onset, _)| *onset == note.onset) {
            Some((_, members)) => members.push(index),
            None => windows.push((note.onset, vec![index])),
        }
    }
    windows.into_iter().map(|(_, members)| members).collect()
}
