use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::{debug, info};

use chorale_domain::{CirDocument, StaffId};

use crate::timeline::{build_note_timeline, onset_windows, NoteOccurrence, NoteTimelineOptions};

/// `onset_window_ms` and `release_tolerance_pct` travel with the exercise
/// definition; the grader does not enforce timing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraderSettings {
    /// Accept the right pitch class in any octave.
    pub octave_flexible: bool,
    pub onset_window_ms: u32,
    pub release_tolerance_pct: u8,
}

impl GraderSettings {
    pub fn onset_window(&self) -> Duration {
        Duration::milliseconds(self.onset_window_ms as i64)
    }

    fn matches(&self, expected: i32, played: i32) -> bool {
        if self.octave_flexible {
            (expected - played).rem_euclid(12) == 0
        } else {
            expected == played
        }
    }
}

impl Default for GraderSettings {
    fn default() -> Self {
        Self {
            octave_flexible: false,
            onset_window_ms: 150,
            release_tolerance_pct: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GradeState {
    Correct,
    Incorrect,
    Partial,
}

impl GradeState {
    pub fn score(self) -> u8 {
        match self {
            GradeState::Correct => 0,
            GradeState::Partial => 1,
            GradeState::Incorrect => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub result: GradeState,
    pub score: u8,
    pub active_index: usize,
}

/// What a single key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteOutcome {
    /// Matched a note attacked in the current window.
    Matched(usize),
    /// Matched a note still sounding from an earlier window.
    MatchedHeld(usize),
    Wrong,
    /// The exercise is already finished.
    Ignored,
}

/// Walks the performer through the score one onset window at a time. A
/// window is complete once every note attacked in it, and every note still
/// sounding into it, has been played.
#[derive(Debug, Clone, Default)]
pub struct ChoraleGrader {
    settings: GraderSettings,
    timeline: Vec<NoteOccurrence>,
    windows: Vec<Vec<usize>>,
    pointer: usize,
    played: BTreeSet<usize>,
    held_keys: BTreeSet<i32>,
    mistake_made: bool,
    last_incorrect: bool,
    finished: bool,
    correct_presses: usize,
    wrong_presses: usize,
}

impl ChoraleGrader {
    pub fn new(settings: GraderSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn load(&mut self, score: &CirDocument, options: &NoteTimelineOptions) -> &mut Self {
        *self = Self::new(self.settings);
        self.timeline = build_note_timeline(score, options);
        self.windows = onset_windows(&self.timeline);
        self.finished = self.windows.is_empty();
        info!(
            notes = self.timeline.len(),
            windows = self.windows.len(),
            measures = score.measures.len(),
            "grader loaded score"
        );
        self
    }

    pub fn settings(&self) -> &GraderSettings {
        &self.settings
    }

    pub fn timeline(&self) -> &[NoteOccurrence] {
        &self.timeline
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn active_index(&self) -> usize {
        self.pointer
    }

    pub fn played_note_ids(&self) -> &BTreeSet<usize> {
        &self.played
    }

    pub fn held_keys(&self) -> &BTreeSet<i32> {
        &self.held_keys
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn mistake_made(&self) -> bool {
        self.mistake_made
    }

    pub fn press_counts(&self) -> (usize, usize) {
        (self.correct_presses, self.wrong_presses)
    }

    /// Onset tick of a window.
    pub fn window_onset(&self, index: usize) -> Option<u64> {
        self.windows
            .get(index)
            .and_then(|members| members.first())
            .map(|&first| self.timeline[first].onset)
    }

    pub fn active_measure_index(&self) -> usize {
        if self.windows.is_empty() {
            return 0;
        }
        let pointer = self.pointer.min(self.windows.len() - 1);
        self.windows[pointer]
            .first()
            .map_or(0, |&first| self.timeline[first].measure_index)
    }

    /// Notes sounding into `onset` from earlier attacks: for each voice, its
    /// most recent earlier note if that note has not yet ended.
    pub fn held_notes_at(&self, onset: u64) -> Vec<usize> {
        let mut seen: HashSet<(StaffId, usize)> = HashSet::new();
        let mut held = Vec::new();
        for (index, note) in self.timeline.iter().enumerate().rev() {
            if note.onset >= onset {
                continue;
            }
            let voice = (note.staff, note.voice_index);
            if seen.contains(&voice) {
                continue;
            }
            if note.onset + note.duration > onset {
                held.push(index);
                seen.insert(voice);
            }
        }
        held
    }

    pub fn note_on(&mut self, midi: i32) -> NoteOutcome {
        if self.finished {
            return NoteOutcome::Ignored;
        }
        self.held_keys.insert(midi);
        let Some(onset) = self.window_onset(self.pointer) else {
            return NoteOutcome::Ignored;
        };
        let window = &self.windows[self.pointer];
        let outcome = match self.first_unplayed(window, midi) {
            Some(index) => NoteOutcome::Matched(index),
            None => match self.first_unplayed(&self.held_notes_at(onset), midi) {
                Some(index) => NoteOutcome::MatchedHeld(index),
                None => NoteOutcome::Wrong,
            },
        };
        match outcome {
            NoteOutcome::Matched(index) | NoteOutcome::MatchedHeld(index) => {
                self.played.insert(self.timeline[index].id);
                self.correct_presses += 1;
                debug!(midi, id = self.timeline[index].id, "matched note");
            }
            _ => {
                self.mistake_made = true;
                self.last_incorrect = true;
                self.wrong_presses += 1;
                debug!(midi, window = self.pointer, "wrong note");
            }
        }
        self.advance_if_window_complete();
        outcome
    }

    /// Releases only update the held-key set; they never move the window.
    pub fn note_off(&mut self, midi: i32) {
        self.held_keys.remove(&midi);
    }

    fn first_unplayed(&self, candidates: &[usize], midi: i32) -> Option<usize> {
        candidates.iter().copied().find(|&index| {
            let note = &self.timeline[index];
            !self.played.contains(&note.id) && self.settings.matches(note.midi, midi)
        })
    }

    fn window_complete(&self, index: usize) -> bool {
        let Some(onset) = self.window_onset(index) else {
            return false;
        };
        self.windows[index]
            .iter()
            .chain(self.held_notes_at(onset).iter())
            .all(|&member| self.played.contains(&self.timeline[member].id))
    }

    fn advance_if_window_complete(&mut self) {
        while self.pointer < self.windows.len() && self.window_complete(self.pointer) {
            self.pointer += 1;
            debug!(window = self.pointer, "advanced window");
        }
        if self.pointer >= self.windows.len() {
            self.finished = true;
            info!("exercise complete");
        }
    }

    /// A wrong note reports `Incorrect` exactly once; otherwise the exercise
    /// is `Correct` when finished and `Partial` until then.
    pub fn grade(&mut self) -> Grade {
        if self.last_incorrect {
            self.last_incorrect = false;
            return Grade {
                result: GradeState::Incorrect,
                score: GradeState::Incorrect.score(),
                active_index: self.clamped_pointer(),
            };
        }
        if self.finished {
            return Grade {
                result: GradeState::Correct,
                score: GradeState::Correct.score(),
                active_index: self.windows.len(),
            };
        }
        Grade {
            result: GradeState::Partial,
            score: GradeState::Partial.score(),
            active_index: self.clamped_pointer(),
        }
    }

    fn clamped_pointer(&self) -> usize {
        self.pointer.min(self.windows.len().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorale_domain::{
        DurationType, Measure, Meta, Pitch, ScoreItem, Staves, StemDirection, Step,
        SymbolicDuration, TimeSignature, Voice,
    };

    /// Treble: C5 half then D5 half over an alto E4 whole note.
    fn score() -> CirDocument {
        let half = SymbolicDuration::plain(DurationType::Half);
        let mut staves = Staves::default();
        staves.treble.voices.push(Voice::new(
            StemDirection::Up,
            vec![
                ScoreItem::note(Pitch::new(Step::C, 0, 5), half),
                ScoreItem::note(Pitch::new(Step::D, 0, 5), half),
            ],
        ));
        staves.treble.voices.push(Voice::new(
            StemDirection::Down,
            vec![ScoreItem::note(
                Pitch::new(Step::E, 0, 4),
                SymbolicDuration::plain(DurationType::Whole),
            )],
        ));
        CirDocument {
            meta: Meta {
                key: None,
                time: TimeSignature::common(),
            },
            measures: vec![Measure { number: 1, staves }],
        }
    }

    fn loaded(settings: GraderSettings) -> ChoraleGrader {
        let mut grader = ChoraleGrader::new(settings);
        grader.load(&score(), &NoteTimelineOptions::default());
        grader
    }

    #[test]
    fn plays_through_windows() {
        let mut grader = loaded(GraderSettings::default());
        assert_eq!(grader.window_count(), 2);
        assert_eq!(grader.grade().result, GradeState::Partial);

        assert_eq!(grader.note_on(72), NoteOutcome::Matched(0));
        assert_eq!(grader.active_index(), 0);
        assert_eq!(grader.note_on(64), NoteOutcome::Matched(2));
        assert_eq!(grader.active_index(), 1);

        // the held alto note was already played, so one press finishes
        assert_eq!(grader.held_notes_at(960), vec![2]);
        assert_eq!(grader.note_on(74), NoteOutcome::Matched(1));
        assert!(grader.is_finished());
        let grade = grader.grade();
        assert_eq!(grade.result, GradeState::Correct);
        assert_eq!(grade.score, 0);
        assert_eq!(grade.active_index, 2);
        assert_eq!(grader.note_on(60), NoteOutcome::Ignored);
    }

    #[test]
    fn wrong_note_is_reported_once() {
        let mut grader = loaded(GraderSettings::default());
        assert_eq!(grader.note_on(61), NoteOutcome::Wrong);
        assert!(grader.mistake_made());
        let grade = grader.grade();
        assert_eq!(grade.result, GradeState::Incorrect);
        assert_eq!(grade.score, 2);
        assert_eq!(grader.grade().result, GradeState::Partial);
        assert!(grader.mistake_made());
        assert_eq!(grader.press_counts(), (0, 1));
    }

    #[test]
    fn octave_flexible_matching() {
        let mut strict = loaded(GraderSettings::default());
        assert_eq!(strict.note_on(60), NoteOutcome::Wrong);

        let mut flexible = loaded(GraderSettings {
            octave_flexible: true,
            ..GraderSettings::default()
        });
        assert_eq!(flexible.note_on(60), NoteOutcome::Matched(0));
        assert_eq!(flexible.note_on(52), NoteOutcome::Matched(2));
    }

    #[test]
    fn note_off_only_releases_keys() {
        let mut grader = loaded(GraderSettings::default());
        grader.note_on(72);
        assert!(grader.held_keys().contains(&72));
        grader.note_off(72);
        assert!(grader.held_keys().is_empty());
        assert_eq!(grader.played_note_ids().len(), 1);
        assert_eq!(grader.active_index(), 0);
    }

    #[test]
    fn empty_score_is_finished_immediately() {
        let mut grader = ChoraleGrader::new(GraderSettings::default());
        let mut empty = score();
        empty.measures.clear();
        grader.load(&empty, &NoteTimelineOptions::default());
        assert!(grader.is_finished());
        assert_eq!(grader.active_measure_index(), 0);
        assert_eq!(grader.grade().result, GradeState::Correct);
    }

    #[test]
    fn settings_serialize_in_camel_case() {
        let json = serde_json::to_string(&GraderSettings::default()).unwrap();
        assert_eq!(
            json,
            r#"{"octaveFlexible":false,"onsetWindowMs":150,"releaseTolerancePct":40}"#
        );
        assert_eq!(GraderSettings::default().onset_window(), Duration::milliseconds(150));
    }
}
