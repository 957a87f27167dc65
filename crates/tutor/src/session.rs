use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::debug;

use chorale_domain::{CirDocument, TICKS_PER_QUARTER};

use crate::midi::{MidiError, MidiMessage};
use crate::scoring::{ChoraleGrader, Grade, GraderSettings, NoteOutcome};
use crate::timeline::{NoteTimelineOptions, VoiceSelection};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PracticeMode {
    #[default]
    PlayAllVoices,
    PlayTargetVoices,
}

/// A graded excerpt as handed to the practice screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub title: String,
    pub score: CirDocument,
    #[serde(default)]
    pub settings: GraderSettings,
    pub tempo_bpm: f64,
    #[serde(default)]
    pub target_voices: VoiceSelection,
    #[serde(default)]
    pub max_measures: Option<usize>,
}

pub struct PracticeSession {
    exercise: Exercise,
    mode: PracticeMode,
    grader: ChoraleGrader,
}

impl PracticeSession {
    pub fn new(exercise: Exercise, mode: PracticeMode) -> Self {
        let options = NoteTimelineOptions {
            select: match mode {
                PracticeMode::PlayAllVoices => VoiceSelection::all(),
                PracticeMode::PlayTargetVoices => exercise.target_voices.clone(),
            },
            max_measures: exercise.max_measures,
        };
        let mut grader = ChoraleGrader::new(exercise.settings);
        grader.load(&exercise.score, &options);
        Self {
            exercise,
            mode,
            grader,
        }
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn mode(&self) -> PracticeMode {
        self.mode
    }

    pub fn grader(&self) -> &ChoraleGrader {
        &self.grader
    }

    /// Feeds a raw MIDI message to the grader. Returns the outcome of a key
    /// press; releases and unrelated messages return `None`.
    pub fn register_message(&mut self, bytes: &[u8]) -> Result<Option<NoteOutcome>, MidiError> {
        match MidiMessage::parse(bytes)? {
            Some(MidiMessage::NoteOn { note, velocity }) => {
                debug!(note, velocity, "note on");
                Ok(Some(self.grader.note_on(note as i32)))
            }
            Some(MidiMessage::NoteOff { note }) => {
                self.grader.note_off(note as i32);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub fn grade(&mut self) -> Grade {
        self.grader.grade()
    }

    /// Wall-clock offset of a window at the exercise tempo.
    pub fn window_offset(&self, index: usize) -> Option<Duration> {
        if self.exercise.tempo_bpm <= 0.0 {
            return None;
        }
        let tick = self.grader.window_onset(index)?;
        let quarters = tick as f64 / TICKS_PER_QUARTER as f64;
        Some(Duration::seconds_f64(quarters * 60.0 / self.exercise.tempo_bpm))
    }

    pub fn completed(&self) -> bool {
        self.grader.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorale_codec::ConversionPipeline;
    use chorale_domain::{Pitch, SourceElement, SourceMeasure, SourcePart, SourceScore, Step};

    fn part(name: &str, step: Step, octave: i8) -> SourcePart {
        let note = |step, octave| SourceElement::Note {
            pitch: Pitch::new(step, 0, octave),
            quarter_length: 2.0,
            tie: None,
        };
        SourcePart::named(
            name,
            vec![SourceMeasure {
                elements: vec![note(step, octave), note(step, octave)],
                ..SourceMeasure::default()
            }],
        )
    }

    fn exercise() -> Exercise {
        let source = SourceScore::new(vec![
            part("Soprano", Step::E, 5),
            part("Alto", Step::C, 5),
            part("Tenor", Step::G, 4),
            part("Bass", Step::C, 3),
        ]);
        let score = ConversionPipeline::new().convert(&source).unwrap().score;
        Exercise {
            id: "bwv-test".into(),
            title: "Test".into(),
            score,
            settings: GraderSettings::default(),
            tempo_bpm: 60.0,
            target_voices: VoiceSelection {
                treble: Some(vec![0]),
                bass: Some(Vec::new()),
            },
            max_measures: None,
        }
    }

    #[test]
    fn target_voices_only_grade_the_selection() {
        let mut session = PracticeSession::new(exercise(), PracticeMode::PlayTargetVoices);
        assert_eq!(session.grader().window_count(), 2);
        assert_eq!(session.register_message(&[0x90, 76, 90]), Ok(Some(NoteOutcome::Matched(0))));
        assert_eq!(session.register_message(&[0x80, 76, 0]), Ok(None));
        assert_eq!(session.register_message(&[0x90, 76, 90]), Ok(Some(NoteOutcome::Matched(1))));
        assert!(session.completed());
    }

    #[test]
    fn all_voices_need_every_note() {
        let mut session = PracticeSession::new(exercise(), PracticeMode::PlayAllVoices);
        for note in [76, 72, 67] {
            session.register_message(&[0x90, note, 80]).unwrap();
        }
        assert_eq!(session.grader().active_index(), 0);
        session.register_message(&[0x90, 48, 80]).unwrap();
        assert_eq!(session.grader().active_index(), 1);
        assert!(!session.completed());
    }

    #[test]
    fn window_offsets_follow_tempo() {
        let session = PracticeSession::new(exercise(), PracticeMode::PlayAllVoices);
        assert_eq!(session.window_offset(0), Some(Duration::ZERO));
        assert_eq!(session.window_offset(1), Some(Duration::seconds(2)));
        assert_eq!(session.window_offset(2), None);
    }

    #[test]
    fn exercise_reads_from_json() {
        let json = serde_json::to_value(exercise()).unwrap();
        assert_eq!(json["tempoBpm"], 60.0);
        let back: Exercise = serde_json::from_value(json).unwrap();
        assert_eq!(back.target_voices.treble, Some(vec![0]));
        assert_eq!(serde_json::to_string(&PracticeMode::PlayTargetVoices).unwrap(), "\"play-target-voices\"");
    }
}
