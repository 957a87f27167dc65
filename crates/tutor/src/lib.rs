pub mod analytics;
pub mod midi;
pub mod scoring;
pub mod session;
pub mod timeline;

pub use analytics::{PerformanceReport, SessionAnalytics};
pub use midi::{MidiDevice, MidiError, MidiManager, MidiMessage};
pub use scoring::{ChoraleGrader, Grade, GradeState, GraderSettings, NoteOutcome};
pub use session::{Exercise, PracticeMode, PracticeSession};
pub use timeline::{build_note_timeline, onset_windows, NoteOccurrence, NoteTimelineOptions, VoiceSelection};
