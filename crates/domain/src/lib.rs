pub mod cir;
pub mod config;
pub mod duration;
pub mod error;
pub mod events;
pub mod excerpt;
pub mod io;
pub mod pitch;
pub mod signature;
pub mod source;

pub use crate::cir::{
    ChordMember, CirDocument, Clef, Measure, Meta, ScoreItem, Staff, StaffId, Staves,
    StemDirection, Tie, Voice,
};
pub use crate::config::{ExportConfig, MeasureStartMode, ReleaseMode, TiedOnsetMode, TimelineOptions};
pub use crate::duration::{quantize, DurationType, SymbolicDuration, DURATION_TABLE};
pub use crate::error::DomainError;
pub use crate::events::{quarters_to_ticks, Event, PerStaff, StaffOnsets, TICKS_PER_QUARTER};
pub use crate::excerpt::Excerpt;
pub use crate::io::{sanitize_identifier, ExportPayload, JsonExporter, PayloadExporter, PayloadSource};
pub use crate::pitch::{pitch_number, Pitch, Step};
pub use crate::signature::TimeSignature;
pub use crate::source::{
    KeyMode, SourceChordNote, SourceElement, SourceKey, SourceMeasure, SourcePart, SourceScore,
    TieType,
};
