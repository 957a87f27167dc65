use anyhow::Result;
use midir::MidiInput;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MidiDevice {
    pub name: String,
}

pub struct MidiManager;

impl MidiManager {
    pub fn list_inputs() -> Result<Vec<MidiDevice>> {
        let input = MidiInput::new("chorale-tutor")?;
        Ok(input
            .ports()
            .iter()
            .map(|port| MidiDevice {
                name: input.port_name(port).unwrap_or_else(|_| "Unknown".into()),
            })
            .collect())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MidiError {
    #[error("empty midi message")]
    Empty,
    #[error("truncated {kind} message: expected 3 bytes, got {len}")]
    Truncated { kind: &'static str, len: usize },
}

/// The subset of channel messages the grader reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
}

impl MidiMessage {
    /// Parses a raw channel message. Anything other than note on/off yields
    /// `Ok(None)`; a note on with zero velocity is a release.
    pub fn parse(bytes: &[u8]) -> Result<Option<Self>, MidiError> {
        let status = *bytes.first().ok_or(MidiError::Empty)?;
        let kind = match status & 0xF0 {
            0x90 => "note on",
            0x80 => "note off",
            _ => return Ok(None),
        };
        let (note, velocity) = match bytes {
            [_, note, velocity, ..] => (note & 0x7F, velocity & 0x7F),
            _ => {
                return Err(MidiError::Truncated {
                    kind,
                    len: bytes.len(),
                })
            }
        };
        Ok(Some(match status & 0xF0 {
            0x90 if velocity > 0 => MidiMessage::NoteOn { note, velocity },
            _ => MidiMessage::NoteOff { note },
        }))
    }
}
