use chorale_domain::{DomainError, KeyMode, Meta, SourceKey, SourceScore, TimeSignature};
use tracing::debug;

const MAJOR_TONICS: [&str; 15] = [
    "Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
];
const MINOR_TONICS: [&str; 15] = [
    "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#", "G#", "D#", "A#",
];

/// Tonic label for a key signature, e.g. `"Eb"` or `"Cm"`. Signatures beyond
/// seven sharps or flats have no label.
pub fn key_label(key: SourceKey) -> Option<String> {
    let index = usize::try_from(key.sharps as i32 + 7).ok()?;
    match key.mode.unwrap_or(KeyMode::Major) {
        KeyMode::Major => MAJOR_TONICS.get(index).map(|t| t.to_string()),
        KeyMode::Minor => MINOR_TONICS.get(index).map(|t| format!("{t}m")),
    }
}

#[derive(Default)]
pub struct MetaInference;

impl MetaInference {
    /// Global key and meter, each taken from the first occurrence in the
    /// score. The meter defaults to 4/4.
    pub fn infer(&self, score: &SourceScore) -> Result<Meta, DomainError> {
        let time = match score.first_time_signature() {
            Some(time) => TimeSignature::new(time.numerator, time.denominator)?,
            None => TimeSignature::common(),
        };
        let key = score.first_key().and_then(key_label);
        debug!(key = ?key, %time, "inferred score meta");
        Ok(Meta { key, time })
    }
}
