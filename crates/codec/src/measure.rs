use chorale_domain::{
    cir::total_quarter_length, quantize, ChordMember, ScoreItem, SourceElement, SourceMeasure,
    SourcePart, Tie, TieType, DURATION_TABLE,
};

/// Shortfall (in quarter notes) below which a voice counts as full.
pub const FILL_TOLERANCE: f64 = 0.01;

/// One part's contribution to one measure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeasureVoice {
    pub items: Vec<ScoreItem>,
    /// Rests appended at the end to reach the measure length.
    pub padding: usize,
}

impl MeasureVoice {
    /// Items as written, before padding.
    pub fn written(&self) -> &[ScoreItem] {
        &self.items[..self.items.len() - self.padding]
    }
}

fn tie_flags(tie: Option<TieType>) -> Tie {
    let (start, stop) = TieType::flags(tie);
    Tie::new(start, stop)
}

pub fn convert_element(element: &SourceElement) -> ScoreItem {
    match element {
        SourceElement::Rest { quarter_length } => ScoreItem::Rest {
            duration: quantize(*quarter_length),
        },
        SourceElement::Note {
            pitch,
            quarter_length,
            tie: tie_type,
        } => ScoreItem::Note {
            pitch: *pitch,
            duration: quantize(*quarter_length),
            tie: tie_flags(*tie_type),
        },
        SourceElement::Chord {
            notes,
            quarter_length,
        } => ScoreItem::Chord {
            notes: notes
                .iter()
                .map(|n| ChordMember {
                    pitch: n.pitch,
                    tie: tie_flags(n.tie),
                })
                .collect(),
            duration: quantize(*quarter_length),
        },
    }
}

/// Walks a measure's elements in time order.
pub fn convert_measure(measure: &SourceMeasure) -> Vec<ScoreItem> {
    measure.elements.iter().map(convert_element).collect()
}

/// Greedy rest sequence covering `gap`, largest value first.
pub fn rests_for_gap(gap: f64) -> Vec<ScoreItem> {
    let mut remaining = gap;
    let mut rests = Vec::new();
    while remaining > FILL_TOLERANCE {
        let (value, duration) = DURATION_TABLE
            .iter()
            .copied()
            .find(|(value, _)| remaining >= *value)
            .unwrap_or(DURATION_TABLE[DURATION_TABLE.len() - 1]);
        rests.push(ScoreItem::rest(duration));
        remaining -= value;
    }
    rests
}

/// Appends rests so the voice fills `target` quarter notes. The opening
/// measure is left alone so pickups keep their written length.
pub fn pad_to_length(items: Vec<ScoreItem>, target: f64, is_first_measure: bool) -> MeasureVoice {
    let current = total_quarter_length(&items);
    if is_first_measure || current >= target - FILL_TOLERANCE {
        return MeasureVoice { items, padding: 0 };
    }
    let rests = rests_for_gap(target - current);
    let padding = rests.len();
    let mut items = items;
    items.extend(rests);
    MeasureVoice { items, padding }
}

/// Builds the voice for `part` at measure `index`. A part that has run out
/// of measures contributes no written items.
pub fn build_voice(part: &SourcePart, index: usize, target: f64) -> MeasureVoice {
    let written = part.measures.get(index).map(convert_measure).unwrap_or_default();
    pad_to_length(written, target, index == 0)
}
