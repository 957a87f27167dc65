use serde::{Deserialize, Serialize};

use crate::{cir::CirDocument, DomainError};

/// Half-open measure range `[start, end)`, 0-based. `end: None` runs to the
/// last measure.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Excerpt {
    #[serde(rename = "startMeasure")]
    pub start: usize,
    #[serde(rename = "endMeasure")]
    pub end: Option<usize>,
}

impl Excerpt {
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// Copies the selected measures, keeping their original numbers and the
    /// document meta.
    pub fn apply(&self, score: &CirDocument) -> Result<CirDocument, DomainError> {
        let total = score.measures.len();
        let end = self.end.unwrap_or(total).min(total);
        if self.start >= end {
            return Err(DomainError::EmptyExcerpt {
                start: self.start,
                end: self.end,
            });
        }
        Ok(CirDocument {
            meta: score.meta.clone(),
            measures: score.measures[self.start..end].to_vec(),
        })
    }

    pub fn title(&self, work_id: &str, total_measures: usize) -> String {
        match self.end {
            None if self.start == 0 => work_id.to_string(),
            end => {
                let end = end.unwrap_or(total_measures);
                format!("{} (mm. {}–{})", work_id, self.start + 1, end)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cir::{Measure, Meta, Staves};
    use crate::signature::TimeSignature;

    fn score(measures: u32) -> CirDocument {
        CirDocument {
            meta: Meta {
                key: Some("Am".into()),
                time: TimeSignature::new(3, 4).unwrap(),
            },
            measures: (1..=measures)
                .map(|number| Measure {
                    number,
                    staves: Staves::default(),
                })
                .collect(),
        }
    }

    #[test]
    fn slices_measures_keeping_numbers() {
        let excerpt = Excerpt::new(1, Some(3)).apply(&score(6)).unwrap();
        let numbers: Vec<u32> = excerpt.measures.iter().map(|m| m.number).collect();
        assert_eq!(numbers, vec![2, 3]);
        assert_eq!(excerpt.meta.key.as_deref(), Some("Am"));
    }

    #[test]
    fn open_end_runs_to_last_measure() {
        let excerpt = Excerpt::new(4, None).apply(&score(6)).unwrap();
        assert_eq!(excerpt.measures.len(), 2);
        let clipped = Excerpt::new(0, Some(40)).apply(&score(6)).unwrap();
        assert_eq!(clipped.measures.len(), 6);
    }

    #[test]
    fn empty_range_is_rejected() {
        let err = Excerpt::new(6, Some(8)).apply(&score(6)).unwrap_err();
        assert!(matches!(err, DomainError::EmptyExcerpt { start: 6, end: Some(8) }));
        assert_eq!(err.to_string(), "no measures in range [6:8]");
    }

    #[test]
    fn titles() {
        assert_eq!(Excerpt::new(0, Some(4)).title("BWV1.6", 20), "BWV1.6 (mm. 1–4)");
        assert_eq!(Excerpt::new(2, None).title("BWV1.6", 20), "BWV1.6 (mm. 3–20)");
        assert_eq!(Excerpt::default().title("BWV1.6", 20), "BWV1.6");
    }
}
