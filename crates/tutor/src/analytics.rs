use serde::{Deserialize, Serialize};

use crate::scoring::ChoraleGrader;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub windows_completed: usize,
    pub total_windows: usize,
    pub mistakes: usize,
    /// Share of key presses that matched an expected note.
    pub accuracy: f32,
}

pub struct SessionAnalytics;

impl SessionAnalytics {
    pub fn from_grader(grader: &ChoraleGrader) -> PerformanceReport {
        let (correct, wrong) = grader.press_counts();
        let presses = correct + wrong;
        PerformanceReport {
            windows_completed: grader.active_index().min(grader.window_count()),
            total_windows: grader.window_count(),
            mistakes: wrong,
            accuracy: if presses == 0 {
                0.0
            } else {
                correct as f32 / presses as f32
            },
        }
    }
}
