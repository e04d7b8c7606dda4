//! Comparison between a previously loaded snapshot and a new one.

use serde::{Deserialize, Serialize};

use crate::summary::Summaries;

/// Headline figures shown after replacing the snapshot with new data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotComparison {
    pub previous_total: usize,
    pub current_total: usize,
    pub mean_age: f64,
    pub mean_first_score: f64,
    pub genetic_confirmation_percentage: f64,
}

impl SnapshotComparison {
    pub fn between(previous_total: usize, current: &Summaries) -> Self {
        Self {
            previous_total,
            current_total: current.total,
            mean_age: current.mean_age,
            mean_first_score: current.mean_first_score,
            genetic_confirmation_percentage: current.genetic_confirmation.genetic_percentage(),
        }
    }

    /// Signed change in patient count.
    pub fn delta(&self) -> i64 {
        self.current_total as i64 - self.previous_total as i64
    }

    pub fn grew(&self) -> bool {
        self.current_total > self.previous_total
    }
}
