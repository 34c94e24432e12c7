//! Score and high-water mark

/// Score for the current run plus the best ever seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    score: u64,
    high_score: u64,
}

impl ScoreLedger {
    pub fn with_high_score(high_score: u64) -> Self {
        Self {
            score: 0,
            high_score,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Add points; returns true when the high score moved
    pub fn add(&mut self, points: u64) -> bool {
        self.score = self.score.saturating_add(points);
        if self.score > self.high_score {
            self.high_score = self.score;
            true
        } else {
            false
        }
    }

    /// Start a new run (the high score stays)
    pub fn reset(&mut self) {
        self.score = 0;
    }
}
