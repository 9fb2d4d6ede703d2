use std::fmt;

use serde::{Deserialize, Serialize};

/// Running tally of answered questions in one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
}

impl Score {
    pub fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    /// Share of correct answers in percent; `None` before any question.
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.correct as f64 / self.total as f64 * 100.0)
    }

    /// Percentage rounded to a whole number, halves away from zero.
    pub fn rounded_percentage(&self) -> Option<f64> {
        self.percentage().map(f64::round)
    }

    pub fn grade(&self) -> Option<Grade> {
        self.percentage().map(Grade::from_percentage)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rounded_percentage() {
            Some(pct) => write!(f, "{} / {} ({}%)", self.correct, self.total, pct),
            None => write!(f, "No questions"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    /// 90% and above.
    Excellent,
    /// 70% up to 90%.
    Good,
    KeepPracticing,
}

impl Grade {
    pub fn from_percentage(pct: f64) -> Self {
        if pct >= 90.0 {
            Grade::Excellent
        } else if pct >= 70.0 {
            Grade::Good
        } else {
            Grade::KeepPracticing
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Grade::Excellent      => "Excellent! Great job!",
            Grade::Good           => "Good work! Keep practicing!",
            Grade::KeepPracticing => "Keep practicing to improve!",
        }
    }
}
