use serde::{Deserialize, Serialize};

use crate::trainer::models::DEFAULT_DISTRACTORS;

/// Per-engine settings.
///
/// `rng_seed: Some(u64)` makes branch selection and option order
/// reproducible; `None` seeds from OS entropy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub rng_seed: Option<u64>,
    /// Distractors offered next to the correct answer.
    pub distractors: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            rng_seed: None,
            distractors: DEFAULT_DISTRACTORS,
        }
    }
}

impl SessionConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_distractors(mut self, distractors: usize) -> Self {
        self.distractors = distractors;
        self
    }
}
