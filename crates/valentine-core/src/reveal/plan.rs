use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealStage {
    Hidden,
    CardShown,
    MessageShown,
    MediaShown,
    FullyRevealed,
}

impl std::fmt::Display for RevealStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RevealStage::Hidden => "hidden",
            RevealStage::CardShown => "card_shown",
            RevealStage::MessageShown => "message_shown",
            RevealStage::MediaShown => "media_shown",
            RevealStage::FullyRevealed => "fully_revealed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealStep {
    pub stage: RevealStage,
    /// Offset from the celebration mount, in milliseconds.
    pub offset_ms: u64,
    pub label: String,
}

impl RevealStep {
    fn new(stage: RevealStage, offset_ms: u64, label: &str) -> Self {
        Self {
            stage,
            offset_ms,
            label: label.into(),
        }
    }
}

/// Ordered stage offsets for the celebration screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealPlan {
    steps: Vec<RevealStep>,
}

impl RevealPlan {
    /// Build a plan, rejecting steps that would move backwards.
    pub fn new(steps: Vec<RevealStep>) -> Result<Self, ValidationError> {
        if steps.is_empty() {
            return Err(ValidationError::EmptyCollection("reveal steps".into()));
        }
        let mut prev_stage = RevealStage::Hidden;
        let mut prev_offset = 0;
        for (index, step) in steps.iter().enumerate() {
            if step.stage <= prev_stage || step.offset_ms < prev_offset {
                return Err(ValidationError::OutOfOrder {
                    index,
                    stage: step.stage.to_string(),
                });
            }
            prev_stage = step.stage;
            prev_offset = step.offset_ms;
        }
        Ok(Self { steps })
    }

    /// The default celebration timing.
    pub fn default_celebration() -> Self {
        Self {
            steps: vec![
                RevealStep::new(RevealStage::CardShown, 100, "Card"),
                RevealStep::new(RevealStage::MessageShown, 400, "Message"),
                RevealStep::new(RevealStage::MediaShown, 1200, "Media"),
                RevealStep::new(RevealStage::FullyRevealed, 1800, "Everything else"),
            ],
        }
    }

    pub fn steps(&self) -> &[RevealStep] {
        &self.steps
    }

    pub fn offset_of(&self, stage: RevealStage) -> Option<u64> {
        self.steps
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.offset_ms)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.steps.last().map(|s| s.offset_ms).unwrap_or(0)
    }
}

impl Default for RevealPlan {
    fn default() -> Self {
        Self::default_celebration()
    }
}
