use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default escalating captions for the evasive target.
pub const DEFAULT_LABELS: [&str; 12] = [
    "No 😢",
    "Why? 😢",
    "Hey… don't do that 💔",
    "Okay wow that hurts 😞",
    "I thought we had something 🥺",
    "I'm crying now 😭",
    "Pleaseeee 💕",
    "This is getting painful 😖",
    "Last chance pls 😔",
    "You're breaking my heart 💔",
    "Fine… but I'll be sad forever 😢",
    "Okay… last chance was real 😭💔",
];

/// Caption shown once the attempt cap is reached.
pub const DEFAULT_TERMINAL_LABEL: &str = "Okay… last chance was real 😭💔";

/// Ordered captions plus the fixed terminal caption. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLabelSet")]
pub struct LabelSet {
    entries: Vec<String>,
    terminal: String,
}

#[derive(Deserialize)]
struct RawLabelSet {
    entries: Vec<String>,
    terminal: String,
}

impl TryFrom<RawLabelSet> for LabelSet {
    type Error = ValidationError;

    fn try_from(raw: RawLabelSet) -> Result<Self, Self::Error> {
        LabelSet::new(raw.entries, raw.terminal)
    }
}

impl LabelSet {
    pub fn new(
        entries: Vec<String>,
        terminal: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if entries.is_empty() {
            return Err(ValidationError::EmptyCollection("labels".into()));
        }
        Ok(Self {
            entries,
            terminal: terminal.into(),
        })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn terminal(&self) -> &str {
        &self.terminal
    }

    /// Caption for `attempts` failed attempts out of `max`.
    ///
    /// Saturates at both ends: zero attempts always shows the first entry,
    /// `attempts >= max` always shows the terminal caption.
    pub fn label(&self, attempts: u32, max: u32) -> &str {
        if attempts >= max {
            return &self.terminal;
        }
        if attempts == 0 {
            return &self.entries[0];
        }
        let idx = (attempts as usize).min(self.entries.len() - 1);
        &self.entries[idx]
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self {
            entries: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
            terminal: DEFAULT_TERMINAL_LABEL.to_string(),
        }
    }
}
