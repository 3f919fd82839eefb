//! Dataset record and split types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::EvalError;

/// One dialogue with its human-written reference summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueRecord {
    /// Identifier from the source dataset
    #[serde(alias = "fname")]
    pub id: String,

    /// Full dialogue text
    pub dialogue: String,

    /// Human reference summary
    pub summary: String,

    /// Topic label (may be empty)
    #[serde(default)]
    pub topic: String,
}

impl DialogueRecord {
    pub fn new(id: impl Into<String>, dialogue: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dialogue: dialogue.into(),
            summary: summary.into(),
            topic: String::new(),
        }
    }
}

/// Dataset partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Validation,
    #[default]
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Validation => "validation",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "train" => Ok(Self::Train),
            "validation" | "val" | "dev" => Ok(Self::Validation),
            "test" => Ok(Self::Test),
            other => Err(EvalError::ConfigValidation(format!(
                "Unknown split '{}'. Supported: train, validation, test",
                other
            ))),
        }
    }
}
