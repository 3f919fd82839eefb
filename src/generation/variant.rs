//! Model variants under evaluation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::EvalError;

/// Which checkpoint produced a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    /// Pretrained model without fine-tuning
    Base,
    /// Fully fine-tuned (instruction-tuned) model
    Full,
    /// Base model with a trained LoRA adapter attached
    Adapter,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 3] = [Self::Base, Self::Full, Self::Adapter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Full => "full",
            Self::Adapter => "adapter",
        }
    }

    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Base => "ORIGINAL MODEL",
            Self::Full => "INSTRUCT MODEL",
            Self::Adapter => "PEFT MODEL",
        }
    }

    /// Column holding this variant's summaries in the results table.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Base => "original_model_summaries",
            Self::Full => "instruct_model_summaries",
            Self::Adapter => "peft_model_summaries",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.column_name() == name)
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelVariant {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base" | "original" => Ok(Self::Base),
            "full" | "instruct" | "full-finetuned" => Ok(Self::Full),
            "adapter" | "peft" | "lora" => Ok(Self::Adapter),
            other => Err(EvalError::ConfigValidation(format!(
                "Unknown model variant '{}'. Supported: base, full, adapter",
                other
            ))),
        }
    }
}
