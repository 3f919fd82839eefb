//! Decoding options passed to every generation call

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::{EvalError, Result};

/// Bounded decoding configuration. Unknown options are rejected when the
/// configuration is built, both from TOML and from `key=value` overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Upper bound on generated tokens
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: NonZeroU32,

    /// Beam width (1 = greedy decoding)
    #[serde(default = "default_num_beams")]
    pub num_beams: NonZeroU32,
}

const DEFAULT_MAX_NEW_TOKENS: NonZeroU32 = match NonZeroU32::new(200) {
    Some(n) => n,
    None => panic!("default token budget must be non-zero"),
};

fn default_max_new_tokens() -> NonZeroU32 {
    DEFAULT_MAX_NEW_TOKENS
}

fn default_num_beams() -> NonZeroU32 {
    NonZeroU32::MIN
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: default_max_new_tokens(),
            num_beams: default_num_beams(),
        }
    }
}

impl GenerationConfig {
    pub const OPTIONS: [&'static str; 2] = ["max_new_tokens", "num_beams"];

    /// Set a single option by name.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
        let key = key.trim();
        let slot = match key {
            "max_new_tokens" => &mut self.max_new_tokens,
            "num_beams" => &mut self.num_beams,
            other => {
                return Err(EvalError::ConfigValidation(format!(
                    "Unrecognized generation option '{}'. Supported: {}",
                    other,
                    Self::OPTIONS.join(", ")
                )))
            }
        };

        *slot = value
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| {
                EvalError::ConfigValidation(format!(
                    "Generation option '{}' must be a positive integer, got '{}'",
                    key, value
                ))
            })?;

        Ok(())
    }

    /// Apply `key=value` assignments on top of this configuration.
    pub fn with_assignments<I, S>(mut self, assignments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (key, value) = assignment.split_once('=').ok_or_else(|| {
                EvalError::ConfigValidation(format!(
                    "Expected key=value for generation option, got '{}'",
                    assignment
                ))
            })?;
            self.set_option(key, value)?;
        }
        Ok(self)
    }

    pub fn is_greedy(&self) -> bool {
        self.num_beams.get() == 1
    }
}
