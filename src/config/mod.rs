//! Configuration module for summeval
//!
//! Handles loading and managing application settings from TOML files.

mod settings;

pub use settings::{
    DatasetSettings, GeneralSettings, ModelSettings, ModelsSettings, RunnerSettings,
    ScoringSettings, Settings, API_KEY_ENV,
};
