use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ModelSettings;
use crate::generation::config::GenerationConfig;
use crate::generation::tgi::TgiGenerator;

/// A text-generation capability backing one model variant.
///
/// Implementations are shared read-only across concurrent calls.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String>;
}

/// Build a generator from a `[models.*]` settings block.
pub fn build_generator(settings: &ModelSettings, timeout: Duration) -> Result<Arc<dyn Generator>> {
    match settings.provider.to_lowercase().as_str() {
        "tgi" => Ok(Arc::new(TgiGenerator::from_settings(settings, timeout)?)),
        other => anyhow::bail!(
            "Unsupported model provider '{}'. Supported providers: tgi",
            other
        ),
    }
}
