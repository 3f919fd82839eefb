use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ModelSettings;
use crate::generation::client::Generator;
use crate::generation::config::GenerationConfig;

/// Client for a text-generation-inference style `POST /generate` endpoint.
pub struct TgiGenerator {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl TgiGenerator {
    pub fn from_settings(settings: &ModelSettings, timeout: Duration) -> Result<Self> {
        let endpoint = settings.endpoint.trim().trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            anyhow::bail!(
                "Model endpoint is missing for provider '{}'. Set endpoint in the [models.*] config section.",
                settings.provider
            );
        }

        let api_key = Some(settings.api_key.trim().to_string()).filter(|k| !k.is_empty());

        Ok(Self {
            http: Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build generation HTTP client")?,
            endpoint,
            api_key,
            model: settings.model.trim().to_string(),
        })
    }

    fn request_url(&self) -> String {
        format!("{}/generate", self.endpoint)
    }
}

#[async_trait]
impl Generator for TgiGenerator {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let body = TgiGenerateRequest {
            inputs: prompt,
            parameters: TgiParameters {
                max_new_tokens: config.max_new_tokens.get(),
                num_beams: config.num_beams.get(),
                do_sample: false,
            },
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            max_new_tokens = body.parameters.max_new_tokens,
            num_beams = body.parameters.num_beams,
            "Sending generation request"
        );

        let mut request = self.http.post(self.request_url()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.context("Generation request failed")?;

        let response = response
            .error_for_status()
            .context("Generation endpoint returned an error status")?;

        let payload: TgiGenerateResponse = response
            .json()
            .await
            .context("Failed to parse generation response")?;

        let text = match payload {
            TgiGenerateResponse::Single(generation) => generation.generated_text,
            TgiGenerateResponse::Batch(generations) => generations
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .context("Generation response did not contain any output")?,
        };

        Ok(text.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct TgiGenerateRequest<'a> {
    inputs: &'a str,
    parameters: TgiParameters,
}

#[derive(Debug, Serialize)]
struct TgiParameters {
    max_new_tokens: u32,
    num_beams: u32,
    do_sample: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TgiGenerateResponse {
    Single(TgiGeneration),
    Batch(Vec<TgiGeneration>),
}

#[derive(Debug, Deserialize)]
struct TgiGeneration {
    generated_text: String,
}
