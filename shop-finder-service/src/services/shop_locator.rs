//! Prompt composition plus the single outbound call per lookup.

use crate::services::metrics;
use crate::services::prompt::{compose_prompt, shop_list_schema};
use crate::services::providers::{GenerationParams, TextProvider};
use std::sync::Arc;
use std::time::Instant;

/// Asks the configured provider for shops near a location.
#[derive(Clone)]
pub struct ShopLocator {
    provider: Arc<dyn TextProvider>,
    params: GenerationParams,
}

impl ShopLocator {
    pub fn new(provider: Arc<dyn TextProvider>, structured_output: bool) -> Self {
        let params = GenerationParams {
            output_schema: structured_output.then(shop_list_schema),
        };
        Self { provider, params }
    }

    pub fn provider(&self) -> &Arc<dyn TextProvider> {
        &self.provider
    }

    /// Raw model reply for `location`, or `None` when the call failed or came
    /// back empty. Failures are logged and counted here and go no further.
    pub async fn fetch_listing(&self, location: &str) -> Option<String> {
        let prompt = compose_prompt(location);
        let provider = self.provider.name();
        let model = self.provider.model();

        let started = Instant::now();
        let result = self.provider.generate(&prompt, &self.params).await;
        metrics::record_provider_latency(provider, model, started.elapsed().as_secs_f64());

        match result {
            Ok(response) if !response.text.trim().is_empty() => {
                tracing::info!(
                    provider,
                    model,
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    finish_reason = response.finish_reason.as_str(),
                    "Received model reply"
                );
                Some(response.text)
            }
            Ok(_) => {
                metrics::record_provider_error(provider, "empty_response");
                tracing::warn!(provider, model, "Model returned an empty reply");
                None
            }
            Err(e) => {
                metrics::record_provider_error(provider, e.kind());
                tracing::error!(provider, model, error = %e, "Error calling generative API");
                None
            }
        }
    }
}
