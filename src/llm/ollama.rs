// src/llm/ollama.rs

use reqwest::blocking::Client;
use serde_json::json;

use crate::llm::{
    CompletionProvider, HttpOptions, ProviderError, build_client, send_json, text_at,
};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Local model served by Ollama's `/api/generate`.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str, options: HttpOptions) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(&options)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            max_retries: options.max_retries,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

impl CompletionProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let url = self.endpoint();
        let payload = json!({
            "model": self.model,
            "system": system,
            "prompt": user,
            "stream": false,
            "options": { "temperature": 0 }
        });

        let body = send_json(self.name(), self.max_retries, || {
            self.client.post(&url).json(&payload)
        })?;

        text_at(&body, &["response"])
            .map(|text| text.trim().to_string())
            .ok_or(ProviderError::MissingField {
                provider: self.name(),
                field: "response",
            })
    }
}
