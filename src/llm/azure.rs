// src/llm/azure.rs

use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::llm::{
    CompletionProvider, HttpOptions, ProviderError, build_client, send_json, text_at,
};

pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-01";

/// Chat-completions deployment on Azure OpenAI.
pub struct AzureOpenAiProvider {
    client: Client,
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: SecretString,
    max_retries: u32,
}

impl AzureOpenAiProvider {
    pub fn new(
        endpoint: &str,
        deployment: &str,
        api_version: &str,
        api_key: SecretString,
        options: HttpOptions,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(&options)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            deployment: deployment.to_string(),
            api_version: api_version.to_string(),
            api_key,
            max_retries: options.max_retries,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

impl CompletionProvider for AzureOpenAiProvider {
    fn name(&self) -> &'static str {
        "azure-openai"
    }

    fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let url = self.url();
        let payload = json!({
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": 0
        });

        let body = send_json(self.name(), self.max_retries, || {
            self.client
                .post(&url)
                .header("api-key", self.api_key.expose_secret())
                .json(&payload)
        })?;

        text_at(&body, &["choices", "0", "message", "content"])
            .map(|text| text.trim().to_string())
            .ok_or(ProviderError::MissingField {
                provider: self.name(),
                field: "choices[0].message.content",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_url() {
        let provider = AzureOpenAiProvider::new(
            "https://shop.openai.azure.com/",
            "gpt-35-turbo",
            DEFAULT_AZURE_API_VERSION,
            SecretString::from("key"),
            HttpOptions::default(),
        )
        .unwrap();
        assert_eq!(
            provider.url(),
            "https://shop.openai.azure.com/openai/deployments/gpt-35-turbo/chat/completions?api-version=2024-02-01"
        );
    }
}
