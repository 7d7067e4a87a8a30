//! Hugging Face Inference API adapter for sentence-transformers/all-MiniLM-L6-v2.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::warn;

use crate::embedding::{EmbeddingError, EmbeddingProvider};

pub const DEFAULT_EMBEDDING_API_URL: &str = "https://router.huggingface.co/hf-inference/models/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction";

const MAX_RETRIES: u32 = 2;

#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
    options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

#[derive(Clone)]
pub struct HuggingFaceEmbedder {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HuggingFaceEmbedder {
    pub fn new(api_url: String, api_key: String) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| EmbeddingError::Provider(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = FeatureExtractionRequest {
            inputs: texts,
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(250 * 2_u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Provider(format!("Request failed: {e}")));
                    continue;
                }
            };

            let status = response.status();

            if status.is_success() {
                return response.json::<Vec<Vec<f32>>>().await.map_err(|e| {
                    EmbeddingError::Provider(format!("Failed to parse response: {e}"))
                });
            }

            let body = response.text().await.unwrap_or_default();

            // 503 is returned while the model is loading.
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                warn!("Embedding API returned {status}: {body}");
                last_error = Some(EmbeddingError::Provider(format!(
                    "Server error {status}: {body}"
                )));
                continue;
            }

            return Err(EmbeddingError::Provider(format!("API error {status}: {body}")));
        }

        Err(last_error.unwrap_or_else(|| EmbeddingError::Provider("Unknown error".to_string())))
    }
}
