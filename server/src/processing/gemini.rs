//! Minimal client for the Gemini `generateContent` endpoint.
//!
//! Only the parts of the wire format the edit path needs are modelled: one
//! user turn carrying an inline image and an instruction, and candidates whose
//! parts may hold text or inline image data.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::config::GeminiConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, alias = "inline_data", skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, alias = "mime_type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentRequest {
    /// One user turn: the image first, then the instruction.
    pub fn image_edit(mime_type: &str, base64_data: String, instruction: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: Some(mime_type.to_string()),
                            data: base64_data,
                        }),
                        ..Part::default()
                    },
                    Part {
                        text: Some(instruction.to_string()),
                        ..Part::default()
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            }),
        }
    }
}

impl GenerateContentResponse {
    /// First part of the first candidate that carries inline image data.
    pub fn first_inline_image(&self) -> Option<&InlineData> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|part| part.inline_data.as_ref())
            .find(|inline| !inline.data.is_empty())
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Returns `None` when no API key is configured.
    pub fn from_config(config: &GeminiConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build Gemini HTTP client")?;

        Ok(Some(Self {
            http_client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        }))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_content(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let res = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to call Gemini API: {}", e))?;

        let status = res.status();
        let body = res.text().await.context("Failed to read Gemini response")?;

        if !status.is_success() {
            return Err(anyhow!("Gemini API returned {}: {}", status, body));
        }

        serde_json::from_str(&body).map_err(|e| anyhow!("Failed to parse Gemini response: {}", e))
    }
}
