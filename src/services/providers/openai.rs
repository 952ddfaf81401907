/// OpenAI chat completions provider
///
/// Issues a single non-streaming completion with JSON-mode output. The
/// reply is handed back raw; interpreting finish reasons and body shape
/// is the recommendation engine's job.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    services::providers::{ModelReply, RecommendationModel},
};

const MAX_COMPLETION_TOKENS: u32 = 1000;
const TEMPERATURE: f64 = 0.7;

#[derive(Clone)]
pub struct OpenAiModel {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiModel {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
        }
    }
}

#[async_trait::async_trait]
impl RecommendationModel for OpenAiModel {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> AppResult<ModelReply> {
        let url = format!("{}/v1/chat/completions", self.api_url);

        let body = json!({
            "model": self.model,
            "messages": [
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            "response_format": { "type": "json_object" },
            "max_tokens": MAX_COMPLETION_TOKENS,
            "temperature": TEMPERATURE,
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Model API returned status {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let reply = match completion.choices.into_iter().next() {
            Some(choice) => ModelReply {
                content: choice.message.content,
                finish_reason: choice.finish_reason,
            },
            None => ModelReply {
                content: None,
                finish_reason: None,
            },
        };

        tracing::info!(
            model = %self.model,
            finish_reason = reply.finish_reason.as_deref().unwrap_or("none"),
            "Model completion received"
        );

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_deserialization() {
        let json = r#"{
            "choices": [
                {
                    "message": { "content": "{\"recommendations\": []}" },
                    "finish_reason": "stop"
                }
            ]
        }"#;

        let completion: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(completion.choices.len(), 1);
        assert_eq!(
            completion.choices[0].message.content.as_deref(),
            Some("{\"recommendations\": []}")
        );
        assert_eq!(completion.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_completion_with_null_content() {
        let json = r#"{
            "choices": [
                {
                    "message": { "content": null },
                    "finish_reason": "length"
                }
            ]
        }"#;

        let completion: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(completion.choices[0].message.content, None);
        assert_eq!(
            completion.choices[0].finish_reason.as_deref(),
            Some("length")
        );
    }
}
