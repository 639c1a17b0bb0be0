use super::models::{ModelInfo, ModelList};
use super::prompts::{diagnosis_prompt, TraceContext};
use crate::config::Config;
use crate::error::{DoctorError, DoctorResult};
use crate::util::truncate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Rate limit retry configuration
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 2000; // 2 seconds
const BACKOFF_MULTIPLIER: u64 = 2; // Exponential backoff

/// Client for the Gemini `generateContent` API.
///
/// Built once per run from [`Config`] and handed to whatever needs it.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].text`
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

fn request_body(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
    }
}

/// Pull the generated text out of a raw `generateContent` response body.
fn extract_response_text(body: &str) -> DoctorResult<String> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| DoctorError::UnexpectedResponse(format!("{}: {}", e, truncate(body, 200))))?;
    parsed
        .first_text()
        .ok_or_else(|| DoctorError::UnexpectedResponse(format!("no text in {}", truncate(body, 200))))
}

/// Extract retry-after hint from an error body (if present)
fn parse_retry_after(text: &str) -> Option<u64> {
    let text_lower = text.to_lowercase();
    let pos = text_lower.find("retry")?;
    text_lower[pos..]
        .split_whitespace()
        .skip(1)
        .take(5)
        .filter_map(|word| {
            word.trim_matches(|c: char| !c.is_ascii_digit())
                .parse::<u64>()
                .ok()
        })
        .find(|secs| *secs > 0 && *secs < 300)
}

fn backoff_secs(retry_count: u32) -> u64 {
    (INITIAL_BACKOFF_MS * BACKOFF_MULTIPLIER.pow(retry_count.saturating_sub(1))) / 1000
}

impl GeminiClient {
    pub fn new(api_key: String, api_base: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Fails with [`DoctorError::MissingApiKey`] when no key is configured.
    pub fn from_config(config: &Config) -> DoctorResult<Self> {
        let api_key = config.api_key().ok_or(DoctorError::MissingApiKey)?;
        Ok(Self::new(api_key, config.api_base(), config.model()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    /// Ask the model to diagnose `code`; returns its raw text answer.
    pub async fn analyze_bug(
        &self,
        description: Option<&str>,
        code: &str,
        trace: Option<&TraceContext>,
    ) -> DoctorResult<String> {
        let prompt = diagnosis_prompt(description, code, trace);
        self.generate(&prompt).await
    }

    /// Send one prompt, retrying on rate limits.
    pub async fn generate(&self, prompt: &str) -> DoctorResult<String> {
        let url = self.generate_url();
        let body = request_body(prompt);
        let mut retry_count = 0;

        loop {
            let response = self
                .http
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let text = response.text().await?;

            if status.is_success() {
                debug!(model = %self.model, chars = text.len(), "Diagnosis received");
                return extract_response_text(&text);
            }

            if status.as_u16() == 429 && retry_count < MAX_RETRIES {
                retry_count += 1;
                let retry_after =
                    parse_retry_after(&text).unwrap_or_else(|| backoff_secs(retry_count));
                warn!(
                    "Gemini rate limited. Retrying in {}s (attempt {}/{})",
                    retry_after, retry_count, MAX_RETRIES
                );
                tokio::time::sleep(tokio::time::Duration::from_secs(retry_after)).await;
                continue;
            }

            return Err(DoctorError::Api {
                status: status.as_u16(),
                body: truncate(&text, 500),
            });
        }
    }

    /// Models this API key can see.
    pub async fn list_models(&self) -> DoctorResult<Vec<ModelInfo>> {
        let response = self
            .http
            .get(format!("{}/models", self.api_base))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(DoctorError::Api {
                status: status.as_u16(),
                body: truncate(&text, 500),
            });
        }
        let list: ModelList = serde_json::from_str(&text)
            .map_err(|e| DoctorError::UnexpectedResponse(e.to_string()))?;
        Ok(list.models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(request_body("line \"one\"\nline two")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"parts": [{"text": "line \"one\"\nline two"}]}]})
        );
    }

    #[test]
    fn test_extract_response_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"[{\"lineNumber\":1}]"}],"role":"model"}}]}"#;
        assert_eq!(extract_response_text(body).unwrap(), "[{\"lineNumber\":1}]");
    }

    #[test]
    fn test_extract_response_text_without_candidates() {
        let err = extract_response_text(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .unwrap_err();
        assert!(matches!(err, DoctorError::UnexpectedResponse(_)));
        assert!(matches!(
            extract_response_text("<html>"),
            Err(DoctorError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("Please retry in 17s."), Some(17));
        assert_eq!(parse_retry_after("retry later"), None);
        assert_eq!(parse_retry_after("quota exceeded"), None);
    }

    #[test]
    fn test_backoff_grows() {
        assert_eq!(backoff_secs(1), 2);
        assert_eq!(backoff_secs(2), 4);
        assert_eq!(backoff_secs(3), 8);
    }

    #[test]
    fn test_generate_url_and_missing_key() {
        let client = GeminiClient::new("k".to_string(), "http://localhost/v1beta/", "gemini-x");
        assert_eq!(
            client.generate_url(),
            "http://localhost/v1beta/models/gemini-x:generateContent"
        );

        let config = Config {
            gemini_api_key: None,
            ..Config::default()
        };
        if std::env::var(crate::config::API_KEY_ENV).is_err() {
            assert!(matches!(
                GeminiClient::from_config(&config),
                Err(DoctorError::MissingApiKey)
            ));
        }
    }
}
