//! Client for the OpenAI-compatible speech server. It speaks with a single
//! preconfigured voice and answers with a finished WAV file.

use reqwest::Client;
use tracing::debug;

use super::error::ApiError;
use super::types::{ModelsResponse, SpeechRequest};
use crate::settings::config::OpenAiSettings;

pub struct OpenAiSpeechClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl OpenAiSpeechClient {
    pub fn new(settings: &OpenAiSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone().filter(|key| !key.is_empty()),
            model: settings.model.clone(),
            client: Client::new(),
        }
    }

    fn request_body(&self, input: &str, speed: f32) -> SpeechRequest {
        SpeechRequest {
            model: self.model.clone(),
            input: input.to_string(),
            response_format: "wav".to_string(),
            speed,
        }
    }

    /// Returns complete WAV bytes
    pub async fn speech(&self, input: &str, speed: f32) -> Result<Vec<u8>, ApiError> {
        let mut request = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .json(&self.request_body(input, speed));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!(chars = input.len(), speed, "openai speech request");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        Ok(response.bytes().await?.to_vec())
    }

    pub async fn models(&self) -> Result<Vec<String>, ApiError> {
        let mut request = self.client.get(format!("{}/models", self.base_url));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let body = response.bytes().await?;
        let models: ModelsResponse = serde_json::from_slice(&body)?;
        Ok(models.data.into_iter().map(|model| model.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::{direct_client, serve_once};

    fn client_for(base_url: String, api_key: Option<&str>) -> OpenAiSpeechClient {
        OpenAiSpeechClient {
            base_url,
            api_key: api_key.map(str::to_string),
            model: "tts-1".to_string(),
            client: direct_client(),
        }
    }

    #[test]
    fn request_body_shape() {
        let client = OpenAiSpeechClient::new(&OpenAiSettings::default());
        let body = serde_json::to_value(client.request_body("今天天氣真好", 1.0)).unwrap();
        assert_eq!(body["input"], "今天天氣真好");
        assert_eq!(body["response_format"], "wav");
        assert_eq!(body["speed"], 1.0);
        assert_eq!(body["model"], "tts-1");
    }

    #[test]
    fn empty_api_key_is_not_sent() {
        let settings = OpenAiSettings {
            api_key: Some(String::new()),
            ..OpenAiSettings::default()
        };
        assert!(OpenAiSpeechClient::new(&settings).api_key.is_none());
    }

    #[test]
    fn models_payload() {
        let body = r#"{"object": "list", "data": [{"id": "MediaTek-Research/BreezyVoice", "object": "model", "created": 0, "owned_by": "local"}]}"#;
        let models: ModelsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(models.data[0].id, "MediaTek-Research/BreezyVoice");
    }

    #[tokio::test]
    async fn speech_sends_bearer_key_and_json() {
        let (url, request) = serve_once("200 OK", b"RIFF").await;

        let wav = client_for(url, Some("sk-local"))
            .speech("hello", 1.25)
            .await
            .unwrap();
        let request = request.await.unwrap();

        assert_eq!(wav, b"RIFF".to_vec());
        assert!(request.request_line().starts_with("POST /audio/speech "));
        assert_eq!(request.header("authorization"), Some("Bearer sk-local"));
        assert_eq!(request.header("content-type"), Some("application/json"));

        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["input"], "hello");
        assert_eq!(body["response_format"], "wav");
        assert_eq!(body["speed"], 1.25);
    }

    #[tokio::test]
    async fn speech_without_key_has_no_authorization() {
        let (url, request) = serve_once("200 OK", b"RIFF").await;

        client_for(url, None).speech("hello", 1.0).await.unwrap();
        let request = request.await.unwrap();

        assert!(request.header("authorization").is_none());
    }

    #[tokio::test]
    async fn speech_server_error_is_status() {
        let (url, request) = serve_once("401 Unauthorized", b"bad key").await;

        let err = client_for(url, Some("sk-wrong"))
            .speech("hello", 1.0)
            .await
            .unwrap_err();
        request.await.unwrap();

        assert!(matches!(
            err,
            ApiError::Status { status, body }
                if status == reqwest::StatusCode::UNAUTHORIZED && body == "bad key"
        ));
    }

    #[tokio::test]
    async fn models_lists_ids() {
        let (url, request) = serve_once(
            "200 OK",
            br#"{"object": "list", "data": [{"id": "tts-1"}, {"id": "tts-1-hd"}]}"#,
        )
        .await;

        let models = client_for(url, Some("sk-local")).models().await.unwrap();
        let request = request.await.unwrap();

        assert!(request.request_line().starts_with("GET /models "));
        assert_eq!(request.header("authorization"), Some("Bearer sk-local"));
        assert_eq!(models, vec!["tts-1", "tts-1-hd"]);
    }
}
