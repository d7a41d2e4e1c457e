use flirtwin_core::config::GeneratorSettings;
use flirtwin_core::types::GenerationRequest;
use flirtwin_providers::gemini::{GeminiConfig, build_generate_content_request};
use flirtwin_providers::parse::parse_generate_content;
use flirtwin_providers::runtime::{Timeouts, execute};
use std::time::Duration;

/// Body bytes kept in an error when the service answers with a failure status.
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Clone)]
pub struct GeminiTextGenerator {
    cfg: GeminiConfig,
    timeouts: Timeouts,
}

impl std::fmt::Debug for GeminiTextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiTextGenerator")
            .field("base_url", &self.cfg.base_url)
            .field("model", &self.cfg.model)
            .field("api_key", &"[REDACTED]")
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl GeminiTextGenerator {
    pub fn new(settings: &GeneratorSettings, api_key: impl Into<String>) -> Self {
        Self {
            cfg: GeminiConfig {
                base_url: settings.base_url.clone(),
                api_key: api_key.into(),
                model: settings.model.clone(),
            },
            timeouts: Timeouts {
                connect: Duration::from_secs(settings.connect_timeout_secs),
                request: Duration::from_secs(settings.request_timeout_secs),
            },
        }
    }

    pub fn model(&self) -> &str {
        &self.cfg.model
    }
}

#[async_trait::async_trait]
impl flirtwin_engine::traits::TextGenerator for GeminiTextGenerator {
    async fn generate_text(&self, request: &GenerationRequest) -> anyhow::Result<String> {
        log::debug!(
            "gemini generateContent: model={} attachments={} temperature={}",
            self.cfg.model,
            request.attachments().len(),
            request.temperature()
        );

        let req = build_generate_content_request(&self.cfg, request)?;
        let resp = execute(&req, self.timeouts).await?;

        if !resp.is_success() {
            let body = String::from_utf8_lossy(&resp.body);
            let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(anyhow::anyhow!(
                "Gemini request failed: status={} body={}",
                resp.status,
                body
            ));
        }

        parse_generate_content(&resp.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flirtwin_core::schema::SchemaKind;
    use flirtwin_engine::traits::TextGenerator;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: String) -> GeneratorSettings {
        GeneratorSettings {
            base_url,
            ..GeneratorSettings::default()
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("hi", vec![], SchemaKind::MessageSet.descriptor(), 0.9).unwrap()
    }

    #[tokio::test]
    async fn returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "{\"messages\":[]}"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let g = GeminiTextGenerator::new(&settings(server.uri()), "secret");
        assert_eq!(g.generate_text(&request()).await.unwrap(), "{\"messages\":[]}");
    }

    #[tokio::test]
    async fn failure_status_is_an_error_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let g = GeminiTextGenerator::new(&settings(server.uri()), "secret");
        let err = g.generate_text(&request()).await.unwrap_err();
        assert!(format!("{err:#}").contains("status=429"));
    }

    #[test]
    fn debug_redacts_key() {
        let g = GeminiTextGenerator::new(&GeneratorSettings::default(), "AIza-secret");
        assert!(!format!("{g:?}").contains("AIza-secret"));
        assert_eq!(g.model(), "gemini-2.5-flash");
    }
}
