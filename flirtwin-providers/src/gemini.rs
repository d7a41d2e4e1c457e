use crate::request::HttpRequest;
use anyhow::Context;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flirtwin_core::types::GenerationRequest;
use serde::Serialize;
use url::Url;

#[derive(Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
    temperature: f32,
}

pub fn generate_content_url(cfg: &GeminiConfig) -> anyhow::Result<Url> {
    let base = format!("{}/", cfg.base_url.trim_end_matches('/'));
    let base = Url::parse(&base).with_context(|| format!("invalid base url: {}", cfg.base_url))?;
    base.join(&format!("models/{}:generateContent", cfg.model))
        .with_context(|| format!("invalid model name: {}", cfg.model))
}

/// Builds a schema-constrained `generateContent` call.
///
/// Images go first, in submission order, followed by the prompt text.
pub fn build_generate_content_request(
    cfg: &GeminiConfig,
    req: &GenerationRequest,
) -> anyhow::Result<HttpRequest> {
    let url = generate_content_url(cfg)?;

    let mut parts: Vec<Part> = req
        .attachments()
        .iter()
        .map(|a| Part::InlineData {
            inline_data: InlineData {
                mime_type: a.mime().as_str(),
                data: STANDARD.encode(a.bytes()),
            },
        })
        .collect();
    parts.push(Part::Text {
        text: req.prompt_text().to_string(),
    });

    let body = GenerateContentBody {
        contents: vec![Content {
            role: "user",
            parts,
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: req.schema().to_json(),
            temperature: req.temperature(),
        },
    };
    let payload = serde_json::to_value(&body).context("encode generateContent body")?;

    Ok(HttpRequest::post_json(url.as_str(), &payload).with_header("x-goog-api-key", &cfg.api_key))
}
