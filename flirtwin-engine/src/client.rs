use crate::traits::TextGenerator;
use flirtwin_core::shape::{ResponseShape, ShapeError, ShapeExpectations};
use flirtwin_core::text::filter_structured_output;
use flirtwin_core::types::GenerationRequest;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    InvalidResponseShape,
    ServiceUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
}

impl GenerationError {
    fn invalid_shape(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::InvalidResponseShape,
            message: message.into(),
        }
    }

    fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::ServiceUnavailable,
            message: message.into(),
        }
    }
}

impl From<ShapeError> for GenerationError {
    fn from(e: ShapeError) -> Self {
        GenerationError::invalid_shape(e.to_string())
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;

/// The single gateway to the generative service.
///
/// One attempt per call, no caching. If the caller stops caring before the
/// call completes, the result is simply dropped.
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn TextGenerator>,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self { backend }
    }

    /// Sends the request and returns the parsed document.
    ///
    /// Only the schema's top-level required keys are checked here; typed
    /// callers should use [`GenerationClient::generate`].
    pub async fn generate_value(&self, request: &GenerationRequest) -> GenerationResult<Value> {
        log::debug!(
            "generate: attachments={} temperature={}",
            request.attachments().len(),
            request.temperature()
        );

        let t0 = Instant::now();
        let raw = self
            .backend
            .generate_text(request)
            .await
            .map_err(|e| GenerationError::unavailable(format!("{e:#}")))?;
        log::debug!("generate: {} bytes in {:?}", raw.len(), t0.elapsed());

        let cleaned = filter_structured_output(&raw);
        let value: Value = serde_json::from_str(&cleaned)
            .map_err(|e| GenerationError::invalid_shape(format!("response is not JSON: {e}")))?;

        let required = request.schema().required_fields();
        if !required.is_empty() {
            let obj = value
                .as_object()
                .ok_or_else(|| GenerationError::invalid_shape("response is not a JSON object"))?;
            if let Some(missing) = required.iter().find(|k| !obj.contains_key(k.as_str())) {
                return Err(GenerationError::invalid_shape(format!(
                    "missing required field `{missing}`"
                )));
            }
        }
        Ok(value)
    }

    /// Sends the request and decodes it into a validated response shape.
    pub async fn generate<T: ResponseShape>(
        &self,
        request: &GenerationRequest,
        expect: &ShapeExpectations,
    ) -> GenerationResult<T> {
        let value = self.generate_value(request).await?;
        Ok(T::from_json(value, expect)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flirtwin_core::schema::SchemaKind;
    use flirtwin_core::types::{DateIdeaSet, MessageSet};

    struct Fixed(anyhow::Result<String>);

    #[async_trait]
    impl TextGenerator for Fixed {
        async fn generate_text(&self, _request: &GenerationRequest) -> anyhow::Result<String> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    fn client(reply: anyhow::Result<String>) -> GenerationClient {
        GenerationClient::new(Arc::new(Fixed(reply)))
    }

    fn request(kind: SchemaKind) -> GenerationRequest {
        GenerationRequest::new("prompt", vec![], kind.descriptor(), 0.5).unwrap()
    }

    #[tokio::test]
    async fn trims_and_parses_valid_document() {
        let c = client(Ok("\n {\"messages\":[\"a\",\"b\",\"c\",\"d\",\"e\"]} \n".into()));
        let set: MessageSet = c
            .generate(&request(SchemaKind::MessageSet), &ShapeExpectations::default())
            .await
            .unwrap();
        assert_eq!(set.messages, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn transport_failure_is_service_unavailable() {
        let c = client(Err(anyhow::anyhow!("connection refused")));
        let err = c
            .generate::<MessageSet>(&request(SchemaKind::MessageSet), &ShapeExpectations::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::ServiceUnavailable);
        assert!(err.message.contains("connection refused"));
    }

    #[tokio::test]
    async fn prose_is_invalid_shape() {
        let c = client(Ok("Sure! Here are five messages.".into()));
        let err = c
            .generate_value(&request(SchemaKind::MessageSet))
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::InvalidResponseShape);
    }

    #[tokio::test]
    async fn missing_top_level_key_is_invalid_shape() {
        let c = client(Ok(r#"{"messages_list":[]}"#.into()));
        let err = c
            .generate_value(&request(SchemaKind::MessageSet))
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::InvalidResponseShape);
        assert!(err.message.contains("`messages`"));
    }

    #[tokio::test]
    async fn cardinality_violation_is_not_truncated() {
        let doc = r#"{"ideas":[
            {"title":"a","description":"d","emoji":"🎨"},
            {"title":"b","description":"d","emoji":"🌲"},
            {"title":"c","description":"d","emoji":"🍜"},
            {"title":"d","description":"d","emoji":"🎳"}]}"#;
        let c = client(Ok(doc.into()));
        let err = c
            .generate::<DateIdeaSet>(&request(SchemaKind::DateIdeaSet), &ShapeExpectations::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::InvalidResponseShape);
        assert!(err.message.contains("expected 3"));
    }
}
