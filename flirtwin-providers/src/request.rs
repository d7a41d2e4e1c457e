use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

fn is_sensitive_header(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == "authorization" || lower.contains("api-key")
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted_headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                let v = if is_sensitive_header(k) { "[REDACTED]" } else { v.as_str() };
                (k.as_str(), v)
            })
            .collect();

        // Bodies carry prompts and base64 images; only their size is useful in logs.
        let body_summary = match &self.body {
            Body::Empty => "Empty".to_string(),
            Body::Json(s) => format!("Json(len={})", s.len()),
        };

        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &redacted_headers)
            .field("body", &body_summary)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Body {
    Empty,
    Json(String),
}

impl HttpRequest {
    pub fn post_json(url: impl Into<String>, payload: &serde_json::Value) -> Self {
        Self {
            method: "POST".into(),
            url: url.into(),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: Body::Json(payload.to_string()),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json_body(&self) -> Option<serde_json::Value> {
        match &self.body {
            Body::Json(s) => serde_json::from_str(s).ok(),
            Body::Empty => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_json_sets_content_type_and_body() {
        let req = HttpRequest::post_json("https://example.com/x", &json!({"a": 1}))
            .with_header("X-Trace", "t1");
        assert_eq!(req.method, "POST");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("x-trace"), Some("t1"));
        assert_eq!(req.json_body().unwrap()["a"], 1);
    }

    #[test]
    fn debug_redacts_keys_and_hides_body() {
        let req = HttpRequest::post_json("https://example.com", &json!({"prompt": "secret crush"}))
            .with_header("x-goog-api-key", "AIza-test-123")
            .with_header("Authorization", "Bearer tok-456");

        let s = format!("{req:?}");
        assert!(!s.contains("AIza-test-123"));
        assert!(!s.contains("tok-456"));
        assert!(!s.contains("secret crush"));
        assert!(s.contains("[REDACTED]"));
        assert!(s.contains("Json(len="));
    }
}
