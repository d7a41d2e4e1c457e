use crate::schema::SchemaDescriptor;
use crate::text::strip_decorative_suffix;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseOptionError {
    pub kind: &'static str,
    pub value: String,
}

fn find_option<T: Copy>(
    kind: &'static str,
    raw: &str,
    all: &[T],
    name: impl Fn(T) -> &'static str,
) -> Result<T, ParseOptionError> {
    let wanted = strip_decorative_suffix(raw);
    all.iter()
        .copied()
        .find(|v| name(*v).eq_ignore_ascii_case(wanted))
        .ok_or_else(|| ParseOptionError {
            kind,
            value: raw.to_string(),
        })
}

/// Tone requested for generated flirty messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Vibe {
    #[default]
    Playful,
    Romantic,
    Bold,
    Witty,
    Mysterious,
    Sweet,
    Poetic,
    Sexual,
}

impl Vibe {
    pub const ALL: [Vibe; 8] = [
        Vibe::Playful,
        Vibe::Romantic,
        Vibe::Bold,
        Vibe::Witty,
        Vibe::Mysterious,
        Vibe::Sweet,
        Vibe::Poetic,
        Vibe::Sexual,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Vibe::Playful => "playful",
            Vibe::Romantic => "romantic",
            Vibe::Bold => "bold",
            Vibe::Witty => "witty",
            Vibe::Mysterious => "mysterious",
            Vibe::Sweet => "sweet",
            Vibe::Poetic => "poetic",
            Vibe::Sexual => "sexual",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Vibe::Playful => "😜",
            Vibe::Romantic => "🥰",
            Vibe::Bold => "🔥",
            Vibe::Witty => "😏",
            Vibe::Mysterious => "🤫",
            Vibe::Sweet => "😊",
            Vibe::Poetic => "✍️",
            Vibe::Sexual => "😈",
        }
    }
}

impl FromStr for Vibe {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find_option("vibe", s, &Vibe::ALL, Vibe::as_str)
    }
}

impl std::fmt::Display for Vibe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DateVibe {
    #[default]
    Casual,
    Romantic,
    Adventurous,
    Unique,
    AtHome,
}

impl DateVibe {
    pub const ALL: [DateVibe; 5] = [
        DateVibe::Casual,
        DateVibe::Romantic,
        DateVibe::Adventurous,
        DateVibe::Unique,
        DateVibe::AtHome,
    ];

    /// Name sent to the model, without decoration.
    pub fn as_str(self) -> &'static str {
        match self {
            DateVibe::Casual => "Casual",
            DateVibe::Romantic => "Romantic",
            DateVibe::Adventurous => "Adventurous",
            DateVibe::Unique => "Unique",
            DateVibe::AtHome => "At-home",
        }
    }

    /// Label shown in pickers.
    pub fn label(self) -> &'static str {
        match self {
            DateVibe::Casual => "Casual ☕",
            DateVibe::Romantic => "Romantic ❤️",
            DateVibe::Adventurous => "Adventurous 🧗",
            DateVibe::Unique => "Unique ✨",
            DateVibe::AtHome => "At-home 🏠",
        }
    }
}

impl FromStr for DateVibe {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find_option("date vibe", s, &DateVibe::ALL, DateVibe::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Budget {
    Free,
    #[default]
    Cheap,
    Moderate,
    Splurge,
}

impl Budget {
    pub const ALL: [Budget; 4] = [Budget::Free, Budget::Cheap, Budget::Moderate, Budget::Splurge];

    pub fn as_str(self) -> &'static str {
        match self {
            Budget::Free => "Free",
            Budget::Cheap => "Cheap",
            Budget::Moderate => "Moderate",
            Budget::Splurge => "Splurge",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Budget::Free => "Free 💰",
            Budget::Cheap => "Cheap 💵",
            Budget::Moderate => "Moderate 💸",
            Budget::Splurge => "Splurge 💎",
        }
    }
}

impl FromStr for Budget {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find_option("budget", s, &Budget::ALL, Budget::as_str)
    }
}

/// The six user-facing features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Messages,
    Inspiration,
    CoachReplies,
    ChatReview,
    ProfileAnalysis,
    DateIdeas,
}

impl Feature {
    /// Premium features sit behind the feature gate.
    ///
    /// This is a UX gate only; callers must check it themselves.
    pub fn requires_unlock(self) -> bool {
        matches!(
            self,
            Feature::CoachReplies | Feature::ChatReview | Feature::ProfileAnalysis
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::Messages => "messages",
            Feature::Inspiration => "inspiration",
            Feature::CoachReplies => "coach_replies",
            Feature::ChatReview => "chat_review",
            Feature::ProfileAnalysis => "profile_analysis",
            Feature::DateIdeas => "date_ideas",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMime {
    Png,
    Jpeg,
    Webp,
}

impl ImageMime {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageMime::Png),
            "image/jpeg" | "image/jpg" => Some(ImageMime::Jpeg),
            "image/webp" => Some(ImageMime::Webp),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageMime::Png),
            "jpg" | "jpeg" => Some(ImageMime::Jpeg),
            "webp" => Some(ImageMime::Webp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageMime::Png => "image/png",
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Webp => "image/webp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("prompt text is empty")]
    EmptyPrompt,
    #[error("attachment has an empty payload")]
    EmptyAttachment,
    #[error("unsupported image type: {0}")]
    UnsupportedMime(String),
    #[error("temperature {0} is outside [0, 1]")]
    TemperatureOutOfRange(f32),
}

/// Image bytes plus a recognized mime type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    mime: ImageMime,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("mime", &self.mime.as_str())
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl ImageAttachment {
    pub fn new(mime: ImageMime, bytes: Vec<u8>) -> Result<Self, RequestError> {
        if bytes.is_empty() {
            return Err(RequestError::EmptyAttachment);
        }
        Ok(Self { mime, bytes })
    }

    pub fn from_mime_type(mime_type: &str, bytes: Vec<u8>) -> Result<Self, RequestError> {
        let mime = ImageMime::from_mime(mime_type)
            .ok_or_else(|| RequestError::UnsupportedMime(mime_type.to_string()))?;
        Self::new(mime, bytes)
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// One call to the generative service. Built fresh per call and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt_text: String,
    attachments: Vec<ImageAttachment>,
    schema: SchemaDescriptor,
    temperature: f32,
}

impl GenerationRequest {
    pub fn new(
        prompt_text: impl Into<String>,
        attachments: Vec<ImageAttachment>,
        schema: SchemaDescriptor,
        temperature: f32,
    ) -> Result<Self, RequestError> {
        let prompt_text = prompt_text.into();
        if prompt_text.trim().is_empty() {
            return Err(RequestError::EmptyPrompt);
        }
        if !(0.0..=1.0).contains(&temperature) {
            return Err(RequestError::TemperatureOutOfRange(temperature));
        }
        Ok(Self {
            prompt_text,
            attachments,
            schema,
            temperature,
        })
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn attachments(&self) -> &[ImageAttachment] {
        &self.attachments
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSet {
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachReply {
    pub reply: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachReplySet {
    pub replies: Vec<CoachReply>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCritique {
    pub original_message: String,
    pub critique: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReview {
    pub overall_feedback: String,
    pub critiques: Vec<ChatCritique>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoCritique {
    pub photo_description: String,
    pub critique: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BioCritique {
    pub critique: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAnalysis {
    pub overall_feedback: String,
    pub photo_analysis: Vec<PhotoCritique>,
    pub bio_analysis: BioCritique,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateIdea {
    pub title: String,
    pub description: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateIdeaSet {
    pub ideas: Vec<DateIdea>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vibe_parses_case_insensitively_and_ignores_decoration() {
        assert_eq!("Playful".parse::<Vibe>().unwrap(), Vibe::Playful);
        assert_eq!("mysterious 🤫".parse::<Vibe>().unwrap(), Vibe::Mysterious);
        assert!("grumpy".parse::<Vibe>().is_err());
    }

    #[test]
    fn date_options_parse_from_labels() {
        for v in DateVibe::ALL {
            assert_eq!(v.label().parse::<DateVibe>().unwrap(), v);
        }
        for b in Budget::ALL {
            assert_eq!(b.label().parse::<Budget>().unwrap(), b);
        }
        assert_eq!("At-home".parse::<DateVibe>().unwrap(), DateVibe::AtHome);
    }

    #[test]
    fn premium_features_are_coach_and_analyzer() {
        let gated: Vec<_> = [
            Feature::Messages,
            Feature::Inspiration,
            Feature::CoachReplies,
            Feature::ChatReview,
            Feature::ProfileAnalysis,
            Feature::DateIdeas,
        ]
        .into_iter()
        .filter(|f| f.requires_unlock())
        .collect();
        assert_eq!(
            gated,
            vec![
                Feature::CoachReplies,
                Feature::ChatReview,
                Feature::ProfileAnalysis
            ]
        );
    }

    #[test]
    fn attachment_rejects_empty_payload_and_unknown_mime() {
        assert_eq!(
            ImageAttachment::new(ImageMime::Png, vec![]),
            Err(RequestError::EmptyAttachment)
        );
        assert!(matches!(
            ImageAttachment::from_mime_type("image/gif", vec![1]),
            Err(RequestError::UnsupportedMime(_))
        ));
        let a = ImageAttachment::from_mime_type("image/JPG", vec![1, 2]).unwrap();
        assert_eq!(a.mime(), ImageMime::Jpeg);
    }

    #[test]
    fn attachment_debug_hides_bytes() {
        let a = ImageAttachment::new(ImageMime::Webp, vec![7; 32]).unwrap();
        let s = format!("{a:?}");
        assert!(s.contains("bytes_len: 32"));
        assert!(!s.contains("7, 7"));
    }

    #[test]
    fn generation_request_checks_preconditions() {
        let schema = SchemaDescriptor::string("x");
        assert_eq!(
            GenerationRequest::new("  ", vec![], schema.clone(), 0.5),
            Err(RequestError::EmptyPrompt)
        );
        assert_eq!(
            GenerationRequest::new("hi", vec![], schema.clone(), 1.5),
            Err(RequestError::TemperatureOutOfRange(1.5))
        );
        let ok = GenerationRequest::new("hi", vec![], schema, 1.0).unwrap();
        assert_eq!(ok.temperature(), 1.0);
    }

    #[test]
    fn response_types_use_camel_case_keys() {
        let review: ChatReview = serde_json::from_str(
            r#"{"overallFeedback":"ok","critiques":[{"originalMessage":"hey","critique":"c","suggestion":"s"}]}"#,
        )
        .unwrap();
        assert_eq!(review.critiques[0].original_message, "hey");
    }
}
