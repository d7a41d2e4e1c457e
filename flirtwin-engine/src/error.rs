use crate::client::{GenerationError, GenerationErrorKind};
use flirtwin_core::types::Feature;
use thiserror::Error;

pub const GENERIC_FAILURE_MESSAGE: &str = "An unknown error occurred.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureErrorKind {
    Validation,
    InvalidResponseShape,
    ServiceUnavailable,
    Unknown,
}

/// A failed feature call. `Display` is the one message shown to the user.
///
/// Technical details never end up in here; they are logged where the error
/// is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("{message}")]
    InvalidResponseShape { message: String },
    #[error("{message}")]
    ServiceUnavailable { message: String },
    #[error("{message}")]
    Unknown { message: String },
}

impl FeatureError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        FeatureError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn unknown() -> Self {
        FeatureError::Unknown {
            message: GENERIC_FAILURE_MESSAGE.into(),
        }
    }

    /// Replaces a generation failure with the feature's friendly fallback.
    pub fn from_generation(feature: Feature, err: &GenerationError) -> Self {
        let message = fallback_message(feature).to_string();
        match err.kind {
            GenerationErrorKind::InvalidResponseShape => {
                FeatureError::InvalidResponseShape { message }
            }
            GenerationErrorKind::ServiceUnavailable => FeatureError::ServiceUnavailable { message },
        }
    }

    pub fn kind(&self) -> FeatureErrorKind {
        match self {
            FeatureError::Validation { .. } => FeatureErrorKind::Validation,
            FeatureError::InvalidResponseShape { .. } => FeatureErrorKind::InvalidResponseShape,
            FeatureError::ServiceUnavailable { .. } => FeatureErrorKind::ServiceUnavailable,
            FeatureError::Unknown { .. } => FeatureErrorKind::Unknown,
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            FeatureError::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }

    pub fn user_message(&self) -> &str {
        match self {
            FeatureError::Validation { message, .. }
            | FeatureError::InvalidResponseShape { message }
            | FeatureError::ServiceUnavailable { message }
            | FeatureError::Unknown { message } => message,
        }
    }
}

pub fn fallback_message(feature: Feature) -> &'static str {
    match feature {
        Feature::Messages => "Failed to generate messages. The AI might be feeling shy!",
        Feature::Inspiration => "Failed to generate new inspiration. The AI needs a coffee!",
        Feature::CoachReplies => "Failed to get coach's advice. The AI might be on a date!",
        Feature::ChatReview => {
            "Failed to review the chat. The AI might be busy analyzing its own texts!"
        }
        Feature::ProfileAnalysis => {
            "Failed to analyze the profile. The AI coach is currently swiping right on other tasks."
        }
        Feature::DateIdeas => "Failed to generate ideas. The AI is fresh out of inspiration!",
    }
}
