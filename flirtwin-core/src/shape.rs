use crate::text::is_blank;
use crate::types::{ChatReview, CoachReplySet, DateIdeaSet, MessageSet, ProfileAnalysis};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

pub const MESSAGE_COUNT: usize = 5;
pub const COACH_REPLY_COUNT: usize = 3;
pub const DATE_IDEA_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("response does not match this shape: {0}")]
    Decode(String),
    #[error("`{field}` has {actual} entries, expected {expected}")]
    Cardinality {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("`{field}` is blank")]
    BlankField { field: String },
    #[error("`{field}` must be a single emoji")]
    NotSingleEmoji { field: String },
}

/// Cardinality that depends on the request, not the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShapeExpectations {
    pub photo_count: Option<usize>,
}

impl ShapeExpectations {
    pub fn photos(count: usize) -> Self {
        Self {
            photo_count: Some(count),
        }
    }
}

/// A typed response with its own required-field and cardinality rules.
pub trait ResponseShape: DeserializeOwned + Sized {
    fn check(&self, expect: &ShapeExpectations) -> Result<(), ShapeError>;

    /// Decodes a parsed JSON document and validates it.
    fn from_json(value: Value, expect: &ShapeExpectations) -> Result<Self, ShapeError> {
        let typed: Self =
            serde_json::from_value(value).map_err(|e| ShapeError::Decode(e.to_string()))?;
        typed.check(expect)?;
        Ok(typed)
    }
}

fn exact(field: &'static str, expected: usize, actual: usize) -> Result<(), ShapeError> {
    if expected != actual {
        return Err(ShapeError::Cardinality {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

fn filled(field: impl Into<String>, value: &str) -> Result<(), ShapeError> {
    if is_blank(value) {
        return Err(ShapeError::BlankField {
            field: field.into(),
        });
    }
    Ok(())
}

impl ResponseShape for MessageSet {
    fn check(&self, _expect: &ShapeExpectations) -> Result<(), ShapeError> {
        exact("messages", MESSAGE_COUNT, self.messages.len())?;
        for (i, m) in self.messages.iter().enumerate() {
            filled(format!("messages[{i}]"), m)?;
        }
        Ok(())
    }
}

impl ResponseShape for CoachReplySet {
    fn check(&self, _expect: &ShapeExpectations) -> Result<(), ShapeError> {
        exact("replies", COACH_REPLY_COUNT, self.replies.len())?;
        for (i, r) in self.replies.iter().enumerate() {
            filled(format!("replies[{i}].reply"), &r.reply)?;
            filled(format!("replies[{i}].explanation"), &r.explanation)?;
        }
        Ok(())
    }
}

impl ResponseShape for ChatReview {
    fn check(&self, _expect: &ShapeExpectations) -> Result<(), ShapeError> {
        filled("overallFeedback", &self.overall_feedback)?;
        for (i, c) in self.critiques.iter().enumerate() {
            filled(format!("critiques[{i}].originalMessage"), &c.original_message)?;
            filled(format!("critiques[{i}].critique"), &c.critique)?;
            filled(format!("critiques[{i}].suggestion"), &c.suggestion)?;
        }
        Ok(())
    }
}

impl ResponseShape for ProfileAnalysis {
    fn check(&self, expect: &ShapeExpectations) -> Result<(), ShapeError> {
        filled("overallFeedback", &self.overall_feedback)?;
        if let Some(n) = expect.photo_count {
            exact("photoAnalysis", n, self.photo_analysis.len())?;
        }
        for (i, p) in self.photo_analysis.iter().enumerate() {
            filled(format!("photoAnalysis[{i}].photoDescription"), &p.photo_description)?;
            filled(format!("photoAnalysis[{i}].critique"), &p.critique)?;
            filled(format!("photoAnalysis[{i}].suggestion"), &p.suggestion)?;
        }
        filled("bioAnalysis.critique", &self.bio_analysis.critique)?;
        filled("bioAnalysis.suggestion", &self.bio_analysis.suggestion)
    }
}

/// One grapheme cluster that is not a letter, digit or other plain ASCII.
/// Keycap and ZWJ sequences count as one.
fn is_single_emoji(value: &str) -> bool {
    let value = value.trim();
    let mut graphemes = value.graphemes(true);
    let (Some(_), None) = (graphemes.next(), graphemes.next()) else {
        return false;
    };
    !value.is_ascii() && !value.chars().any(char::is_alphabetic)
}

impl ResponseShape for DateIdeaSet {
    fn check(&self, _expect: &ShapeExpectations) -> Result<(), ShapeError> {
        exact("ideas", DATE_IDEA_COUNT, self.ideas.len())?;
        for (i, idea) in self.ideas.iter().enumerate() {
            filled(format!("ideas[{i}].title"), &idea.title)?;
            filled(format!("ideas[{i}].description"), &idea.description)?;
            filled(format!("ideas[{i}].emoji"), &idea.emoji)?;
            if !is_single_emoji(&idea.emoji) {
                return Err(ShapeError::NotSingleEmoji {
                    field: format!("ideas[{i}].emoji"),
                });
            }
        }
        Ok(())
    }
}
