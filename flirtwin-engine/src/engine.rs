use crate::client::GenerationClient;
use crate::error::FeatureError;
use crate::traits::TextGenerator;
use flirtwin_core::inspiration::append_texts;
use flirtwin_core::prompt::{
    build_chat_review_prompt, build_coach_prompt, build_date_idea_prompt,
    build_inspiration_prompt, build_message_prompt, build_profile_prompt,
};
use flirtwin_core::schema::SchemaKind;
use flirtwin_core::shape::{ResponseShape, ShapeExpectations};
use flirtwin_core::text::is_blank;
use flirtwin_core::types::{
    Budget, ChatReview, CoachReplySet, DateIdea, DateIdeaSet, DateVibe, Feature,
    GenerationRequest, ImageAttachment, MessageSet, ProfileAnalysis, Vibe,
};
use std::sync::Arc;

pub const MESSAGES_TEMPERATURE: f32 = 0.9;
pub const INSPIRATION_TEMPERATURE: f32 = 0.95;
pub const COACH_TEMPERATURE: f32 = 0.8;
pub const CHAT_REVIEW_TEMPERATURE: f32 = 0.7;
pub const PROFILE_TEMPERATURE: f32 = 0.7;
pub const DATE_IDEAS_TEMPERATURE: f32 = 0.9;

pub const MAX_PROFILE_PHOTOS: usize = 6;

fn require(field: &'static str, value: &str, message: &str) -> Result<(), FeatureError> {
    if is_blank(value) {
        return Err(FeatureError::validation(field, message));
    }
    Ok(())
}

/// The six feature operations: validate, build the prompt, call the model,
/// and turn the result into a typed value or one user-facing error.
#[derive(Clone)]
pub struct FlirtEngine {
    client: GenerationClient,
}

impl FlirtEngine {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self {
            client: GenerationClient::new(backend),
        }
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    async fn run<T: ResponseShape>(
        &self,
        feature: Feature,
        prompt: String,
        attachments: Vec<ImageAttachment>,
        schema: SchemaKind,
        temperature: f32,
        expect: ShapeExpectations,
    ) -> Result<T, FeatureError> {
        let request =
            match GenerationRequest::new(prompt, attachments, schema.descriptor(), temperature) {
                Ok(r) => r,
                Err(e) => {
                    log::error!("{}: invalid generation request: {e}", feature.name());
                    return Err(FeatureError::unknown());
                }
            };

        self.client
            .generate::<T>(&request, &expect)
            .await
            .map_err(|e| {
                log::error!("{}: generation failed: {e}", feature.name());
                FeatureError::from_generation(feature, &e)
            })
    }

    /// Five short messages for `recipient` in the given vibe.
    pub async fn generate_messages(
        &self,
        recipient: &str,
        vibe: &str,
        context: &str,
    ) -> Result<Vec<String>, FeatureError> {
        require("recipient", recipient, "Please enter who the message is for.")?;
        require("vibe", vibe, "Please enter a vibe.")?;
        let vibe: Vibe = vibe.parse().map_err(|_| {
            FeatureError::validation("vibe", "Please enter one of the available vibes.")
        })?;

        let set: MessageSet = self
            .run(
                Feature::Messages,
                build_message_prompt(recipient, vibe, context),
                vec![],
                SchemaKind::MessageSet,
                MESSAGES_TEMPERATURE,
                ShapeExpectations::default(),
            )
            .await?;
        Ok(set.messages)
    }

    /// Asks for five new texts in `category` and returns `existing_texts`
    /// followed by them.
    pub async fn generate_inspiration(
        &self,
        category: &str,
        existing_texts: &[String],
    ) -> Result<Vec<String>, FeatureError> {
        require("category", category, "Please enter a category.")?;
        if existing_texts.iter().all(|t| is_blank(t)) {
            return Err(FeatureError::validation(
                "existing_texts",
                "Please enter the texts already shown in this category.",
            ));
        }

        let set: MessageSet = self
            .run(
                Feature::Inspiration,
                build_inspiration_prompt(category, existing_texts),
                vec![],
                SchemaKind::InspirationMessageSet,
                INSPIRATION_TEMPERATURE,
                ShapeExpectations::default(),
            )
            .await?;
        Ok(append_texts(existing_texts, set.messages))
    }

    pub async fn generate_coach_replies(
        &self,
        last_message: &str,
        history: &str,
    ) -> Result<CoachReplySet, FeatureError> {
        require(
            "last_message",
            last_message,
            "Please enter the message you received.",
        )?;

        self.run(
            Feature::CoachReplies,
            build_coach_prompt(last_message, history),
            vec![],
            SchemaKind::CoachReplySet,
            COACH_TEMPERATURE,
            ShapeExpectations::default(),
        )
        .await
    }

    /// Reviews a chat screenshot. `user_identifier` is passed to the model as typed.
    pub async fn review_chat_screenshot(
        &self,
        screenshot: Option<&ImageAttachment>,
        user_identifier: &str,
    ) -> Result<ChatReview, FeatureError> {
        let screenshot = screenshot.ok_or_else(|| {
            FeatureError::validation(
                "screenshot",
                "Please upload a screenshot of your conversation.",
            )
        })?;
        require(
            "user_identifier",
            user_identifier,
            "Please describe your messages (e.g., 'I'm the blue bubbles').",
        )?;

        self.run(
            Feature::ChatReview,
            build_chat_review_prompt(user_identifier),
            vec![screenshot.clone()],
            SchemaKind::ChatReview,
            CHAT_REVIEW_TEMPERATURE,
            ShapeExpectations::default(),
        )
        .await
    }

    /// Critiques 1 to 6 profile photos plus the bio. One photo critique per
    /// image, in submission order.
    pub async fn analyze_profile(
        &self,
        photos: &[ImageAttachment],
        bio: &str,
        goals: &str,
    ) -> Result<ProfileAnalysis, FeatureError> {
        if photos.is_empty() {
            return Err(FeatureError::validation(
                "photos",
                "Please upload at least one screenshot of your profile.",
            ));
        }
        if photos.len() > MAX_PROFILE_PHOTOS {
            return Err(FeatureError::validation(
                "photos",
                "You can upload a maximum of 6 photos.",
            ));
        }
        require("goals", goals, "Please enter your dating goals.")?;

        self.run(
            Feature::ProfileAnalysis,
            build_profile_prompt(photos.len(), bio, goals),
            photos.to_vec(),
            SchemaKind::ProfileAnalysis,
            PROFILE_TEMPERATURE,
            ShapeExpectations::photos(photos.len()),
        )
        .await
    }

    /// Three date ideas. `vibe` and `budget` may be picker labels; the
    /// decoration is dropped before anything is sent.
    pub async fn generate_date_ideas(
        &self,
        vibe: &str,
        budget: &str,
        interests: &str,
    ) -> Result<Vec<DateIdea>, FeatureError> {
        require("vibe", vibe, "Please enter a vibe for the date.")?;
        require("budget", budget, "Please enter a budget.")?;
        let vibe: DateVibe = vibe.parse().map_err(|_| {
            FeatureError::validation("vibe", "Please enter one of the available date vibes.")
        })?;
        let budget: Budget = budget.parse().map_err(|_| {
            FeatureError::validation("budget", "Please enter one of the available budgets.")
        })?;

        let set: DateIdeaSet = self
            .run(
                Feature::DateIdeas,
                build_date_idea_prompt(vibe, budget, interests),
                vec![],
                SchemaKind::DateIdeaSet,
                DATE_IDEAS_TEMPERATURE,
                ShapeExpectations::default(),
            )
            .await?;
        Ok(set.ideas)
    }
}
