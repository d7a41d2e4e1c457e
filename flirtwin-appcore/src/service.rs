use std::future::Future;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use flirtwin_core::config::{AppConfig, MessagePreferences};
use flirtwin_core::inspiration::{Category, default_categories};
use flirtwin_core::types::{
    Budget, ChatReview, CoachReplySet, DateIdea, DateVibe, Feature, ImageAttachment,
    ProfileAnalysis,
};
use flirtwin_engine::engine::FlirtEngine;
use flirtwin_engine::error::FeatureError;
use flirtwin_engine::gate::{FeatureGate, GateState, UnlockOutcome};
use flirtwin_runtime::config_store::ConfigStore;
use flirtwin_runtime::runtime_engine::build_engine;
use serde::Serialize;
use thiserror::Error;

use crate::slot::{ResultSlot, SlotPolicy, ViewState};

pub const DEFAULT_USER_IDENTIFIER: &str = "the blue bubbles";
pub const DEFAULT_PROFILE_GOALS: &str = "a serious relationship";

pub fn default_date_vibe_label() -> &'static str {
    DateVibe::default().label()
}

pub fn default_budget_label() -> &'static str {
    Budget::default().label()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// A premium feature was invoked while the gate is locked. The backend
    /// was not called.
    #[error("This feature is locked. Watch a short ad to unlock it.")]
    Locked { feature: Feature },
    #[error("Unknown inspiration category: {0}")]
    UnknownCategory(String),
    #[error(transparent)]
    Feature(#[from] FeatureError),
}

impl ActionError {
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

struct Slots {
    messages: ResultSlot<Vec<String>>,
    coach: ResultSlot<CoachReplySet>,
    review: ResultSlot<ChatReview>,
    profile: ResultSlot<ProfileAnalysis>,
    dates: ResultSlot<Vec<DateIdea>>,
    inspiration: ResultSlot<Category>,
}

impl Slots {
    fn new(policy: SlotPolicy) -> Self {
        Self {
            messages: ResultSlot::new(policy),
            coach: ResultSlot::new(policy),
            review: ResultSlot::new(policy),
            profile: ResultSlot::new(policy),
            dates: ResultSlot::new(policy),
            inspiration: ResultSlot::new(policy),
        }
    }
}

/// The "load more" state of the inspiration screen. `result` is the category
/// that was last extended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspirationView {
    pub loading_category: Option<String>,
    #[serde(flatten)]
    pub view: ViewState<Category>,
}

/// Clears the loading marker when its load finishes or is abandoned.
struct LoadingCategory<'a> {
    marker: &'a Mutex<Option<String>>,
    title: String,
}

impl<'a> LoadingCategory<'a> {
    fn set(marker: &'a Mutex<Option<String>>, title: &str) -> Self {
        *marker.lock().unwrap_or_else(PoisonError::into_inner) = Some(title.to_string());
        Self {
            marker,
            title: title.to_string(),
        }
    }
}

impl Drop for LoadingCategory<'_> {
    fn drop(&mut self) {
        let mut marker = self.marker.lock().unwrap_or_else(PoisonError::into_inner);
        if marker.as_deref() == Some(self.title.as_str()) {
            *marker = None;
        }
    }
}

/// Everything a front end needs: feature calls with their view state, the
/// premium gate and the remembered message preferences.
pub struct AppService {
    config_store: ConfigStore,
    config: Mutex<AppConfig>,
    engine: FlirtEngine,
    gate: FeatureGate,
    slots: Slots,
    categories: Mutex<Vec<Category>>,
    loading_category: Mutex<Option<String>>,
}

impl AppService {
    /// Loads the config once and wires it to `engine`.
    pub fn new(config_store: ConfigStore, engine: FlirtEngine) -> anyhow::Result<Self> {
        let config = config_store.load_or_default()?;
        Ok(Self {
            config_store,
            config: Mutex::new(config),
            engine,
            gate: FeatureGate::new(),
            slots: Slots::new(SlotPolicy::default()),
            categories: Mutex::new(default_categories()),
            loading_category: Mutex::new(None),
        })
    }

    /// Production entry point. Fails when no credential is available.
    pub fn open(config_path: PathBuf) -> anyhow::Result<Self> {
        let config_store = ConfigStore::at_path(config_path);
        let config = config_store.load_or_default()?;
        let engine = build_engine(&config)?;
        Self::new(config_store, engine)
    }

    pub fn with_gate(mut self, gate: FeatureGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_slot_policy(mut self, policy: SlotPolicy) -> Self {
        self.slots = Slots::new(policy);
        self
    }

    fn config(&self) -> std::sync::MutexGuard<'_, AppConfig> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config_snapshot(&self) -> AppConfig {
        self.config().clone()
    }

    pub fn preferences(&self) -> MessagePreferences {
        self.config().preferences.clone()
    }

    pub fn save_preferences(&self, prefs: MessagePreferences) -> anyhow::Result<()> {
        let mut cfg = self.config();
        let mut next = cfg.clone();
        next.preferences = prefs;
        self.config_store.save(&next)?;
        *cfg = next;
        Ok(())
    }

    pub fn update_preferences(
        &self,
        f: impl FnOnce(&mut MessagePreferences),
    ) -> anyhow::Result<MessagePreferences> {
        let mut prefs = self.preferences();
        f(&mut prefs);
        self.save_preferences(prefs.clone())?;
        Ok(prefs)
    }

    pub fn gate(&self) -> &FeatureGate {
        &self.gate
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    /// Starts the simulated ad. Premium features unlock when it finishes.
    pub fn watch_ad(&self) -> UnlockOutcome {
        self.gate.begin_unlock()
    }

    fn ensure_unlocked(&self, feature: Feature) -> Result<(), ActionError> {
        if feature.requires_unlock() && !self.gate.is_unlocked() {
            log::debug!("{} blocked by feature gate", feature.name());
            return Err(ActionError::Locked { feature });
        }
        Ok(())
    }

    async fn run_in_slot<T, Fut>(slot: &ResultSlot<T>, call: Fut) -> Result<T, ActionError>
    where
        T: Clone,
        Fut: Future<Output = Result<T, FeatureError>>,
    {
        let token = slot.begin();
        let out = call.await;
        let shown = match &out {
            Ok(v) => Ok(v.clone()),
            Err(e) => Err(e.user_message().to_string()),
        };
        token.complete(shown);
        out.map_err(ActionError::from)
    }

    pub async fn generate_messages(
        &self,
        recipient: &str,
        vibe: &str,
        context: &str,
    ) -> Result<Vec<String>, ActionError> {
        Self::run_in_slot(
            &self.slots.messages,
            self.engine.generate_messages(recipient, vibe, context),
        )
        .await
    }

    /// Generates with the saved preferences.
    pub async fn generate_messages_from_preferences(&self) -> Result<Vec<String>, ActionError> {
        let prefs = self.preferences();
        self.generate_messages(&prefs.recipient, prefs.vibe.as_str(), &prefs.context)
            .await
    }

    pub fn messages_view(&self) -> ViewState<Vec<String>> {
        self.slots.messages.snapshot()
    }

    pub fn inspiration_categories(&self) -> Vec<Category> {
        self.categories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// "Load more" for one category. New texts are appended to that category
    /// only, and the updated category is returned.
    pub async fn load_more_inspiration(&self, title: &str) -> Result<Category, ActionError> {
        let seen = self
            .inspiration_categories()
            .into_iter()
            .find(|c| c.title == title)
            .ok_or_else(|| ActionError::UnknownCategory(title.to_string()))?;

        let _marker = LoadingCategory::set(&self.loading_category, title);
        let call = async {
            let all = self
                .engine
                .generate_inspiration(&seen.title, &seen.texts)
                .await?;
            let fresh: Vec<String> = all.into_iter().skip(seen.texts.len()).collect();
            Ok::<_, FeatureError>(self.append_to_category(&seen, fresh))
        };
        Self::run_in_slot(&self.slots.inspiration, call).await
    }

    fn append_to_category(&self, seen: &Category, fresh: Vec<String>) -> Category {
        let mut categories = self
            .categories
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match categories.iter_mut().find(|c| c.title == seen.title) {
            Some(category) => {
                category.texts.extend(fresh);
                category.clone()
            }
            None => {
                let mut category = seen.clone();
                category.texts.extend(fresh);
                categories.push(category.clone());
                category
            }
        }
    }

    pub fn inspiration_view(&self) -> InspirationView {
        InspirationView {
            loading_category: self
                .loading_category
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            view: self.slots.inspiration.snapshot(),
        }
    }

    pub async fn coach_replies(
        &self,
        last_message: &str,
        history: &str,
    ) -> Result<CoachReplySet, ActionError> {
        self.ensure_unlocked(Feature::CoachReplies)?;
        Self::run_in_slot(
            &self.slots.coach,
            self.engine.generate_coach_replies(last_message, history),
        )
        .await
    }

    pub fn coach_view(&self) -> ViewState<CoachReplySet> {
        self.slots.coach.snapshot()
    }

    pub async fn review_chat(
        &self,
        screenshot: Option<&ImageAttachment>,
        user_identifier: &str,
    ) -> Result<ChatReview, ActionError> {
        self.ensure_unlocked(Feature::ChatReview)?;
        Self::run_in_slot(
            &self.slots.review,
            self.engine.review_chat_screenshot(screenshot, user_identifier),
        )
        .await
    }

    pub fn review_view(&self) -> ViewState<ChatReview> {
        self.slots.review.snapshot()
    }

    pub async fn analyze_profile(
        &self,
        photos: &[ImageAttachment],
        bio: &str,
        goals: &str,
    ) -> Result<ProfileAnalysis, ActionError> {
        self.ensure_unlocked(Feature::ProfileAnalysis)?;
        Self::run_in_slot(
            &self.slots.profile,
            self.engine.analyze_profile(photos, bio, goals),
        )
        .await
    }

    pub fn profile_view(&self) -> ViewState<ProfileAnalysis> {
        self.slots.profile.snapshot()
    }

    pub async fn date_ideas(
        &self,
        vibe: &str,
        budget: &str,
        interests: &str,
    ) -> Result<Vec<DateIdea>, ActionError> {
        Self::run_in_slot(
            &self.slots.dates,
            self.engine.generate_date_ideas(vibe, budget, interests),
        )
        .await
    }

    pub fn dates_view(&self) -> ViewState<Vec<DateIdea>> {
        self.slots.dates.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flirtwin_core::types::{GenerationRequest, Vibe};
    use flirtwin_engine::traits::TextGenerator;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Canned {
        reply: String,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl TextGenerator for Canned {
        async fn generate_text(&self, _request: &GenerationRequest) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn service(dir: &tempfile::TempDir, reply: &str) -> (AppService, Arc<Canned>) {
        let backend = Arc::new(Canned {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
        });
        let store = ConfigStore::at_path(dir.path().join("flirtwin.json"));
        let svc = AppService::new(store, FlirtEngine::new(backend.clone())).unwrap();
        (svc, backend)
    }

    #[test]
    fn preferences_persist_through_explicit_save() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, _) = service(&dir, "");
        assert_eq!(svc.preferences(), MessagePreferences::default());

        svc.update_preferences(|p| {
            p.recipient = "Riley".into();
            p.vibe = Vibe::Bold;
        })
        .unwrap();

        let (reopened, _) = service(&dir, "");
        let prefs = reopened.preferences();
        assert_eq!(prefs.recipient, "Riley");
        assert_eq!(prefs.vibe, Vibe::Bold);
        assert_eq!(prefs.context, "");
    }

    #[tokio::test]
    async fn premium_features_are_locked_until_ad_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let replies = r#"{"replies":[
            {"reply":"a","explanation":"x"},
            {"reply":"b","explanation":"y"},
            {"reply":"c","explanation":"z"}]}"#;
        let (svc, backend) = service(&dir, replies);
        let svc = svc.with_gate(FeatureGate::with_delay(std::time::Duration::from_millis(5)));

        let err = svc.coach_replies("hey", "").await.unwrap_err();
        assert_eq!(
            err,
            ActionError::Locked {
                feature: Feature::CoachReplies
            }
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert_eq!(svc.coach_view(), ViewState::default());

        assert_eq!(svc.watch_ad(), UnlockOutcome::Started);
        svc.gate().wait_unlocked().await;

        let set = svc.coach_replies("hey", "").await.unwrap();
        assert_eq!(set.replies.len(), 3);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(svc.coach_view().result, Some(set));
    }

    #[tokio::test]
    async fn free_features_ignore_the_gate() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, _) = service(&dir, r#"{"messages":["1","2","3","4","5"]}"#);
        assert_eq!(svc.gate_state(), GateState::Locked);
        let out = svc.generate_messages_from_preferences().await.unwrap();
        assert_eq!(out.len(), 5);
        assert_eq!(svc.messages_view().result, Some(out));
    }

    #[tokio::test]
    async fn failure_shows_friendly_message_in_view() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, _) = service(&dir, "not json at all");
        let err = svc.date_ideas("Casual ☕", "Free 💰", "").await.unwrap_err();
        assert!(matches!(err, ActionError::Feature(_)));

        let view = svc.dates_view();
        assert!(!view.loading);
        assert!(view.result.is_none());
        assert_eq!(
            view.error.as_deref(),
            Some("Failed to generate ideas. The AI is fresh out of inspiration!")
        );
    }

    #[tokio::test]
    async fn load_more_appends_to_one_category_only() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, _) = service(&dir, r#"{"messages":["n1","n2","n3","n4","n5"]}"#);
        let before = svc.inspiration_categories();

        let updated = svc.load_more_inspiration("Playful & Witty").await.unwrap();
        assert_eq!(updated.texts.len(), 9);
        assert_eq!(&updated.texts[5..], ["n2", "n3", "n4", "n5"]);

        let after = svc.inspiration_categories();
        for (b, a) in before.iter().zip(&after) {
            if a.title == "Playful & Witty" {
                assert_eq!(a.texts[..4], b.texts[..]);
            } else {
                assert_eq!(a, b);
            }
        }

        assert!(matches!(
            svc.load_more_inspiration("Nope").await.unwrap_err(),
            ActionError::UnknownCategory(_)
        ));

        let view = svc.inspiration_view();
        assert_eq!(view.loading_category, None);
        assert!(!view.view.loading);
        assert_eq!(view.view.result, Some(updated));
    }

    #[tokio::test]
    async fn failed_load_more_shows_error_and_keeps_category() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, _) = service(&dir, "the model wandered off");
        let before = svc.inspiration_categories();

        let err = svc.load_more_inspiration("Late Night Thoughts").await.unwrap_err();
        assert!(matches!(err, ActionError::Feature(_)));
        assert_eq!(svc.inspiration_categories(), before);

        let view = svc.inspiration_view();
        assert_eq!(view.loading_category, None);
        assert!(!view.view.loading);
        assert!(view.view.result.is_none());
        assert_eq!(
            view.view.error.as_deref(),
            Some("Failed to generate new inspiration. The AI needs a coffee!")
        );
    }

    /// Never answers for the "witty" vibe.
    struct StallsOnWitty;

    #[async_trait::async_trait]
    impl TextGenerator for StallsOnWitty {
        async fn generate_text(&self, request: &GenerationRequest) -> anyhow::Result<String> {
            if request.prompt_text().contains("The desired vibe is: witty\n") {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            }
            Ok(r#"{"messages":["1","2","3","4","5"]}"#.into())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_request_does_not_leave_view_loading() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at_path(dir.path().join("flirtwin.json"));
        let svc = AppService::new(store, FlirtEngine::new(Arc::new(StallsOnWitty))).unwrap();

        let gave_up = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            svc.generate_messages("Alex", "witty", ""),
        )
        .await;
        assert!(gave_up.is_err());
        assert!(!svc.messages_view().loading);

        let out = svc.generate_messages("Alex", "playful", "").await.unwrap();
        let view = svc.messages_view();
        assert!(!view.loading);
        assert_eq!(view.result, Some(out));
    }
}
