use std::sync::Arc;

use flirtwin_core::config::AppConfig;
use flirtwin_engine::engine::FlirtEngine;
use flirtwin_engine::traits::TextGenerator;

use crate::gemini::GeminiTextGenerator;
use crate::secrets::{MissingCredential, load_api_key};

/// Build a runnable engine from config and an already-resolved key.
pub fn build_engine_from_config(cfg: &AppConfig, api_key: &str) -> FlirtEngine {
    let backend: Arc<dyn TextGenerator> =
        Arc::new(GeminiTextGenerator::new(&cfg.generator, api_key));
    FlirtEngine::new(backend)
}

/// Like [`build_engine_from_config`], resolving the key from the environment
/// or keyring first. Without a key there is no engine.
pub fn build_engine(cfg: &AppConfig) -> Result<FlirtEngine, MissingCredential> {
    let key = load_api_key()?;
    Ok(build_engine_from_config(cfg, key.expose()))
}
