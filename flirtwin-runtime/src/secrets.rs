use anyhow::Context;
use thiserror::Error;

/// Keyring service name. Constant so upgrades don't orphan the stored key.
const SERVICE: &str = "flirtwin";
const KEYRING_USER: &str = "gemini_api_key";

/// Environment variables checked for the credential, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Error)]
#[error(
    "missing credential: set API_KEY or GEMINI_API_KEY, or store a key in the OS keyring (service `flirtwin`)"
)]
pub struct MissingCredential;

/// The generative service key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Resolves the credential from the process environment, then the keyring.
pub fn load_api_key() -> Result<ApiKey, MissingCredential> {
    resolve_api_key(|name| std::env::var(name).ok(), get_keyring_key)
}

/// Lookup order: each of [`API_KEY_ENV_VARS`], then the keyring. Blank
/// values are skipped. A keyring failure is logged and treated as absent.
pub fn resolve_api_key(
    env: impl Fn(&str) -> Option<String>,
    keyring: impl FnOnce() -> anyhow::Result<Option<String>>,
) -> Result<ApiKey, MissingCredential> {
    for name in API_KEY_ENV_VARS {
        if let Some(v) = env(name).filter(|v| !v.trim().is_empty()) {
            log::debug!("credential loaded from {name}");
            return Ok(ApiKey(v.trim().to_string()));
        }
    }

    match keyring() {
        Ok(Some(v)) if !v.trim().is_empty() => {
            log::debug!("credential loaded from keyring");
            Ok(ApiKey(v.trim().to_string()))
        }
        Ok(_) => Err(MissingCredential),
        Err(e) => {
            log::warn!("keyring lookup failed: {e:#}");
            Err(MissingCredential)
        }
    }
}

pub fn get_keyring_key() -> anyhow::Result<Option<String>> {
    let entry = keyring::Entry::new(SERVICE, KEYRING_USER).context("create keyring entry")?;

    match entry.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(anyhow::Error::new(e)).context("get secret"),
    }
}
