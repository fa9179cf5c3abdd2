//! Settings persistence and provider wiring.

use anyhow::{Context, Result};
use composer::Dispatcher;
use providers::GeminiClient;
use shared::settings::AppSettings;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Environment variables consulted, in order, when the settings carry no key.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Get the config file path
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut p| {
        p.push("augustus");
        p.push("settings.json");
        p
    })
}

/// Load settings from disk or return defaults. The flag says whether a
/// settings file was actually read.
pub fn load_settings_or_default() -> (AppSettings, bool) {
    match config_path() {
        Some(path) => load_settings_from(&path),
        None => (AppSettings::default(), false),
    }
}

pub fn load_settings_from(path: &Path) -> (AppSettings, bool) {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return (AppSettings::default(), false);
    };
    match serde_json::from_str::<AppSettings>(&contents) {
        Ok(settings) => (settings, true),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            (AppSettings::default(), false)
        }
    }
}

/// Save settings to disk
pub fn save_settings(settings: &AppSettings) -> Result<()> {
    let path = config_path().context("no config directory on this platform")?;
    save_settings_to(&path, settings)
}

pub fn save_settings_to(path: &Path, settings: &AppSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "settings saved");
    Ok(())
}

/// API key from the settings file, falling back to the environment.
pub fn resolve_api_key(settings: &AppSettings) -> Option<String> {
    resolve_api_key_with(settings, |name| std::env::var(name).ok())
}

fn resolve_api_key_with(
    settings: &AppSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    if let Some(key) = settings.model.gemini_auth.api_key() {
        return Some(key.to_string());
    }
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Build a dispatcher backed by Gemini for the given settings.
pub fn build_dispatcher(settings: &AppSettings) -> Result<Dispatcher> {
    let client = GeminiClient::new(
        resolve_api_key(settings),
        &settings.model.gemini_model,
        settings.model.gemini_base_url.as_deref(),
    )
    .context("failed to build Gemini client")?;
    if !client.has_credential() {
        warn!("no Gemini API key configured; generations will fail until one is set");
    }
    Ok(Dispatcher::new(Arc::new(client)))
}
