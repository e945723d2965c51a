use std::{fs, path::Path};

use anyhow::Context;
use presentation::TransitionConfig;
use serde::Deserialize;

use crate::flow::MissingStatePolicy;

pub const DEFAULT_CONFIG_FILE: &str = "wayfinder.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mailbox_capacity: usize,
    pub missing_state: MissingStatePolicy,
    pub default_transition: TransitionConfig,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mailbox_capacity: 64,
            missing_state: MissingStatePolicy::Abort,
            default_transition: TransitionConfig::default(),
            log_filter: "info".into(),
        }
    }
}

/// Reads `path` (or `wayfinder.toml` if it exists) and then applies
/// `WAYFINDER__*` environment overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config '{}'", path.display()))?;
            parse_settings(&raw)
                .with_context(|| format!("failed to parse config '{}'", path.display()))?
        }
        None => match fs::read_to_string(DEFAULT_CONFIG_FILE) {
            Ok(raw) => parse_settings(&raw)
                .with_context(|| format!("failed to parse config '{DEFAULT_CONFIG_FILE}'"))?,
            Err(_) => Settings::default(),
        },
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str(raw)?)
}

/// Unparsable values are ignored and the previous setting kept.
pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("WAYFINDER__MAILBOX_CAPACITY") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.mailbox_capacity = parsed;
        }
    }

    if let Some(v) = lookup("WAYFINDER__MISSING_STATE") {
        match v.to_ascii_lowercase().as_str() {
            "abort" => settings.missing_state = MissingStatePolicy::Abort,
            "complete" => settings.missing_state = MissingStatePolicy::Complete,
            _ => {}
        }
    }

    if let Some(v) = lookup("WAYFINDER__TRANSITION_STYLE") {
        settings.default_transition.style = v;
    }

    if let Some(v) = lookup("WAYFINDER__LOG_FILTER") {
        settings.log_filter = v;
    }
}
