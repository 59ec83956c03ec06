use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "cart.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub user_id: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://unstopablerundatabse.onrender.com".into(),
            user_id: 1,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(self.base_url.trim())
            .with_context(|| format!("invalid base url '{}'", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("base url '{}' must use http or https", self.base_url);
        }
        Ok(())
    }
}

/// Defaults, then the config file, then environment variables.
///
/// An explicitly requested file must exist; the default `cart.toml` is
/// optional.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match explicit_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if required => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub(crate) fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let table: toml::Table = toml::from_str(raw)?;

    if let Some(value) = table.get("base_url") {
        match value.as_str() {
            Some(v) => settings.base_url = v.to_string(),
            None => warn!("ignoring non-string base_url in config file"),
        }
    }
    if let Some(value) = table.get("user_id") {
        let parsed = match value {
            toml::Value::Integer(v) => Some(*v),
            toml::Value::String(v) => v.trim().parse::<i64>().ok(),
            _ => None,
        };
        match parsed {
            Some(v) => settings.user_id = v,
            None => warn!(?value, "ignoring invalid user_id in config file"),
        }
    }

    Ok(())
}

pub(crate) fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("CART_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        settings.base_url = v;
    }

    for key in ["CART_USER_ID", "APP__USER_ID"] {
        if let Some(v) = lookup(key) {
            match v.trim().parse::<i64>() {
                Ok(parsed) => settings.user_id = parsed,
                Err(_) => warn!(key, value = %v, "ignoring non-numeric user id"),
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
