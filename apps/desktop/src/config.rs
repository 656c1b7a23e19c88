use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use client_core::DEFAULT_DATA_PATH;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "movies.toml";
const PREFERENCES_FILE: &str = "preferences.json";
const APP_DIR: &str = "movie-list";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// URL the list is "hosted" on; its query may carry an `api` override.
    pub page_url: String,
    pub data_path: String,
    /// Read the movie document from disk instead of over HTTP.
    pub data_file: Option<PathBuf>,
    pub preferences_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_url: "http://localhost:8080/".into(),
            data_path: DEFAULT_DATA_PATH.into(),
            data_file: None,
            preferences_path: None,
        }
    }
}

impl Settings {
    pub fn preferences_path(&self) -> PathBuf {
        self.preferences_path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .unwrap_or_else(|| PathBuf::from("."))
                .join(PREFERENCES_FILE)
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    page_url: Option<String>,
    data_path: Option<String>,
    data_file: Option<PathBuf>,
    preferences_path: Option<PathBuf>,
}

/// Defaults, then the TOML file, then environment variables.
///
/// A missing file is fine when it was not asked for explicitly; an explicit
/// path that cannot be read, or any file that does not parse, is an error.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if required => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.page_url {
        settings.page_url = v;
    }
    if let Some(v) = file.data_path {
        settings.data_path = v;
    }
    if let Some(v) = file.data_file {
        settings.data_file = Some(v);
    }
    if let Some(v) = file.preferences_path {
        settings.preferences_path = Some(v);
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    for key in ["MOVIES_PAGE_URL", "APP__PAGE_URL"] {
        if let Some(v) = var(key) {
            settings.page_url = v;
        }
    }
    for key in ["MOVIES_DATA_PATH", "APP__DATA_PATH"] {
        if let Some(v) = var(key) {
            settings.data_path = v;
        }
    }
    if let Some(v) = var("MOVIES_DATA_FILE") {
        settings.data_file = Some(PathBuf::from(v));
    }
    if let Some(v) = var("MOVIES_PREFERENCES") {
        settings.preferences_path = Some(PathBuf::from(v));
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
