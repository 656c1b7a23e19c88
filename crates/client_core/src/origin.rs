//! API base resolution: query override, persisted preference, or page origin.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};
use url::Url;

use crate::error::PreferenceError;

/// Query string key carrying an API base override.
pub const API_OVERRIDE_PARAM: &str = "api";
/// Preference key the last override is persisted under.
pub const API_BASE_KEY: &str = "API_BASE";

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: HashMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON key/value file. A missing or unreadable file starts out empty.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferenceStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), "ignoring unreadable preferences file: {err}");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        let encoded = serde_json::to_string_pretty(&self.values)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PreferenceError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        fs::write(&self.path, encoded).map_err(|source| PreferenceError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseSource {
    QueryOverride,
    StoredPreference,
    PageOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase {
    value: String,
    source: BaseSource,
    page_url: Url,
}

impl ApiBase {
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> BaseSource {
        self.source
    }

    /// Resolves `path` under the base. Without an override the path is
    /// relative to the page itself; relative overrides such as `/api`
    /// resolve against the page URL.
    pub fn join(&self, path: &str) -> Result<Url, url::ParseError> {
        if self.source == BaseSource::PageOrigin {
            return self.page_url.join(path);
        }
        let directory = if self.value.ends_with('/') {
            self.value.clone()
        } else {
            format!("{}/", self.value)
        };
        self.page_url.join(&directory)?.join(path)
    }
}

pub fn resolve_api_base(page_url: &Url, store: &mut dyn PreferenceStore) -> ApiBase {
    let from_query = page_url
        .query_pairs()
        .find(|(key, _)| key == API_OVERRIDE_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty());

    let (override_value, source) = match from_query {
        Some(value) => (Some(value), BaseSource::QueryOverride),
        None => (
            store.get(API_BASE_KEY).filter(|value| !value.is_empty()),
            BaseSource::StoredPreference,
        ),
    };

    let Some(raw) = override_value else {
        let origin = page_url.origin().ascii_serialization();
        debug!(base = %origin, "using page origin as api base");
        return ApiBase {
            value: origin,
            source: BaseSource::PageOrigin,
            page_url: page_url.clone(),
        };
    };

    let value = raw.strip_suffix('/').unwrap_or(&raw).to_string();
    if let Err(err) = store.set(API_BASE_KEY, &value) {
        warn!(base = %value, "failed to persist api base override: {err}");
    }
    debug!(base = %value, ?source, "using api base override");

    ApiBase {
        value,
        source,
        page_url: page_url.clone(),
    }
}

#[cfg(test)]
#[path = "tests/origin_tests.rs"]
mod tests;
