//! Where the movie document comes from.

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::MovieCatalog;
use tracing::debug;
use url::Url;

use crate::{error::MovieSourceError, origin::ApiBase};

/// Relative path of the movie document under the API base.
pub const DEFAULT_DATA_PATH: &str = "movies.json";

#[async_trait]
pub trait MovieSource: Send + Sync {
    async fn fetch(&self) -> Result<MovieCatalog, MovieSourceError>;

    /// Human readable location, used in logs.
    fn describe(&self) -> String;
}

pub fn parse_catalog(body: &str) -> Result<MovieCatalog, MovieSourceError> {
    Ok(serde_json::from_str(body)?)
}

pub struct HttpMovieSource {
    http: Client,
    url: Url,
}

impl HttpMovieSource {
    pub fn new(url: Url) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    pub fn from_base(base: &ApiBase, path: &str) -> Result<Self, MovieSourceError> {
        Ok(Self::new(base.join(path)?))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl MovieSource for HttpMovieSource {
    async fn fetch(&self) -> Result<MovieCatalog, MovieSourceError> {
        let transport = |source| MovieSourceError::Transport {
            url: self.url.to_string(),
            source,
        };

        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(MovieSourceError::Status {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        debug!(url = %self.url, bytes = body.len(), "fetched movie document");
        parse_catalog(&body)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// Reads the movie document from a local file.
pub struct FileMovieSource {
    path: PathBuf,
}

impl FileMovieSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MovieSource for FileMovieSource {
    async fn fetch(&self) -> Result<MovieCatalog, MovieSourceError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| MovieSourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        parse_catalog(&body)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
