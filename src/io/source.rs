//! Audio acquisition
//!
//! An [`AudioSource`] resolves an opaque source identifier (a file name, a
//! preview URL, ...) to encoded audio bytes. The estimator never interprets
//! the identifier itself.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::AnalysisError;

/// Encoded audio fetched from a source
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceAudio {
    /// Encoded payload
    pub bytes: Vec<u8>,
    /// Container hint for the decoder ("wav", "mp3", ...), if known
    pub extension_hint: Option<String>,
}

/// Fetches encoded audio by source identifier
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Fetch the payload for `source_id`
    ///
    /// # Errors
    ///
    /// `Fetch` when the audio cannot be retrieved. Sources do not retry.
    async fn fetch(&self, source_id: &str) -> Result<SourceAudio, AnalysisError>;
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Reads audio files from the local filesystem
///
/// With a root directory, identifiers are relative paths below it and may
/// not escape it.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    root: Option<PathBuf>,
}

impl FileSource {
    /// Source resolving identifiers as paths as given
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Source resolving identifiers relative to `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, source_id: &str) -> Result<PathBuf, AnalysisError> {
        let relative = Path::new(source_id);
        match &self.root {
            None => Ok(relative.to_path_buf()),
            Some(root) => {
                let escapes = relative
                    .components()
                    .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
                if escapes {
                    return Err(AnalysisError::Fetch(format!(
                        "Source '{}' is outside {}",
                        source_id,
                        root.display()
                    )));
                }
                Ok(root.join(relative))
            }
        }
    }
}

#[async_trait]
impl AudioSource for FileSource {
    async fn fetch(&self, source_id: &str) -> Result<SourceAudio, AnalysisError> {
        let path = self.resolve(source_id)?;
        log::debug!("Reading audio file: {}", path.display());

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| AnalysisError::Fetch(format!("Failed to read {}: {}", path.display(), e)))?;

        Ok(SourceAudio {
            bytes,
            extension_hint: extension_of(&path),
        })
    }
}

/// Fetches preview clips over HTTP(S)
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: Option<String>,
}

#[cfg(feature = "http")]
impl HttpSource {
    /// Source treating identifiers as absolute URLs
    pub fn new() -> Self {
        Self::default()
    }

    /// Source appending identifiers to `base_url` unless they are absolute URLs
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: Some(base_url.into()),
        }
    }

    /// Use a preconfigured client (timeouts, proxies, ...)
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn url_for(&self, source_id: &str) -> String {
        if source_id.starts_with("http://") || source_id.starts_with("https://") {
            return source_id.to_string();
        }
        match &self.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                source_id.trim_start_matches('/')
            ),
            None => source_id.to_string(),
        }
    }
}

/// Container hint from a Content-Type header value
#[cfg(feature = "http")]
fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next()?.trim();
    match mime {
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/wav" | "audio/wave" | "audio/x-wav" => Some("wav"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        "audio/ogg" | "audio/vorbis" => Some("ogg"),
        "audio/mp4" | "audio/aac" | "audio/x-m4a" => Some("m4a"),
        _ => None,
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl AudioSource for HttpSource {
    async fn fetch(&self, source_id: &str) -> Result<SourceAudio, AnalysisError> {
        let url = self.url_for(source_id);
        log::debug!("Fetching audio: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AnalysisError::Fetch(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Fetch(format!("HTTP {} for {}", status, url)));
        }

        let extension_hint = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(extension_for_content_type)
            .map(str::to_string)
            .or_else(|| {
                let path = url.split(|c| c == '?' || c == '#').next().unwrap_or(url.as_str());
                extension_of(Path::new(path))
            });

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AnalysisError::Fetch(format!("Reading body of {} failed: {}", url, e)))?;

        Ok(SourceAudio {
            bytes: bytes.to_vec(),
            extension_hint,
        })
    }
}
