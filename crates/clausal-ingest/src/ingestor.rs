//! Document Ingestor
//!
//! Fetches a document from a URL or local path, detects its type, extracts
//! and cleans its text. No retries happen here; retry policy belongs to the
//! caller.

use crate::clean::{clean_text, strip_email_headers};
use crate::error::{IngestError, Result};
use crate::extract::extract_text;
use crate::source::{detect, DocumentSource};
use clausal_domain::{ContentType, Document};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Default maximum document size (10 MiB)
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Default fetch timeout
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Ingestion limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Payloads larger than this fail with a parse error
    pub max_document_bytes: usize,
    /// Budget for one fetch
    pub fetch_timeout_secs: u64,
    /// Accept filesystem paths as well as URLs
    pub allow_local_paths: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            allow_local_paths: true,
        }
    }
}

/// Raw bytes plus whatever the transport said about them
struct Fetched {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

/// Fetches and parses documents
///
/// # Examples
///
/// ```no_run
/// use clausal_ingest::{Ingestor, IngestConfig};
///
/// # async fn run() -> Result<(), clausal_ingest::IngestError> {
/// let ingestor = Ingestor::new(IngestConfig::default())?;
/// let doc = ingestor.ingest("https://example.com/policy.pdf").await?;
/// println!("{} bytes of text", doc.text.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Ingestor {
    client: reqwest::Client,
    config: IngestConfig,
}

impl Ingestor {
    /// Create an ingestor with its own HTTP client
    pub fn new(config: IngestConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(concat!("clausal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IngestError::fetch("<client>", e))?;
        Ok(Self { client, config })
    }

    /// Create an ingestor that reuses an existing HTTP client
    pub fn with_client(client: reqwest::Client, config: IngestConfig) -> Self {
        Self { client, config }
    }

    /// Active limits
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Fetch and parse one document
    pub async fn ingest(&self, locator: &str) -> Result<Document> {
        let source = DocumentSource::parse(locator);
        info!(source = %locator, "Ingesting document");

        let fetched = match &source {
            DocumentSource::Url(url) => self.fetch_url(locator, url).await?,
            DocumentSource::Path(_) if !self.config.allow_local_paths => {
                warn!(source = %locator, "Rejected local path");
                return Err(IngestError::fetch(locator, "only http(s) URLs are accepted"));
            }
            DocumentSource::Path(path) => self.read_file(locator, path).await?,
        };
        debug!(source = %locator, bytes = fetched.bytes.len(), "Fetched document");

        let content_type = detect(&source, fetched.content_type.as_deref(), &fetched.bytes)
            .ok_or_else(|| IngestError::parse(locator, "unsupported content type"))?;

        let text = parse_bytes(locator, fetched.bytes, content_type).await?;
        if text.is_empty() {
            warn!(source = %locator, "Document contains no text");
        }

        let document = Document::new(locator, text, content_type, unix_now());
        info!(
            source = %locator,
            document_id = %document.id,
            content_type = %content_type,
            chars = document.text.len(),
            "Document ingested"
        );
        Ok(document)
    }

    async fn fetch_url(&self, locator: &str, url: &str) -> Result<Fetched> {
        let mut response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                IngestError::Timeout {
                    location: locator.to_string(),
                    millis: self.config.fetch_timeout_secs * 1000,
                }
            } else {
                IngestError::fetch(locator, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::fetch(locator, format!("HTTP {}", status)));
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.config.max_document_bytes {
                return Err(self.too_large(locator, len as usize));
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(piece) = response
            .chunk()
            .await
            .map_err(|e| IngestError::fetch(locator, e))?
        {
            bytes.extend_from_slice(&piece);
            if bytes.len() > self.config.max_document_bytes {
                return Err(self.too_large(locator, bytes.len()));
            }
        }

        Ok(Fetched { bytes, content_type })
    }

    async fn read_file(&self, locator: &str, path: &Path) -> Result<Fetched> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| IngestError::fetch(locator, e))?;
        if !metadata.is_file() {
            return Err(IngestError::fetch(locator, "not a regular file"));
        }
        if metadata.len() as usize > self.config.max_document_bytes {
            return Err(self.too_large(locator, metadata.len() as usize));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| IngestError::fetch(locator, e))?;
        Ok(Fetched {
            bytes,
            content_type: None,
        })
    }

    fn too_large(&self, locator: &str, size: usize) -> IngestError {
        IngestError::parse(
            locator,
            format!(
                "document is {} bytes, limit is {} bytes",
                size, self.config.max_document_bytes
            ),
        )
    }
}

/// Extract and clean text off the async runtime
async fn parse_bytes(locator: &str, bytes: Vec<u8>, content_type: ContentType) -> Result<String> {
    let joined = tokio::task::spawn_blocking(move || {
        extract_text(&bytes, content_type).map(|raw| match content_type {
            ContentType::Email => clean_text(&strip_email_headers(&raw)),
            _ => clean_text(&raw),
        })
    })
    .await
    .map_err(|e| IngestError::parse(locator, format!("extraction task failed: {}", e)))?;

    joined.map_err(|e| IngestError::parse(locator, e))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
