use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::source::error::SourceError;
use crate::source::store::{EphemerisStore, Snapshot};
use crate::web::config::SourceConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Url(String),
    File(PathBuf),
}

impl std::fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentSource::Url(url) => write!(f, "{}", url),
            DocumentSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

pub struct DocumentLoader {
    source: DocumentSource,
    cache_file: Option<PathBuf>,
    client: reqwest::Client,
    // one fetch+publish at a time, so an older download never replaces a newer one
    refresh_lock: Mutex<()>,
}

/// Raw document text and where it actually came from.
pub struct Fetched {
    pub document: String,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    File(PathBuf),
    Remote(String),
    /// Cache file read back after the download from the URL failed.
    Cache { path: PathBuf, url: String },
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::File(path) => write!(f, "{}", path.display()),
            Origin::Remote(url) => write!(f, "{}", url),
            Origin::Cache { path, url } => {
                write!(f, "{} (cached copy of {})", path.display(), url)
            }
        }
    }
}

impl DocumentLoader {
    pub fn new(
        source: DocumentSource,
        cache_file: Option<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            source,
            cache_file,
            client,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        Self::new(
            config.document_source(),
            config.cache_file.clone(),
            config.timeout,
        )
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// Raw document text. Falls back to the cache file when the remote fetch fails.
    pub async fn fetch(&self) -> Result<Fetched, SourceError> {
        let url = match &self.source {
            DocumentSource::File(path) => {
                return Ok(Fetched {
                    document: fs::read_to_string(path)?,
                    origin: Origin::File(path.clone()),
                })
            }
            DocumentSource::Url(url) => url,
        };

        match self.download(url).await {
            Ok(document) => Ok(Fetched {
                document,
                origin: Origin::Remote(url.clone()),
            }),
            Err(e) => match &self.cache_file {
                Some(cache) if cache.exists() => {
                    log::warn!(
                        "Fetching {} failed ({}), using cached copy {}",
                        url,
                        e,
                        cache.display()
                    );
                    Ok(Fetched {
                        document: fs::read_to_string(cache)?,
                        origin: Origin::Cache {
                            path: cache.clone(),
                            url: url.clone(),
                        },
                    })
                }
                _ => Err(e),
            },
        }
    }

    async fn download(&self, url: &str) -> Result<String, SourceError> {
        log::info!("Fetching ephemeris from {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Fetches and parses the document. Only a download that parses is written
    /// to the cache file.
    pub async fn load(&self) -> Result<Snapshot, SourceError> {
        let fetched = self.fetch().await?;
        let snapshot = Snapshot::from_document(&fetched.document, fetched.origin.to_string())?;

        if let (Origin::Remote(_), Some(cache)) = (&fetched.origin, &self.cache_file) {
            if let Err(e) = write_cache(cache, &fetched.document) {
                log::warn!("Failed to write document cache {}: {}", cache.display(), e);
            }
        }

        log::info!(
            "Loaded {} state vectors from {}",
            snapshot.series.len(),
            snapshot.source
        );
        Ok(snapshot)
    }

    /// Loads a fresh snapshot and publishes it. On failure the store is untouched.
    pub async fn refresh(&self, store: &EphemerisStore) -> Result<Arc<Snapshot>, SourceError> {
        let _guard = self.refresh_lock.lock().await;
        let snapshot = self.load().await?;
        Ok(store.publish(snapshot))
    }
}

/// Replaces the cache file in one rename, so readers never see a partial document.
fn write_cache(cache: &Path, document: &str) -> std::io::Result<()> {
    let dir = match cache.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(document.as_bytes())?;
    tmp.persist(cache).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::SAMPLE_DOCUMENT;
    use std::io::Write;

    const TIMEOUT: Duration = Duration::from_secs(2);
    // nothing listens on the discard port
    const DEAD_URL: &str = "http://127.0.0.1:9/ISS.OEM_J2K_EPH.xml";

    /// Serves `body` on a local port and returns its URL.
    async fn serve_body(body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route("/oem.xml", axum::routing::get(move || async move { body }));
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}/oem.xml", addr)
    }

    fn sample_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_DOCUMENT.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn loads_local_file() {
        let file = sample_file();
        let loader =
            DocumentLoader::new(DocumentSource::File(file.path().into()), None, TIMEOUT).unwrap();
        let snapshot = loader.load().await.unwrap();
        assert_eq!(snapshot.series.len(), 3);
        assert_eq!(snapshot.source, file.path().display().to_string());
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let loader = DocumentLoader::new(
            DocumentSource::File("/nonexistent/iss_oem.xml".into()),
            None,
            TIMEOUT,
        )
        .unwrap();
        assert!(matches!(loader.load().await, Err(SourceError::Io(_))));
    }

    #[tokio::test]
    async fn failed_download_falls_back_to_cache() {
        let cache = sample_file();
        let loader = DocumentLoader::new(
            DocumentSource::Url(DEAD_URL.into()),
            Some(cache.path().into()),
            TIMEOUT,
        )
        .unwrap();
        let snapshot = loader.load().await.unwrap();
        assert_eq!(snapshot.series.len(), 3);
        assert_eq!(
            snapshot.source,
            format!("{} (cached copy of {})", cache.path().display(), DEAD_URL)
        );
    }

    #[tokio::test]
    async fn failed_download_without_cache_is_http_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DocumentLoader::new(
            DocumentSource::Url(DEAD_URL.into()),
            Some(dir.path().join("never_written.xml")),
            TIMEOUT,
        )
        .unwrap();
        assert!(matches!(loader.fetch().await, Err(SourceError::Http(_))));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let good = sample_file();
        let store = EphemerisStore::new();
        let loader =
            DocumentLoader::new(DocumentSource::File(good.path().into()), None, TIMEOUT).unwrap();
        loader.refresh(&store).await.unwrap();

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        bad.write_all(b"<oem><body><segment><data></data></segment></body></oem>")
            .unwrap();
        let loader =
            DocumentLoader::new(DocumentSource::File(bad.path().into()), None, TIMEOUT).unwrap();
        assert!(matches!(
            loader.refresh(&store).await,
            Err(SourceError::Parse(_))
        ));

        let current = store.snapshot().unwrap();
        assert_eq!(current.series.len(), 3);
        assert_eq!(current.source, good.path().display().to_string());
    }

    #[tokio::test]
    async fn successful_download_is_cached() {
        let url = serve_body(SAMPLE_DOCUMENT).await;
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("iss_oem.xml");
        let loader =
            DocumentLoader::new(DocumentSource::Url(url.clone()), Some(cache.clone()), TIMEOUT)
                .unwrap();

        let snapshot = loader.load().await.unwrap();
        assert_eq!(snapshot.source, url);
        assert_eq!(fs::read_to_string(&cache).unwrap(), SAMPLE_DOCUMENT);
    }

    #[tokio::test]
    async fn malformed_download_keeps_good_cache() {
        let url = serve_body("<html>maintenance</html>").await;
        let cache = sample_file();
        let loader = DocumentLoader::new(
            DocumentSource::Url(url),
            Some(cache.path().into()),
            TIMEOUT,
        )
        .unwrap();

        assert!(matches!(loader.load().await, Err(SourceError::Parse(_))));
        assert_eq!(fs::read_to_string(cache.path()).unwrap(), SAMPLE_DOCUMENT);
    }

    #[tokio::test]
    async fn refreshes_run_one_at_a_time() {
        let file = sample_file();
        let store = EphemerisStore::new();
        let loader =
            DocumentLoader::new(DocumentSource::File(file.path().into()), None, TIMEOUT).unwrap();

        let guard = loader.refresh_lock.lock().await;
        let blocked =
            tokio::time::timeout(Duration::from_millis(100), loader.refresh(&store)).await;
        assert!(blocked.is_err());
        assert!(store.snapshot().is_none());
        drop(guard);

        let (a, b) = tokio::join!(loader.refresh(&store), loader.refresh(&store));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(store.snapshot().unwrap().series.len(), 3);
    }
}
