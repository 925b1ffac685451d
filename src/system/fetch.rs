// src/system/fetch.rs

//! Source archive download with a local cache
//!
//! Remote archives are cached under the download cache by file name. Local
//! paths and `file://` URLs are used in place. In offline mode only cached
//! archives are served.

use crate::error::{Error, Result};
use crate::hash::{hash_file, parse_checksum};
use crate::recipe::Downloader;
use reqwest::blocking::Client;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use url::Url;

/// Default timeout for HTTP requests (5 minutes, source archives can be large)
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Downloader backed by `reqwest` and a cache directory
pub struct HttpDownloader {
    client: Client,
    cache_dir: PathBuf,
    offline: bool,
}

impl HttpDownloader {
    pub fn new(cache_dir: impl Into<PathBuf>, offline: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::DownloadError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
            offline,
        })
    }

    /// Where a remote URL is cached
    pub fn cache_path(&self, url: &str) -> Result<PathBuf> {
        let parsed =
            Url::parse(url).map_err(|e| Error::DownloadError(format!("Invalid URL {url}: {e}")))?;
        let filename = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::DownloadError(format!("No file name in URL {url}")))?;
        Ok(self.cache_dir.join(filename))
    }

    fn download(&self, url: &str, dest: &Path, checksum: Option<&str>) -> Result<()> {
        info!("Downloading {}", url);
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::DownloadError(format!("Failed to download {url}: {e}")))?;

        fs::create_dir_all(&self.cache_dir)?;
        let mut temp = NamedTempFile::new_in(&self.cache_dir)?;

        let mut buffer = [0u8; STREAM_BUFFER_SIZE];
        let mut downloaded: u64 = 0;
        loop {
            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| Error::DownloadError(format!("Failed to read response: {e}")))?;
            if bytes_read == 0 {
                break;
            }
            temp.write_all(&buffer[..bytes_read])?;
            downloaded += bytes_read as u64;
        }
        temp.flush()?;
        debug!("Downloaded {} bytes from {}", downloaded, url);

        if let Some(checksum) = checksum {
            verify_checksum(temp.path(), checksum)?;
        }

        temp.persist(dest)
            .map_err(|e| Error::IoError(format!("Failed to store {}: {}", dest.display(), e)))?;
        Ok(())
    }
}

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str, checksum: Option<&str>) -> Result<PathBuf> {
        if let Some(path) = local_path(url) {
            if !path.exists() {
                return Err(Error::DownloadError(format!(
                    "Source not found: {}",
                    path.display()
                )));
            }
            debug!("Using local source {}", path.display());
            if let Some(checksum) = checksum.filter(|_| path.is_file()) {
                verify_checksum(&path, checksum)?;
            }
            return Ok(path);
        }

        let cached = self.cache_path(url)?;
        if cached.is_file() {
            match checksum.map(|c| verify_checksum(&cached, c)) {
                None | Some(Ok(())) => {
                    debug!("Using cached source {}", cached.display());
                    return Ok(cached);
                }
                Some(Err(e)) => {
                    warn!("Cached source {} is unusable: {}", cached.display(), e);
                    fs::remove_file(&cached)?;
                }
            }
        }

        if self.offline {
            return Err(Error::DownloadError(format!(
                "Offline mode and {} is not in the download cache",
                url
            )));
        }

        self.download(url, &cached, checksum)?;
        Ok(cached)
    }
}

/// Local path for plain paths and `file://` URLs, `None` for remote URLs
pub fn local_path(url: &str) -> Option<PathBuf> {
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "file" => parsed.to_file_path().ok(),
        // Single letters are Windows drive prefixes, not schemes
        Ok(parsed) if parsed.scheme().len() > 1 => None,
        _ => Some(PathBuf::from(url)),
    }
}

/// Check a file against a checksum option
pub fn verify_checksum(path: &Path, checksum: &str) -> Result<()> {
    let (algorithm, expected) = parse_checksum(checksum)
        .ok_or_else(|| Error::ConfigError(format!("Invalid checksum: {checksum}")))?;

    let actual = hash_file(algorithm, path)?;

    if actual != expected {
        return Err(Error::ChecksumMismatch {
            path: path.display().to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_path_detection() {
        assert_eq!(
            local_path("/srv/src/pkg-1.0.tar.gz"),
            Some(PathBuf::from("/srv/src/pkg-1.0.tar.gz"))
        );
        assert_eq!(
            local_path("file:///srv/src/pkg.tar.gz"),
            Some(PathBuf::from("/srv/src/pkg.tar.gz"))
        );
        assert_eq!(local_path("relative/pkg.tar"), Some(PathBuf::from("relative/pkg.tar")));
        assert_eq!(local_path("http://example.com/pkg.tar.gz"), None);
    }

    #[test]
    fn test_cache_path_uses_file_name() {
        let downloader = HttpDownloader::new("/cache", false).unwrap();
        assert_eq!(
            downloader
                .cache_path("http://example.com/dist/zlib-1.3.tar.gz?mirror=1")
                .unwrap(),
            PathBuf::from("/cache/zlib-1.3.tar.gz")
        );
        assert!(downloader.cache_path("http://example.com/").is_err());
    }

    #[test]
    fn test_verify_checksum() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.tar");
        fs::write(&path, b"hello").unwrap();

        verify_checksum(&path, "5d41402abc4b2a76b9719d911017c592").unwrap();
        let err = verify_checksum(&path, "00000000000000000000000000000000").unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }));
        assert!(matches!(
            verify_checksum(&path, "bogus").unwrap_err(),
            Error::ConfigError(_)
        ));
    }

    #[test]
    fn test_fetch_local_and_offline() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("pkg.tar");
        fs::write(&archive, b"hello").unwrap();

        let downloader = HttpDownloader::new(temp_dir.path().join("cache"), true).unwrap();
        let url = archive.to_string_lossy().into_owned();
        assert_eq!(
            downloader
                .fetch(&url, Some("5d41402abc4b2a76b9719d911017c592"))
                .unwrap(),
            archive
        );

        let err = downloader
            .fetch("http://example.invalid/pkg.tar.gz", None)
            .unwrap_err();
        assert!(matches!(err, Error::DownloadError(_)));
    }

    #[test]
    fn test_fetch_serves_cache_offline() {
        let temp_dir = TempDir::new().unwrap();
        let cache = temp_dir.path().join("cache");
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("pkg-1.0.tar.gz"), b"hello").unwrap();

        let downloader = HttpDownloader::new(&cache, true).unwrap();
        let path = downloader
            .fetch("http://x/pkg-1.0.tar.gz", Some("md5:5d41402abc4b2a76b9719d911017c592"))
            .unwrap();
        assert_eq!(path, cache.join("pkg-1.0.tar.gz"));
    }
}
