use anyhow::{Context, Result};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use symphonia::core::io::MediaSource;

/// Request timeout for remote sources
const FETCH_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Where an input track comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url(String),
}

impl Source {
    pub fn parse(input: &str) -> Self {
        if input.starts_with("http://") || input.starts_with("https://") {
            Source::Url(input.to_string())
        } else {
            Source::File(PathBuf::from(input))
        }
    }

    /// Identifier carried into the analysis result.
    pub fn id(&self) -> String {
        self.to_string()
    }

    /// File extension used as a format hint for the decoder.
    pub fn extension(&self) -> Option<String> {
        match self {
            Source::File(path) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase),
            Source::Url(url) => {
                let path = url.split(['?', '#']).next().unwrap_or(url);
                let name = path.rsplit('/').next()?;
                Path::new(name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_lowercase)
            }
        }
    }

    pub fn open(&self) -> Result<Box<dyn MediaSource>> {
        match self {
            Source::File(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
                Ok(Box::new(file))
            }
            Source::Url(url) => Ok(Box::new(Cursor::new(fetch(url)?))),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

fn fetch(url: &str) -> Result<Vec<u8>> {
    log::info!("Fetching {}...", url);
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(concat!("ffs/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to fetch {}", url))?
        .error_for_status()
        .with_context(|| format!("Server rejected request for {}", url))?;

    let bytes = response
        .bytes()
        .with_context(|| format!("Failed to read response body from {}", url))?;
    log::info!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_urls_and_paths() {
        assert_eq!(
            Source::parse("http://localhost:3000/assets/song.mp3"),
            Source::Url("http://localhost:3000/assets/song.mp3".into())
        );
        assert_eq!(
            Source::parse("music/song.flac"),
            Source::File(PathBuf::from("music/song.flac"))
        );
    }

    #[test]
    fn extension_hint() {
        assert_eq!(Source::parse("a/b/Track.MP3").extension().as_deref(), Some("mp3"));
        assert_eq!(
            Source::parse("https://host/x/song.ogg?token=abc#t=3").extension().as_deref(),
            Some("ogg")
        );
        assert_eq!(Source::parse("https://host/stream").extension(), None);
    }

    #[test]
    fn id_is_the_input_string() {
        assert_eq!(Source::parse("https://host/a.wav").id(), "https://host/a.wav");
        assert_eq!(Source::parse("a.wav").id(), "a.wav");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Source::parse("/definitely/not/here.wav").open().err().unwrap();
        assert!(err.to_string().contains("/definitely/not/here.wav"));
    }
}
