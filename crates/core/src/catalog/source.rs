use std::{path::PathBuf, time::Duration};

use reqwest::{Client, Url};
use tracing::info;

use crate::{error::CatalogError, models::CatalogDocument};

/// Where the catalog document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    /// Remote document fetched over HTTP(S).
    Remote(Url),
    /// Local JSON file.
    Local(PathBuf),
}

impl CatalogLocation {
    /// Interpret a configured location: `http(s)://` and `file://` URLs are
    /// used as given, anything else is treated as a filesystem path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(url) = Url::parse(trimmed) {
            match url.scheme() {
                "http" | "https" => return Self::Remote(url),
                "file" => {
                    if let Ok(path) = url.to_file_path() {
                        return Self::Local(path);
                    }
                }
                _ => {}
            }
        }
        Self::Local(PathBuf::from(trimmed))
    }

    /// Base against which relative game addresses are resolved.
    pub fn base_url(&self) -> Option<Url> {
        match self {
            Self::Remote(url) => Some(url.clone()),
            Self::Local(path) => {
                let absolute = if path.is_absolute() {
                    path.clone()
                } else {
                    std::env::current_dir().ok()?.join(path)
                };
                Url::from_file_path(absolute).ok()
            }
        }
    }
}

/// Provider of the catalog document.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// Fetch and parse the document.
    async fn fetch(&self) -> Result<CatalogDocument, CatalogError>;

    /// Base for resolving relative game addresses, if any.
    fn base_url(&self) -> Option<Url> {
        None
    }
}

/// Catalog served over HTTP.
pub struct HttpCatalogSource {
    client: Client,
    url: Url,
}

impl HttpCatalogSource {
    /// Source for `url` with a request timeout.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<CatalogDocument, CatalogError> {
        info!(url = %self.url, "Fetching catalog");
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn base_url(&self) -> Option<Url> {
        Some(self.url.clone())
    }
}

/// Catalog read from a local JSON file.
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    /// Source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileCatalogSource {
    async fn fetch(&self) -> Result<CatalogDocument, CatalogError> {
        info!(path = %self.path.display(), "Reading catalog");
        let contents = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn base_url(&self) -> Option<Url> {
        CatalogLocation::Local(self.path.clone()).base_url()
    }
}

/// Source selected from a [`CatalogLocation`].
pub enum AnySource {
    /// HTTP source.
    Http(HttpCatalogSource),
    /// File source.
    File(FileCatalogSource),
}

impl AnySource {
    /// Build the matching source for a location.
    pub fn from_location(location: CatalogLocation, timeout: Duration) -> Result<Self, CatalogError> {
        Ok(match location {
            CatalogLocation::Remote(url) => Self::Http(HttpCatalogSource::new(url, timeout)?),
            CatalogLocation::Local(path) => Self::File(FileCatalogSource::new(path)),
        })
    }
}

impl CatalogSource for AnySource {
    async fn fetch(&self) -> Result<CatalogDocument, CatalogError> {
        match self {
            Self::Http(source) => source.fetch().await,
            Self::File(source) => source.fetch().await,
        }
    }

    fn base_url(&self) -> Option<Url> {
        match self {
            Self::Http(source) => source.base_url(),
            Self::File(source) => source.base_url(),
        }
    }
}

/// Resolve a game address against the catalog base. Absolute addresses and
/// unresolvable inputs are returned unchanged.
pub fn resolve_game_url(base: Option<&Url>, raw: &str) -> String {
    if Url::parse(raw).is_ok() {
        return raw.to_string();
    }
    base.and_then(|base| base.join(raw).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_locations() {
        assert!(matches!(
            CatalogLocation::parse("https://example.com/game_links.json"),
            CatalogLocation::Remote(_)
        ));
        assert_eq!(
            CatalogLocation::parse("./game_links.json"),
            CatalogLocation::Local(PathBuf::from("./game_links.json"))
        );
    }

    #[test]
    fn resolves_relative_game_urls() {
        let base = Url::parse("https://portal.example.com/games/game_links.json").unwrap();
        assert_eq!(
            resolve_game_url(Some(&base), "./index.html"),
            "https://portal.example.com/games/index.html"
        );
        assert_eq!(
            resolve_game_url(Some(&base), "https://other.example.com/"),
            "https://other.example.com/"
        );
        assert_eq!(resolve_game_url(None, "./index.html"), "./index.html");
    }

    #[tokio::test]
    async fn file_source_reads_document() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("game_links.json");
        fs::write(
            &path,
            r#"{"games":[{"id":7,"title":"Maze","url":"./maze.html","category":"Puzzle"}],"categories":["Puzzle"]}"#,
        )?;
        let source = FileCatalogSource::new(&path);
        let document = source.fetch().await?;
        assert_eq!(document.games.len(), 1);
        assert_eq!(document.categories, Some(vec!["Puzzle".to_string()]));

        let base = source.base_url().expect("file base url");
        assert_eq!(
            resolve_game_url(Some(&base), "./maze.html"),
            Url::from_file_path(dir.path().join("maze.html"))
                .unwrap()
                .to_string()
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let source = FileCatalogSource::new(dir.path().join("absent.json"));
        assert!(matches!(source.fetch().await, Err(CatalogError::Io(_))));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error() -> Result<()> {
        let url = Url::parse("http://127.0.0.1:9/game_links.json")?;
        let source = HttpCatalogSource::new(url, Duration::from_secs(2))?;
        assert!(source.fetch().await.is_err());
        Ok(())
    }
}
