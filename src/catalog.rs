//! Remote bouquet catalog client
//!
//! The catalog is a GitHub "contents" listing: a JSON array of files, each
//! with a `name` and a `download_url`. Only `.tv` files are bouquets.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::bouquet_parser::{display_name, fallback_name, parse_bouquet};
use crate::error::{BouquetError, Result};
use crate::models::{Bouquet, CatalogEntry};
use crate::store::is_plain_filename;

/// Plain text GET, so the catalog can be driven without a network in tests
pub trait HttpFetch: Send + Sync {
    fn get_text(&self, url: &str) -> Result<String>;
}

pub struct UreqFetcher {
    agent: ureq::Agent,
    user_agent: String,
}

impl UreqFetcher {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            .timeout_connect(Some(Duration::from_secs(timeout_secs.min(30))))
            .build()
            .new_agent();

        Self {
            agent,
            user_agent: user_agent.to_string(),
        }
    }
}

impl HttpFetch for UreqFetcher {
    fn get_text(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .map_err(|e| BouquetError::network(url, format!("Request failed: {}", e)))?;

        if response.status() != 200 {
            return Err(BouquetError::network(url, format!("HTTP error: {}", response.status())));
        }

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| BouquetError::network(url, format!("Read failed: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct RemoteFile {
    name: String,
    #[serde(default)]
    download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing {
    Files(Vec<serde_json::Value>),
    Failure { message: String },
}

/// Bouquet files named by a listing document, in listing order
pub fn parse_listing(url: &str, body: &str) -> Result<Vec<(String, String)>> {
    let listing: Listing = serde_json::from_str(body)
        .map_err(|e| BouquetError::network(url, format!("Invalid catalog listing: {}", e)))?;

    let files = match listing {
        Listing::Files(files) => files,
        Listing::Failure { message } => return Err(BouquetError::network(url, message)),
    };

    Ok(files
        .into_iter()
        .filter_map(|value| serde_json::from_value::<RemoteFile>(value).ok())
        .filter(|file| file.name.ends_with(".tv"))
        .filter(|file| {
            let plain = is_plain_filename(&file.name);
            if !plain {
                warn!(name = %file.name, "skipping catalog entry with a path in its name");
            }
            plain
        })
        .filter_map(|file| file.download_url.map(|u| (file.name, u)))
        .collect())
}

pub struct CatalogClient<F: HttpFetch> {
    fetcher: F,
    listing_url: String,
}

impl<F: HttpFetch> CatalogClient<F> {
    pub fn new(fetcher: F, listing_url: &str) -> Self {
        Self {
            fetcher,
            listing_url: listing_url.to_string(),
        }
    }

    /// Fetch the listing, then each bouquet to learn its `#NAME` title.
    /// A bouquet that fails to download keeps its filename title.
    pub fn list_bouquets(&self) -> Result<Vec<CatalogEntry>> {
        let body = self.fetcher.get_text(&self.listing_url)?;
        let files = parse_listing(&self.listing_url, &body)?;

        let mut entries = Vec::with_capacity(files.len());
        for (filename, download_url) in files {
            let display = match self.fetcher.get_text(&download_url) {
                Ok(content) => display_name(&filename, &content),
                Err(e) => {
                    warn!(%filename, error = %e, "could not fetch bouquet title");
                    fallback_name(&filename)
                }
            };
            entries.push(CatalogEntry {
                filename,
                display_name: display,
                download_url,
            });
        }

        info!(count = entries.len(), url = %self.listing_url, "catalog loaded");
        Ok(entries)
    }

    /// Raw content of one catalog bouquet
    pub fn fetch(&self, entry: &CatalogEntry) -> Result<String> {
        self.fetcher.get_text(&entry.download_url)
    }

    /// Parsed channels of one catalog bouquet, for previewing
    pub fn view(&self, entry: &CatalogEntry) -> Result<Bouquet> {
        let content = self.fetch(entry)?;
        Ok(parse_bouquet(&content, &entry.display_name))
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeFetcher;
    use super::*;

    const LISTING_URL: &str = "https://api.example.com/contents/";

    fn listing() -> String {
        r#"[
            {"name": "README.md", "type": "file", "download_url": "https://raw.example.com/README.md"},
            {"name": "userbouquet.iptv_news.tv", "type": "file", "download_url": "https://raw.example.com/news.tv"},
            {"name": "picons", "type": "dir", "download_url": null},
            {"name": "userbouquet.iptv_sport.tv", "type": "file", "download_url": "https://raw.example.com/sport.tv"},
            {"name": "userbouquet.iptv_kids.tv", "type": "file", "download_url": "https://raw.example.com/kids.tv"}
        ]"#
        .to_string()
    }

    #[test]
    fn test_list_bouquets_resolves_titles() {
        let fetcher = FakeFetcher::default()
            .with(LISTING_URL, &listing())
            .with("https://raw.example.com/news.tv", "#NAME World News\n#SERVICE 1:0:1:A\n")
            .with("https://raw.example.com/sport.tv", "#SERVICE 1:0:1:B\n");
        let client = CatalogClient::new(fetcher, LISTING_URL);

        let entries = client.list_bouquets().unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.display_name.as_str()).collect();
        // kids.tv is not served: it keeps the filename title
        assert_eq!(titles, vec!["World News", "iptv_sport", "iptv_kids"]);
        assert_eq!(entries[0].filename, "userbouquet.iptv_news.tv");
        assert_eq!(entries[0].download_url, "https://raw.example.com/news.tv");
    }

    #[test]
    fn test_listing_failure_is_network_error() {
        let client = CatalogClient::new(FakeFetcher::default(), LISTING_URL);
        assert!(matches!(client.list_bouquets(), Err(BouquetError::Network { .. })));
    }

    #[test]
    fn test_listing_error_object() {
        let body = r#"{"message": "API rate limit exceeded", "documentation_url": "https://docs.github.com"}"#;
        let err = parse_listing(LISTING_URL, body).unwrap_err();
        assert!(err.to_string().contains("API rate limit exceeded"));
    }

    #[test]
    fn test_listing_skips_names_with_paths() {
        let body = r#"[
            {"name": "../userbouquet.iptv_up.tv", "download_url": "https://raw.example.com/up.tv"},
            {"name": "/etc/userbouquet.iptv_abs.tv", "download_url": "https://raw.example.com/abs.tv"},
            {"name": "userbouquet.iptv_ok.tv", "download_url": "https://raw.example.com/ok.tv"}
        ]"#;
        let files = parse_listing(LISTING_URL, body).unwrap();
        assert_eq!(files, vec![("userbouquet.iptv_ok.tv".to_string(), "https://raw.example.com/ok.tv".to_string())]);
    }

    #[test]
    fn test_empty_listing() {
        assert!(parse_listing(LISTING_URL, "[]").unwrap().is_empty());
    }

    #[test]
    fn test_view_parses_channels() {
        let fetcher = FakeFetcher::default().with(
            "https://raw.example.com/news.tv",
            "#NAME World News\n#SERVICE 1:0:1:A\n#DESCRIPTION CNN\n#SERVICE 1:0:1:B\n#DESCRIPTION BBC\n",
        );
        let client = CatalogClient::new(fetcher, LISTING_URL);
        let entry = CatalogEntry {
            filename: "userbouquet.iptv_news.tv".to_string(),
            display_name: "World News".to_string(),
            download_url: "https://raw.example.com/news.tv".to_string(),
        };

        let bouquet = client.view(&entry).unwrap();
        let names: Vec<&str> = bouquet.records.iter().map(|r| r.display_text()).collect();
        assert_eq!(names, vec!["CNN", "BBC"]);
    }
}
