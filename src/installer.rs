//! Batch install of catalog bouquets
//!
//! Each bouquet is downloaded, validated and written on its own. A failure
//! is recorded and the batch carries on; nothing already written is undone.

use tracing::{info, warn};

use crate::catalog::{CatalogClient, HttpFetch};
use crate::error::{BouquetError, Result};
use crate::models::CatalogEntry;
use crate::store::BouquetStore;

#[derive(Debug, Default)]
pub struct InstallReport {
    pub installed: Vec<String>,
    pub failed: Vec<(String, BouquetError)>,
}

impl InstallReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// One-line status for the UI
    pub fn summary(&self) -> String {
        if self.failed.is_empty() {
            format!("Installed {} bouquet(s) successfully!", self.installed.len())
        } else {
            let failures: Vec<String> = self
                .failed
                .iter()
                .map(|(name, e)| format!("{}: {}", name, e))
                .collect();
            format!(
                "Installed {} bouquet(s), {} failed ({})",
                self.installed.len(),
                self.failed.len(),
                failures.join("; ")
            )
        }
    }
}

pub fn install_one<F: HttpFetch>(
    client: &CatalogClient<F>,
    store: &BouquetStore,
    entry: &CatalogEntry,
) -> Result<()> {
    let content = client.fetch(entry)?;
    store.install(&entry.filename, &content)
}

pub fn install_selected<F: HttpFetch>(
    client: &CatalogClient<F>,
    store: &BouquetStore,
    entries: &[CatalogEntry],
) -> Result<InstallReport> {
    if entries.is_empty() {
        return Err(BouquetError::NothingSelected);
    }

    let mut report = InstallReport::default();
    for entry in entries {
        match install_one(client, store, entry) {
            Ok(()) => report.installed.push(entry.filename.clone()),
            Err(e) => {
                warn!(filename = %entry.filename, error = %e, "install failed");
                report.failed.push((entry.filename.clone(), e));
            }
        }
    }

    info!(
        installed = report.installed.len(),
        failed = report.failed.len(),
        "install batch finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bouquet_index::BouquetFilter;
    use crate::catalog::fake::FakeFetcher;

    fn entry(name: &str) -> CatalogEntry {
        CatalogEntry {
            filename: format!("userbouquet.iptv_{}.tv", name),
            display_name: name.to_string(),
            download_url: format!("https://raw.example.com/{}.tv", name),
        }
    }

    #[test]
    fn test_partial_failure_keeps_others() {
        let dir = tempfile::tempdir().unwrap();
        let store = BouquetStore::new(dir.path(), BouquetFilter::default());
        let fetcher = FakeFetcher::default()
            .with("https://raw.example.com/news.tv", "#NAME News\n#SERVICE 1:0:1:A\n")
            .with("https://raw.example.com/broken.tv", "<html>oops</html>")
            .with("https://raw.example.com/sport.tv", "#NAME Sport\n");
        let client = CatalogClient::new(fetcher, "https://api.example.com/contents/");

        let entries = vec![entry("news"), entry("broken"), entry("missing"), entry("sport")];
        let report = install_selected(&client, &store, &entries).unwrap();

        assert_eq!(report.installed, vec!["userbouquet.iptv_news.tv", "userbouquet.iptv_sport.tv"]);
        assert_eq!(report.failed.len(), 2);
        assert!(matches!(report.failed[0].1, BouquetError::MalformedBouquet { .. }));
        assert!(matches!(report.failed[1].1, BouquetError::Network { .. }));
        assert!(!report.is_success());
        assert!(report.summary().starts_with("Installed 2 bouquet(s), 2 failed"));

        assert_eq!(
            store.index_order().unwrap(),
            vec!["userbouquet.iptv_news.tv", "userbouquet.iptv_sport.tv"]
        );
        let listed: Vec<String> = store.list_bouquets().unwrap().into_iter().map(|e| e.display_name).collect();
        assert_eq!(listed, vec!["News", "Sport"]);
    }

    #[test]
    fn test_empty_selection() {
        let dir = tempfile::tempdir().unwrap();
        let store = BouquetStore::new(dir.path(), BouquetFilter::default());
        let client = CatalogClient::new(FakeFetcher::default(), "https://api.example.com/contents/");
        assert!(matches!(
            install_selected(&client, &store, &[]),
            Err(BouquetError::NothingSelected)
        ));
    }
}
