//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::bouquet_index::BouquetFilter;
use crate::reload::DEFAULT_RELOAD_URL;

pub const DEFAULT_CATALOG_URL: &str = "https://api.github.com/repos/ciefp/CiefpIPTV/contents/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bouquet_dir")]
    pub bouquet_dir: String,
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    // Which installed files count as IPTV bouquets
    #[serde(default = "default_prefixes")]
    pub bouquet_prefixes: Vec<String>,
    #[serde(default = "default_keywords")]
    pub bouquet_keywords: Vec<String>,
    // Empty disables the reload prompt
    #[serde(default = "default_reload_url")]
    pub reload_url: String,
    #[serde(default = "default_page_step")]
    pub page_step: usize,
    #[serde(default = "default_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
}

fn default_bouquet_dir() -> String { "/etc/enigma2/".to_string() }
fn default_catalog_url() -> String { DEFAULT_CATALOG_URL.to_string() }
fn default_user_agent() -> String { format!("iptv_bouquets/{}", env!("CARGO_PKG_VERSION")) }
fn default_prefixes() -> Vec<String> { BouquetFilter::default().prefixes }
fn default_keywords() -> Vec<String> { BouquetFilter::default().keywords }
fn default_reload_url() -> String { DEFAULT_RELOAD_URL.to_string() }
fn default_page_step() -> usize { 10 }
fn default_timeout() -> u64 { 60 }
fn default_true() -> bool { true }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bouquet_dir: default_bouquet_dir(),
            catalog_url: default_catalog_url(),
            user_agent: default_user_agent(),
            bouquet_prefixes: default_prefixes(),
            bouquet_keywords: default_keywords(),
            reload_url: default_reload_url(),
            page_step: default_page_step(),
            http_timeout_secs: default_timeout(),
            dark_mode: true,
        }
    }
}

impl AppConfig {
    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("iptv_bouquets");
        fs::create_dir_all(&path).ok();
        path.push("config.json");
        path
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn save(&self) {
        self.save_to(&Self::config_path());
    }

    /// Missing or unreadable files give the defaults
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => warn!(path = %path.display(), error = %e, "ignoring invalid config"),
                }
            }
        }

        Self::default()
    }

    pub fn save_to(&self, path: &Path) {
        if let Ok(content) = serde_json::to_string_pretty(self) {
            if let Err(e) = fs::write(path, content) {
                warn!(path = %path.display(), error = %e, "could not save config");
            }
        }
    }

    pub fn filter(&self) -> BouquetFilter {
        BouquetFilter::new(self.bouquet_prefixes.clone(), self.bouquet_keywords.clone())
    }

    /// Page step used by Left/Right in move mode, never zero
    pub fn page_offset(&self) -> isize {
        self.page_step.max(1) as isize
    }
}
