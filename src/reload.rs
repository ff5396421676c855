//! Receiver service list reload
//!
//! Enigma2 only picks up new or edited bouquet files after it reloads its
//! service lists. The web interface exposes that as a plain GET.

use tracing::info;

use crate::catalog::HttpFetch;
use crate::error::Result;

pub const DEFAULT_RELOAD_URL: &str = "http://127.0.0.1/web/servicelistreload?mode=0";

pub struct ServiceReloader<F: HttpFetch> {
    fetcher: F,
    url: String,
}

impl<F: HttpFetch> ServiceReloader<F> {
    pub fn new(fetcher: F, url: &str) -> Self {
        Self {
            fetcher,
            url: url.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Request the reload. Returns false when no reload URL is configured.
    pub fn reload(&self) -> Result<bool> {
        if !self.is_configured() {
            return Ok(false);
        }
        self.fetcher.get_text(&self.url)?;
        info!(url = %self.url, "service lists reloaded");
        Ok(true)
    }
}
