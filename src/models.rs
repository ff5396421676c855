//! Data models for IPTV Bouquets

/// UI Tab selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tab {
    Catalog,
    Manager,
    Editor,
    Cleaner,
    Console,
}

/// One channel entry of a bouquet file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    /// Service reference following the `#SERVICE` marker, kept opaque
    pub service: String,
    /// Text of the following `#DESCRIPTION` line, empty if there was none
    pub description: String,
}

impl ChannelRecord {
    pub fn new(service: &str, description: &str) -> Self {
        Self {
            service: service.to_string(),
            description: description.to_string(),
        }
    }

    /// Text shown in lists: the description, or the service reference
    pub fn display_text(&self) -> &str {
        if self.description.is_empty() {
            &self.service
        } else {
            &self.description
        }
    }
}

/// A named, ordered list of channel records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bouquet {
    pub name: String,
    pub records: Vec<ChannelRecord>,
}

/// A bouquet file found in the bouquet directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BouquetIndexEntry {
    pub filename: String,
    pub display_name: String,
}

/// A bouquet file offered by the remote catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub filename: String,
    pub display_name: String,
    pub download_url: String,
}
