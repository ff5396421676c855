//! Enigma2 bouquet file parser and serializer
//!
//! A bouquet file is line oriented. `#NAME` carries the title, each
//! `#SERVICE` line opens a channel record and an optional `#DESCRIPTION`
//! line right after it names that channel. Everything else is ignored.

use crate::models::{Bouquet, ChannelRecord};

pub const NAME_MARKER: &str = "#NAME";
pub const SERVICE_MARKER: &str = "#SERVICE";
pub const DESCRIPTION_MARKER: &str = "#DESCRIPTION";

const BOUQUET_PREFIX: &str = "userbouquet.";
const BOUQUET_SUFFIX: &str = ".tv";
const UTF8_BOM: char = '\u{feff}';

/// Title used when a bouquet has no `#NAME` line:
/// `userbouquet.iptv_news.tv` -> `iptv_news`
pub fn fallback_name(filename: &str) -> String {
    let name = filename.strip_prefix(BOUQUET_PREFIX).unwrap_or(filename);
    name.strip_suffix(BOUQUET_SUFFIX).unwrap_or(name).to_string()
}

/// Parse bouquet content. Never fails: unknown lines are skipped and a file
/// without records yields an empty bouquet.
pub fn parse_bouquet(content: &str, fallback: &str) -> Bouquet {
    let mut name: Option<String> = None;
    let mut records = Vec::new();
    let mut current: Option<ChannelRecord> = None;

    for line in content.lines() {
        let line = line.trim().trim_start_matches(UTF8_BOM);

        if let Some(rest) = line.strip_prefix(NAME_MARKER) {
            // a later title replaces an earlier one
            name = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(SERVICE_MARKER) {
            if let Some(record) = current.take() {
                records.push(record);
            }
            let service = rest.trim();
            if !service.is_empty() {
                current = Some(ChannelRecord::new(service, ""));
            }
        } else if let Some(rest) = line.strip_prefix(DESCRIPTION_MARKER) {
            if let Some(record) = current.as_mut() {
                record.description = rest.trim().to_string();
            }
        }
    }

    if let Some(record) = current {
        records.push(record);
    }

    Bouquet {
        name: name.unwrap_or_else(|| fallback.to_string()),
        records,
    }
}

/// Serialize a bouquet back to file content (LF line endings)
pub fn serialize_bouquet(bouquet: &Bouquet) -> String {
    let mut out = String::with_capacity(32 + bouquet.records.len() * 96);
    out.push_str(NAME_MARKER);
    out.push(' ');
    out.push_str(&bouquet.name);
    out.push('\n');

    for record in &bouquet.records {
        out.push_str(SERVICE_MARKER);
        out.push(' ');
        out.push_str(&record.service);
        out.push('\n');
        if !record.description.is_empty() {
            out.push_str(DESCRIPTION_MARKER);
            out.push(' ');
            out.push_str(&record.description);
            out.push('\n');
        }
    }

    out
}

/// Title from the first `#NAME` line, without parsing records
pub fn scan_name(content: &str) -> Option<String> {
    content
        .lines()
        .map(|line| line.trim().trim_start_matches(UTF8_BOM))
        .find_map(|line| line.strip_prefix(NAME_MARKER))
        .map(|rest| rest.trim().to_string())
}

/// Installable content must open with a `#NAME` line
pub fn has_name_header(content: &str) -> bool {
    content.trim_start_matches(UTF8_BOM).starts_with(NAME_MARKER)
}

/// Display title for a file's content, falling back to the filename
pub fn display_name(filename: &str, content: &str) -> String {
    scan_name(content).unwrap_or_else(|| fallback_name(filename))
}

#[cfg(test)]
#[path = "bouquet_parser_tests.rs"]
mod tests;
