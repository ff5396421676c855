//! Master index (`bouquets.tv`) handling
//!
//! The index registers bouquet files with lines of the form
//! `#SERVICE 1:7:1:0:0:0:0:0:0:0:FROM BOUQUET "<file>" ORDER BY bouquet`
//! and their order is the order the receiver shows them in.

use std::collections::HashSet;

use crate::models::BouquetIndexEntry;

pub const INDEX_FILENAME: &str = "bouquets.tv";

const FROM_BOUQUET: &str = "FROM BOUQUET";

/// Registration line for a bouquet file (without line terminator)
pub fn registration_line(filename: &str) -> String {
    format!(
        "#SERVICE 1:7:1:0:0:0:0:0:0:0:{} \"{}\" ORDER BY bouquet",
        FROM_BOUQUET, filename
    )
}

/// Filenames referenced by the index, in index order
pub fn parse_index_order(content: &str) -> Vec<String> {
    let mut order = Vec::new();

    for line in content.lines() {
        if !line.contains("#SERVICE") || !line.contains(FROM_BOUQUET) {
            continue;
        }
        let Some(start) = line.find('"') else {
            continue;
        };
        let rest = &line[start + 1..];
        if let Some(end) = rest.find('"') {
            if end > 0 {
                order.push(rest[..end].to_string());
            }
        }
    }

    order
}

/// Index content with the registration line for `filename` appended, or
/// `None` when an identical line is already present.
pub fn register(content: &str, filename: &str) -> Option<String> {
    let line = registration_line(filename);
    if content.lines().any(|l| l.trim_end() == line) {
        return None;
    }

    let mut updated = String::with_capacity(content.len() + line.len() + 2);
    updated.push_str(content);
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&line);
    updated.push('\n');
    Some(updated)
}

/// Index content without any line mentioning `filename`.
/// Original line endings of the kept lines are preserved.
pub fn unregister(content: &str, filename: &str) -> String {
    content
        .split_inclusive('\n')
        .filter(|line| !line.contains(filename))
        .collect()
}

/// Which files in the bouquet directory count as IPTV bouquets
#[derive(Debug, Clone, PartialEq)]
pub struct BouquetFilter {
    pub prefixes: Vec<String>,
    pub keywords: Vec<String>,
}

impl Default for BouquetFilter {
    fn default() -> Self {
        Self {
            prefixes: vec![
                "userbouquet.ciefpsettings".to_string(),
                "userbouquet.iptv".to_string(),
            ],
            keywords: vec!["iptv".to_string()],
        }
    }
}

impl BouquetFilter {
    pub fn new(prefixes: Vec<String>, keywords: Vec<String>) -> Self {
        Self { prefixes, keywords }
    }

    pub fn matches(&self, filename: &str) -> bool {
        if !filename.ends_with(".tv") || filename == INDEX_FILENAME {
            return false;
        }
        let lower = filename.to_lowercase();
        self.prefixes.iter().any(|p| filename.starts_with(p.as_str()))
            || self
                .keywords
                .iter()
                .any(|k| lower.contains(&k.to_lowercase()))
    }
}

/// Merge the index order with the bouquet files found on disk.
///
/// Every candidate appears exactly once: first the ones named by the index
/// in index order, then the rest in the order given. Index entries without
/// a file are dropped.
pub fn merge_index<F>(order: &[String], candidates: &[String], mut resolve_name: F) -> Vec<BouquetIndexEntry>
where
    F: FnMut(&str) -> String,
{
    let mut remaining: Vec<&str> = Vec::with_capacity(candidates.len());
    let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());
    for name in candidates {
        if seen.insert(name.as_str()) {
            remaining.push(name.as_str());
        }
    }

    let mut merged = Vec::with_capacity(remaining.len());
    for filename in order {
        if let Some(pos) = remaining.iter().position(|c| *c == filename.as_str()) {
            remaining.remove(pos);
            merged.push(BouquetIndexEntry {
                filename: filename.clone(),
                display_name: resolve_name(filename),
            });
        }
    }

    for filename in remaining {
        merged.push(BouquetIndexEntry {
            filename: filename.to_string(),
            display_name: resolve_name(filename),
        });
    }

    merged
}

#[cfg(test)]
#[path = "bouquet_index_tests.rs"]
mod tests;
