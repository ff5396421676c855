//! Bouquet editing session
//!
//! Holds a working copy of one bouquet file plus the selection, move mode
//! and cursor of the editor screen. Nothing touches the disk until `save`.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::bouquet_parser::{fallback_name, parse_bouquet, serialize_bouquet};
use crate::confirm::{ConfirmAction, PendingConfirmation};
use crate::error::{BouquetError, Result};
use crate::models::{Bouquet, ChannelRecord};

/// Second words that belong to a show title rather than to the channel name
const TITLE_KEYWORDS: [&str; 4] = ["Premiere", "Series", "Episode", "TV+"];

const AROUND_THE_CLOCK: &str = "24/7 ";

static EPISODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)\s+S\d+\s+E\d+").expect("valid episode pattern"));

type PrefixRule = fn(&str) -> Option<String>;

/// Tried in order; the first rule that applies decides the prefix.
const SIMILAR_RULES: [PrefixRule; 4] = [
    colon_prefix,
    episode_prefix,
    around_the_clock_prefix,
    leading_words_prefix,
];

/// `HBO: Movie Night` -> `HBO:`
fn colon_prefix(text: &str) -> Option<String> {
    text.find(':').map(|pos| text[..=pos].to_string())
}

/// `Show S02 E05` -> `Show `
fn episode_prefix(text: &str) -> Option<String> {
    EPISODE_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|title| format!("{} ", title.as_str()))
}

fn around_the_clock_prefix(text: &str) -> Option<String> {
    text.starts_with(AROUND_THE_CLOCK)
        .then(|| AROUND_THE_CLOCK.to_string())
}

/// First word, or first two when the second is a title keyword
fn leading_words_prefix(text: &str) -> Option<String> {
    let parts: Vec<&str> = text.splitn(3, ' ').collect();
    if parts.len() > 2 && TITLE_KEYWORDS.contains(&parts[1]) {
        return Some(format!("{} {} ", parts[0], parts[1]));
    }
    if parts.len() > 1 {
        Some(format!("{} ", parts[0]))
    } else {
        Some(format!("{} ", text))
    }
}

/// Prefix shared by channels "similar" to one with the given display text
pub fn similar_prefix(text: &str) -> String {
    SIMILAR_RULES
        .iter()
        .find_map(|rule| rule(text))
        .unwrap_or_else(|| format!("{} ", text))
}

fn matches_prefix(text: &str, prefix: &str) -> bool {
    text.starts_with(prefix) || text == prefix.trim_end()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimilarOutcome {
    Selected { prefix: String, count: usize },
    Deselected { prefix: String, count: usize },
    NoMatch { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    NothingToSave,
    Saved { records: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitDecision {
    Close,
    Confirm(PendingConfirmation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionResume {
    Deleted(usize),
    Close,
    Stay,
    /// The confirmation did not belong to an editor session
    Ignored,
}

pub struct EditSession {
    path: PathBuf,
    channels: Bouquet,
    original: Vec<ChannelRecord>,
    selection: BTreeSet<usize>,
    move_mode: bool,
    cursor: usize,
}

impl EditSession {
    pub fn new(path: PathBuf, bouquet: Bouquet) -> Self {
        let original = bouquet.records.clone();
        Self {
            path,
            channels: bouquet,
            original,
            selection: BTreeSet::new(),
            move_mode: false,
            cursor: 0,
        }
    }

    /// Load a bouquet file into a new session
    pub fn open(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| BouquetError::filesystem(path, e))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bouquet = parse_bouquet(&content, &fallback_name(&filename));
        info!(path = %path.display(), records = bouquet.records.len(), "opened bouquet for editing");
        Ok(Self::new(path.to_path_buf(), bouquet))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.channels.name
    }

    pub fn records(&self) -> &[ChannelRecord] {
        &self.channels.records
    }

    pub fn len(&self) -> usize {
        self.channels.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.records.is_empty()
    }

    /// Selected positions in ascending order
    pub fn selection(&self) -> Vec<usize> {
        self.selection.iter().copied().collect()
    }

    pub fn is_selected(&self, position: usize) -> bool {
        self.selection.contains(&position)
    }

    pub fn move_mode(&self) -> bool {
        self.move_mode
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, position: usize) {
        if position < self.len() {
            self.cursor = position;
        }
    }

    pub fn is_modified(&self) -> bool {
        self.channels.records != self.original
    }

    /// List label for a row: selected rows are marked `[SELECTED]`,
    /// or prefixed `>>` while move mode is on.
    pub fn row_label(&self, position: usize) -> String {
        let Some(record) = self.channels.records.get(position) else {
            return String::new();
        };
        let text = record.display_text();
        if !self.selection.contains(&position) {
            text.to_string()
        } else if self.move_mode {
            format!(">> {}", text)
        } else {
            format!("{} [SELECTED]", text)
        }
    }

    /// Add or remove `position` from the selection. Returns false when out of range.
    pub fn toggle_select(&mut self, position: usize) -> bool {
        if position >= self.len() {
            return false;
        }
        if !self.selection.remove(&position) {
            self.selection.insert(position);
        }
        true
    }

    /// Select every channel similar to the one at `position`, or deselect
    /// them all if they already are. `None` when out of range.
    pub fn select_similar(&mut self, position: usize) -> Option<SimilarOutcome> {
        let text = self.channels.records.get(position)?.display_text().to_string();
        let prefix = similar_prefix(&text);

        let similar: Vec<usize> = self
            .channels
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| matches_prefix(record.display_text(), &prefix))
            .map(|(i, _)| i)
            .collect();

        if similar.is_empty() {
            debug!(%text, %prefix, "no similar channels");
            return Some(SimilarOutcome::NoMatch { text });
        }

        let count = similar.len();
        if similar.iter().all(|i| self.selection.contains(i)) {
            for i in &similar {
                self.selection.remove(i);
            }
            Some(SimilarOutcome::Deselected { prefix, count })
        } else {
            self.selection.extend(similar);
            Some(SimilarOutcome::Selected { prefix, count })
        }
    }

    /// Flip move mode; leaving it clears the selection. Returns the new state.
    pub fn toggle_move_mode(&mut self) -> bool {
        self.move_mode = !self.move_mode;
        if !self.move_mode {
            self.selection.clear();
        }
        self.move_mode
    }

    /// Move the selected channels as one block by `offset` rows.
    ///
    /// The block is inserted at `first selected + offset`, clamped to the
    /// remaining rows, and the selection follows it.
    pub fn move_selection(&mut self, offset: isize) -> bool {
        if !self.move_mode || self.selection.is_empty() {
            return false;
        }

        let first = match self.selection.first() {
            Some(first) => *first,
            None => return false,
        };
        let records = std::mem::take(&mut self.channels.records);
        let mut moved = Vec::with_capacity(self.selection.len());
        let mut remaining = Vec::with_capacity(records.len());
        for (i, record) in records.into_iter().enumerate() {
            if self.selection.contains(&i) {
                moved.push(record);
            } else {
                remaining.push(record);
            }
        }

        let count = moved.len();
        let target = (first as isize + offset).clamp(0, remaining.len() as isize) as usize;
        remaining.splice(target..target, moved);
        self.channels.records = remaining;

        self.selection = (target..target + count).collect();
        self.cursor = target;
        true
    }

    /// Cursor movement from the arrow keys. In move mode with a selection
    /// the selected block moves instead.
    pub fn navigate(&mut self, offset: isize) {
        if self.move_mode && !self.selection.is_empty() {
            self.move_selection(offset);
        } else if !self.is_empty() {
            let last = self.len() as isize - 1;
            self.cursor = (self.cursor as isize + offset).clamp(0, last) as usize;
        }
    }

    pub fn request_delete(&self) -> Result<PendingConfirmation> {
        if self.selection.is_empty() {
            return Err(BouquetError::NothingSelected);
        }
        Ok(PendingConfirmation::request(ConfirmAction::DeleteChannels {
            positions: self.selection(),
        }))
    }

    /// Remove the selected channels and clear the selection
    pub fn delete_selected(&mut self) -> usize {
        let positions = std::mem::take(&mut self.selection);
        self.delete_positions(&positions)
    }

    /// Remove the channels at the given positions. The selection is cleared
    /// since its positions no longer name the same channels.
    fn delete_positions(&mut self, positions: &BTreeSet<usize>) -> usize {
        let before = self.len();
        self.selection.clear();
        let mut i = 0;
        self.channels.records.retain(|_| {
            let keep = !positions.contains(&i);
            i += 1;
            keep
        });
        if self.cursor >= self.len() {
            self.cursor = self.len().saturating_sub(1);
        }
        before - self.len()
    }

    pub fn request_exit(&self) -> ExitDecision {
        if self.is_modified() {
            ExitDecision::Confirm(PendingConfirmation::request(ConfirmAction::DiscardChanges))
        } else {
            ExitDecision::Close
        }
    }

    /// Second phase of `request_delete` / `request_exit`
    pub fn resume(&mut self, pending: PendingConfirmation, accepted: bool) -> SessionResume {
        match pending.action {
            // exactly what the prompt counted, even if the selection changed since
            ConfirmAction::DeleteChannels { positions } if accepted => {
                let positions: BTreeSet<usize> = positions.into_iter().collect();
                SessionResume::Deleted(self.delete_positions(&positions))
            }
            ConfirmAction::DiscardChanges if accepted => SessionResume::Close,
            ConfirmAction::DeleteChannels { .. } | ConfirmAction::DiscardChanges => {
                SessionResume::Stay
            }
            _ => SessionResume::Ignored,
        }
    }

    /// Write the bouquet back to its file if anything changed
    pub fn save(&mut self) -> Result<SaveOutcome> {
        self.save_with(|path, content| fs::write(path, content))
    }

    pub fn save_with<W>(&mut self, mut write: W) -> Result<SaveOutcome>
    where
        W: FnMut(&Path, &str) -> std::io::Result<()>,
    {
        if !self.is_modified() {
            return Ok(SaveOutcome::NothingToSave);
        }

        let content = serialize_bouquet(&self.channels);
        write(&self.path, &content).map_err(|e| BouquetError::filesystem(&self.path, e))?;
        self.original = self.channels.records.clone();

        let records = self.len();
        info!(path = %self.path.display(), records, "saved bouquet");
        Ok(SaveOutcome::Saved { records })
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod tests;
