//! Two-phase confirmations
//!
//! An operation that needs the user's consent returns a
//! [`PendingConfirmation`]. The UI shows its prompt and hands it back
//! together with the answer; nothing happens until then.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Download and install the selected catalog entries
    InstallBouquets { filenames: Vec<String> },
    /// Remove bouquet files and their index lines
    DeleteBouquets { filenames: Vec<String> },
    /// Remove the channel records selected when the prompt was raised
    DeleteChannels { positions: Vec<usize> },
    /// Close the editor even though it has unsaved changes
    DiscardChanges,
    /// Permanently remove `.del` files
    PurgeDeleted { filenames: Vec<String> },
    /// Ask the receiver to reload its service lists and bouquets
    ReloadServices,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub action: ConfirmAction,
    pub prompt: String,
}

impl PendingConfirmation {
    pub fn request(action: ConfirmAction) -> Self {
        let prompt = match &action {
            ConfirmAction::InstallBouquets { filenames } => {
                format!("Install {} selected bouquet(s)?", filenames.len())
            }
            ConfirmAction::DeleteBouquets { filenames } => {
                format!("Delete {} selected bouquet(s)?", filenames.len())
            }
            ConfirmAction::DeleteChannels { positions } => {
                format!("Delete {} selected channel(s)?", positions.len())
            }
            ConfirmAction::DiscardChanges => {
                "You have unsaved changes. Exit without saving?".to_string()
            }
            ConfirmAction::PurgeDeleted { filenames } => {
                format!("Permanently delete {} .del file(s)?", filenames.len())
            }
            ConfirmAction::ReloadServices => "Do you want to reload settings now?".to_string(),
        };
        Self { action, prompt }
    }
}
