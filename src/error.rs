//! Error taxonomy for catalog, install and bouquet file operations

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BouquetError {
    /// Catalog listing or file download failed.
    #[error("Network error ({url}): {message}")]
    Network { url: String, message: String },

    /// Downloaded content does not start with a `#NAME` line.
    #[error("Invalid bouquet file format: {filename}")]
    MalformedBouquet { filename: String },

    /// Read, write or delete failed on a path in the bouquet directory.
    #[error("{}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Nothing selected")]
    NothingSelected,
}

impl BouquetError {
    pub fn network(url: &str, message: impl ToString) -> Self {
        BouquetError::Network {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn filesystem(path: &Path, source: std::io::Error) -> Self {
        BouquetError::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BouquetError>;
