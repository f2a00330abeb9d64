use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted while reading or writing `settings.json`.
#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("cannot access settings at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SettingsError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
