use std::path::PathBuf;

use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::input::InputError;

/// Failures surfaced by the scanner controller. Each one replaces the result panel.
#[derive(Debug, Error)]
pub enum ScannerError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("failed to read staged file {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScannerError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Input(err) => err.user_message(),
            Self::Dispatch(err) => err.user_message(),
            Self::ReadFailed { path, .. } => {
                format!("Could not read {}. Please select the file again.", path.display())
            }
        }
    }
}
