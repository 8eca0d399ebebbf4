use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub mod manual;

pub use manual::{validate_manual_fields, ManualEntry, ManualField, ManualRecord};

/// Largest upload accepted by the drop zone (16 MiB).
pub const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;
pub const CSV_EXTENSION: &str = ".csv";

/// Rejections raised while staging inputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("`{name}` is not a .csv file")]
    InvalidFormat { name: String },
    #[error("`{name}` is {size} bytes, above the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },
    #[error("required field `{field}` is empty")]
    MissingField { field: ManualField },
    #[error("field `{field}` is not a valid number (got `{value}`)")]
    InvalidNumber { field: ManualField, value: String },
}

impl InputError {
    /// Text shown in the result panel.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidFormat { .. } => "Please upload a CSV file only.".into(),
            Self::TooLarge { .. } => {
                "File size exceeds 16MB limit. Please upload a smaller file.".into()
            }
            Self::MissingField { .. } => "Please fill in all fields before analyzing.".into(),
            Self::InvalidNumber { field, value } => {
                format!("Field {field} must be numeric (got \"{value}\").")
            }
        }
    }
}

/// A file offered through the picker or drop zone. Content is read on analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, size: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size,
            path: path.into(),
        }
    }

    /// Build a candidate from file metadata on disk.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, size, path))
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.name, format_file_size(self.size))
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if !self.name.ends_with(CSV_EXTENSION) {
            return Err(InputError::InvalidFormat {
                name: self.name.clone(),
            });
        }
        if self.size > MAX_FILE_SIZE {
            return Err(InputError::TooLarge {
                name: self.name.clone(),
                size: self.size,
                limit: MAX_FILE_SIZE,
            });
        }
        Ok(())
    }
}

/// Which upload panel is visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayMode {
    /// Drop zone shown, file info and analyze button hidden.
    NoFile,
    /// File info row shown with the given label.
    FileStaged { label: String },
}

/// Holds the staged upload between selection and analysis.
#[derive(Debug, Default)]
pub struct InputManager {
    staged: Option<FileCandidate>,
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `candidate`, replacing any earlier file. Rejections keep the previous one.
    pub fn select_file(&mut self, candidate: FileCandidate) -> Result<&FileCandidate, InputError> {
        candidate.validate()?;
        debug!(name = %candidate.name, size = candidate.size, "file staged");
        let staged = self.staged.insert(candidate);
        Ok(&*staged)
    }

    pub fn clear_file(&mut self) {
        if self.staged.take().is_some() {
            debug!("staged file cleared");
        }
    }

    pub fn staged(&self) -> Option<&FileCandidate> {
        self.staged.as_ref()
    }

    pub fn display_mode(&self) -> DisplayMode {
        match &self.staged {
            Some(file) => DisplayMode::FileStaged {
                label: file.label(),
            },
            None => DisplayMode::NoFile,
        }
    }
}

/// Human-readable size: bytes below 1 KiB, then KB/MB with two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.2} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MIB as f64)
    }
}

/// Data rows in a CSV body, assuming a single header line.
pub fn count_rows(content: &str) -> usize {
    content.split('\n').count().saturating_sub(1)
}
