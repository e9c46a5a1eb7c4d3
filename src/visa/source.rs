//! Storage backends for visa documents.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::visa::types::{VisaError, VisaType};

/// Where raw visa documents come from.
///
/// The loader owns caching; a source only knows how to fetch bytes.
pub trait VisaSource: Send + Sync {
    /// Read the raw document for `visa_type`.
    fn read(&self, visa_type: VisaType) -> Result<String, VisaError>;
}

/// Reads `<dir>/<visa_type>.json`.
#[derive(Debug, Clone)]
pub struct FsVisaSource {
    dir: PathBuf,
}

impl FsVisaSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, visa_type: VisaType) -> PathBuf {
        self.dir.join(format!("{}.json", visa_type))
    }
}

impl VisaSource for FsVisaSource {
    fn read(&self, visa_type: VisaType) -> Result<String, VisaError> {
        std::fs::read_to_string(self.path_for(visa_type)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => VisaError::NotFound(visa_type),
            _ => VisaError::Io {
                visa_type,
                source: e,
            },
        })
    }
}
