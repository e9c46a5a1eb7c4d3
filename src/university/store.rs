//! Read-only access to the generated university data directory.
//!
//! # Layout
//! ```text
//! <dir>/summary.json        Summary index
//! <dir>/<Country_Name>.json CountryDocument per country
//! ```

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::config::AggregationPolicy;
use crate::observability::metrics;
use crate::university::types::{
    CountryDocument, CountrySummary, Summary, University, UniversityError, UniversityResult,
};

pub const SUMMARY_FILE: &str = "summary.json";

/// Universities gathered from several country files.
#[derive(Debug, Default)]
pub struct Aggregate {
    /// Records in candidate order, each file's records in file order.
    pub universities: Vec<University>,
    /// Files that existed but could not be read (best-effort policy only).
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UniversityStore {
    dir: PathBuf,
    policy: AggregationPolicy,
}

impl UniversityStore {
    pub fn new(dir: impl Into<PathBuf>, policy: AggregationPolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn policy(&self) -> AggregationPolicy {
        self.policy
    }

    /// Load the summary index. Absent index means the data was never generated.
    pub fn summary(&self) -> UniversityResult<Summary> {
        self.read_json(SUMMARY_FILE)?
            .ok_or(UniversityError::DataNotFound)
    }

    /// Load one per-country document; `Ok(None)` when the file does not exist.
    pub fn country(&self, file_name: &str) -> UniversityResult<Option<CountryDocument>> {
        self.read_json(file_name)
    }

    /// Concatenate the records of every candidate country.
    ///
    /// Missing files are skipped silently. Unreadable files are skipped and
    /// reported under [`AggregationPolicy::BestEffort`], and abort the whole
    /// call under [`AggregationPolicy::FailFast`].
    pub fn collect<'a, I>(&self, candidates: I) -> UniversityResult<Aggregate>
    where
        I: IntoIterator<Item = &'a CountrySummary>,
    {
        let mut aggregate = Aggregate::default();

        for entry in candidates {
            match self.country(&entry.file_name) {
                Ok(Some(document)) => aggregate.universities.extend(document.universities),
                Ok(None) => {
                    tracing::debug!(file = %entry.file_name, "Country file missing, skipping");
                }
                Err(e) => match self.policy {
                    AggregationPolicy::FailFast => return Err(e),
                    AggregationPolicy::BestEffort => {
                        tracing::warn!(file = %entry.file_name, error = %e, "Skipping unreadable country file");
                        metrics::record_skipped_file();
                        aggregate.skipped.push(entry.file_name.clone());
                    }
                },
            }
        }

        Ok(aggregate)
    }

    fn read_json<T: DeserializeOwned>(&self, file_name: &str) -> UniversityResult<Option<T>> {
        if Path::new(file_name).file_name() != Some(OsStr::new(file_name)) {
            return Err(UniversityError::Parse {
                file: file_name.to_string(),
                reason: "not a plain file name".to_string(),
            });
        }

        let content = match std::fs::read_to_string(self.dir.join(file_name)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(UniversityError::Io {
                    file: file_name.to_string(),
                    source: e,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| UniversityError::Parse {
                file: file_name.to_string(),
                reason: e.to_string(),
            })
    }
}
