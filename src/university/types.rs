//! University dataset types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One ranked university, as generated by the offline transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    /// `<country>_<ordinal>`, stable per generation run.
    pub id: String,
    pub rank: u32,
    #[serde(default)]
    pub ranking: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    pub country: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub tuition_fee: u32,
    #[serde(default)]
    pub application_fee: u32,
    #[serde(default)]
    pub application_open: bool,
    #[serde(default)]
    pub application_url: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub is_watchlisted: bool,
}

/// Contents of one per-country file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDocument {
    pub country: String,
    #[serde(default)]
    pub total_universities: usize,
    pub universities: Vec<University>,
}

/// Index entry pointing at a per-country file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    pub name: String,
    pub count: usize,
    pub file_name: String,
}

/// Contents of `summary.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_countries: usize,
    pub total_universities: usize,
    /// Sorted by descending `count`.
    pub countries: Vec<CountrySummary>,
}

/// Errors raised by the university store and query pipeline.
#[derive(Debug, Error)]
pub enum UniversityError {
    /// The summary index is missing: preprocessing has not been run.
    #[error("University data not found. Please run the CSV parser first.")]
    DataNotFound,

    #[error("Country not found: {0}")]
    CountryNotFound(String),

    /// Caller supplied unusable parameters.
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Failed to parse {file}: {reason}")]
    Parse { file: String, reason: String },

    #[error("Failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

pub type UniversityResult<T> = Result<T, UniversityError>;

/// Derive a per-country file name from a display name.
///
/// Every character outside `[A-Za-z0-9]` becomes `_`.
pub fn country_file_name(country: &str) -> String {
    let mut name: String = country
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    name.push_str(".json");
    name
}
