//! University rankings subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP params
//!     → catalog.rs (search / top / per-country / regions)
//!     → store.rs (summary.json, per-country files)
//!     → query.rs (filters, stable sort, pagination)
//! ```

pub mod catalog;
pub mod flags;
pub mod query;
pub mod store;
pub mod types;

pub use catalog::{Catalog, CountryListing, SearchRequest, SearchResults, TopRequest, TopResults};
pub use query::{Filters, Page, PageRequest, SortField, SortOrder, SortSpec};
pub use store::UniversityStore;
pub use types::{CountryDocument, CountrySummary, Summary, University, UniversityError};
