//! Visa requirements subsystem.
//!
//! # Data Flow
//! ```text
//! GET /api/visa/{type}/{country}
//!     → types.rs (VisaType parse, country key normalization)
//!     → loader.rs (cache hit? return : read via source.rs, parse, store)
//!     → VisaDocument lookup
//!
//! watcher.rs: file change in visa dir → cache cleared
//! ```

pub mod loader;
pub mod source;
pub mod types;
pub mod watcher;

pub use loader::{CacheStats, VisaCache, VisaLoader};
pub use source::{FsVisaSource, VisaSource};
pub use types::{
    normalize_country_key, CountryVisaInfo, UnknownVisaType, VisaDocument, VisaError, VisaType,
    VisaTypeDescriptor,
};
pub use watcher::DataWatcher;
