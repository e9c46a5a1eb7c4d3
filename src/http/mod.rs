//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID, request span)
//!     → visa.rs / university.rs / system.rs handlers
//!     → params.rs (raw query strings → typed values)
//!     → response.rs (domain errors → JSON error bodies)
//!     → Send to client
//! ```

pub mod params;
pub mod request;
pub mod response;
pub mod server;
pub mod system;
pub mod university;
pub mod visa;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{ApiServer, AppState};
