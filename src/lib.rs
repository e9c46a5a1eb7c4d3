//! Visa requirements and university rankings API library.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod university;
pub mod visa;

pub use config::schema::ServiceConfig;
pub use http::ApiServer;
pub use lifecycle::Shutdown;
