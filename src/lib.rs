pub mod api;
pub mod community;
pub mod config;
pub mod error;
pub mod github;

pub use error::ScanError;
