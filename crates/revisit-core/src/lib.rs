//! Shared configuration and process-level errors for the Revisit service.

pub mod config;
pub mod error;

pub use config::RevisitConfig;
pub use error::{CoreError, Result};
