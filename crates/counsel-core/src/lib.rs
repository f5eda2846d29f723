//! Counsel Core — domain models, repository and gateway traits, and the
//! system-wide error taxonomy for the consultation booking backend.

pub mod error;
pub mod gateway;
pub mod models;
pub mod repository;

pub use error::{CounselError, CounselResult};
