//! Ingestion orchestration for the brick-wall media pipeline.
//!
//! This crate provides:
//! - Upload admission checks against a show's playback contract
//! - The ingestion state machine with guaranteed rollback on failure

pub mod error;
pub mod ingest;
pub mod validate;

pub use error::{IngestError, IngestResult};
pub use ingest::{ingest_upload, IngestRequest, IngestState};
pub use validate::validate_upload;
