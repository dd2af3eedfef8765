//! Persistence collaborator for the media pipeline.
//!
//! This crate provides:
//! - The `ShowStore` trait the pipeline drives record changes through
//! - The on-disk show directory layout
//! - Cascade removal of media records and their derived artifacts

pub mod error;
pub mod layout;
pub mod ops;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{StoreError, StoreResult};
pub use layout::ShowLayout;
pub use ops::{discard_media, purge_show_media, remove_media_artifacts};
pub use store::ShowStore;
