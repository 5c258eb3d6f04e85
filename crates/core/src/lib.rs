//! Core types for localhist
//!
//! This crate defines the data model shared by the store readers, the
//! change-log decoder and the orphan analysis:
//! - ContentRecord: One decoded blob from a content store
//! - StorageFormat: Which on-disk generation a content store uses
//! - ChangeRecord / ChangeSet / Change / ChangeKind: Decoded change-log entries
//! - ContentReference: A change that points at a content id
//! - OrphanStatus: Verdict produced by the classifier
//! - limits: Fixed sizes and sanity ceilings of the on-disk formats

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod change;
pub mod limits;
pub mod reference;
pub mod text;
pub mod types;

pub use change::{Change, ChangeKind, ChangeRecord, ChangeSet};
pub use reference::{ContentReference, OrphanStatus};
pub use text::looks_like_text;
pub use types::{ContentId, ContentRecord, StorageFormat};
