//! Domain entities and business logic
//!
//! Pure types and functions with no I/O:
//! - Newtypes for validated identifiers
//! - Remote tree nodes and their local materialization kinds
//! - Local target state
//! - Name sanitization and staleness classification
//! - Domain-specific error types

pub mod errors;
pub mod local_state;
pub mod newtypes;
pub mod remote_item;
pub mod sanitize;
pub mod staleness;

// Re-export commonly used types
pub use errors::DomainError;
pub use local_state::FileSystemState;
pub use newtypes::RemoteId;
pub use remote_item::{leaf_kind_for, ItemKind, LeafKind, RemoteItem, RemoteLock};
pub use sanitize::{disambiguate, sanitize, MAX_NAME_CHARS};
pub use staleness::{classify, is_stale, Staleness};
