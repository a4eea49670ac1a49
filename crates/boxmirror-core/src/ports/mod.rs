//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the sync engine
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteTree`] - Remote tree listing, content streaming, unlocking (Box)
//! - [`ILocalFileSystem`] - Local target state, directories, file sinks

pub mod local_filesystem;
pub mod remote_tree;

pub use local_filesystem::{FileSink, FileSystemState, ILocalFileSystem};
pub use remote_tree::{ByteStream, IRemoteTree, RemoteError};
