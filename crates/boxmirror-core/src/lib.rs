//! BoxMirror Core - Domain logic and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `RemoteItem`, `LeafKind`, `RemoteLock`, `FileSystemState`
//! - **Domain rules** - name sanitization and staleness classification
//! - **Port definitions** - Traits for adapters: `IRemoteTree`, `ILocalFileSystem`
//! - **Configuration** - YAML-backed `Config` with validation and a builder
//!
//! # Architecture
//!
//! The domain module contains pure functions with no I/O.
//! Ports define trait interfaces that adapter crates implement: the Box
//! adapter implements [`ports::IRemoteTree`], the sync crate implements
//! [`ports::ILocalFileSystem`] on top of `tokio::fs`.

pub mod config;
pub mod domain;
pub mod ports;
