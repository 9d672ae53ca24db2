//! Core types and traits for rfe.
//!
//! This crate provides the data model shared by every rfe crate: directory
//! entries, the remote path model, preview classification, the
//! [`RemoteFs`] collaborator trait and client configuration.

mod config;
mod entry;
mod error;
mod file_type;
pub mod path;
mod remote;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use entry::{Entry, epoch_to_utc};
pub use error::{RemoteError, RemoteResult};
pub use file_type::{FileType, language_for};
pub use path::Breadcrumb;
pub use remote::{
    MetaUpdate, MoveReceipt, ProgressFn, RemoteFs, ShareRequest, ShareResponse, StatInfo,
    SystemStats, UploadFile,
};
