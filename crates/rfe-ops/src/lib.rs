//! Remote mutation orchestration for rfe.
//!
//! Every filesystem change is delegated to a [`rfe_core::RemoteFs`]; this
//! crate sequences the calls, applies the local guards that veto a move
//! before it is sent, and keeps the single-slot clipboard and undo state.
//! Uploads report progress via channels, following the same pattern as the
//! other long-running operations.

mod clipboard;
mod error;
mod guard;
mod move_op;
mod mutate;
mod progress;
mod share;
mod undo;
mod upload;

pub use clipboard::{ClipboardMode, ClipboardSlot, PasteOutcome};
pub use error::{OpsError, OpsResult};
pub use guard::{MoveSkip, SkipKind, check_move};
pub use move_op::{DragPayload, MoveBatch, drop_on, move_batch};
pub use mutate::{create_directory, create_file, delete, rename};
pub use progress::{UploadComplete, UploadEvent, UploadProgress, percent_of};
pub use share::{AccessMode, ShareOptions, SharePanel};
pub use undo::UndoSlot;
pub use upload::start_upload;

/// Default channel buffer size for upload progress updates.
pub const UPLOAD_CHANNEL_SIZE: usize = 100;
