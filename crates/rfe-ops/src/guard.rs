//! Guards that veto a move before it reaches the server.

use std::fmt;

use rfe_core::path;

/// A move that was skipped locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSkip {
    /// The path that would have moved.
    pub source: String,
    /// The directory it was dropped on.
    pub destination: String,
    /// Why it was skipped.
    pub kind: SkipKind,
}

impl MoveSkip {
    /// Create a new skip record.
    pub fn new(source: impl Into<String>, destination: impl Into<String>, kind: SkipKind) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            kind,
        }
    }
}

/// The reason a move was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipKind {
    /// Source and destination are the same path.
    SameFile,
    /// The destination lies inside the source.
    SourceIsAncestor,
}

impl fmt::Display for SkipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SameFile => write!(f, "Source and destination are the same"),
            Self::SourceIsAncestor => write!(f, "Cannot move a folder into itself"),
        }
    }
}

/// Check whether moving `source` into `destination` must be skipped.
pub fn check_move(source: &str, destination: &str) -> Option<MoveSkip> {
    if path::same_path(source, destination) {
        return Some(MoveSkip::new(source, destination, SkipKind::SameFile));
    }
    if path::is_child_of(destination, source) {
        return Some(MoveSkip::new(source, destination, SkipKind::SourceIsAncestor));
    }
    None
}
