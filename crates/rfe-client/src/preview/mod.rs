//! File preview and in-place editing.
//!
//! Text is loaded into an editor widget created through a [`WidgetFactory`];
//! media types are shown from a resource URL without fetching content.

mod session;
mod widget;

pub use session::{
    EditorSession, OpenDocument, OpenOutcome, OpenStep, PendingOpen, PreviewBody, PreviewError,
    UNSUPPORTED_MESSAGE,
};
pub use widget::{EditorWidget, TextBuffer, TextBufferFactory, WidgetFactory};
