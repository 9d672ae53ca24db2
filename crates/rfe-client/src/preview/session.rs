//! The single preview/editor session.

use std::sync::Arc;

use rfe_core::{Entry, FileType, RemoteError, RemoteFs, RemoteResult, language_for};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::widget::{EditorWidget, WidgetFactory};
use crate::generation::{Generation, Ticket};

/// Toast text for content that cannot be shown.
pub const UNSUPPORTED_MESSAGE: &str = "Cannot preview this file. Please download and open locally.";

/// Errors that close or block the preview.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreviewError {
    /// Neither a known preview type nor readable as text.
    #[error("Cannot preview this file. Please download and open locally.")]
    Unsupported,

    /// The content fetch or save failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Nothing editable is open.
    #[error("No text document is open")]
    NoDocument,
}

impl PreviewError {
    /// Text shown to the user in a toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// What the open document renders as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewBody {
    /// Text held by the live editor widget.
    Text { language: &'static str },
    /// Media rendered from a resource URL.
    Media { url: String },
}

/// The document currently shown.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenDocument {
    pub path: String,
    pub name: String,
    pub file_type: FileType,
    pub editable: bool,
    pub body: PreviewBody,
}

/// A text fetch in flight.
#[derive(Debug, Clone)]
pub struct PendingOpen {
    ticket: Ticket,
    path: String,
    name: String,
    file_type: FileType,
    editable: bool,
}

impl PendingOpen {
    /// File being fetched.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// First half of an open.
#[derive(Debug, Clone)]
pub enum OpenStep {
    /// Directories are not previewed.
    Ignored,
    /// Media is ready; nothing to fetch.
    Ready,
    /// Text content must be fetched and passed to [`EditorSession::finish_open`].
    Fetch(PendingOpen),
}

/// Result of an open.
#[derive(Debug, Clone, PartialEq)]
pub enum OpenOutcome {
    Opened,
    Ignored,
    /// A newer open or a close happened while fetching.
    Stale,
    /// The session closed itself.
    Failed(PreviewError),
}

/// At most one open document and one live widget.
pub struct EditorSession {
    factory: Arc<dyn WidgetFactory>,
    document: Option<OpenDocument>,
    widget: Option<Box<dyn EditorWidget>>,
    generation: Generation,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("document", &self.document)
            .field("has_widget", &self.widget.is_some())
            .finish()
    }
}

impl EditorSession {
    /// Create a closed session.
    pub fn new(factory: Arc<dyn WidgetFactory>) -> Self {
        Self {
            factory,
            document: None,
            widget: None,
            generation: Generation::new(),
        }
    }

    /// The open document, if any.
    pub fn document(&self) -> Option<&OpenDocument> {
        self.document.as_ref()
    }

    /// Whether a document is shown.
    pub fn is_open(&self) -> bool {
        self.document.is_some()
    }

    /// Whether the open document accepts edits.
    pub fn is_editable(&self) -> bool {
        self.document.as_ref().is_some_and(|d| d.editable)
    }

    /// The live editor widget.
    pub fn widget(&self) -> Option<&dyn EditorWidget> {
        self.widget.as_deref()
    }

    /// Mutable access to the live editor widget.
    pub fn widget_mut(&mut self) -> Option<&mut (dyn EditorWidget + 'static)> {
        self.widget.as_deref_mut()
    }

    /// Start opening `entry`, closing whatever was shown.
    pub fn begin_open(&mut self, entry: &Entry, editable: bool, remote: &dyn RemoteFs) -> OpenStep {
        if entry.is_dir {
            return OpenStep::Ignored;
        }
        self.close();

        let file_type = entry.file_type();
        if file_type.is_media() {
            debug!(path = %entry.path, %file_type, "Opening media preview");
            self.document = Some(OpenDocument {
                path: entry.path.clone(),
                name: entry.name.to_string(),
                file_type,
                editable: false,
                body: PreviewBody::Media {
                    url: remote.resource_url(&entry.path),
                },
            });
            return OpenStep::Ready;
        }

        let ticket = self.generation.begin();
        debug!(path = %entry.path, %file_type, "Fetching preview content");
        OpenStep::Fetch(PendingOpen {
            ticket,
            path: entry.path.clone(),
            name: entry.name.to_string(),
            file_type,
            editable,
        })
    }

    /// Finish a text open with the fetched content.
    pub fn finish_open(&mut self, pending: PendingOpen, result: RemoteResult<String>) -> OpenOutcome {
        if !self.generation.is_current(pending.ticket) {
            debug!(
                path = %pending.path,
                stale = pending.ticket.get(),
                current = self.generation.current(),
                "Discarding stale preview content"
            );
            return OpenOutcome::Stale;
        }

        let content = match result {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %pending.path, error = %e, "Preview fetch failed");
                self.close();
                let error = if pending.file_type == FileType::Unsupported {
                    PreviewError::Unsupported
                } else {
                    PreviewError::Remote(e)
                };
                return OpenOutcome::Failed(error);
            }
        };

        let language = language_for(&pending.name);
        self.widget = Some(self.factory.create(&content, !pending.editable, language));
        self.document = Some(OpenDocument {
            path: pending.path,
            name: pending.name,
            file_type: FileType::Text,
            editable: pending.editable,
            body: PreviewBody::Text { language },
        });
        OpenOutcome::Opened
    }

    /// Open `entry` read-only.
    pub async fn open(&mut self, entry: &Entry, remote: &dyn RemoteFs) -> OpenOutcome {
        self.open_with(entry, false, remote).await
    }

    /// Open a text file directly in editable mode.
    pub async fn edit(&mut self, entry: &Entry, remote: &dyn RemoteFs) -> OpenOutcome {
        self.open_with(entry, true, remote).await
    }

    async fn open_with(&mut self, entry: &Entry, editable: bool, remote: &dyn RemoteFs) -> OpenOutcome {
        match self.begin_open(entry, editable, remote) {
            OpenStep::Ignored => OpenOutcome::Ignored,
            OpenStep::Ready => OpenOutcome::Opened,
            OpenStep::Fetch(pending) => {
                let result = remote.read(pending.path()).await;
                self.finish_open(pending, result)
            }
        }
    }

    /// Toggle editing on the live widget.
    pub fn set_editable(&mut self, editable: bool) {
        let Some(doc) = self.document.as_mut() else {
            return;
        };
        if !matches!(doc.body, PreviewBody::Text { .. }) {
            return;
        }
        doc.editable = editable;
        if let Some(widget) = self.widget.as_mut() {
            widget.set_read_only(!editable);
        }
    }

    /// Write the widget content back and return to read-only mode.
    pub async fn save(&mut self, remote: &dyn RemoteFs) -> Result<(), PreviewError> {
        let (path, content) = match (&self.document, &self.widget) {
            (Some(doc), Some(widget)) => (doc.path.clone(), widget.content()),
            _ => return Err(PreviewError::NoDocument),
        };

        remote.save(&path, &content).await?;
        info!(path = %path, bytes = content.len(), "Saved file");
        self.set_editable(false);
        Ok(())
    }

    /// The embedding view could not render the media resource.
    pub fn media_failed(&mut self) -> Option<PreviewError> {
        let is_media = self
            .document
            .as_ref()
            .is_some_and(|d| matches!(d.body, PreviewBody::Media { .. }));
        if !is_media {
            return None;
        }
        self.close();
        Some(PreviewError::Unsupported)
    }

    /// Dispose the widget and forget the document.
    pub fn close(&mut self) {
        if let Some(mut widget) = self.widget.take() {
            widget.dispose();
        }
        if let Some(doc) = self.document.take() {
            debug!(path = %doc.path, "Preview closed");
        }
        self.generation.invalidate();
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        if let Some(mut widget) = self.widget.take() {
            widget.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::TextBufferFactory;
    use rfe_core::mock::MockRemote;

    fn session() -> (EditorSession, TextBufferFactory) {
        let factory = TextBufferFactory::new();
        (EditorSession::new(Arc::new(factory.clone())), factory)
    }

    #[tokio::test]
    async fn test_text_opens_read_only() {
        let remote = MockRemote::new().with_file(r"C:\a.txt", "hello");
        let (mut session, _) = session();

        let entry = Entry::file("a.txt", r"C:\a.txt", 5);
        assert_eq!(session.open(&entry, &remote).await, OpenOutcome::Opened);
        assert!(!session.is_editable());
        let widget = session.widget().unwrap();
        assert!(widget.is_read_only());
        assert_eq!(widget.content(), "hello");
    }

    #[tokio::test]
    async fn test_media_uses_resource_url() {
        let remote = MockRemote::new();
        let (mut session, factory) = session();

        let entry = Entry::file("p.png", r"C:\p.png", 5);
        assert_eq!(session.open(&entry, &remote).await, OpenOutcome::Opened);
        let doc = session.document().unwrap();
        assert_eq!(doc.file_type, FileType::Image);
        assert!(matches!(doc.body, PreviewBody::Media { ref url } if url.contains("p.png")));
        assert_eq!(factory.created(), 0);

        assert_eq!(session.media_failed(), Some(PreviewError::Unsupported));
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn test_unsupported_falls_back_to_text() {
        let remote = MockRemote::new().with_file(r"C:\Makefile", "all:");
        let (mut session, _) = session();

        let entry = Entry::file("Makefile", r"C:\Makefile", 4);
        assert_eq!(session.open(&entry, &remote).await, OpenOutcome::Opened);
        assert_eq!(session.document().unwrap().file_type, FileType::Text);

        let entry = Entry::file("blob.bin", r"C:\blob.bin", 4);
        assert_eq!(
            session.open(&entry, &remote).await,
            OpenOutcome::Failed(PreviewError::Unsupported)
        );
        assert!(!session.is_open());
        assert!(session.widget().is_none());
    }

    #[tokio::test]
    async fn test_second_open_replaces_widget() {
        let remote = MockRemote::new()
            .with_file(r"C:\a.txt", "first")
            .with_file(r"C:\b.txt", "second");
        let (mut session, factory) = session();

        let first = Entry::file("a.txt", r"C:\a.txt", 5);
        let second = Entry::file("b.txt", r"C:\b.txt", 6);
        assert_eq!(session.open(&first, &remote).await, OpenOutcome::Opened);
        assert_eq!(session.open(&second, &remote).await, OpenOutcome::Opened);

        assert_eq!(factory.created(), 2);
        assert_eq!(factory.live(), 1);
        assert_eq!(session.widget().unwrap().content(), "second");

        session.close();
        assert_eq!(factory.live(), 0);
    }

    #[tokio::test]
    async fn test_toggle_editable_keeps_widget() {
        let remote = MockRemote::new().with_file(r"C:\a.txt", "hello");
        let (mut session, factory) = session();

        let entry = Entry::file("a.txt", r"C:\a.txt", 5);
        session.open(&entry, &remote).await;
        assert!(session.widget().unwrap().is_read_only());

        session.set_editable(true);
        assert!(session.is_editable());
        assert!(!session.widget().unwrap().is_read_only());
        assert_eq!(factory.created(), 1);

        session.widget_mut().unwrap().set_content("edited");
        session.set_editable(false);
        assert!(session.widget().unwrap().is_read_only());
        assert_eq!(session.widget().unwrap().content(), "edited");
        assert_eq!(factory.created(), 1);
        assert_eq!(factory.live(), 1);
    }

    #[test]
    fn test_stale_content_is_discarded() {
        let remote = MockRemote::new();
        let (mut session, factory) = session();

        let first = Entry::file("a.txt", r"C:\a.txt", 1);
        let second = Entry::file("b.txt", r"C:\b.txt", 1);
        let OpenStep::Fetch(old) = session.begin_open(&first, false, &remote) else {
            panic!("expected fetch");
        };
        let OpenStep::Fetch(new) = session.begin_open(&second, false, &remote) else {
            panic!("expected fetch");
        };

        assert_eq!(session.finish_open(old, Ok("a".into())), OpenOutcome::Stale);
        assert_eq!(session.finish_open(new, Ok("b".into())), OpenOutcome::Opened);
        assert_eq!(session.document().unwrap().name, "b.txt");
        assert_eq!(factory.live(), 1);
    }
}
