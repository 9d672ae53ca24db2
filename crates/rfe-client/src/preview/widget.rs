//! Editor widget seam.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A live text editor instance owned by the preview session.
pub trait EditorWidget: Send {
    /// Current text, including unsaved edits.
    fn content(&self) -> String;

    /// Replace the whole text.
    fn set_content(&mut self, text: &str);

    /// Apply or lift the read-only flag without rebuilding the widget.
    fn set_read_only(&mut self, read_only: bool);

    /// Whether the widget rejects edits.
    fn is_read_only(&self) -> bool;

    /// Release the instance. Called exactly once, before the next one is created.
    fn dispose(&mut self);
}

/// Creates editor widgets.
pub trait WidgetFactory: Send + Sync {
    /// Build a widget showing `content` with highlighting for `language`.
    fn create(&self, content: &str, read_only: bool, language: &'static str)
    -> Box<dyn EditorWidget>;
}

/// In-memory text buffer used by the command line and by tests.
#[derive(Debug)]
pub struct TextBuffer {
    text: String,
    read_only: bool,
    language: &'static str,
    live: Arc<AtomicUsize>,
    disposed: bool,
}

impl TextBuffer {
    /// Language id the buffer was created with.
    pub fn language(&self) -> &'static str {
        self.language
    }
}

impl EditorWidget for TextBuffer {
    fn content(&self) -> String {
        self.text.clone()
    }

    fn set_content(&mut self, text: &str) {
        if !self.read_only {
            self.text = text.to_string();
        }
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Factory for [`TextBuffer`] widgets that counts live instances.
#[derive(Debug, Clone, Default)]
pub struct TextBufferFactory {
    live: Arc<AtomicUsize>,
    created: Arc<AtomicUsize>,
}

impl TextBufferFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widgets created and not yet disposed.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Widgets created in total.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl WidgetFactory for TextBufferFactory {
    fn create(
        &self,
        content: &str,
        read_only: bool,
        language: &'static str,
    ) -> Box<dyn EditorWidget> {
        self.live.fetch_add(1, Ordering::SeqCst);
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(TextBuffer {
            text: content.to_string(),
            read_only,
            language,
            live: Arc::clone(&self.live),
            disposed: false,
        })
    }
}
