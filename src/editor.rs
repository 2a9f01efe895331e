//! Capability traits implemented by the editor host.
//!
//! The session store never talks to the editor directly; it reads the
//! active document and posts transient status messages through these
//! seams, which keeps the store testable outside the editor process.

/// Access to the currently focused document.
pub trait DocumentSource: Send + Sync {
  /// Full text of the active document, or `None` when no document has
  /// focus.
  fn active_document_text(&self) -> Option<String>;
}

/// A headless source: there is never an active document.
pub struct NoActiveDocument;

impl DocumentSource for NoActiveDocument {
  fn active_document_text(&self) -> Option<String> {
    None
  }
}

/// Sink for short-lived, purely informational status messages.
pub trait StatusSink: Send + Sync {
  fn show(&self, message: &str);
}

/// Discards status messages.
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
  fn show(&self, _message: &str) {}
}

/// Routes status messages to the tracing log instead of the UI.
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
  fn show(&self, message: &str) {
    tracing::debug!(message, "status");
  }
}
