//! Diagnostics channel and error types.
//!
//! Frame-level problems never abort the host. They are reported as
//! `Diagnostic` events through the handler registered at initialization,
//! and the engine degrades the current frame instead. Only engine
//! construction returns a hard `EngineError`.

use std::fmt;

use thiserror::Error;

use crate::id::ElementId;

/// Category of a frame diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The arena budget was exhausted mid-frame. The frame is abandoned and
    /// the previous frame's commands are returned.
    OutOfMemory,
    /// Unbalanced `open`/`close`, or a second root. The frame is abandoned
    /// and an empty command sequence is returned.
    MismatchedScope,
    /// A declaration carried an invalid value (negative padding, min > max,
    /// ...). The value is corrected and the frame continues.
    InvalidSizingConfig,
    /// Two elements declared the same explicit id in one frame.
    DuplicateId,
    /// A text or image element was given children. The payload is dropped.
    LeafWithChildren,
}

impl DiagnosticKind {
    /// Whether this diagnostic abandons the frame.
    pub fn is_fatal_to_frame(&self) -> bool {
        matches!(self, DiagnosticKind::OutOfMemory | DiagnosticKind::MismatchedScope)
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::OutOfMemory => "out of memory",
            DiagnosticKind::MismatchedScope => "mismatched scope",
            DiagnosticKind::InvalidSizingConfig => "invalid sizing config",
            DiagnosticKind::DuplicateId => "duplicate id",
            DiagnosticKind::LeafWithChildren => "leaf with children",
        };
        f.write_str(name)
    }
}

/// A structured diagnostic event.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// The element the diagnostic is about, when one is known.
    pub element: Option<ElementId>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            element: None,
        }
    }

    pub fn with_element(mut self, element: ElementId) -> Self {
        self.element = Some(element);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Caller-supplied diagnostic callback.
pub type DiagnosticHandler = Box<dyn FnMut(&Diagnostic)>;

/// Routes diagnostics to the handler and to `tracing`.
pub(crate) struct Diagnostics {
    handler: DiagnosticHandler,
    /// Frame-fatal kinds already raised this frame.
    raised: Vec<DiagnosticKind>,
    count: u32,
}

impl Diagnostics {
    pub(crate) fn new(handler: DiagnosticHandler) -> Self {
        Self {
            handler,
            raised: Vec::new(),
            count: 0,
        }
    }

    pub(crate) fn begin_frame(&mut self) {
        self.raised.clear();
        self.count = 0;
    }

    /// Report a diagnostic. Frame-fatal kinds are deduplicated per frame.
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.kind.is_fatal_to_frame() {
            if self.raised.contains(&diagnostic.kind) {
                return;
            }
            self.raised.push(diagnostic.kind);
        }
        tracing::warn!(kind = %diagnostic.kind, element = ?diagnostic.element, "{}", diagnostic.message);
        self.count += 1;
        (self.handler)(&diagnostic);
    }

    /// Diagnostics raised since the frame began.
    pub(crate) fn count(&self) -> u32 {
        self.count
    }
}

/// Arena budget exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("arena exhausted: requested {requested} bytes with {remaining} remaining")]
pub struct ArenaExhausted {
    pub requested: usize,
    pub remaining: usize,
}

/// Errors returned when constructing an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("arena too small: {provided} bytes provided, at least {required} required")]
    ArenaTooSmall { provided: usize, required: usize },

    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
}
