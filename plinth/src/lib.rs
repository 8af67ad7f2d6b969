//! Plinth: Immediate-Mode Layout Engine
//!
//! Plinth turns a declarative element tree, rebuilt every frame, into
//! absolute rectangles and a flat list of backend-agnostic render commands:
//! - Flexbox-like sizing (fit, grow, fixed, percent) with padding, gaps and
//!   alignment
//! - Word wrapping through a pluggable text measurer
//! - Clipping and scroll memory keyed by stable element ids
//! - Hit-testing against the last laid-out frame
//!
//! # Architecture
//!
//! All per-frame data lives in storage charged against a fixed arena budget
//! and is released in O(1) at `begin_frame`. Problems during a frame never
//! panic: they are reported through the diagnostic handler and the frame
//! degrades (corrected values, empty output, or the previous frame's output).
//!
//! # Usage
//!
//! ```
//! use plinth::{Color, Declaration, Direction, Engine, Padding, Size, Sizing, TextStyle};
//!
//! let mut engine = Engine::initialize(Engine::min_memory_size() * 8, Size::new(800.0, 600.0), |d| {
//!     eprintln!("layout diagnostic: {d}");
//! })
//! .unwrap();
//!
//! engine.begin_frame();
//! engine.element(
//!     Declaration::new()
//!         .id("root")
//!         .size(Sizing::grow(), Sizing::grow())
//!         .padding(Padding::all(16.0))
//!         .direction(Direction::TopToBottom)
//!         .background(Color::rgb8(250, 250, 255)),
//!     |ui| ui.text("Hello", TextStyle::new().size(24.0)),
//! );
//! for command in engine.end_frame() {
//!     println!("{:?} at {:?}", command.kind(), command.bounding_box);
//! }
//! ```

// Core primitives
pub mod primitives;
pub mod id;

// Per-frame memory and diagnostics
pub mod arena;
pub mod diagnostics;

// Layout system
pub mod layout;
pub mod text;

// Output and queries
pub mod render;
pub mod snapshot;
pub mod scroll;

// Engine facade
pub mod config;
pub mod engine;
pub mod stats;

// Re-export core types
pub use primitives::{Color, Point, Rect, Size};
pub use id::ElementId;
pub use arena::Arena;
pub use diagnostics::{ArenaExhausted, Diagnostic, DiagnosticHandler, DiagnosticKind, EngineError};
pub use layout::{
    Alignment, Border, ChildAlignment, Clip, Declaration, Direction, ElementConfig, ImageConfig, ImageHandle, Padding,
    Sizing, TextSpan, TextStyle, TextWrap,
};
pub use text::{MonospaceMeasurer, TextMeasurer};
pub use render::{RenderCommand, RenderCommandKind, RenderCommands, RenderData};
pub use snapshot::LayoutSnapshot;
pub use config::EngineConfig;
pub use engine::Engine;
pub use stats::FrameStats;
