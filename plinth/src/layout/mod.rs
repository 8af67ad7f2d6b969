//! Layout system.
//!
//! # Architecture
//!
//! ```text
//! open/text/close -> builder (pre-order tree) -> solver (sizes, wrap, positions) -> emitter
//! ```
//!
//! The tree is rebuilt every frame. Nothing here survives `begin_frame` except
//! what the engine keeps on purpose (measurement cache, scroll memory).

pub mod declaration;
pub mod sizing;

pub(crate) mod builder;
pub(crate) mod flex;
pub(crate) mod solver;
pub(crate) mod tree;

pub use declaration::{
    Border, Clip, Declaration, ElementConfig, ImageConfig, ImageHandle, TextContent, TextStyle, TextWrap,
    BASE_FONT_SIZE,
};
pub use sizing::{Alignment, Axis, ChildAlignment, Direction, Padding, Sizing};
pub use tree::TextSpan;
