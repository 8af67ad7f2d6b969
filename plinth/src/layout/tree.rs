//! Frame-scoped layout tree storage.
//!
//! Nodes live in one vector in open order, which is a depth-first pre-order
//! of the tree: every child has a larger index than its parent, and a node's
//! subtree occupies the contiguous range `index..subtree_end`. Child lists are
//! contiguous ranges of `children`, filled in when a node closes.

use serde::{Deserialize, Serialize};

use crate::arena::{Arena, TEXT_BYTES_PER_ELEMENT};
use crate::diagnostics::ArenaExhausted;
use crate::id::ElementId;
use crate::primitives::{Point, Size};

use super::declaration::{ElementConfig, TextStyle};
use super::sizing::Axis;

/// Index of a node in the frame's node vector.
pub type NodeId = usize;

/// Byte range into a text buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: u32,
    pub len: u32,
}

impl TextSpan {
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }

    /// Sub-span relative to this span's start.
    #[inline]
    pub(crate) fn slice(&self, start: u32, len: u32) -> TextSpan {
        TextSpan { start: self.start + start, len }
    }
}

/// Text payload of a leaf, with its unwrapped measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TextLeaf {
    pub span: TextSpan,
    pub style: TextStyle,
    /// Single-line (or newline-split) size before wrapping.
    pub preferred: Size,
    /// Widest unbreakable word; the floor wrapping can shrink to.
    pub min_width: f32,
    pub line_height: f32,
}

impl TextLeaf {
    /// Whether the solver may narrow this leaf below its preferred width.
    #[inline]
    pub fn can_shrink(&self) -> bool {
        self.style.wrap == super::declaration::TextWrap::Words && self.min_width < self.preferred.width
    }
}

/// One line of wrapped text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WrappedLine {
    pub span: TextSpan,
    pub width: f32,
}

/// A node of the frame's layout tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutNode {
    pub id: ElementId,
    pub config: ElementConfig,
    pub text: Option<TextLeaf>,
    /// Children counted while open; moved to `children` on close.
    pub child_count: u32,
    pub children_start: usize,
    /// One past the last node of this subtree.
    pub subtree_end: NodeId,
    /// Bottom-up content size from the fit pass.
    pub fit: Size,
    /// Narrowest width the node can be shrunk to without breaking words.
    pub min_width: f32,
    /// Final size.
    pub size: Size,
    /// Final absolute position (top-left).
    pub position: Point,
    /// Extent of the children, used for scroll limits.
    pub content_size: Size,
    pub lines_start: usize,
    pub lines_len: usize,
}

impl LayoutNode {
    pub fn new(id: ElementId, config: ElementConfig) -> Self {
        Self {
            id,
            config,
            text: None,
            child_count: 0,
            children_start: 0,
            subtree_end: 0,
            fit: Size::ZERO,
            min_width: 0.0,
            size: Size::ZERO,
            position: Point::ORIGIN,
            content_size: Size::ZERO,
            lines_start: 0,
            lines_len: 0,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.child_count == 0
    }
}

/// Read or write one component of a `Size`/`Point` by axis.
pub(crate) trait AxisExt {
    fn get(&self, axis: Axis) -> f32;
    fn set(&mut self, axis: Axis, value: f32);
}

impl AxisExt for Size {
    #[inline]
    fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    #[inline]
    fn set(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Horizontal => self.width = value,
            Axis::Vertical => self.height = value,
        }
    }
}

impl AxisExt for Point {
    #[inline]
    fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    #[inline]
    fn set(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Horizontal => self.x = value,
            Axis::Vertical => self.y = value,
        }
    }
}

/// All per-frame layout storage. Every push is charged to the arena first.
#[derive(Debug, Default)]
pub(crate) struct LayoutTree {
    pub nodes: Vec<LayoutNode>,
    pub children: Vec<NodeId>,
    pub text: String,
    pub lines: Vec<WrappedLine>,
}

impl LayoutTree {
    /// Storage preallocated for frames of up to `max_nodes` elements.
    pub fn with_capacity(max_nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(max_nodes),
            children: Vec::with_capacity(max_nodes),
            text: String::with_capacity(max_nodes * TEXT_BYTES_PER_ELEMENT),
            lines: Vec::with_capacity(max_nodes),
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.children.clear();
        self.text.clear();
        self.lines.clear();
    }

    pub fn push_node(&mut self, arena: &mut Arena, node: LayoutNode) -> Result<NodeId, ArenaExhausted> {
        arena.reserve_array::<LayoutNode>(1)?;
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }

    pub fn push_child_slot(&mut self, arena: &mut Arena, child: NodeId) -> Result<(), ArenaExhausted> {
        arena.reserve_array::<NodeId>(1)?;
        self.children.push(child);
        Ok(())
    }

    pub fn push_text(&mut self, arena: &mut Arena, text: &str) -> Result<TextSpan, ArenaExhausted> {
        arena.reserve(text.len())?;
        let start = self.text.len() as u32;
        self.text.push_str(text);
        Ok(TextSpan { start, len: text.len() as u32 })
    }

    pub fn push_line(&mut self, arena: &mut Arena, line: WrappedLine) -> Result<(), ArenaExhausted> {
        arena.reserve_array::<WrappedLine>(1)?;
        self.lines.push(line);
        Ok(())
    }

    /// Children of `node` in declaration order.
    #[inline]
    pub fn children_of(&self, node: NodeId) -> &[NodeId] {
        let n = &self.nodes[node];
        &self.children[n.children_start..n.children_start + n.child_count as usize]
    }

    #[inline]
    pub fn text_of(&self, span: TextSpan) -> &str {
        &self.text[span.range()]
    }

    #[inline]
    pub fn lines_of(&self, node: NodeId) -> &[WrappedLine] {
        let n = &self.nodes[node];
        &self.lines[n.lines_start..n.lines_start + n.lines_len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_ranges() {
        let span = TextSpan { start: 4, len: 6 };
        assert_eq!(span.range(), 4..10);
        assert_eq!(span.slice(2, 3), TextSpan { start: 6, len: 3 });
    }

    #[test]
    fn axis_access() {
        let mut s = Size::new(1.0, 2.0);
        s.set(Axis::Vertical, 5.0);
        assert_eq!(s.get(Axis::Horizontal), 1.0);
        assert_eq!(s.get(Axis::Vertical), 5.0);

        let mut p = Point::ORIGIN;
        p.set(Axis::Horizontal, 3.0);
        assert_eq!(p, Point::new(3.0, 0.0));
    }

    #[test]
    fn pushes_charge_the_arena() {
        let mut arena = Arena::with_capacity(Arena::min_memory_size()).unwrap();
        let mut tree = LayoutTree::default();
        let node = LayoutNode::new(ElementId::named("a"), ElementConfig::default());
        let id = tree.push_node(&mut arena, node).unwrap();
        assert_eq!(id, 0);
        let after_node = arena.used();
        assert!(after_node >= std::mem::size_of::<LayoutNode>());

        let span = tree.push_text(&mut arena, "hello").unwrap();
        assert_eq!(tree.text_of(span), "hello");
        assert_eq!(arena.used(), after_node + 5);
    }

    #[test]
    fn text_push_fails_when_budget_is_spent() {
        let mut arena = Arena::with_capacity(Arena::min_memory_size()).unwrap();
        let remaining = arena.remaining();
        arena.reserve(remaining - 2).unwrap();
        let mut tree = LayoutTree::default();
        assert!(tree.push_text(&mut arena, "abc").is_err());
        assert!(tree.text.is_empty());
    }
}
