//! Render command emission.
//!
//! Walks the solved tree in paint order and produces a flat list of
//! backend-agnostic draw commands. Per element the order is fixed:
//! background, border, image, text lines, then (for clipping elements)
//! a scissor pair around the children.

use serde::Serialize;

use crate::arena::{Arena, COMMANDS_PER_ELEMENT, TEXT_BYTES_PER_ELEMENT};
use crate::diagnostics::ArenaExhausted;
use crate::id::ElementId;
use crate::layout::declaration::ImageHandle;
use crate::layout::tree::{LayoutTree, NodeId, TextSpan};
use crate::primitives::{Color, Rect};

/// One draw command. Array position is paint order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderCommand {
    pub id: ElementId,
    /// Absolute bounds.
    pub bounding_box: Rect,
    pub data: RenderData,
}

/// Kind-specific payload of a `RenderCommand`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum RenderData {
    Rectangle {
        color: Color,
        corner_radius: f32,
    },
    /// Stroke inside the bounding box.
    Border {
        color: Color,
        width: f32,
        corner_radius: f32,
    },
    /// One line of text. `span` indexes `RenderCommands::text`.
    Text {
        span: TextSpan,
        font_id: u16,
        font_size: f32,
        line_height: f32,
        color: Color,
    },
    Image {
        handle: ImageHandle,
        corner_radius: f32,
    },
    /// Clip subsequent commands to the bounding box until the matching end.
    ScissorStart,
    ScissorEnd,
}

/// Discriminant of `RenderData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RenderCommandKind {
    Rectangle,
    Border,
    Text,
    Image,
    ScissorStart,
    ScissorEnd,
}

impl RenderCommand {
    pub fn kind(&self) -> RenderCommandKind {
        match self.data {
            RenderData::Rectangle { .. } => RenderCommandKind::Rectangle,
            RenderData::Border { .. } => RenderCommandKind::Border,
            RenderData::Text { .. } => RenderCommandKind::Text,
            RenderData::Image { .. } => RenderCommandKind::Image,
            RenderData::ScissorStart => RenderCommandKind::ScissorStart,
            RenderData::ScissorEnd => RenderCommandKind::ScissorEnd,
        }
    }
}

/// Owned output of one frame: commands plus the text they reference.
#[derive(Debug, Default)]
pub(crate) struct CommandBuffer {
    pub commands: Vec<RenderCommand>,
    pub text: String,
}

impl CommandBuffer {
    /// Buffer preallocated for frames of up to `max_nodes` elements.
    pub fn with_capacity(max_nodes: usize) -> Self {
        Self {
            commands: Vec::with_capacity(max_nodes * COMMANDS_PER_ELEMENT),
            text: String::with_capacity(max_nodes * TEXT_BYTES_PER_ELEMENT),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.text.clear();
    }

    fn push(&mut self, arena: &mut Arena, command: RenderCommand) -> Result<(), ArenaExhausted> {
        arena.reserve_array::<RenderCommand>(1)?;
        self.commands.push(command);
        Ok(())
    }

    fn push_text(&mut self, arena: &mut Arena, text: &str) -> Result<TextSpan, ArenaExhausted> {
        arena.reserve(text.len())?;
        let start = self.text.len() as u32;
        self.text.push_str(text);
        Ok(TextSpan { start, len: text.len() as u32 })
    }

    pub fn view(&self) -> RenderCommands<'_> {
        RenderCommands {
            commands: &self.commands,
            text: &self.text,
        }
    }
}

/// Read-only view of a frame's commands, valid until the engine is next
/// mutated.
#[derive(Debug, Clone, Copy)]
pub struct RenderCommands<'a> {
    commands: &'a [RenderCommand],
    text: &'a str,
}

impl RenderCommands<'static> {
    pub(crate) const EMPTY: Self = RenderCommands { commands: &[], text: "" };
}

impl<'a> RenderCommands<'a> {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a RenderCommand> {
        self.commands.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'a, RenderCommand> {
        self.commands.iter()
    }

    pub fn as_slice(&self) -> &'a [RenderCommand] {
        self.commands
    }

    /// Resolve a text span. Out-of-range spans yield `""`.
    pub fn text(&self, span: TextSpan) -> &'a str {
        self.text.get(span.range()).unwrap_or("")
    }

    /// The string a `Text` command draws, if `command` is one.
    pub fn text_of(&self, command: &RenderCommand) -> Option<&'a str> {
        match command.data {
            RenderData::Text { span, .. } => Some(self.text(span)),
            _ => None,
        }
    }
}

impl<'a> IntoIterator for RenderCommands<'a> {
    type Item = &'a RenderCommand;
    type IntoIter = std::slice::Iter<'a, RenderCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

/// Emit commands for the solved tree into `out`, which is cleared first.
pub(crate) fn emit(tree: &LayoutTree, arena: &mut Arena, out: &mut CommandBuffer) -> Result<(), ArenaExhausted> {
    out.clear();
    // Open scissors: (subtree end, id, bounds).
    let mut clips: Vec<(NodeId, ElementId, Rect)> = Vec::new();

    for (index, node) in tree.nodes.iter().enumerate() {
        while let Some(&(end, id, bounds)) = clips.last() {
            if index < end {
                break;
            }
            out.push(arena, RenderCommand { id, bounding_box: bounds, data: RenderData::ScissorEnd })?;
            clips.pop();
        }

        let config = &node.config;
        let bounds = Rect::from_origin_size(node.position, node.size);
        let id = node.id;

        if let Some(color) = config.background {
            let data = RenderData::Rectangle { color, corner_radius: config.corner_radius };
            out.push(arena, RenderCommand { id, bounding_box: bounds, data })?;
        }

        if let Some(border) = config.border.filter(|b| b.width > 0.0) {
            let data = RenderData::Border {
                color: border.color,
                width: border.width,
                corner_radius: config.corner_radius,
            };
            out.push(arena, RenderCommand { id, bounding_box: bounds, data })?;
        }

        if let Some(image) = config.image {
            let data = RenderData::Image { handle: image.handle, corner_radius: config.corner_radius };
            out.push(arena, RenderCommand { id, bounding_box: bounds, data })?;
        }

        if let Some(leaf) = node.text {
            let x = bounds.x + config.padding.left;
            let mut y = bounds.y + config.padding.top;
            for line in tree.lines_of(index) {
                let span = out.push_text(arena, tree.text_of(line.span))?;
                let data = RenderData::Text {
                    span,
                    font_id: leaf.style.font_id,
                    font_size: leaf.style.font_size,
                    line_height: leaf.line_height,
                    color: leaf.style.color,
                };
                let bounding_box = Rect::new(x, y, line.width, leaf.line_height);
                out.push(arena, RenderCommand { id, bounding_box, data })?;
                y += leaf.line_height;
            }
        }

        if config.clip.is_active() {
            out.push(arena, RenderCommand { id, bounding_box: bounds, data: RenderData::ScissorStart })?;
            clips.push((node.subtree_end, id, bounds));
        }
    }

    while let Some((_, id, bounds)) = clips.pop() {
        out.push(arena, RenderCommand { id, bounding_box: bounds, data: RenderData::ScissorEnd })?;
    }
    Ok(())
}

// =========================================================================
// Tests
// =========================================================================
