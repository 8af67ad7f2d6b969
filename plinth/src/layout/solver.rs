//! Box-model solver.
//!
//! Turns the declared tree into absolute rectangles. Widths are solved
//! first, then text is wrapped to its final width, then heights are solved
//! (so wrapped text contributes its real height), then positions.
//!
//! Nodes are stored in pre-order, so each per-axis pass is a flat loop:
//! the bottom-up fit pass walks indices in reverse, the top-down grow and
//! position passes walk them forward. No recursion.

use crate::arena::Arena;
use crate::diagnostics::ArenaExhausted;
use crate::primitives::{Point, Size};
use crate::scroll::ScrollStates;
use crate::text::{MeasureCache, TextMeasurer};

use super::declaration::ElementConfig;
use super::flex::{distribute, FlexItem};
use super::sizing::{Axis, Sizing};
use super::tree::{AxisExt, LayoutNode, LayoutTree, NodeId, WrappedLine};

/// Services the solver borrows from the engine.
pub(crate) struct SolveEnv<'a> {
    pub arena: &'a mut Arena,
    pub cache: &'a mut MeasureCache,
    pub measurer: &'a dyn TextMeasurer,
    pub scroll: &'a ScrollStates,
    pub viewport: Size,
    /// Trace every node's final box.
    pub debug: bool,
}

/// Lay out the whole tree. Fails only if wrapped lines exhaust the arena.
pub(crate) fn solve(tree: &mut LayoutTree, env: &mut SolveEnv<'_>) -> Result<(), ArenaExhausted> {
    if tree.nodes.is_empty() {
        return Ok(());
    }
    let mut scratch = Vec::new();

    fit_pass(tree, Axis::Horizontal);
    grow_pass(tree, Axis::Horizontal, env.viewport, &mut scratch);
    wrap_text(tree, env)?;
    fit_pass(tree, Axis::Vertical);
    grow_pass(tree, Axis::Vertical, env.viewport, &mut scratch);
    position_pass(tree, env.scroll);

    if env.debug {
        for node in &tree.nodes {
            tracing::trace!(
                id = node.id.raw(),
                x = node.position.x,
                y = node.position.y,
                w = node.size.width,
                h = node.size.height,
                "layout node"
            );
        }
    }
    Ok(())
}

#[inline]
fn sizing_along(config: &ElementConfig, axis: Axis) -> Sizing {
    match axis {
        Axis::Horizontal => config.width,
        Axis::Vertical => config.height,
    }
}

/// Child list and mutable nodes at once.
#[inline]
fn split(tree: &mut LayoutTree, index: NodeId) -> (&[NodeId], &mut [LayoutNode]) {
    let node = &tree.nodes[index];
    let start = node.children_start;
    let end = start + node.child_count as usize;
    (&tree.children[start..end], tree.nodes.as_mut_slice())
}

// =========================================================================
// Fit pass (bottom-up)
// =========================================================================

/// Content-derived size of every node along `axis`, children before parents.
fn fit_pass(tree: &mut LayoutTree, axis: Axis) {
    for index in (0..tree.nodes.len()).rev() {
        let node = &tree.nodes[index];
        let config = &node.config;
        let padding = config.padding.along(axis);

        let (content, min_content) = if let Some(text) = &node.text {
            match axis {
                Axis::Horizontal => {
                    let floor = if text.can_shrink() { text.min_width } else { text.preferred.width };
                    (text.preferred.width, floor)
                }
                Axis::Vertical => {
                    let height = node.lines_len as f32 * text.line_height;
                    (height, height)
                }
            }
        } else if let Some(image) = config.image {
            let extent = image.source_size.get(axis);
            (extent, extent)
        } else {
            let children = tree.children_of(index);
            let along_main = config.direction.main_axis() == axis;
            let gaps = config.child_gap * children.len().saturating_sub(1) as f32;
            let (mut content, mut min_content) = if along_main { (gaps, gaps) } else { (0.0, 0.0) };
            for &child in children {
                let child = &tree.nodes[child];
                let (fit, min) = (child.fit.get(axis), child.min_width);
                if along_main {
                    content += fit;
                    min_content += min;
                } else {
                    content = content.max(fit);
                    min_content = min_content.max(min);
                }
            }
            (content, min_content)
        };

        let sizing = sizing_along(config, axis);
        let resolve = |content: f32| match sizing {
            Sizing::Fixed(px) => px,
            Sizing::Fit { .. } => sizing.clamp(content + padding),
            Sizing::Grow { min, .. } => min,
            Sizing::Percent(_) => 0.0,
        };
        let fit = resolve(content);
        let min_width = resolve(min_content);

        let node = &mut tree.nodes[index];
        node.fit.set(axis, fit);
        if axis == Axis::Horizontal {
            node.min_width = min_width.min(fit);
        }
    }
}

// =========================================================================
// Grow / shrink pass (top-down)
// =========================================================================

fn grow_pass(tree: &mut LayoutTree, axis: Axis, viewport: Size, scratch: &mut Vec<FlexItem>) {
    let available = viewport.get(axis);
    let root = &mut tree.nodes[0];
    let sizing = sizing_along(&root.config, axis);
    let size = match sizing {
        Sizing::Grow { .. } => sizing.clamp(available),
        Sizing::Fixed(px) => px,
        Sizing::Fit { .. } => root.fit.get(axis),
        Sizing::Percent(fraction) => fraction * available,
    };
    root.size.set(axis, size);

    for index in 0..tree.nodes.len() {
        if tree.nodes[index].is_leaf() {
            continue;
        }
        let (children, nodes) = split(tree, index);
        size_children(nodes, children, index, axis, scratch);
    }
}

/// Size the children of `parent` along `axis`, whose own size is final.
fn size_children(nodes: &mut [LayoutNode], children: &[NodeId], parent: NodeId, axis: Axis, scratch: &mut Vec<FlexItem>) {
    let config = nodes[parent].config;
    let content = (nodes[parent].size.get(axis) - config.padding.along(axis)).max(0.0);

    if config.direction.main_axis() != axis {
        for &child in children {
            let node = &mut nodes[child];
            let sizing = sizing_along(&node.config, axis);
            let size = match sizing {
                Sizing::Fixed(px) => px,
                Sizing::Fit { .. } => {
                    let fit = node.fit.get(axis);
                    if axis == Axis::Horizontal && node.min_width < fit {
                        fit.min(content).max(node.min_width)
                    } else {
                        fit
                    }
                }
                Sizing::Grow { .. } => sizing.clamp(content),
                Sizing::Percent(fraction) => fraction * content,
            };
            node.size.set(axis, size);
        }
        return;
    }

    // Grow children claim nothing up front; the free space is measured
    // without them and their minimums only clamp their share.
    let mut used = config.child_gap * children.len().saturating_sub(1) as f32;
    for &child in children {
        let node = &mut nodes[child];
        let size = match sizing_along(&node.config, axis) {
            Sizing::Percent(fraction) => fraction * content,
            Sizing::Grow { .. } => 0.0,
            _ => node.fit.get(axis),
        };
        node.size.set(axis, size);
        used += size;
    }

    let grows = |node: &LayoutNode| sizing_along(&node.config, axis).is_grow();
    let view: &[LayoutNode] = nodes;
    scratch.clear();
    scratch.extend(children.iter().map(|&c| &view[c]).filter(|n| grows(n)).map(|node| {
        let sizing = sizing_along(&node.config, axis);
        let (min, max) = sizing.bounds();
        FlexItem::new(0.0, sizing.flex(), min, max)
    }));
    if !scratch.is_empty() {
        distribute(scratch, (content - used).max(0.0));
        used += scratch.iter().map(|item| item.size).sum::<f32>();
        write_back(nodes, children, axis, scratch, grows);
    }

    let free = content - used;
    if free < 0.0 && axis == Axis::Horizontal {
        let shrinks = |node: &LayoutNode| {
            matches!(node.config.width, Sizing::Fit { .. }) && node.min_width < node.size.width
        };
        let view: &[LayoutNode] = nodes;
        scratch.clear();
        scratch.extend(
            children
                .iter()
                .map(|&c| &view[c])
                .filter(|n| shrinks(n))
                .map(|node| FlexItem::new(node.size.width, 1.0, node.min_width, node.size.width)),
        );
        distribute(scratch, free);
        write_back(nodes, children, axis, scratch, shrinks);
    }
}

fn write_back(
    nodes: &mut [LayoutNode],
    children: &[NodeId],
    axis: Axis,
    items: &[FlexItem],
    selected: impl Fn(&LayoutNode) -> bool,
) {
    let mut items = items.iter();
    for &child in children {
        if !selected(&nodes[child]) {
            continue;
        }
        if let Some(item) = items.next() {
            nodes[child].size.set(axis, item.size);
        }
    }
}

// =========================================================================
// Text wrapping
// =========================================================================

fn wrap_text(tree: &mut LayoutTree, env: &mut SolveEnv<'_>) -> Result<(), ArenaExhausted> {
    let mut lines = Vec::new();
    for index in 0..tree.nodes.len() {
        let node = &tree.nodes[index];
        let Some(leaf) = node.text else {
            continue;
        };
        let width = (node.size.width - node.config.padding.horizontal()).max(0.0);
        let content = &tree.text[leaf.span.range()];

        lines.clear();
        let measured = env.cache.measure(content, &leaf.style, env.measurer);
        measured.wrap(&leaf.style, width, |start, len, line_width| {
            lines.push(WrappedLine {
                span: leaf.span.slice(start, len),
                width: line_width,
            });
        });

        let lines_start = tree.lines.len();
        for line in &lines {
            tree.push_line(env.arena, *line)?;
        }
        let node = &mut tree.nodes[index];
        node.lines_start = lines_start;
        node.lines_len = lines.len();
    }
    Ok(())
}

// =========================================================================
// Positioning (top-down)
// =========================================================================

fn position_pass(tree: &mut LayoutTree, scroll: &ScrollStates) {
    tree.nodes[0].position = Point::ORIGIN;

    for index in 0..tree.nodes.len() {
        if tree.nodes[index].is_leaf() {
            continue;
        }
        let (children, nodes) = split(tree, index);
        let parent = nodes[index];
        let config = parent.config;
        let main = config.direction.main_axis();
        let cross = main.cross();

        let mut offset = if config.clip.is_active() { scroll.offset(parent.id) } else { Point::ORIGIN };
        if !config.clip.horizontal {
            offset.x = 0.0;
        }
        if !config.clip.vertical {
            offset.y = 0.0;
        }

        let gaps = config.child_gap * children.len().saturating_sub(1) as f32;
        let run: f32 = gaps + children.iter().map(|&c| nodes[c].size.get(main)).sum::<f32>();
        let content_main = parent.size.get(main) - config.padding.along(main);
        let content_cross = parent.size.get(cross) - config.padding.along(cross);
        let free = content_main - run;
        let align_main = if free > 0.0 { config.child_alignment.along(main).offset(free) } else { 0.0 };
        let align_cross = config.child_alignment.along(cross);

        let mut cursor = parent.position.get(main) + config.padding.leading(main) + align_main - offset.get(main);
        let cross_origin = parent.position.get(cross) + config.padding.leading(cross) - offset.get(cross);
        let mut widest: f32 = 0.0;

        for &child in children {
            let node = &mut nodes[child];
            let extent = node.size.get(cross);
            let mut position = Point::ORIGIN;
            position.set(main, cursor);
            position.set(cross, cross_origin + align_cross.offset(content_cross - extent));
            node.position = position;
            cursor += node.size.get(main) + config.child_gap;
            widest = widest.max(extent);
        }

        let mut content_size = Size::ZERO;
        content_size.set(main, run + config.padding.along(main));
        content_size.set(cross, widest + config.padding.along(cross));
        nodes[index].content_size = content_size;
    }
}

// =========================================================================
// Tests
// =========================================================================
