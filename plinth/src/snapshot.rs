//! Layout snapshot for queries between frames.
//!
//! Captures every element's final box and effective clip after layout so
//! the host can hit-test pointer positions and look up element bounds while
//! it builds the next frame.

use std::collections::HashMap;

use crate::id::ElementId;
use crate::layout::tree::{LayoutTree, NodeId};
use crate::primitives::{Point, Rect};

/// Extent used for the unclipped axis of a single-axis clip.
const UNBOUNDED: f32 = 1.0e9;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ElementBox {
    id: ElementId,
    bounds: Rect,
    /// Intersection of all clipping ancestors, if any.
    clip: Option<Rect>,
}

impl ElementBox {
    #[inline]
    fn hit(&self, point: Point) -> bool {
        self.bounds.contains(point) && self.clip.is_none_or(|clip| clip.contains(point))
    }
}

/// Boxes of the last laid-out frame, in paint order.
#[derive(Debug, Default)]
pub struct LayoutSnapshot {
    boxes: Vec<ElementBox>,
    by_id: HashMap<ElementId, usize>,
}

impl LayoutSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
        self.by_id.clear();
    }

    /// Rebuild from a solved tree.
    pub(crate) fn capture(&mut self, tree: &LayoutTree) {
        self.clear();
        // (subtree end, effective clip for descendants)
        let mut clips: Vec<(NodeId, Rect)> = Vec::new();

        for (index, node) in tree.nodes.iter().enumerate() {
            while clips.last().is_some_and(|&(end, _)| index >= end) {
                clips.pop();
            }
            let bounds = Rect::from_origin_size(node.position, node.size);
            let clip = clips.last().map(|&(_, clip)| clip);
            self.by_id.entry(node.id).or_insert(self.boxes.len());
            self.boxes.push(ElementBox { id: node.id, bounds, clip });

            let axes = node.config.clip;
            if axes.is_active() {
                let own = Rect::new(
                    if axes.horizontal { bounds.x } else { -UNBOUNDED },
                    if axes.vertical { bounds.y } else { -UNBOUNDED },
                    if axes.horizontal { bounds.width } else { 2.0 * UNBOUNDED },
                    if axes.vertical { bounds.height } else { 2.0 * UNBOUNDED },
                );
                let effective = match clip {
                    Some(outer) => outer.intersection(&own).unwrap_or(Rect::ZERO),
                    None => own,
                };
                clips.push((node.subtree_end, effective));
            }
        }
    }

    /// Final box of `id` in the last frame.
    pub fn element_box(&self, id: ElementId) -> Option<Rect> {
        self.by_id.get(&id).map(|&i| self.boxes[i].bounds)
    }

    /// The topmost (last painted, so deepest) element under `point`.
    pub fn hit_test(&self, point: Point) -> Option<ElementId> {
        self.boxes.iter().rev().find(|b| b.hit(point)).map(|b| b.id)
    }

    /// Whether `point` is over the visible part of `id`.
    pub fn pointer_over(&self, id: ElementId, point: Point) -> bool {
        self.by_id.get(&id).is_some_and(|&i| self.boxes[i].hit(point))
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
