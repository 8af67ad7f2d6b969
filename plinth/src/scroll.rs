//! Scroll memory for clipping containers.
//!
//! The only state kept between frames for a node, keyed by its `ElementId`.
//! Offsets are positive toward the end of the content (0 = unscrolled) and
//! are clamped against the limits measured by the previous layout.

use std::collections::HashMap;

use crate::id::ElementId;
use crate::primitives::{Point, Size};

/// Frames a container may go undeclared before its state is dropped.
pub const SCROLL_STATE_MAX_AGE: u64 = 120;

/// Scroll state for a single clipping container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    /// Current scroll offset (0 = start).
    pub offset: Point,
    /// Largest offset on each axis, from the last layout.
    pub max: Point,
    /// Size of the children's extent, from the last layout.
    pub content_size: Size,
    /// Visible size of the container, from the last layout.
    pub viewport: Size,
    generation: u64,
}

impl ScrollState {
    fn new(generation: u64) -> Self {
        Self {
            offset: Point::ORIGIN,
            max: Point::new(f32::MAX, f32::MAX),
            content_size: Size::ZERO,
            viewport: Size::ZERO,
            generation,
        }
    }

    /// Scroll by a delta (positive = move content toward its start).
    pub fn scroll_by(&mut self, delta: Point) {
        self.offset = Point::new(
            (self.offset.x - delta.x).clamp(0.0, self.max.x),
            (self.offset.y - delta.y).clamp(0.0, self.max.y),
        );
    }

    fn clamp(&mut self) {
        self.offset = Point::new(self.offset.x.clamp(0.0, self.max.x), self.offset.y.clamp(0.0, self.max.y));
    }
}

/// All scroll states, retained across frames.
#[derive(Debug, Default)]
pub struct ScrollStates {
    states: HashMap<ElementId, ScrollState>,
    generation: u64,
}

impl ScrollStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame and drop states not seen for `max_age` frames.
    pub fn begin_frame(&mut self, max_age: u64) {
        self.generation += 1;
        let cutoff = self.generation.saturating_sub(max_age);
        self.states.retain(|_, state| state.generation >= cutoff);
    }

    /// The offset to apply to the children of `id` this frame.
    pub fn offset(&self, id: ElementId) -> Point {
        self.states.get(&id).map_or(Point::ORIGIN, |state| state.offset)
    }

    pub fn get(&self, id: ElementId) -> Option<&ScrollState> {
        self.states.get(&id)
    }

    /// Record the measured extents of a clipping container after layout.
    ///
    /// Only axes that clip can scroll; the other axis is pinned to 0.
    pub fn record(&mut self, id: ElementId, viewport: Size, content_size: Size, clip_x: bool, clip_y: bool) {
        let generation = self.generation;
        let state = self.states.entry(id).or_insert_with(|| ScrollState::new(generation));
        state.generation = generation;
        state.viewport = viewport;
        state.content_size = content_size;
        let limit = |clips: bool, content: f32, visible: f32| {
            if clips { (content - visible).max(0.0) } else { 0.0 }
        };
        state.max = Point::new(
            limit(clip_x, content_size.width, viewport.width),
            limit(clip_y, content_size.height, viewport.height),
        );
        state.clamp();
    }

    /// Scroll `id` by `delta`. Creates the state if the container has not
    /// been laid out yet; it is clamped on the next layout.
    pub fn scroll_by(&mut self, id: ElementId, delta: Point) {
        let generation = self.generation;
        self.states
            .entry(id)
            .or_insert_with(|| ScrollState::new(generation))
            .scroll_by(delta);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
