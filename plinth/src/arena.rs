//! Per-frame memory budget.
//!
//! The arena is a bump allocator over a fixed byte budget. Every structure a
//! frame creates (nodes, child slots, text bytes, wrapped lines, render
//! commands) reserves its size here before it is stored. Storage itself lives
//! in index-addressed vectors that are cleared, not freed, at frame start, and
//! that hold only `Copy` data, so `reset` is a pointer reset with no
//! destructors.

use std::mem::{align_of, size_of};

use crate::diagnostics::{ArenaExhausted, EngineError};
use crate::layout::tree::{LayoutNode, NodeId, WrappedLine};
use crate::render::RenderCommand;

/// Elements the smallest accepted arena must be able to hold.
const MIN_ELEMENTS: usize = 16;
/// Average text bytes budgeted per element by `memory_size_for`.
pub(crate) const TEXT_BYTES_PER_ELEMENT: usize = 32;
/// Render commands budgeted per element (background, border, text, scissor).
pub(crate) const COMMANDS_PER_ELEMENT: usize = 4;

/// Region handed out by `Arena::reserve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaHandle {
    pub offset: usize,
    pub len: usize,
}

/// A fixed-capacity bump allocator, reset once per frame.
#[derive(Debug)]
pub struct Arena {
    capacity: usize,
    offset: usize,
    high_water: usize,
}

impl Arena {
    /// Bytes one element costs in the worst common case.
    pub fn element_cost() -> usize {
        size_of::<LayoutNode>()
            + size_of::<NodeId>()
            + size_of::<WrappedLine>()
            + COMMANDS_PER_ELEMENT * size_of::<RenderCommand>()
    }

    /// The smallest budget `with_capacity` accepts.
    pub fn min_memory_size() -> usize {
        MIN_ELEMENTS * Self::element_cost()
    }

    /// Recommended budget for frames of up to `max_elements` elements.
    pub fn memory_size_for(max_elements: usize) -> usize {
        max_elements.max(MIN_ELEMENTS) * (Self::element_cost() + TEXT_BYTES_PER_ELEMENT)
    }

    /// Create an arena with a budget of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Result<Self, EngineError> {
        let required = Self::min_memory_size();
        if capacity < required {
            return Err(EngineError::ArenaTooSmall { provided: capacity, required });
        }
        Ok(Self {
            capacity,
            offset: 0,
            high_water: 0,
        })
    }

    /// Reserve `bytes` bytes. Fails without side effects when the budget
    /// cannot satisfy the request.
    #[inline]
    pub fn reserve(&mut self, bytes: usize) -> Result<ArenaHandle, ArenaExhausted> {
        self.reserve_aligned(bytes, 1)
    }

    /// Reserve room for `count` values of `T`, aligned for `T`.
    #[inline]
    pub fn reserve_array<T>(&mut self, count: usize) -> Result<ArenaHandle, ArenaExhausted> {
        self.reserve_aligned(size_of::<T>() * count, align_of::<T>())
    }

    fn reserve_aligned(&mut self, bytes: usize, align: usize) -> Result<ArenaHandle, ArenaExhausted> {
        let start = self.offset.next_multiple_of(align);
        let end = start.checked_add(bytes).filter(|end| *end <= self.capacity);
        let Some(end) = end else {
            return Err(ArenaExhausted {
                requested: bytes,
                remaining: self.remaining(),
            });
        };
        self.offset = end;
        self.high_water = self.high_water.max(end);
        Ok(ArenaHandle { offset: start, len: bytes })
    }

    /// Release everything. O(1).
    #[inline]
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn used(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.offset
    }

    /// Largest `used()` seen since creation.
    pub fn high_water(&self) -> usize {
        self.high_water
    }
}
