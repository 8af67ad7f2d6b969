//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::primitives::Size;
use crate::scroll::SCROLL_STATE_MAX_AGE;

/// Configuration for `Engine::with_config`.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial layout viewport.
    pub viewport: Size,

    /// Expected upper bound on elements per frame. Sizes the arena when
    /// `arena_bytes` is not set.
    pub max_nodes: usize,

    /// Explicit arena budget in bytes.
    pub arena_bytes: Option<usize>,

    /// Entries kept in the text measurement cache.
    pub measure_cache_capacity: usize,

    /// Frames a scroll container may go undeclared before its offset is
    /// forgotten.
    pub scroll_state_max_age: u64,

    /// Trace every element's final box at `trace` level.
    pub debug_layout: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(1200.0, 800.0),
            max_nodes: 8192,
            arena_bytes: None,
            measure_cache_capacity: 4096,
            scroll_state_max_age: SCROLL_STATE_MAX_AGE,
            debug_layout: false,
        }
    }
}

impl EngineConfig {
    /// The arena budget this config asks for.
    pub fn arena_bytes(&self) -> usize {
        self.arena_bytes.unwrap_or_else(|| Arena::memory_size_for(self.max_nodes))
    }
}
