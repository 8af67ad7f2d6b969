//! The engine facade.
//!
//! Owns every piece of state that outlives a frame (arena budget, text
//! measurement cache, scroll memory, the last hit-test snapshot and the last
//! good output) and drives one frame at a time:
//!
//! ```text
//! begin_frame -> open/text/close ... -> end_frame -> RenderCommands
//! ```

use std::mem;
use std::num::NonZeroUsize;
use std::time::Instant;

use crate::arena::Arena;
use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, EngineError};
use crate::id::ElementId;
use crate::layout::builder::{BuildEnv, BuildStatus, LayoutBuilder};
use crate::layout::declaration::{Declaration, TextStyle};
use crate::layout::solver::{solve, SolveEnv};
use crate::primitives::{Point, Rect, Size};
use crate::render::{emit, CommandBuffer, RenderCommands};
use crate::scroll::ScrollStates;
use crate::snapshot::LayoutSnapshot;
use crate::stats::{timed, FrameStats};
use crate::text::{MeasureCache, MonospaceMeasurer, TextMeasurer};

/// An immediate-mode layout engine.
///
/// # Example
///
/// ```
/// use plinth::{Color, Declaration, Engine, Sizing, Size};
///
/// let mut engine = Engine::initialize(Engine::min_memory_size() * 4, Size::new(800.0, 600.0), |_| {}).unwrap();
/// engine.begin_frame();
/// engine.element(
///     Declaration::new().id("root").size(Sizing::grow(), Sizing::grow()).background(Color::WHITE),
///     |_| {},
/// );
/// let commands = engine.end_frame();
/// assert_eq!(commands.len(), 1);
/// ```
pub struct Engine {
    config: EngineConfig,
    viewport: Size,
    arena: Arena,
    builder: LayoutBuilder,
    diagnostics: Diagnostics,
    cache: MeasureCache,
    measurer: Box<dyn TextMeasurer>,
    scroll: ScrollStates,
    snapshot: LayoutSnapshot,
    /// Output of the last successful frame.
    front: CommandBuffer,
    /// Scratch output, swapped in when emission succeeds.
    back: CommandBuffer,
    stats: FrameStats,
    frame: u64,
    frame_started: Option<Instant>,
}

fn check_viewport(viewport: Size) -> Result<(), EngineError> {
    let valid = |v: f32| v.is_finite() && v >= 0.0;
    if valid(viewport.width) && valid(viewport.height) {
        Ok(())
    } else {
        Err(EngineError::InvalidViewport { width: viewport.width, height: viewport.height })
    }
}

impl Engine {
    /// Create an engine with an arena of `arena_bytes` bytes.
    ///
    /// `handler` receives every diagnostic raised while frames are built.
    pub fn initialize(
        arena_bytes: usize,
        viewport: Size,
        handler: impl FnMut(&Diagnostic) + 'static,
    ) -> Result<Self, EngineError> {
        let config = EngineConfig { viewport, arena_bytes: Some(arena_bytes), ..Default::default() };
        Self::with_config(config, handler)
    }

    /// Create an engine from a full configuration.
    pub fn with_config(config: EngineConfig, handler: impl FnMut(&Diagnostic) + 'static) -> Result<Self, EngineError> {
        check_viewport(config.viewport)?;
        let arena = Arena::with_capacity(config.arena_bytes())?;
        let capacity = NonZeroUsize::new(config.measure_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        tracing::debug!(
            arena_bytes = arena.capacity(),
            width = config.viewport.width,
            height = config.viewport.height,
            "layout engine initialized"
        );
        Ok(Self {
            viewport: config.viewport,
            arena,
            builder: LayoutBuilder::with_capacity(config.max_nodes),
            diagnostics: Diagnostics::new(Box::new(handler)),
            cache: MeasureCache::new(capacity),
            measurer: Box::new(MonospaceMeasurer::default()),
            scroll: ScrollStates::new(),
            snapshot: LayoutSnapshot::new(),
            front: CommandBuffer::with_capacity(config.max_nodes),
            back: CommandBuffer::with_capacity(config.max_nodes),
            stats: FrameStats::default(),
            frame: 0,
            frame_started: None,
            config,
        })
    }

    /// The smallest arena `initialize` accepts.
    pub fn min_memory_size() -> usize {
        Arena::min_memory_size()
    }

    /// Arena budget for this engine's configured `max_nodes`.
    pub fn recommended_memory_size(&self) -> usize {
        Arena::memory_size_for(self.config.max_nodes)
    }

    /// Replace the text measurer. Cached measurements are dropped.
    pub fn set_text_measurer(&mut self, measurer: impl TextMeasurer + 'static) {
        self.measurer = Box::new(measurer);
        self.cache.clear();
    }

    /// Change the viewport used by subsequent layouts.
    pub fn set_viewport(&mut self, viewport: Size) -> Result<(), EngineError> {
        check_viewport(viewport)?;
        self.viewport = viewport;
        Ok(())
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =====================================================================
    // Frame lifecycle
    // =====================================================================

    /// Start declaring a new frame. Releases all per-frame memory.
    pub fn begin_frame(&mut self) {
        self.arena.reset();
        self.builder.begin_frame();
        self.diagnostics.begin_frame();
        self.scroll.begin_frame(self.config.scroll_state_max_age);
        self.frame += 1;
        self.frame_started = Some(Instant::now());
    }

    /// Declarations outside `begin_frame`/`end_frame` start a frame.
    fn ensure_frame(&mut self) {
        if self.frame_started.is_none() {
            self.begin_frame();
        }
    }

    fn with_builder<R>(&mut self, f: impl FnOnce(&mut LayoutBuilder, &mut BuildEnv<'_>) -> R) -> R {
        self.ensure_frame();
        let mut env = BuildEnv {
            arena: &mut self.arena,
            diagnostics: &mut self.diagnostics,
            cache: &mut self.cache,
            measurer: &*self.measurer,
        };
        f(&mut self.builder, &mut env)
    }

    /// Open an element as the last child of the current one.
    pub fn open(&mut self, declaration: Declaration<'_>) {
        self.with_builder(|builder, env| builder.open(&declaration, env));
    }

    /// Close the most recently opened element.
    pub fn close(&mut self) {
        self.with_builder(|builder, env| builder.close(env));
    }

    /// Declare a text leaf inside the current element.
    pub fn text(&mut self, content: &str, style: TextStyle) {
        self.with_builder(|builder, env| builder.text(content, style, env));
    }

    /// Open `declaration`, run `children`, and close it.
    pub fn element(&mut self, declaration: Declaration<'_>, children: impl FnOnce(&mut Self)) {
        self.open(declaration);
        children(self);
        self.close();
    }

    /// Lay out the declared tree and emit its render commands.
    ///
    /// On `MismatchedScope` the result is empty. On `OutOfMemory` it is the
    /// last successful frame's output.
    pub fn end_frame(&mut self) -> RenderCommands<'_> {
        let status = self.with_builder(|builder, env| builder.finish(env));
        let declare_time = self.frame_started.take().map(|t| t.elapsed()).unwrap_or_default();

        self.stats = FrameStats {
            frame: self.frame,
            element_count: self.builder.tree.nodes.len(),
            arena_capacity: self.arena.capacity(),
            declare_time,
            ..Default::default()
        };

        match status {
            BuildStatus::Complete => {}
            BuildStatus::Malformed => {
                self.finish_stats(true, 0);
                return RenderCommands::EMPTY;
            }
            BuildStatus::OutOfMemory => return self.stale_output(),
        }

        let mut env = SolveEnv {
            arena: &mut self.arena,
            cache: &mut self.cache,
            measurer: &*self.measurer,
            scroll: &self.scroll,
            viewport: self.viewport,
            debug: self.config.debug_layout,
        };
        let tree = &mut self.builder.tree;
        let (solved, layout_time) = timed(|| solve(tree, &mut env));
        self.stats.layout_time = layout_time;
        if let Err(err) = solved {
            self.diagnostics
                .report(Diagnostic::new(DiagnosticKind::OutOfMemory, err.to_string()));
            return self.stale_output();
        }

        let (tree, arena, back) = (&self.builder.tree, &mut self.arena, &mut self.back);
        let (emitted, emit_time) = timed(|| emit(tree, arena, back));
        self.stats.emit_time = emit_time;
        if let Err(err) = emitted {
            self.diagnostics
                .report(Diagnostic::new(DiagnosticKind::OutOfMemory, err.to_string()));
            return self.stale_output();
        }

        // Queries and scroll limits follow the frame whose commands are returned.
        for node in &self.builder.tree.nodes {
            let clip = node.config.clip;
            if clip.is_active() {
                self.scroll
                    .record(node.id, node.size, node.content_size, clip.horizontal, clip.vertical);
            }
        }
        self.snapshot.capture(&self.builder.tree);

        mem::swap(&mut self.front, &mut self.back);
        let count = self.front.commands.len();
        self.finish_stats(false, count);
        self.front.view()
    }

    fn stale_output(&mut self) -> RenderCommands<'_> {
        let count = self.front.commands.len();
        self.finish_stats(true, count);
        self.front.view()
    }

    fn finish_stats(&mut self, abandoned: bool, command_count: usize) {
        let stats = &mut self.stats;
        stats.abandoned = abandoned;
        stats.command_count = command_count;
        stats.arena_used = self.arena.used();
        stats.arena_high_water = self.arena.high_water();
        stats.measure_hits = self.cache.hits;
        stats.measure_misses = self.cache.misses;
        stats.diagnostics = self.diagnostics.count();
        tracing::debug!(
            frame = stats.frame,
            elements = stats.element_count,
            commands = stats.command_count,
            arena_used = stats.arena_used,
            abandoned,
            layout = ?stats.layout_time,
            emit = ?stats.emit_time,
            "frame complete"
        );
    }

    /// Output of the last successful frame.
    pub fn last_commands(&self) -> RenderCommands<'_> {
        self.front.view()
    }

    // =====================================================================
    // Queries
    // =====================================================================

    /// Final box of `id` in the last laid-out frame.
    pub fn element_box(&self, id: impl Into<ElementId>) -> Option<Rect> {
        self.snapshot.element_box(id.into())
    }

    /// The deepest element under `point` in the last laid-out frame.
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        self.snapshot.hit_test(point)
    }

    /// Whether `point` is over the visible part of `id`.
    pub fn pointer_over(&self, id: impl Into<ElementId>, point: Point) -> bool {
        self.snapshot.pointer_over(id.into(), point)
    }

    /// Scroll a clipping container. Positive deltas move content toward its
    /// start. Applied from the next layout on.
    pub fn scroll_by(&mut self, id: impl Into<ElementId>, delta: Point) {
        self.scroll.scroll_by(id.into(), delta);
    }

    pub fn scroll_offset(&self, id: impl Into<ElementId>) -> Point {
        self.scroll.offset(id.into())
    }

    pub fn frame_stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }
}
