//! Builds the frame's layout tree from nested `open`/`close` calls.
//!
//! Open nodes sit on an explicit stack. Closed children wait in a shared
//! pending buffer until their parent closes, at which point they are moved
//! into one contiguous child range in declaration order.

use std::collections::HashSet;

use crate::arena::Arena;
use crate::diagnostics::{ArenaExhausted, Diagnostic, DiagnosticKind, Diagnostics};
use crate::id::ElementId;
use crate::text::{MeasureCache, TextMeasurer};

use super::declaration::{sanitize, Declaration, TextStyle};
use super::tree::{LayoutNode, LayoutTree, NodeId, TextLeaf};

/// Services the builder borrows from the engine while a frame is declared.
pub(crate) struct BuildEnv<'a> {
    pub arena: &'a mut Arena,
    pub diagnostics: &'a mut Diagnostics,
    pub cache: &'a mut MeasureCache,
    pub measurer: &'a dyn TextMeasurer,
}

/// How a frame's declaration phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuildStatus {
    Complete,
    /// Unbalanced scopes or a second root.
    Malformed,
    OutOfMemory,
}

#[derive(Debug, Clone, Copy)]
struct OpenScope {
    node: NodeId,
    /// Where this node's children start in `pending`.
    pending_start: usize,
}

#[derive(Debug, Default)]
pub(crate) struct LayoutBuilder {
    pub tree: LayoutTree,
    stack: Vec<OpenScope>,
    pending: Vec<NodeId>,
    seen_ids: HashSet<ElementId>,
    malformed: bool,
    out_of_memory: bool,
}

impl LayoutBuilder {
    pub fn with_capacity(max_nodes: usize) -> Self {
        Self {
            tree: LayoutTree::with_capacity(max_nodes),
            stack: Vec::with_capacity(64),
            pending: Vec::with_capacity(max_nodes),
            seen_ids: HashSet::with_capacity(max_nodes),
            ..Self::default()
        }
    }

    /// Forget the previous frame's tree.
    pub fn begin_frame(&mut self) {
        self.tree.clear();
        self.stack.clear();
        self.pending.clear();
        self.seen_ids.clear();
        self.malformed = false;
        self.out_of_memory = false;
    }

    /// Whether further declarations this frame are ignored.
    #[inline]
    fn abandoned(&self) -> bool {
        self.malformed || self.out_of_memory
    }

    fn scope_error(&mut self, env: &mut BuildEnv<'_>, message: &str) {
        self.malformed = true;
        env.diagnostics
            .report(Diagnostic::new(DiagnosticKind::MismatchedScope, message));
    }

    fn oom(&mut self, env: &mut BuildEnv<'_>, err: ArenaExhausted) {
        self.out_of_memory = true;
        env.diagnostics
            .report(Diagnostic::new(DiagnosticKind::OutOfMemory, err.to_string()));
    }

    /// Open a node as the last child of the current scope (or as the root).
    pub fn open(&mut self, declaration: &Declaration<'_>, env: &mut BuildEnv<'_>) {
        if self.abandoned() {
            return;
        }
        let parent = self.stack.last().copied();
        if parent.is_none() && !self.tree.nodes.is_empty() {
            self.scope_error(env, "a second root element was opened after the root closed");
            return;
        }

        let id = match (declaration.id, parent) {
            (Some(id), _) => id,
            (None, Some(scope)) => {
                let index = (self.pending.len() - scope.pending_start) as u32;
                self.tree.nodes[scope.node].id.child(index)
            }
            (None, None) => ElementId::ROOT_PARENT.child(0),
        };

        if let Some(scope) = parent {
            self.strip_leaf_payload(scope.node, env);
        }

        if declaration.id.is_some() && !self.seen_ids.insert(id) {
            env.diagnostics.report(
                Diagnostic::new(DiagnosticKind::DuplicateId, format!("element id {:#018x} declared twice", id.raw()))
                    .with_element(id),
            );
        }

        let mut config = declaration.config;
        let mut style = declaration.text.map(|text| text.style);
        let problems = sanitize(&mut config, style.as_mut());
        if !problems.is_empty() {
            env.diagnostics.report(
                Diagnostic::new(DiagnosticKind::InvalidSizingConfig, problems.join("; ")).with_element(id),
            );
        }

        let node = LayoutNode::new(id, config);
        let index = match self.tree.push_node(env.arena, node) {
            Ok(index) => index,
            Err(err) => return self.oom(env, err),
        };

        if let (Some(text), Some(style)) = (declaration.text, style) {
            match self.attach_text(index, text.content, style, env) {
                Ok(()) => {}
                Err(err) => return self.oom(env, err),
            }
        }

        self.stack.push(OpenScope {
            node: index,
            pending_start: self.pending.len(),
        });
    }

    fn attach_text(
        &mut self,
        node: NodeId,
        content: &str,
        style: TextStyle,
        env: &mut BuildEnv<'_>,
    ) -> Result<(), ArenaExhausted> {
        let span = self.tree.push_text(env.arena, content)?;
        let measured = env.cache.measure(content, &style, env.measurer);
        self.tree.nodes[node].text = Some(TextLeaf {
            span,
            style,
            preferred: measured.size,
            min_width: measured.min_width,
            line_height: measured.line_height,
        });
        Ok(())
    }

    /// A text or image node that receives a child loses its payload.
    fn strip_leaf_payload(&mut self, parent: NodeId, env: &mut BuildEnv<'_>) {
        let node = &mut self.tree.nodes[parent];
        if node.text.is_none() && node.config.image.is_none() {
            return;
        }
        node.text = None;
        node.config.image = None;
        let id = node.id;
        env.diagnostics.report(
            Diagnostic::new(
                DiagnosticKind::LeafWithChildren,
                "text or image element received children; payload dropped",
            )
            .with_element(id),
        );
    }

    /// Close the current scope.
    pub fn close(&mut self, env: &mut BuildEnv<'_>) {
        if self.abandoned() {
            return;
        }
        let Some(scope) = self.stack.pop() else {
            self.scope_error(env, "close() called with no open element");
            return;
        };

        let children_start = self.tree.children.len();
        for i in scope.pending_start..self.pending.len() {
            if let Err(err) = self.tree.push_child_slot(env.arena, self.pending[i]) {
                return self.oom(env, err);
            }
        }
        let child_count = (self.pending.len() - scope.pending_start) as u32;
        self.pending.truncate(scope.pending_start);

        let subtree_end = self.tree.nodes.len();
        let node = &mut self.tree.nodes[scope.node];
        node.children_start = children_start;
        node.child_count = child_count;
        node.subtree_end = subtree_end;

        if !self.stack.is_empty() {
            self.pending.push(scope.node);
        }
    }

    /// Open and immediately close a text leaf.
    pub fn text(&mut self, content: &str, style: TextStyle, env: &mut BuildEnv<'_>) {
        self.open(&Declaration::new().text(content, style), env);
        self.close(env);
    }

    /// End the declaration phase.
    pub fn finish(&mut self, env: &mut BuildEnv<'_>) -> BuildStatus {
        if self.out_of_memory {
            return BuildStatus::OutOfMemory;
        }
        if !self.malformed && !self.stack.is_empty() {
            let open = self.stack.len();
            self.scope_error(env, &format!("frame ended with {open} unclosed element(s)"));
        }
        if self.malformed {
            BuildStatus::Malformed
        } else {
            BuildStatus::Complete
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::num::NonZeroUsize;
    use std::rc::Rc;

    use super::*;
    use crate::layout::sizing::Sizing;
    use crate::primitives::Size;

    struct Harness {
        arena: Arena,
        diagnostics: Diagnostics,
        cache: MeasureCache,
        seen: Rc<RefCell<Vec<DiagnosticKind>>>,
        builder: LayoutBuilder,
    }

    fn measure(text: &str, _font: u16, _size: f32) -> Size {
        Size::new(text.len() as f32 * 10.0, 20.0)
    }

    impl Harness {
        fn new() -> Self {
            Self::with_arena(Arena::memory_size_for(64))
        }

        fn with_arena(bytes: usize) -> Self {
            let seen = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&seen);
            let mut builder = LayoutBuilder::default();
            builder.begin_frame();
            Self {
                arena: Arena::with_capacity(bytes).unwrap(),
                diagnostics: Diagnostics::new(Box::new(move |d: &Diagnostic| sink.borrow_mut().push(d.kind))),
                cache: MeasureCache::new(NonZeroUsize::new(16).unwrap()),
                seen,
                builder,
            }
        }

        fn open(&mut self, decl: Declaration<'_>) {
            let mut env = BuildEnv {
                arena: &mut self.arena,
                diagnostics: &mut self.diagnostics,
                cache: &mut self.cache,
                measurer: &measure,
            };
            self.builder.open(&decl, &mut env);
        }

        fn close(&mut self) {
            let mut env = BuildEnv {
                arena: &mut self.arena,
                diagnostics: &mut self.diagnostics,
                cache: &mut self.cache,
                measurer: &measure,
            };
            self.builder.close(&mut env);
        }

        fn text(&mut self, content: &str) {
            let mut env = BuildEnv {
                arena: &mut self.arena,
                diagnostics: &mut self.diagnostics,
                cache: &mut self.cache,
                measurer: &measure,
            };
            self.builder.text(content, TextStyle::new(), &mut env);
        }

        fn finish(&mut self) -> BuildStatus {
            let mut env = BuildEnv {
                arena: &mut self.arena,
                diagnostics: &mut self.diagnostics,
                cache: &mut self.cache,
                measurer: &measure,
            };
            self.builder.finish(&mut env)
        }

        fn kinds(&self) -> Vec<DiagnosticKind> {
            self.seen.borrow().clone()
        }
    }

    #[test]
    fn children_are_contiguous_in_declaration_order() {
        let mut h = Harness::new();
        h.open(Declaration::new().id("root"));
        h.open(Declaration::new().id("a"));
        h.open(Declaration::new().id("a.1"));
        h.close();
        h.close();
        h.open(Declaration::new().id("b"));
        h.close();
        h.close();
        assert_eq!(h.finish(), BuildStatus::Complete);

        let tree = &h.builder.tree;
        assert_eq!(tree.nodes.len(), 4);
        assert_eq!(tree.children_of(0), &[1, 3]);
        assert_eq!(tree.children_of(1), &[2]);
        assert_eq!(tree.nodes[0].subtree_end, 4);
        assert_eq!(tree.nodes[1].subtree_end, 3);
        assert!(h.kinds().is_empty());
    }

    #[test]
    fn anonymous_ids_derive_from_parent_and_index() {
        let mut h = Harness::new();
        h.open(Declaration::new().id("root"));
        h.open(Declaration::new());
        h.close();
        h.open(Declaration::new());
        h.close();
        h.close();
        h.finish();

        let root = ElementId::named("root");
        let tree = &h.builder.tree;
        assert_eq!(tree.nodes[1].id, root.child(0));
        assert_eq!(tree.nodes[2].id, root.child(1));
    }

    #[test]
    fn text_leaves_are_measured() {
        let mut h = Harness::new();
        h.open(Declaration::new());
        h.text("hello world");
        h.close();
        h.finish();

        let leaf = h.builder.tree.nodes[1].text.unwrap();
        assert_eq!(h.builder.tree.text_of(leaf.span), "hello world");
        assert_eq!(leaf.preferred, Size::new(110.0, 20.0));
        assert_eq!(leaf.min_width, 50.0);
    }

    #[test]
    fn unclosed_scopes_report_one_mismatch() {
        let mut h = Harness::new();
        h.open(Declaration::new());
        h.open(Declaration::new());
        h.open(Declaration::new());
        h.close();
        h.close();
        assert_eq!(h.finish(), BuildStatus::Malformed);
        assert_eq!(h.kinds(), vec![DiagnosticKind::MismatchedScope]);
    }

    #[test]
    fn extra_close_is_a_mismatch() {
        let mut h = Harness::new();
        h.open(Declaration::new());
        h.close();
        h.close();
        h.close();
        assert_eq!(h.finish(), BuildStatus::Malformed);
        assert_eq!(h.kinds(), vec![DiagnosticKind::MismatchedScope]);
    }

    #[test]
    fn second_root_is_a_mismatch() {
        let mut h = Harness::new();
        h.open(Declaration::new());
        h.close();
        h.open(Declaration::new());
        h.close();
        assert_eq!(h.finish(), BuildStatus::Malformed);
        assert_eq!(h.kinds(), vec![DiagnosticKind::MismatchedScope]);
        assert_eq!(h.builder.tree.nodes.len(), 1);
    }

    #[test]
    fn duplicate_explicit_ids_are_reported() {
        let mut h = Harness::new();
        h.open(Declaration::new().id("root"));
        h.open(Declaration::new().id("item"));
        h.close();
        h.open(Declaration::new().id("item"));
        h.close();
        h.close();
        assert_eq!(h.finish(), BuildStatus::Complete);
        assert_eq!(h.kinds(), vec![DiagnosticKind::DuplicateId]);
    }

    #[test]
    fn invalid_config_is_corrected_and_reported() {
        let mut h = Harness::new();
        h.open(Declaration::new().width(Sizing::fixed(-5.0)).child_gap(-1.0));
        h.close();
        assert_eq!(h.finish(), BuildStatus::Complete);
        assert_eq!(h.kinds(), vec![DiagnosticKind::InvalidSizingConfig]);
        let node = &h.builder.tree.nodes[0];
        assert_eq!(node.config.width, Sizing::Fixed(0.0));
        assert_eq!(node.config.child_gap, 0.0);
    }

    #[test]
    fn leaf_with_children_drops_payload() {
        let mut h = Harness::new();
        h.open(Declaration::new().text("label", TextStyle::new()));
        h.open(Declaration::new());
        h.close();
        h.open(Declaration::new());
        h.close();
        h.close();
        assert_eq!(h.finish(), BuildStatus::Complete);
        assert_eq!(h.kinds(), vec![DiagnosticKind::LeafWithChildren]);
        let root = &h.builder.tree.nodes[0];
        assert!(root.text.is_none());
        assert_eq!(root.child_count, 2);
    }

    #[test]
    fn exhaustion_abandons_the_frame() {
        let mut h = Harness::with_arena(Arena::min_memory_size());
        h.open(Declaration::new());
        for _ in 0..10_000 {
            h.text("some text that costs arena bytes");
        }
        h.close();
        assert_eq!(h.finish(), BuildStatus::OutOfMemory);
        assert_eq!(h.kinds(), vec![DiagnosticKind::OutOfMemory]);
    }
}
