#![forbid(unsafe_code)]

//! Panel arena and stack queries.
//!
//! Every panel lives in one arena keyed by [`PanelId`]. A node refers to its
//! parent by id (a non-owning back-reference) and owns an ordered stack of
//! child ids, bottom first. Stacks never hold duplicates and a panel sits in
//! at most one stack at a time.
//!
//! Queries here are pure: they never change state and never fail. Unknown
//! ids answer `None`, `0`, or `false`.

use std::collections::HashMap;
use std::fmt;

use navstack_core::{PanelId, PanelState, TemplateId};

use crate::host::PanelHooks;
use crate::transition::TransitionHandle;

/// Role of a panel with respect to use-once instancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    /// Reusable panel; pushing it shows this very node.
    Singleton,
    /// Use-once template; pushing it shows a fresh [`PanelKind::Instance`].
    Template,
    /// Disposable instance of a template, destroyed after it hides.
    Instance,
}

impl PanelKind {
    #[must_use]
    pub const fn is_use_once(self) -> bool {
        !matches!(self, Self::Singleton)
    }
}

/// Work waiting on a panel's hide to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Continuation {
    /// Swap `outgoing` for `incoming` on `node`'s stack and show `incoming`.
    Replace {
        node: PanelId,
        outgoing: PanelId,
        incoming: PanelId,
        keep_outgoing: bool,
    },
    /// Show `node`'s new top if it is hidden.
    Reshow { node: PanelId },
}

pub(crate) struct PanelNode {
    pub(crate) name: String,
    pub(crate) kind: PanelKind,
    pub(crate) template: TemplateId,
    pub(crate) parent: Option<PanelId>,
    /// Bottom → top.
    pub(crate) children: Vec<PanelId>,
    pub(crate) state: PanelState,
    pub(crate) locked: bool,
    /// template → live instance created by this node.
    pub(crate) instance_cache: HashMap<TemplateId, PanelId>,
    pub(crate) hooks: Box<dyn PanelHooks>,
    pub(crate) handle: Option<TransitionHandle>,
    pub(crate) continuations: Vec<Continuation>,
    /// Parent whose own hide waits for this panel's hide.
    pub(crate) hide_waiter: Option<PanelId>,
    pub(crate) pending_child_hides: usize,
    pub(crate) hide_after_show: bool,
    /// Hidden directly while still in its parent's stack; leave the stack
    /// once the hide finishes.
    pub(crate) leave_stack: bool,
}

impl PanelNode {
    pub(crate) fn new(
        name: String,
        kind: PanelKind,
        template: TemplateId,
        parent: Option<PanelId>,
        hooks: Box<dyn PanelHooks>,
    ) -> Self {
        Self {
            name,
            kind,
            template,
            parent,
            children: Vec::new(),
            state: PanelState::Hidden,
            locked: false,
            instance_cache: HashMap::new(),
            hooks,
            handle: None,
            continuations: Vec::new(),
            hide_waiter: None,
            pending_child_hides: 0,
            hide_after_show: false,
            leave_stack: false,
        }
    }
}

impl fmt::Debug for PanelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelNode")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("state", &self.state)
            .field("locked", &self.locked)
            .field("pending_child_hides", &self.pending_child_hides)
            .finish_non_exhaustive()
    }
}

/// The panel arena.
#[derive(Debug)]
pub struct PanelTree {
    nodes: HashMap<PanelId, PanelNode>,
    root: PanelId,
    next_id: Option<PanelId>,
    next_template: u64,
}

impl PanelTree {
    pub(crate) fn new(root_name: String, root_hooks: Box<dyn PanelHooks>) -> Self {
        let root = PanelId::MIN;
        let mut node = PanelNode::new(root_name, PanelKind::Singleton, TemplateId::new(0), None, root_hooks);
        // The root is the backdrop everything else stacks on; it is always up.
        node.state = PanelState::Shown;
        let mut nodes = HashMap::new();
        nodes.insert(root, node);
        Self {
            nodes,
            root,
            next_id: root.checked_next(),
            next_template: 1,
        }
    }

    #[must_use]
    pub fn root(&self) -> PanelId {
        self.root
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: PanelId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub(crate) fn node(&self, id: PanelId) -> Option<&PanelNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: PanelId) -> Option<&mut PanelNode> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn peek_next_id(&self) -> Option<PanelId> {
        self.next_id
    }

    pub(crate) fn insert(&mut self, node: PanelNode) -> Option<PanelId> {
        let id = self.next_id?;
        self.next_id = id.checked_next();
        self.nodes.insert(id, node);
        Some(id)
    }

    pub(crate) fn remove(&mut self, id: PanelId) -> Option<PanelNode> {
        self.nodes.remove(&id)
    }

    pub(crate) fn allocate_template(&mut self) -> TemplateId {
        let template = TemplateId::new(self.next_template);
        self.next_template += 1;
        template
    }

    /// Panels whose parent link points at `id`.
    pub(crate) fn dependents(&self, id: PanelId) -> Vec<PanelId> {
        let mut ids: Vec<PanelId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.parent == Some(id))
            .map(|(&child, _)| child)
            .collect();
        ids.sort_unstable();
        ids
    }

    // -----------------------------------------------------------------------
    // Per-panel queries
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn state(&self, id: PanelId) -> Option<PanelState> {
        self.node(id).map(|n| n.state)
    }

    #[must_use]
    pub fn is_displayed(&self, id: PanelId) -> bool {
        self.state(id).is_some_and(PanelState::is_displayed)
    }

    #[must_use]
    pub fn is_transiting(&self, id: PanelId) -> bool {
        self.state(id).is_some_and(PanelState::is_transiting)
    }

    #[must_use]
    pub fn name(&self, id: PanelId) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    #[must_use]
    pub fn kind(&self, id: PanelId) -> Option<PanelKind> {
        self.node(id).map(|n| n.kind)
    }

    #[must_use]
    pub fn template(&self, id: PanelId) -> Option<TemplateId> {
        self.node(id).map(|n| n.template)
    }

    #[must_use]
    pub fn parent(&self, id: PanelId) -> Option<PanelId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// The panel's own lock flag.
    #[must_use]
    pub fn lock_flag(&self, id: PanelId) -> bool {
        self.node(id).is_some_and(|n| n.locked)
    }

    /// Locked for navigation: the panel or anything in its active stack,
    /// at any depth, is locked.
    #[must_use]
    pub fn is_locked(&self, id: PanelId) -> bool {
        self.lock_holder(id).is_some()
    }

    /// The first locked panel found in `id`'s subtree, checking `id` first
    /// and then its stack from the top down.
    #[must_use]
    pub fn lock_holder(&self, id: PanelId) -> Option<PanelId> {
        let node = self.node(id)?;
        if node.locked {
            return Some(id);
        }
        node.children
            .iter()
            .rev()
            .find_map(|&child| self.lock_holder(child))
    }

    /// Live instance `node` created from `template`, if any.
    #[must_use]
    pub fn instance_of(&self, node: PanelId, template: TemplateId) -> Option<PanelId> {
        self.node(node)?.instance_cache.get(&template).copied()
    }

    // -----------------------------------------------------------------------
    // Stack queries
    // -----------------------------------------------------------------------

    /// Stack of `node`, bottom first.
    #[must_use]
    pub fn stack(&self, node: PanelId) -> &[PanelId] {
        self.node(node).map_or(&[], |n| n.children.as_slice())
    }

    /// Last pushed, not yet popped child.
    #[must_use]
    pub fn top(&self, node: PanelId) -> Option<PanelId> {
        self.stack(node).last().copied()
    }

    #[must_use]
    pub fn depth(&self, node: PanelId) -> usize {
        self.stack(node).len()
    }

    #[must_use]
    pub fn stack_contains(&self, node: PanelId, child: PanelId) -> bool {
        self.stack(node).contains(&child)
    }

    /// Position of `child` counted from the top (0 = top).
    #[must_use]
    pub fn index_of(&self, node: PanelId, child: PanelId) -> Option<usize> {
        self.stack(node)
            .iter()
            .rev()
            .position(|&candidate| candidate == child)
    }

    /// Draw order among siblings: `depth - index`, so the top child has the
    /// highest order and the bottom child has order 1.
    #[must_use]
    pub fn order(&self, node: PanelId, child: PanelId) -> Option<usize> {
        self.index_of(node, child).map(|index| self.depth(node) - index)
    }

    /// Front-most panel under `node`: follow displayed tops down until a
    /// node has no displayed top.
    #[must_use]
    pub fn highest_panel(&self, node: PanelId) -> PanelId {
        let mut current = node;
        while let Some(top) = self.top(current) {
            if !self.is_displayed(top) {
                break;
            }
            current = top;
        }
        current
    }

    /// Walk parent links to the top of the tree.
    #[must_use]
    pub fn root_of(&self, id: PanelId) -> PanelId {
        let mut current = id;
        let mut steps = 0;
        while let Some(parent) = self.parent(current) {
            current = parent;
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
        }
        current
    }

    /// Whether `ancestor` is `id` or lies on `id`'s parent chain.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: PanelId, id: PanelId) -> bool {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.parent(candidate);
        }
        false
    }

    // -----------------------------------------------------------------------
    // Stack mutation
    // -----------------------------------------------------------------------

    /// Push `child` onto `node`'s stack, moving it out of whatever stack held
    /// it before (including `node`'s own) and re-homing its parent link.
    pub(crate) fn push_child(&mut self, node: PanelId, child: PanelId) {
        if let Some(previous) = self.parent(child) {
            self.remove_child(previous, child);
        }
        if let Some(parent) = self.node_mut(node) {
            parent.children.retain(|&c| c != child);
            parent.children.push(child);
        }
        if let Some(entry) = self.node_mut(child) {
            entry.parent = Some(node);
        }
    }

    pub(crate) fn pop_child(&mut self, node: PanelId) -> Option<PanelId> {
        self.node_mut(node)?.children.pop()
    }

    pub(crate) fn remove_child(&mut self, node: PanelId, child: PanelId) -> bool {
        let Some(parent) = self.node_mut(node) else {
            return false;
        };
        let before = parent.children.len();
        parent.children.retain(|&c| c != child);
        parent.children.len() != before
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Structural dump of the active stacks below `node`.
    #[must_use]
    pub fn snapshot(&self, node: PanelId) -> NavSnapshot {
        let (name, state, locked) = self
            .node(node)
            .map(|n| (n.name.clone(), n.state, n.locked))
            .unwrap_or_default();
        NavSnapshot {
            id: node,
            name,
            state,
            locked,
            stack: self
                .stack(node)
                .iter()
                .map(|&child| self.snapshot(child))
                .collect(),
        }
    }
}

/// Point-in-time view of a panel and its active stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavSnapshot {
    pub id: PanelId,
    pub name: String,
    pub state: PanelState,
    pub locked: bool,
    /// Bottom first.
    pub stack: Vec<NavSnapshot>,
}

impl NavSnapshot {
    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{:indent$}{} [{}] {}", "", self.name, self.id, self.state)?;
        if self.locked {
            f.write_str(" locked")?;
        }
        writeln!(f)?;
        for child in self.stack.iter().rev() {
            child.write_indented(f, indent + 2)?;
        }
        Ok(())
    }
}

impl fmt::Display for NavSnapshot {
    /// Renders topmost children first, indented by depth.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NoHooks;

    fn tree_with(count: usize) -> (PanelTree, Vec<PanelId>) {
        let mut tree = PanelTree::new("root".into(), Box::new(NoHooks));
        let root = tree.root();
        let ids = (0..count)
            .map(|i| {
                let template = tree.allocate_template();
                let node = PanelNode::new(
                    format!("p{i}"),
                    PanelKind::Singleton,
                    template,
                    Some(root),
                    Box::new(NoHooks),
                );
                tree.insert(node).unwrap()
            })
            .collect();
        (tree, ids)
    }

    #[test]
    fn push_pop_is_lifo() {
        let (mut tree, ids) = tree_with(3);
        let root = tree.root();
        for &id in &ids {
            tree.push_child(root, id);
        }
        assert_eq!(tree.top(root), Some(ids[2]));
        assert_eq!(tree.depth(root), 3);
        assert_eq!(tree.pop_child(root), Some(ids[2]));
        assert_eq!(tree.top(root), Some(ids[1]));
    }

    #[test]
    fn order_is_highest_on_top() {
        let (mut tree, ids) = tree_with(3);
        let root = tree.root();
        for &id in &ids {
            tree.push_child(root, id);
        }
        assert_eq!(tree.index_of(root, ids[2]), Some(0));
        assert_eq!(tree.order(root, ids[2]), Some(3));
        assert_eq!(tree.order(root, ids[1]), Some(2));
        assert_eq!(tree.order(root, ids[0]), Some(1));
    }

    #[test]
    fn repush_moves_instead_of_duplicating() {
        let (mut tree, ids) = tree_with(2);
        let root = tree.root();
        tree.push_child(root, ids[0]);
        tree.push_child(root, ids[1]);
        tree.push_child(root, ids[0]);
        assert_eq!(tree.stack(root), &[ids[1], ids[0]]);
    }

    #[test]
    fn push_elsewhere_leaves_old_stack() {
        let (mut tree, ids) = tree_with(2);
        let root = tree.root();
        tree.push_child(root, ids[0]);
        tree.push_child(root, ids[1]);
        tree.push_child(ids[0], ids[1]);
        assert_eq!(tree.stack(root), &[ids[0]]);
        assert_eq!(tree.stack(ids[0]), &[ids[1]]);
        assert_eq!(tree.parent(ids[1]), Some(ids[0]));
        assert_eq!(tree.root_of(ids[1]), root);
    }

    #[test]
    fn highest_panel_follows_displayed_tops() {
        let (mut tree, ids) = tree_with(3);
        let root = tree.root();
        tree.push_child(root, ids[0]);
        tree.push_child(ids[0], ids[1]);
        assert_eq!(tree.highest_panel(root), root);

        tree.node_mut(ids[0]).unwrap().state = PanelState::Shown;
        tree.node_mut(ids[1]).unwrap().state = PanelState::Showing;
        assert_eq!(tree.highest_panel(root), ids[1]);

        tree.node_mut(ids[1]).unwrap().state = PanelState::Hiding;
        assert_eq!(tree.highest_panel(root), ids[0]);
    }

    #[test]
    fn lock_is_recursive_over_active_stack() {
        let (mut tree, ids) = tree_with(3);
        let root = tree.root();
        tree.push_child(root, ids[0]);
        tree.push_child(ids[0], ids[1]);
        tree.node_mut(ids[1]).unwrap().locked = true;
        assert!(tree.is_locked(ids[0]));
        assert_eq!(tree.lock_holder(root), Some(ids[1]));
        assert!(!tree.lock_flag(ids[0]));

        tree.remove_child(ids[0], ids[1]);
        assert!(!tree.is_locked(ids[0]));
    }

    #[test]
    fn unknown_ids_answer_empty() {
        let (tree, _) = tree_with(0);
        let ghost = PanelId::from_raw(99).unwrap();
        assert_eq!(tree.depth(ghost), 0);
        assert_eq!(tree.top(ghost), None);
        assert_eq!(tree.state(ghost), None);
        assert!(!tree.is_locked(ghost));
    }

    #[test]
    fn snapshot_renders_top_first() {
        let (mut tree, ids) = tree_with(2);
        let root = tree.root();
        tree.push_child(root, ids[0]);
        tree.push_child(root, ids[1]);
        tree.node_mut(ids[1]).unwrap().locked = true;
        let text = tree.snapshot(root).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "root [panel#1] shown");
        assert_eq!(lines[1], "  p1 [panel#3] hidden locked");
        assert_eq!(lines[2], "  p0 [panel#2] hidden");
    }
}
