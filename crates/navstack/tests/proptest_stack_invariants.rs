//! Property-based invariant tests for the panel tree.
//!
//! Random operation sequences run against a navigator with instant
//! transitions. After every step:
//!
//! 1. No panel is left transiting.
//! 2. Every panel sits in at most one stack, and its parent link names
//!    that stack's owner.
//! 3. Every panel still descends from the root (no cycles).
//! 4. The top of a non-empty stack has order equal to the stack depth.
//! 5. A successful pop removes exactly one entry.
//! 6. A pop is refused exactly when `can_pop` says so.
//! 7. A successful push leaves the panel on top and displayed.
//! 8. Showing a displayed panel is refused and changes nothing.
//! 9. Bulk pops never hide a locked panel.

use std::collections::HashMap;

use navstack::{
    InstantTransitions, NavConfig, NavRejection, Navigator, NoHooks, PanelId, PanelSpec,
    PanelState,
};
use proptest::prelude::*;

const PANELS: usize = 6;

#[derive(Debug, Clone)]
enum Op {
    PushOnTop { node: usize, panel: usize },
    Replace { node: usize, panel: usize, keep: bool, instant: bool },
    Pop { node: usize },
    PopAll { node: usize },
    PopUntilOne { node: usize },
    Lock { panel: usize, locked: bool },
    Back { node: usize },
    Show { panel: usize },
}

// ── Strategies ────────────────────────────────────────────────────────────

fn node_index() -> impl Strategy<Value = usize> {
    // 0 is the root.
    prop_oneof![3 => Just(0usize), 2 => 1..=PANELS]
}

fn panel_index() -> impl Strategy<Value = usize> {
    1..=PANELS
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (node_index(), panel_index()).prop_map(|(node, panel)| Op::PushOnTop { node, panel }),
        2 => (node_index(), panel_index(), any::<bool>(), any::<bool>())
            .prop_map(|(node, panel, keep, instant)| Op::Replace { node, panel, keep, instant }),
        3 => node_index().prop_map(|node| Op::Pop { node }),
        1 => node_index().prop_map(|node| Op::PopAll { node }),
        1 => node_index().prop_map(|node| Op::PopUntilOne { node }),
        1 => (panel_index(), any::<bool>()).prop_map(|(panel, locked)| Op::Lock { panel, locked }),
        1 => node_index().prop_map(|node| Op::Back { node }),
        1 => panel_index().prop_map(|panel| Op::Show { panel }),
    ]
}

fn ops(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(op_strategy(), 1..=max_len)
}

// ── Harness ───────────────────────────────────────────────────────────────

struct World {
    nav: Navigator,
    ids: Vec<PanelId>,
}

impl World {
    fn new() -> Self {
        let mut nav = Navigator::new("root", NavConfig::default(), InstantTransitions);
        let root = nav.root();
        let mut ids = vec![root];
        for i in 1..=PANELS {
            ids.push(
                nav.register(root, PanelSpec::new(format!("p{i}")), Box::new(NoHooks))
                    .unwrap(),
            );
        }
        Self { nav, ids }
    }

    fn id(&self, index: usize) -> PanelId {
        self.ids[index]
    }

    fn check_structure(&self) -> Result<(), TestCaseError> {
        let tree = self.nav.tree();
        let root = tree.root();
        let mut owner: HashMap<PanelId, PanelId> = HashMap::new();
        for &node in &self.ids {
            // 1
            prop_assert!(!tree.is_transiting(node), "{node} left transiting");
            // 3
            prop_assert_eq!(tree.root_of(node), root);

            let stack = tree.stack(node);
            prop_assert_eq!(stack.len(), tree.depth(node));
            // 4
            if let Some(top) = tree.top(node) {
                prop_assert_eq!(tree.order(node, top), Some(stack.len()));
            }
            for &child in stack {
                // 2
                prop_assert!(owner.insert(child, node).is_none(), "{child} in two stacks");
                prop_assert_eq!(tree.parent(child), Some(node));
            }
        }
        Ok(())
    }

    fn apply(&mut self, op: &Op) -> Result<(), TestCaseError> {
        match *op {
            Op::PushOnTop { node, panel } => {
                let (node, panel) = (self.id(node), self.id(panel));
                if self.nav.push_on_top(node, panel).is_ok() {
                    // 7
                    prop_assert_eq!(self.nav.tree().top(node), Some(panel));
                    prop_assert!(self.nav.tree().is_displayed(panel));
                }
            }
            Op::Replace { node, panel, keep, instant } => {
                let (node, panel) = (self.id(node), self.id(panel));
                if self.nav.push_replace(node, panel, keep, false, instant).is_ok() {
                    prop_assert_eq!(self.nav.tree().top(node), Some(panel));
                    prop_assert_eq!(self.nav.tree().state(panel), Some(PanelState::Shown));
                }
            }
            Op::Pop { node } => {
                let node = self.id(node);
                let depth = self.nav.tree().depth(node);
                let can_pop = self.nav.can_pop(node);
                match self.nav.pop(node, false) {
                    Ok(outcome) => {
                        // 5
                        prop_assert_eq!(outcome.popped.len(), 1);
                        prop_assert_eq!(self.nav.tree().depth(node), depth - 1);
                        // 6
                        prop_assert!(can_pop);
                    }
                    Err(NavRejection::EmptyStack(_)) => prop_assert_eq!(depth, 0),
                    Err(NavRejection::Blocked { .. }) => prop_assert!(!can_pop),
                    Err(other) => prop_assert!(false, "unexpected rejection {other}"),
                }
            }
            Op::PopAll { node } => {
                let node = self.id(node);
                let locked: Vec<_> = self
                    .nav
                    .tree()
                    .stack(node)
                    .iter()
                    .copied()
                    .filter(|&p| self.nav.is_locked(p))
                    .map(|p| (p, self.nav.tree().state(p)))
                    .collect();
                let outcome = self.nav.pop_all(node).unwrap();
                // 9
                prop_assert_eq!(outcome.retained.len(), locked.len());
                for (panel, state) in locked {
                    prop_assert_eq!(self.nav.tree().state(panel), state);
                    prop_assert!(self.nav.tree().stack_contains(node, panel));
                }
            }
            Op::PopUntilOne { node } => {
                let node = self.id(node);
                self.nav.pop_until_only_one_remains(node).unwrap();
            }
            Op::Lock { panel, locked } => {
                let panel = self.id(panel);
                self.nav.lock(panel, locked).unwrap();
            }
            Op::Back { node } => {
                let node = self.id(node);
                let _ = self.nav.back(node);
            }
            Op::Show { panel } => {
                let panel = self.id(panel);
                let before = self.nav.tree().state(panel);
                let result = self.nav.show(panel);
                if before.is_some_and(PanelState::is_displayed) {
                    // 8
                    prop_assert_eq!(result.err(), Some(NavRejection::AlreadyDisplayed(panel)));
                    prop_assert_eq!(self.nav.tree().state(panel), before);
                }
            }
        }
        Ok(())
    }
}

// ═════════════════════════════════════════════════════════════════════════
// INVARIANTS
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn structure_holds_after_every_step(sequence in ops(60)) {
        let mut world = World::new();
        for op in &sequence {
            world.apply(op)?;
            world.check_structure()?;
        }
    }

    #[test]
    fn push_pop_depth_roundtrip(count in 1usize..=PANELS) {
        let mut world = World::new();
        let root = world.nav.root();
        for i in 1..=count {
            let id = world.id(i);
            world.nav.push_on_top(root, id).unwrap();
            prop_assert_eq!(world.nav.tree().depth(root), i);
            prop_assert_eq!(world.nav.tree().highest_panel(root), id);
        }
        for i in (0..count).rev() {
            world.nav.pop(root, false).unwrap();
            prop_assert_eq!(world.nav.tree().depth(root), i);
        }
        prop_assert!(!world.nav.dimmer_visible());
    }

    #[test]
    fn determinism(sequence in ops(40)) {
        let mut first = World::new();
        let mut second = World::new();
        for op in &sequence {
            first.apply(op)?;
            second.apply(op)?;
        }
        prop_assert_eq!(
            first.nav.snapshot().to_string(),
            second.nav.snapshot().to_string()
        );
    }
}
