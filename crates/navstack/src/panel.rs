#![forbid(unsafe_code)]

//! Panel transitions and stack operations.
//!
//! Every operation here acts on the stack owned by one node ("this" node,
//! passed as `node`). The rules:
//!
//! - A panel only starts showing from `Hidden` and only starts hiding from
//!   `Shown`; a transition that has started always runs to completion.
//! - Hiding a panel first dismisses its own stack, topmost first and with
//!   the same lock rule as `pop_all`. Its own visual hide starts only once
//!   every child hide has finished.
//! - Pops and replaces are refused while the node, or any panel in its stack
//!   (at any depth), is locked or transiting. A refused replace degrades to
//!   an overlay push.
//! - Bulk pops set locked panels aside and push them back afterwards in
//!   their original order; those panels are never hidden.
//!
//! Rejections are returned as [`NavRejection`] and logged at `warn`.

use std::mem;

use navstack_core::{PanelId, PanelState, TransitionDirection};

use crate::error::{NavRejection, PopOutcome, PushOutcome};
use crate::host::TemplateInfo;
use crate::root::{NavEvent, Navigator};
use crate::stack::{Continuation, PanelKind, PanelNode, PanelTree};
use crate::transition::{TransitionDriver, TransitionHandle, TransitionStep};

fn logged<T>(op: &'static str, result: Result<T, NavRejection>) -> Result<T, NavRejection> {
    if let Err(reason) = &result {
        tracing::warn!(op, reason = %reason, "navigation rejected");
    }
    result
}

impl<D: TransitionDriver> Navigator<D> {
    fn require(&self, id: PanelId) -> Result<(), NavRejection> {
        if self.tree.contains(id) {
            Ok(())
        } else {
            Err(NavRejection::UnknownPanel(id))
        }
    }

    fn require_state(&self, id: PanelId) -> Result<PanelState, NavRejection> {
        self.tree.state(id).ok_or(NavRejection::UnknownPanel(id))
    }

    /// `panel` may go onto `node`'s stack: it is not the root, and not
    /// `node` or one of `node`'s ancestors.
    fn check_target(&self, node: PanelId, panel: PanelId) -> Result<(), NavRejection> {
        if panel == self.tree.root()
            || self.tree.is_ancestor_or_self(panel, node)
            || self.tree.kind(panel) == Some(PanelKind::Template)
        {
            return Err(NavRejection::InvalidTarget { node, panel });
        }
        Ok(())
    }

    fn check_not_transiting(&self, panel: PanelId) -> Result<(), NavRejection> {
        let state = self.require_state(panel)?;
        if state.is_transiting() {
            return Err(NavRejection::Transiting { panel, state });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Instancing and locks
    // -----------------------------------------------------------------------

    /// Resolve a push target. Reusable panels and existing instances are
    /// returned as-is; a use-once template gets a fresh instance, cached in
    /// `node` under the template's id (replacing any earlier entry).
    pub fn create_or_reuse(&mut self, node: PanelId, template: PanelId) -> Result<PanelId, NavRejection> {
        self.require(node)?;
        let Some(source) = self.tree.node(template) else {
            return Err(NavRejection::UnknownPanel(template));
        };
        if source.kind != PanelKind::Template {
            return Ok(template);
        }
        let template_id = source.template;
        let name = source.name.clone();
        let locked = source.locked;

        let instance = self.tree.peek_next_id().ok_or(NavRejection::IdsExhausted)?;
        let hooks = self.factory.instantiate(&TemplateInfo {
            template_panel: template,
            template: template_id,
            instance,
            name: &name,
        });
        let mut entry = PanelNode::new(name, PanelKind::Instance, template_id, Some(node), hooks);
        entry.locked = locked;
        let instance = self.tree.insert(entry).ok_or(NavRejection::IdsExhausted)?;

        let replaced = self
            .tree
            .node_mut(node)
            .and_then(|owner| owner.instance_cache.insert(template_id, instance));
        match replaced {
            Some(previous) => tracing::debug!(
                template = %template_id,
                instance = %instance,
                previous = %previous,
                "replaced cached use-once instance"
            ),
            None => tracing::debug!(template = %template_id, instance = %instance, "created use-once instance"),
        }
        Ok(instance)
    }

    /// Set the panel's own lock flag.
    pub fn lock(&mut self, panel: PanelId, locked: bool) -> Result<(), NavRejection> {
        let node = self
            .tree
            .node_mut(panel)
            .ok_or(NavRejection::UnknownPanel(panel))?;
        node.locked = locked;
        tracing::debug!(panel = %panel, locked, "lock changed");
        Ok(())
    }

    /// The panel or anything in its active stack is locked.
    #[must_use]
    pub fn is_locked(&self, panel: PanelId) -> bool {
        self.tree.is_locked(panel)
    }

    /// First panel preventing a pop on `node`: `node` itself when locked or
    /// transiting, otherwise the topmost stack entry that is transiting or
    /// holds a lock anywhere in its subtree.
    #[must_use]
    pub fn pop_blocker(&self, node: PanelId) -> Option<PanelId> {
        let entry = self.tree.node(node)?;
        if entry.locked || entry.state.is_transiting() {
            return Some(node);
        }
        entry.children.iter().rev().find_map(|&child| {
            if self.tree.is_transiting(child) {
                Some(child)
            } else {
                self.tree.lock_holder(child)
            }
        })
    }

    #[must_use]
    pub fn can_pop(&self, node: PanelId) -> bool {
        self.tree.contains(node) && self.pop_blocker(node).is_none()
    }

    // -----------------------------------------------------------------------
    // Show / hide
    // -----------------------------------------------------------------------

    /// Start showing a hidden panel.
    pub fn show(&mut self, panel: PanelId) -> Result<TransitionHandle, NavRejection> {
        logged("show", self.try_show(panel))
    }

    fn try_show(&mut self, panel: PanelId) -> Result<TransitionHandle, NavRejection> {
        let state = self.require_state(panel)?;
        if state.is_transiting() {
            return Err(NavRejection::Transiting { panel, state });
        }
        if state.is_displayed() {
            return Err(NavRejection::AlreadyDisplayed(panel));
        }
        if self.tree.kind(panel) == Some(PanelKind::Template) {
            return Err(NavRejection::InvalidTarget { node: panel, panel });
        }
        Ok(self.begin_show(panel))
    }

    /// Start hiding a shown panel, dismissing its own stack first. The panel
    /// leaves its parent's stack once the hide finishes.
    pub fn hide(&mut self, panel: PanelId) -> Result<TransitionHandle, NavRejection> {
        logged("hide", self.try_hide(panel))
    }

    fn try_hide(&mut self, panel: PanelId) -> Result<TransitionHandle, NavRejection> {
        let state = self.require_state(panel)?;
        if panel == self.tree.root() {
            return Err(NavRejection::InvalidTarget { node: panel, panel });
        }
        if state.is_transiting() {
            return Err(NavRejection::Transiting { panel, state });
        }
        if state != PanelState::Shown {
            return Err(NavRejection::NotDisplayed(panel));
        }
        if let Some(node) = self.tree.node_mut(panel) {
            node.leave_stack = true;
        }
        Ok(self.begin_hide(panel))
    }

    fn begin_show(&mut self, panel: PanelId) -> TransitionHandle {
        let _span = tracing::debug_span!("navstack.show", panel = %panel).entered();
        let handle = TransitionHandle::new(panel, TransitionDirection::Show);
        let Some(node) = self.tree.node_mut(panel) else {
            return handle;
        };
        node.state = PanelState::Showing;
        node.hide_after_show = false;
        node.leave_stack = false;
        node.handle = Some(handle.clone());
        node.hooks.before_show(panel);
        let parent = node.parent;

        // A showing panel goes in front of every sibling.
        let order = parent.map_or(0, |p| {
            let depth = self.tree.depth(p);
            if self.tree.stack_contains(p, panel) { depth } else { depth + 1 }
        });
        self.host.place(panel, parent, order);
        self.host.set_active(panel, true);
        self.host.set_interactable(panel, false);
        tracing::trace!(panel = %panel, order, "showing");

        if self.driver.begin(panel, TransitionDirection::Show) == TransitionStep::Instant {
            self.finish_show(panel);
        }
        handle
    }

    fn begin_hide(&mut self, panel: PanelId) -> TransitionHandle {
        let _span = tracing::debug_span!("navstack.hide", panel = %panel).entered();
        let handle = TransitionHandle::new(panel, TransitionDirection::Hide);
        let Some(node) = self.tree.node_mut(panel) else {
            return handle;
        };
        node.state = PanelState::Hiding;
        node.handle = Some(handle.clone());
        node.hooks.before_hide(panel);
        let children = mem::take(&mut node.children);
        self.host.set_interactable(panel, false);
        tracing::trace!(panel = %panel, children = children.len(), "hiding");

        // Children go first, topmost first, with the same lock rule as
        // `pop_all`. The parent's own visual step waits for every child hide
        // still in flight.
        let mut waiting = 0;
        let mut retained = Vec::new();
        for child in children.into_iter().rev() {
            if self.tree.is_locked(child) {
                retained.push(child);
            } else if self.dismiss(child, Some(panel)) {
                waiting += 1;
            }
        }
        if let Some(node) = self.tree.node_mut(panel) {
            if !retained.is_empty() {
                tracing::debug!(panel = %panel, retained = ?retained, "locked children stay");
                retained.reverse();
                retained.append(&mut node.children);
                node.children = retained;
            }
            node.pending_child_hides += waiting;
        }
        if waiting == 0 {
            self.start_hide_visual(panel);
        }
        handle
    }

    fn start_hide_visual(&mut self, panel: PanelId) {
        if self.driver.begin(panel, TransitionDirection::Hide) == TransitionStep::Instant {
            self.finish_hide(panel);
        }
    }

    /// Take a panel that just left a stack out of view. Returns whether
    /// `waiter` now waits for a hide completion from it.
    fn dismiss(&mut self, panel: PanelId, waiter: Option<PanelId>) -> bool {
        let Some(state) = self.tree.state(panel) else {
            return false;
        };
        match state {
            PanelState::Shown => {
                self.begin_hide(panel);
                let still_hiding = self.tree.state(panel) == Some(PanelState::Hiding);
                if still_hiding && let Some(node) = self.tree.node_mut(panel) {
                    node.hide_waiter = waiter;
                }
                still_hiding && waiter.is_some()
            }
            PanelState::Showing => {
                if let Some(node) = self.tree.node_mut(panel) {
                    node.hide_after_show = true;
                    node.hide_waiter = waiter;
                }
                waiter.is_some()
            }
            PanelState::Hiding => {
                if waiter.is_some()
                    && let Some(node) = self.tree.node_mut(panel)
                {
                    node.hide_waiter = waiter;
                }
                waiter.is_some()
            }
            PanelState::Hidden => {
                self.release_if_instance(panel);
                false
            }
        }
    }

    /// Completion of the in-flight visual step for `panel`.
    pub(crate) fn finish_visual(&mut self, panel: PanelId) -> Result<PanelState, NavRejection> {
        let (state, remaining) = self
            .tree
            .node(panel)
            .map(|node| (node.state, node.pending_child_hides))
            .ok_or(NavRejection::UnknownPanel(panel))?;
        match state {
            PanelState::Showing => self.finish_show(panel),
            PanelState::Hiding if remaining > 0 => {
                return Err(NavRejection::ChildrenPending { panel, remaining });
            }
            PanelState::Hiding => self.finish_hide(panel),
            PanelState::Hidden | PanelState::Shown => {
                return Err(NavRejection::NotTransiting(panel));
            }
        }
        Ok(self.tree.state(panel).unwrap_or(PanelState::Hidden))
    }

    fn finish_show(&mut self, panel: PanelId) {
        let Some(node) = self.tree.node_mut(panel) else {
            return;
        };
        node.state = PanelState::Shown;
        node.hooks.after_show(panel);
        let handle = node.handle.take();
        let hide_next = mem::take(&mut node.hide_after_show);

        self.host.set_interactable(panel, true);
        if let Some(handle) = handle {
            handle.resolve(PanelState::Shown);
        }
        tracing::debug!(panel = %panel, "shown");
        self.emit(NavEvent::Shown(panel));
        self.transition_finished(panel, TransitionDirection::Show);

        if hide_next && self.tree.state(panel) == Some(PanelState::Shown) {
            tracing::debug!(panel = %panel, "hiding after show completed");
            self.begin_hide(panel);
        }
    }

    fn finish_hide(&mut self, panel: PanelId) {
        let Some(node) = self.tree.node_mut(panel) else {
            return;
        };
        node.state = PanelState::Hidden;
        node.hooks.after_hide(panel);
        let handle = node.handle.take();
        let continuations = mem::take(&mut node.continuations);
        let waiter = node.hide_waiter.take();
        let leave_stack = mem::take(&mut node.leave_stack);
        let parent = node.parent;
        let kind = node.kind;

        if leave_stack && let Some(parent) = parent {
            self.tree.remove_child(parent, panel);
        }
        self.host.set_active(panel, false);
        if let Some(handle) = handle {
            handle.resolve(PanelState::Hidden);
        }
        tracing::debug!(panel = %panel, "hidden");
        self.emit(NavEvent::Hidden(panel));

        if kind == PanelKind::Instance {
            self.schedule_destroy(panel);
        }
        for continuation in continuations {
            self.run_continuation(continuation);
        }
        if let Some(parent) = waiter {
            self.child_hide_finished(parent);
        }
        self.transition_finished(panel, TransitionDirection::Hide);
    }

    fn child_hide_finished(&mut self, parent: PanelId) {
        let Some(node) = self.tree.node_mut(parent) else {
            return;
        };
        if node.pending_child_hides == 0 {
            return;
        }
        node.pending_child_hides -= 1;
        if node.pending_child_hides == 0 && node.state == PanelState::Hiding {
            self.start_hide_visual(parent);
        }
    }

    fn release_if_instance(&mut self, panel: PanelId) {
        if self.tree.kind(panel) == Some(PanelKind::Instance)
            && self.tree.state(panel) == Some(PanelState::Hidden)
        {
            self.schedule_destroy(panel);
        }
    }

    fn run_continuation(&mut self, continuation: Continuation) {
        // A node that started hiding meanwhile takes no new visible children.
        match continuation {
            Continuation::Replace {
                node,
                outgoing,
                incoming,
                keep_outgoing,
            } => {
                if !keep_outgoing {
                    self.tree.remove_child(node, outgoing);
                }
                if self.tree.state(node) == Some(PanelState::Hiding) {
                    tracing::debug!(node = %node, panel = %incoming, "owner hiding, replace dropped");
                    return;
                }
                match self.check_not_transiting(incoming) {
                    Ok(()) => self.place_and_show(node, incoming),
                    Err(reason) => {
                        tracing::warn!(panel = %incoming, reason = %reason, "deferred replace dropped");
                    }
                }
            }
            Continuation::Reshow { node } => {
                if self.tree.state(node) != Some(PanelState::Hiding) {
                    self.reshow_top(node);
                }
            }
        }
    }

    /// Put `panel` on top of `node`'s stack and make sure it is visible.
    fn place_and_show(&mut self, node: PanelId, panel: PanelId) {
        self.tree.push_child(node, panel);
        match self.tree.state(panel) {
            Some(PanelState::Hidden) => {
                self.begin_show(panel);
            }
            Some(PanelState::Shown) => {
                let order = self.tree.order(node, panel).unwrap_or(0);
                self.host.place(panel, Some(node), order);
            }
            _ => {}
        }
    }

    /// Show `node`'s top again if it is sitting hidden in the stack.
    fn reshow_top(&mut self, node: PanelId) {
        let Some(top) = self.tree.top(node) else {
            return;
        };
        if self.tree.state(top) != Some(PanelState::Hidden) {
            return;
        }
        self.begin_show(top);
        if let Some(entry) = self.tree.node_mut(top) {
            entry.hooks.on_reshow(top);
        }
    }

    // -----------------------------------------------------------------------
    // Push
    // -----------------------------------------------------------------------

    /// Overlay `panel` on `node`'s stack without touching what is below.
    pub fn push_on_top(&mut self, node: PanelId, panel: PanelId) -> Result<PushOutcome, NavRejection> {
        let _span = tracing::debug_span!("navstack.push_on_top", node = %node, panel = %panel).entered();
        logged("push_on_top", self.try_push_on_top(node, panel))
    }

    fn try_push_on_top(&mut self, node: PanelId, panel: PanelId) -> Result<PushOutcome, NavRejection> {
        self.require(node)?;
        self.require(panel)?;
        let panel = self.create_or_reuse(node, panel)?;
        self.check_target(node, panel)?;
        if self.tree.top(node) == Some(panel) && self.tree.is_displayed(panel) {
            tracing::debug!(node = %node, panel = %panel, "already on top");
            return Ok(PushOutcome::AlreadyOnTop(panel));
        }
        self.check_not_transiting(panel)?;
        self.place_and_show(node, panel);
        Ok(PushOutcome::Pushed(panel))
    }

    /// Replace `node`'s top with `panel`.
    ///
    /// - `keep_current_in_stack`: leave the old top (hidden) below `panel`.
    /// - `only_if_inactive`: refuse when `panel` is already displayed in the
    ///   stack.
    /// - `instant`: swap the stack right away instead of waiting for the old
    ///   top's hide to finish.
    ///
    /// When the stack cannot be popped (locked or transiting entries) the
    /// panel is overlaid instead and [`PushOutcome::Overlaid`] is returned.
    pub fn push_replace(
        &mut self,
        node: PanelId,
        panel: PanelId,
        keep_current_in_stack: bool,
        only_if_inactive: bool,
        instant: bool,
    ) -> Result<PushOutcome, NavRejection> {
        let _span = tracing::debug_span!("navstack.push_replace", node = %node, panel = %panel).entered();
        logged(
            "push_replace",
            self.try_push_replace(node, panel, keep_current_in_stack, only_if_inactive, instant),
        )
    }

    fn try_push_replace(
        &mut self,
        node: PanelId,
        panel: PanelId,
        keep: bool,
        only_if_inactive: bool,
        instant: bool,
    ) -> Result<PushOutcome, NavRejection> {
        self.require(node)?;
        self.require(panel)?;
        let panel = self.create_or_reuse(node, panel)?;
        self.check_target(node, panel)?;
        self.check_not_transiting(panel)?;

        let current = self.tree.top(node);
        if current == Some(panel) {
            return Err(NavRejection::AlreadyOnTop { node, panel });
        }
        if only_if_inactive && self.tree.is_displayed(panel) && self.tree.stack_contains(node, panel) {
            return Err(NavRejection::AlreadyActive { node, panel });
        }

        let Some(current) = current else {
            self.place_and_show(node, panel);
            return Ok(PushOutcome::Replaced {
                panel,
                previous: None,
            });
        };

        if let Some(blocked_by) = self.pop_blocker(node) {
            tracing::warn!(
                node = %node,
                panel = %panel,
                blocked_by = %blocked_by,
                "replace blocked, overlaying instead"
            );
            self.place_and_show(node, panel);
            return Ok(PushOutcome::Overlaid { panel, blocked_by });
        }

        if self.tree.state(current) == Some(PanelState::Shown) {
            if !instant
                && let Some(outgoing) = self.tree.node_mut(current)
            {
                outgoing.continuations.push(Continuation::Replace {
                    node,
                    outgoing: current,
                    incoming: panel,
                    keep_outgoing: keep,
                });
            }
            self.begin_hide(current);

            if instant {
                if !keep {
                    self.tree.remove_child(node, current);
                }
                self.place_and_show(node, panel);
            } else if self.tree.state(current) != Some(PanelState::Hidden) {
                return Ok(PushOutcome::Deferred {
                    panel,
                    previous: current,
                });
            }
            return Ok(PushOutcome::Replaced {
                panel,
                previous: Some(current),
            });
        }

        if !keep {
            self.tree.remove_child(node, current);
            self.release_if_instance(current);
        }
        self.place_and_show(node, panel);
        Ok(PushOutcome::Replaced {
            panel,
            previous: Some(current),
        })
    }

    // -----------------------------------------------------------------------
    // Pop
    // -----------------------------------------------------------------------

    /// Pop and hide `node`'s top. Once the hide finishes (or right away when
    /// `instant`), a hidden new top is shown again.
    pub fn pop(&mut self, node: PanelId, instant: bool) -> Result<PopOutcome, NavRejection> {
        let _span = tracing::debug_span!("navstack.pop", node = %node).entered();
        logged("pop", self.try_pop(node, instant))
    }

    fn try_pop(&mut self, node: PanelId, instant: bool) -> Result<PopOutcome, NavRejection> {
        self.require(node)?;
        let Some(top) = self.tree.top(node) else {
            return Err(NavRejection::EmptyStack(node));
        };
        if let Some(by) = self.pop_blocker(node) {
            return Err(NavRejection::Blocked { node, by });
        }
        self.tree.pop_child(node);

        if self.tree.state(top) == Some(PanelState::Shown) {
            if !instant && let Some(entry) = self.tree.node_mut(top) {
                entry.continuations.push(Continuation::Reshow { node });
            }
            self.begin_hide(top);
            if instant {
                self.reshow_top(node);
            }
        } else {
            self.release_if_instance(top);
            self.reshow_top(node);
        }
        Ok(PopOutcome {
            popped: vec![top],
            retained: Vec::new(),
        })
    }

    /// Pop `node`'s stack from the top while `keep_going` says so, setting
    /// locked panels aside and pushing them back in their original order.
    fn pop_while<F>(&mut self, node: PanelId, mut keep_going: F) -> PopOutcome
    where
        F: FnMut(&PanelTree, PanelId) -> bool,
    {
        self.suspend_dequeue += 1;
        let mut outcome = PopOutcome::default();
        let mut set_aside = Vec::new();
        while let Some(top) = self.tree.top(node) {
            if !keep_going(&self.tree, top) {
                break;
            }
            self.tree.pop_child(node);
            if self.tree.is_locked(top) {
                set_aside.push(top);
                continue;
            }
            self.dismiss(top, None);
            outcome.popped.push(top);
        }
        for &panel in set_aside.iter().rev() {
            self.tree.push_child(node, panel);
        }
        set_aside.reverse();
        outcome.retained = set_aside;
        self.suspend_dequeue -= 1;
        if !outcome.retained.is_empty() {
            tracing::debug!(node = %node, retained = ?outcome.retained, "kept locked panels");
        }
        outcome
    }

    /// Pop everything except locked panels, which stay shown.
    pub fn pop_all(&mut self, node: PanelId) -> Result<PopOutcome, NavRejection> {
        let _span = tracing::debug_span!("navstack.pop_all", node = %node).entered();
        logged("pop_all", self.require(node))?;
        let outcome = self.pop_while(node, |_, _| true);
        self.refresh_root();
        Ok(outcome)
    }

    /// Pop until one panel remains (plus any locked panels set aside), then
    /// reshow the top if it is hidden.
    pub fn pop_until_only_one_remains(&mut self, node: PanelId) -> Result<PopOutcome, NavRejection> {
        let _span = tracing::debug_span!("navstack.pop_until_one", node = %node).entered();
        logged("pop_until_only_one_remains", self.require(node))?;
        let outcome = self.pop_while(node, |tree, _| tree.depth(node) > 1);
        self.reshow_top(node);
        self.refresh_root();
        Ok(outcome)
    }

    /// Pop until `target` itself has been popped.
    pub fn pop_until_panel_removed(
        &mut self,
        node: PanelId,
        target: PanelId,
    ) -> Result<PopOutcome, NavRejection> {
        let _span = tracing::debug_span!("navstack.pop_until_removed", node = %node, target = %target).entered();
        logged("pop_until_panel_removed", self.require_in_stack(node, target))?;
        let mut reached = false;
        let outcome = self.pop_while(node, |_, top| {
            if reached {
                return false;
            }
            reached = top == target;
            true
        });
        self.reshow_top(node);
        self.refresh_root();
        Ok(outcome)
    }

    /// Pop until `target` is the top. `target` itself stays.
    pub fn pop_until_panel_on_top(
        &mut self,
        node: PanelId,
        target: PanelId,
    ) -> Result<PopOutcome, NavRejection> {
        let _span = tracing::debug_span!("navstack.pop_until_on_top", node = %node, target = %target).entered();
        logged("pop_until_panel_on_top", self.require_in_stack(node, target))?;
        let outcome = self.pop_while(node, |_, top| top != target);
        self.reshow_top(node);
        self.refresh_root();
        Ok(outcome)
    }

    fn require_in_stack(&self, node: PanelId, target: PanelId) -> Result<(), NavRejection> {
        self.require(node)?;
        if !self.tree.stack_contains(node, target) {
            return Err(NavRejection::NotInStack { node, target });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Back navigation
    // -----------------------------------------------------------------------

    /// Depth-first back step: descend through tops whose own top is on
    /// screen and pop the deepest one.
    pub fn pop_children_then_parent(&mut self, node: PanelId) -> Result<PopOutcome, NavRejection> {
        logged("pop_children_then_parent", self.require(node))?;
        if let Some(top) = self.tree.top(node)
            && self.tree.is_displayed(top)
            && self.tree.highest_panel(top) != top
        {
            return self.pop_children_then_parent(top);
        }
        self.pop(node, false)
    }

    /// Go back from `node`: the root delegates to the front-most panel; any
    /// other panel asks its parent to pop depth-first.
    pub fn back(&mut self, node: PanelId) -> Result<PopOutcome, NavRejection> {
        logged("back", self.require(node))?;
        match self.tree.parent(node) {
            Some(parent) => self.pop_children_then_parent(parent),
            None => {
                let highest = self.tree.highest_panel(node);
                if highest == node {
                    return logged("back", Err(NavRejection::NothingToGoBack));
                }
                self.back(highest)
            }
        }
    }
}
