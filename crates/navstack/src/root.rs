#![forbid(unsafe_code)]

//! The navigation root.
//!
//! [`Navigator`] owns the whole panel tree plus the collaborators it calls
//! out to. The root node is created with the navigator, starts `Shown`, and
//! can never be pushed or popped. On top of the stack operations in
//! [`crate::panel`] the root adds:
//!
//! - a FIFO pending queue that feeds the root's stack whenever it goes idle,
//! - the dimmer rule (dimmer directly behind the front-most panel whenever
//!   that panel is not the root),
//! - routed commands addressed by [`RootKey`]/[`PanelKey`],
//! - the per-frame [`Navigator::tick`] and use-once destruction timers.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use navstack_core::{
    CommandKind, NavConfig, PanelCommand, PanelId, PanelKey, PanelState, PushMode, RootKey,
    TransitionDirection,
};

use crate::error::{EnqueueOutcome, NavRejection};
use crate::host::{NoHooks, NoopFactory, NoopHost, PanelFactory, PanelHooks, PanelHost};
use crate::stack::{NavSnapshot, PanelKind, PanelNode, PanelTree};
use crate::transition::TransitionDriver;

/// Registration parameters for a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSpec {
    pub name: String,
    /// Register as a use-once template instead of a reusable panel.
    pub use_once: bool,
    pub locked: bool,
    /// Routing key for commands addressed to this navigator's root.
    pub key: Option<PanelKey>,
}

impl PanelSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            use_once: false,
            locked: false,
            key: None,
        }
    }

    #[must_use]
    pub fn use_once(mut self) -> Self {
        self.use_once = true;
        self
    }

    #[must_use]
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    #[must_use]
    pub fn keyed(mut self, key: impl Into<PanelKey>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Observable state changes, drained with [`Navigator::take_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Shown(PanelId),
    Hidden(PanelId),
    /// Moved out of the pending queue onto the root's stack.
    Dequeued(PanelId),
    /// A use-once instance was released.
    Destroyed(PanelId),
    /// The dimmer moved behind a panel, or was hidden (`None`).
    Dimmer(Option<PanelId>),
}

#[derive(Debug, Clone, Copy)]
struct DestroyTimer {
    panel: PanelId,
    remaining: Duration,
}

/// A panel tree with its root, queue, and collaborators.
///
/// Single-threaded: every operation runs to its next suspension point
/// (a pending visual transition) and returns.
pub struct Navigator<D = crate::transition::InstantTransitions> {
    pub(crate) tree: PanelTree,
    pub(crate) config: NavConfig,
    pub(crate) driver: D,
    pub(crate) host: Box<dyn PanelHost>,
    pub(crate) factory: Box<dyn PanelFactory>,
    root_key: RootKey,
    registry: HashMap<PanelKey, PanelId>,
    pending: VecDeque<PanelId>,
    queue_blocked: bool,
    /// Nonzero while a bulk pop is reshaping the root's stack.
    pub(crate) suspend_dequeue: u32,
    dimmer_behind: Option<PanelId>,
    destroy_timers: Vec<DestroyTimer>,
    events: VecDeque<NavEvent>,
}

impl<D> std::fmt::Debug for Navigator<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("root_key", &self.root_key)
            .field("tree", &self.tree)
            .field("pending", &self.pending)
            .field("queue_blocked", &self.queue_blocked)
            .field("dimmer_behind", &self.dimmer_behind)
            .finish_non_exhaustive()
    }
}

impl<D: TransitionDriver> Navigator<D> {
    /// A navigator with an empty root, no-op host, and no-op factory.
    pub fn new(root_key: impl Into<RootKey>, config: NavConfig, driver: D) -> Self {
        let root_key = root_key.into();
        Self {
            tree: PanelTree::new(root_key.to_string(), Box::new(NoHooks)),
            config,
            driver,
            host: Box::new(NoopHost),
            factory: Box::new(NoopFactory),
            root_key,
            registry: HashMap::new(),
            pending: VecDeque::new(),
            queue_blocked: false,
            suspend_dequeue: 0,
            dimmer_behind: None,
            destroy_timers: Vec::new(),
            events: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: Box<dyn PanelHost>) -> Self {
        self.host = host;
        self
    }

    #[must_use]
    pub fn with_factory(mut self, factory: Box<dyn PanelFactory>) -> Self {
        self.factory = factory;
        self
    }

    #[must_use]
    pub fn root(&self) -> PanelId {
        self.tree.root()
    }

    #[must_use]
    pub fn root_key(&self) -> &RootKey {
        &self.root_key
    }

    #[must_use]
    pub fn tree(&self) -> &PanelTree {
        &self.tree
    }

    #[must_use]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    #[must_use]
    pub fn snapshot(&self) -> NavSnapshot {
        self.tree.snapshot(self.tree.root())
    }

    /// Drain the events recorded since the last call. At most
    /// [`NavConfig::max_events`] are kept; older ones are dropped first.
    pub fn take_events(&mut self) -> Vec<NavEvent> {
        self.events.drain(..).collect()
    }

    pub(crate) fn emit(&mut self, event: NavEvent) {
        let max = self.config.max_events;
        if max > 0 && self.events.len() >= max {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Add a panel homed under `parent`. The panel starts `Hidden` and
    /// outside every stack.
    pub fn register(
        &mut self,
        parent: PanelId,
        spec: PanelSpec,
        hooks: Box<dyn PanelHooks>,
    ) -> Result<PanelId, NavRejection> {
        if !self.tree.contains(parent) {
            return Err(NavRejection::UnknownPanel(parent));
        }
        if let Some(key) = &spec.key
            && self.registry.contains_key(key)
        {
            tracing::warn!(key = %key, "panel key already registered");
            return Err(NavRejection::DuplicateKey(key.clone()));
        }
        let kind = if spec.use_once {
            PanelKind::Template
        } else {
            PanelKind::Singleton
        };
        let template = self.tree.allocate_template();
        let mut node = PanelNode::new(spec.name, kind, template, Some(parent), hooks);
        node.locked = spec.locked;
        let id = self.tree.insert(node).ok_or(NavRejection::IdsExhausted)?;
        if let Some(key) = spec.key {
            self.registry.insert(key, id);
        }
        tracing::debug!(panel = %id, ?kind, parent = %parent, "registered panel");
        Ok(id)
    }

    /// Panel registered under `key`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<PanelId> {
        self.registry.get(key).copied()
    }

    // -----------------------------------------------------------------------
    // Pending queue
    // -----------------------------------------------------------------------

    /// Root stack is non-empty.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.tree.depth(self.tree.root()) > 0
    }

    /// Show `panel` now if the root is idle, otherwise queue it.
    ///
    /// Queued use-once templates are instantiated immediately so activation
    /// later costs nothing extra.
    pub fn enqueue(&mut self, panel: PanelId) -> Result<EnqueueOutcome, NavRejection> {
        let root = self.tree.root();
        if !self.is_busy() {
            let outcome = self.push_on_top(root, panel)?;
            return Ok(EnqueueOutcome::Shown(outcome.panel()));
        }
        if let Some(capacity) = self.config.queue_capacity
            && self.pending.len() >= capacity
        {
            tracing::warn!(panel = %panel, capacity, "pending queue full");
            return Err(NavRejection::QueueFull { capacity });
        }
        let instance = self.create_or_reuse(root, panel)?;
        self.pending.push_back(instance);
        let position = self.pending.len() - 1;
        tracing::debug!(panel = %instance, position, "queued panel");
        Ok(EnqueueOutcome::Queued {
            panel: instance,
            position,
        })
    }

    /// Pending panels, next first.
    #[must_use]
    pub fn pending(&self) -> Vec<PanelId> {
        self.pending.iter().copied().collect()
    }

    /// Drop every queued panel, returning them.
    pub fn clear_pending(&mut self) -> Vec<PanelId> {
        self.pending.drain(..).collect()
    }

    #[must_use]
    pub fn is_queue_blocked(&self) -> bool {
        self.queue_blocked
    }

    /// Stop (or resume) feeding the root from the queue. Resuming on an idle
    /// root activates the next queued panel.
    pub fn set_queue_blocked(&mut self, blocked: bool) {
        self.queue_blocked = blocked;
        if !blocked {
            self.try_dequeue();
        }
    }

    fn try_dequeue(&mut self) {
        if self.queue_blocked || self.suspend_dequeue > 0 || self.is_busy() {
            return;
        }
        let root = self.tree.root();
        while let Some(next) = self.pending.pop_front() {
            match self.push_on_top(root, next) {
                Ok(_) => {
                    tracing::debug!(panel = %next, remaining = self.pending.len(), "dequeued panel");
                    self.emit(NavEvent::Dequeued(next));
                    return;
                }
                Err(reason) => {
                    tracing::warn!(panel = %next, reason = %reason, "dropping queued panel");
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    /// A show or hide finished somewhere in the tree.
    pub(crate) fn transition_finished(&mut self, panel: PanelId, direction: TransitionDirection) {
        if self.tree.root_of(panel) != self.tree.root() {
            return;
        }
        self.update_dimmer();
        if direction == TransitionDirection::Hide {
            self.try_dequeue();
        }
    }

    /// Re-apply the dimmer rule and feed the queue after a batch change.
    pub(crate) fn refresh_root(&mut self) {
        self.update_dimmer();
        self.try_dequeue();
    }

    #[must_use]
    pub fn dimmer_visible(&self) -> bool {
        self.dimmer_behind.is_some()
    }

    /// Panel the dimmer currently sits behind.
    #[must_use]
    pub fn dimmer_behind(&self) -> Option<PanelId> {
        self.dimmer_behind
    }

    fn update_dimmer(&mut self) {
        let root = self.tree.root();
        let highest = self.tree.highest_panel(root);
        let target = (highest != root).then_some(highest);
        if target == self.dimmer_behind {
            return;
        }
        self.dimmer_behind = target;
        match target {
            Some(panel) => self.host.show_dimmer(panel),
            None => self.host.hide_dimmer(),
        }
        self.emit(NavEvent::Dimmer(target));
    }

    // -----------------------------------------------------------------------
    // Routed commands
    // -----------------------------------------------------------------------

    /// Handle a command from the host's event bus.
    ///
    /// Returns `Ok(false)` when the command is addressed to another root.
    /// Otherwise the resolved panel is written into `cmd.resolved`.
    pub fn handle_command(&mut self, cmd: &mut PanelCommand) -> Result<bool, NavRejection> {
        if cmd.root != self.root_key {
            return Ok(false);
        }
        let Some(panel) = self.lookup(cmd.panel.as_str()) else {
            tracing::warn!(root = %cmd.root, key = %cmd.panel, "routed command for unknown panel");
            return Err(NavRejection::UnknownKey(cmd.panel.clone()));
        };
        let root = self.tree.root();
        let resolved = match cmd.kind {
            CommandKind::Request => match self.tree.template(panel) {
                Some(template) if self.tree.kind(panel) == Some(PanelKind::Template) => {
                    self.tree.instance_of(root, template).unwrap_or(panel)
                }
                _ => panel,
            },
            CommandKind::Push(PushMode::OnTop) => self.push_on_top(root, panel)?.panel(),
            CommandKind::Push(PushMode::Replacement) => {
                let keep = self.config.replace_keeps_current;
                let instant = self.config.replace_instant;
                self.push_replace(root, panel, keep, false, instant)?.panel()
            }
            CommandKind::Push(PushMode::Queued) => self.enqueue(panel)?.panel(),
        };
        tracing::debug!(key = %cmd.panel, kind = ?cmd.kind, panel = %resolved, "routed command");
        cmd.resolved = Some(resolved);
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Frame driving
    // -----------------------------------------------------------------------

    /// Advance one frame: finish transitions the driver reports done and run
    /// use-once destruction timers.
    pub fn tick(&mut self, dt: Duration) {
        let mut completed = Vec::new();
        self.driver.tick(dt, &mut completed);
        for panel in completed {
            if let Err(reason) = self.finish_visual(panel) {
                tracing::debug!(panel = %panel, reason = %reason, "driver completion ignored");
            }
        }

        let mut due = Vec::new();
        self.destroy_timers.retain_mut(|timer| {
            if timer.remaining <= dt {
                due.push(timer.panel);
                false
            } else {
                timer.remaining -= dt;
                true
            }
        });
        for panel in due {
            self.destroy_instance(panel);
        }
    }

    /// Signal that `panel`'s pending visual step finished.
    pub fn complete_transition(&mut self, panel: PanelId) -> Result<PanelState, NavRejection> {
        self.driver.forget(panel);
        self.finish_visual(panel)
    }

    pub(crate) fn schedule_destroy(&mut self, panel: PanelId) {
        self.destroy_timers.retain(|timer| timer.panel != panel);
        self.destroy_timers.push(DestroyTimer {
            panel,
            remaining: self.config.destroy_grace,
        });
    }

    /// Panels waiting for destruction.
    #[must_use]
    pub fn doomed(&self) -> Vec<PanelId> {
        self.destroy_timers.iter().map(|timer| timer.panel).collect()
    }

    fn destroy_instance(&mut self, panel: PanelId) {
        let Some(node) = self.tree.node(panel) else {
            return;
        };
        let parent = node.parent;
        let in_stack = parent.is_some_and(|p| self.tree.stack_contains(p, panel));
        if node.state != PanelState::Hidden || in_stack || self.pending.contains(&panel) {
            tracing::debug!(panel = %panel, "instance back in use, not destroying");
            return;
        }
        let template = node.template;

        for dependent in self.tree.dependents(panel) {
            if let Some(entry) = self.tree.node_mut(dependent) {
                entry.parent = parent;
            }
        }
        if let Some(owner) = parent
            && let Some(owner_node) = self.tree.node_mut(owner)
            && owner_node.instance_cache.get(&template) == Some(&panel)
        {
            owner_node.instance_cache.remove(&template);
        }
        self.tree.remove(panel);
        self.driver.forget(panel);
        self.host.destroy(panel);
        self.emit(NavEvent::Destroyed(panel));
        tracing::debug!(panel = %panel, "destroyed use-once instance");
    }
}
