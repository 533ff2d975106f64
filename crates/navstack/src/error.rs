#![forbid(unsafe_code)]

//! Rejections and outcomes of navigation operations.
//!
//! Navigation never fails fatally. An operation either does what was asked,
//! falls back to something weaker (reported through the outcome type), or is
//! rejected with a [`NavRejection`] and leaves the tree untouched. Every
//! rejection is also logged at `warn` level by the operation that produced it.

use std::fmt;

use navstack_core::{PanelId, PanelKey, PanelState};

/// Why a navigation operation did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRejection {
    /// The id is not (or no longer) part of the tree.
    UnknownPanel(PanelId),
    /// The panel is mid-show or mid-hide.
    Transiting { panel: PanelId, state: PanelState },
    /// `Show` on a panel that is already displayed.
    AlreadyDisplayed(PanelId),
    /// `Hide` on a panel that is not shown.
    NotDisplayed(PanelId),
    /// The panel is already the top of the target stack.
    AlreadyOnTop { node: PanelId, panel: PanelId },
    /// `only_if_inactive` push of a panel that is displayed in the stack.
    AlreadyActive { node: PanelId, panel: PanelId },
    /// Pop on an empty stack.
    EmptyStack(PanelId),
    /// A locked or transiting panel prevents popping.
    Blocked { node: PanelId, by: PanelId },
    /// Bulk pop toward a panel that is not in the stack.
    NotInStack { node: PanelId, target: PanelId },
    /// The root, the node itself, or one of its ancestors cannot be pushed
    /// onto the node's stack.
    InvalidTarget { node: PanelId, panel: PanelId },
    /// `Back` with nothing displayed above the root.
    NothingToGoBack,
    /// `complete_transition` on a panel with no transition in flight.
    NotTransiting(PanelId),
    /// `complete_transition` on a hide still waiting for its children.
    ChildrenPending { panel: PanelId, remaining: usize },
    /// The pending queue is at capacity.
    QueueFull { capacity: usize },
    /// A routed command named a panel key nobody registered.
    UnknownKey(PanelKey),
    /// Registration reused a routing key.
    DuplicateKey(PanelKey),
    /// The panel id space is exhausted.
    IdsExhausted,
}

impl fmt::Display for NavRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPanel(id) => write!(f, "{id} is not in the tree"),
            Self::Transiting { panel, state } => write!(f, "{panel} is {state}"),
            Self::AlreadyDisplayed(id) => write!(f, "{id} is already displayed"),
            Self::NotDisplayed(id) => write!(f, "{id} is not shown"),
            Self::AlreadyOnTop { node, panel } => write!(f, "{panel} is already on top of {node}"),
            Self::AlreadyActive { node, panel } => {
                write!(f, "{panel} is already active in the stack of {node}")
            }
            Self::EmptyStack(node) => write!(f, "stack of {node} is empty"),
            Self::Blocked { node, by } => write!(f, "pop on {node} blocked by {by}"),
            Self::NotInStack { node, target } => {
                write!(f, "{target} is not in the stack of {node}")
            }
            Self::InvalidTarget { node, panel } => {
                write!(f, "{panel} cannot be pushed onto {node}")
            }
            Self::NothingToGoBack => f.write_str("nothing is displayed above the root"),
            Self::NotTransiting(id) => write!(f, "{id} has no transition in flight"),
            Self::ChildrenPending { panel, remaining } => {
                write!(f, "{panel} is waiting for {remaining} child hide(s)")
            }
            Self::QueueFull { capacity } => write!(f, "pending queue is full ({capacity})"),
            Self::UnknownKey(key) => write!(f, "no panel registered as '{key}'"),
            Self::DuplicateKey(key) => write!(f, "panel key '{key}' is already registered"),
            Self::IdsExhausted => f.write_str("panel id space exhausted"),
        }
    }
}

impl std::error::Error for NavRejection {}

/// What a successful push did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Pushed and shown (or brought to the front if already displayed).
    Pushed(PanelId),
    /// Already the displayed top; nothing changed.
    AlreadyOnTop(PanelId),
    /// Replaced `previous` (if any) and shown the new panel.
    Replaced {
        panel: PanelId,
        previous: Option<PanelId>,
    },
    /// The replacement waits for `previous` to finish hiding.
    Deferred { panel: PanelId, previous: PanelId },
    /// The replace was blocked, so the panel was overlaid instead.
    Overlaid { panel: PanelId, blocked_by: PanelId },
}

impl PushOutcome {
    /// The panel that was (or will be) pushed. For use-once templates this
    /// is the fresh instance.
    #[must_use]
    pub const fn panel(&self) -> PanelId {
        match *self {
            Self::Pushed(panel)
            | Self::AlreadyOnTop(panel)
            | Self::Replaced { panel, .. }
            | Self::Deferred { panel, .. }
            | Self::Overlaid { panel, .. } => panel,
        }
    }
}

/// What a pop removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopOutcome {
    /// Panels taken off the stack and hidden, in pop order (topmost first).
    pub popped: Vec<PanelId>,
    /// Locked panels that were set aside and pushed back, bottom first.
    pub retained: Vec<PanelId>,
}

impl PopOutcome {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.popped.is_empty() && self.retained.is_empty()
    }
}

/// What an enqueue did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The root was idle and the panel was pushed at once.
    Shown(PanelId),
    /// The panel waits at `position` (0 = next) in the pending queue.
    Queued { panel: PanelId, position: usize },
}

impl EnqueueOutcome {
    #[must_use]
    pub const fn panel(&self) -> PanelId {
        match *self {
            Self::Shown(panel) | Self::Queued { panel, .. } => panel,
        }
    }
}
