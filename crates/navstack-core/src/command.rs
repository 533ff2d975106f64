#![forbid(unsafe_code)]

//! Routed panel commands.
//!
//! A host's event bus carries [`PanelCommand`] values keyed by root and panel
//! names. The navigation root that owns `root` handles the command and
//! answers by writing the resolved panel into the same value.
//!
//! ```ignore
//! let mut cmd = PanelCommand::push("hud", "inventory", PushMode::Queued);
//! if navigator.handle_command(&mut cmd) {
//!     let shown = cmd.resolved;
//! }
//! ```

use crate::id::{PanelId, PanelKey, RootKey};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a routed push lands on the root's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum PushMode {
    /// Overlay on whatever is currently visible.
    #[default]
    OnTop,
    /// Hide the current top and replace it.
    Replacement,
    /// Show now if the root is idle, otherwise wait in the pending queue.
    Queued,
}

/// What a routed command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum CommandKind {
    /// Push the named panel using the given mode.
    Push(PushMode),
    /// Resolve the named panel without changing the stack.
    Request,
}

/// A request/response command addressed to one navigation root.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelCommand {
    pub root: RootKey,
    pub panel: PanelKey,
    pub kind: CommandKind,
    /// Written by the handling root: the panel that was pushed or resolved.
    /// For use-once templates this is the live instance, not the template.
    #[cfg_attr(feature = "serde", serde(default))]
    pub resolved: Option<PanelId>,
}

impl PanelCommand {
    pub fn push(root: impl Into<RootKey>, panel: impl Into<PanelKey>, mode: PushMode) -> Self {
        Self {
            root: root.into(),
            panel: panel.into(),
            kind: CommandKind::Push(mode),
            resolved: None,
        }
    }

    pub fn request(root: impl Into<RootKey>, panel: impl Into<PanelKey>) -> Self {
        Self {
            root: root.into(),
            panel: panel.into(),
            kind: CommandKind::Request,
            resolved: None,
        }
    }

    /// Whether a root has answered this command.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}
