#![forbid(unsafe_code)]

//! Core vocabulary for navstack: identifiers, the panel state machine,
//! routed commands, configuration, and transition timing.
//!
//! Nothing in this crate knows about the panel tree itself; see the
//! `navstack` crate for the stack, transition, and root layers.

pub mod animation;
pub mod command;
pub mod config;
pub mod id;
pub mod state;

pub use command::{CommandKind, PanelCommand, PushMode};
pub use config::{ConfigError, NavConfig};
pub use id::{PanelId, PanelKey, RootKey, TemplateId};
pub use state::{PanelState, TransitionDirection};
