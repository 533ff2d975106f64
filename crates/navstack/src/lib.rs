#![forbid(unsafe_code)]

//! Stack-based panel navigation.
//!
//! A [`Navigator`] owns a tree of panels. Every panel owns a LIFO stack of
//! child panels; pushing shows a child, popping hides it. Shows and hides
//! are asynchronous: a [`TransitionDriver`] decides whether a transition
//! completes at once or later, and the navigator keeps each panel in
//! `Showing`/`Hiding` until it does.
//!
//! # Layers
//!
//! - [`stack`]: the arena tree and pure stack queries (top, depth, order,
//!   highest panel).
//! - [`panel`]: per-panel show/hide state machine and the push/pop family,
//!   including lock-aware bulk pops and depth-first back navigation.
//! - [`root`]: the tree root: pending queue, dimmer rule, routed commands,
//!   and the per-frame [`Navigator::tick`].
//!
//! # Example
//!
//! ```ignore
//! let mut nav = Navigator::new("hud", NavConfig::default(), InstantTransitions);
//! let menu = nav.register(nav.root(), PanelSpec::new("menu"), Box::new(NoHooks))?;
//! nav.push_on_top(nav.root(), menu)?;
//! nav.back(nav.root())?;
//! ```

pub mod error;
pub mod host;
pub mod panel;
pub mod root;
pub mod stack;
pub mod transition;

pub use error::{EnqueueOutcome, NavRejection, PopOutcome, PushOutcome};
pub use host::{NoHooks, NoopFactory, NoopHost, PanelFactory, PanelHooks, PanelHost, TemplateInfo};
pub use navstack_core::{
    CommandKind, NavConfig, PanelCommand, PanelId, PanelKey, PanelState, PushMode, RootKey,
    TemplateId, TransitionDirection,
};
pub use root::{NavEvent, Navigator, PanelSpec};
pub use stack::{NavSnapshot, PanelKind, PanelTree};
pub use transition::{
    FadeTransitions, InstantTransitions, ManualTransitions, TransitionDriver, TransitionHandle,
    TransitionStep,
};
