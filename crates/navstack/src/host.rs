#![forbid(unsafe_code)]

//! Collaborator traits the navigator calls out to.
//!
//! The navigator decides *when* panels appear and disappear. Everything
//! about *how* (building panel content, placing it in a scene, drawing a
//! dimmer) belongs to the host and is reached through these traits. All
//! methods default to no-ops so hosts implement only what they need.

use navstack_core::{PanelId, TemplateId};

/// Lifecycle callbacks for one panel.
///
/// Callbacks receive only the panel id and cannot reenter the navigator;
/// hosts that need to react with navigation queue the follow-up and apply it
/// after the current call returns.
pub trait PanelHooks {
    /// A show is starting; the panel is `Showing`.
    fn before_show(&mut self, _panel: PanelId) {}

    /// The show finished; the panel is `Shown`.
    fn after_show(&mut self, _panel: PanelId) {}

    /// A hide is starting; the panel is `Hiding` and its children have not
    /// been dismissed yet.
    fn before_hide(&mut self, _panel: PanelId) {}

    /// The hide finished; the panel is `Hidden`.
    fn after_hide(&mut self, _panel: PanelId) {}

    /// The panel became the top again after the panels above it were popped.
    fn on_reshow(&mut self, _panel: PanelId) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl PanelHooks for NoHooks {}

/// Description of a template handed to the factory.
#[derive(Debug, Clone, Copy)]
pub struct TemplateInfo<'a> {
    /// The registered template panel.
    pub template_panel: PanelId,
    pub template: TemplateId,
    /// Id the new instance will have.
    pub instance: PanelId,
    pub name: &'a str,
}

/// Builds runtime instances of use-once templates.
pub trait PanelFactory {
    /// Produce the hooks driving a fresh instance of `template`.
    fn instantiate(&mut self, template: &TemplateInfo<'_>) -> Box<dyn PanelHooks>;
}

/// Factory producing instances without hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFactory;

impl PanelFactory for NoopFactory {
    fn instantiate(&mut self, _template: &TemplateInfo<'_>) -> Box<dyn PanelHooks> {
        Box::new(NoHooks)
    }
}

/// Scene placement and overlay side effects.
pub trait PanelHost {
    /// Place `panel` under `parent` with draw order `order`. Higher orders
    /// draw in front of lower ones among siblings.
    fn place(&mut self, _panel: PanelId, _parent: Option<PanelId>, _order: usize) {}

    /// Activate or deactivate the panel's visual representation.
    fn set_active(&mut self, _panel: PanelId, _active: bool) {}

    /// Enable or disable input on the panel's surface. Disabled while the
    /// panel is transiting.
    fn set_interactable(&mut self, _panel: PanelId, _interactable: bool) {}

    /// Show the dimmer directly behind `behind`.
    fn show_dimmer(&mut self, _behind: PanelId) {}

    fn hide_dimmer(&mut self) {}

    /// Release a use-once instance after its grace period.
    fn destroy(&mut self, _panel: PanelId) {}
}

/// Host with no visual side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl PanelHost for NoopHost {}
