#![forbid(unsafe_code)]

//! The scripted walkthrough: a HUD root with a menu, nested settings pages,
//! a locked confirmation dialog, and use-once toasts.

use std::time::Duration;

use navstack::{
    FadeTransitions, NavConfig, NavRejection, Navigator, NoHooks, PanelCommand,
    PanelFactory, PanelHooks, PanelHost, PanelId, PanelSpec, PushMode, TemplateInfo,
};

use crate::cli::Opts;

/// Host that reports scene side effects through tracing.
struct LoggingHost;

impl PanelHost for LoggingHost {
    fn place(&mut self, panel: PanelId, parent: Option<PanelId>, order: usize) {
        tracing::trace!(panel = %panel, parent = ?parent, order, "place");
    }

    fn show_dimmer(&mut self, behind: PanelId) {
        tracing::info!(behind = %behind, "dimmer shown");
    }

    fn hide_dimmer(&mut self) {
        tracing::info!("dimmer hidden");
    }

    fn destroy(&mut self, panel: PanelId) {
        tracing::info!(panel = %panel, "instance destroyed");
    }
}

struct LoggingHooks {
    name: String,
}

impl PanelHooks for LoggingHooks {
    fn after_show(&mut self, panel: PanelId) {
        tracing::info!(panel = %panel, name = %self.name, "visible");
    }

    fn after_hide(&mut self, panel: PanelId) {
        tracing::info!(panel = %panel, name = %self.name, "gone");
    }

    fn on_reshow(&mut self, panel: PanelId) {
        tracing::info!(panel = %panel, name = %self.name, "back on top");
    }
}

struct LoggingFactory;

impl PanelFactory for LoggingFactory {
    fn instantiate(&mut self, template: &TemplateInfo<'_>) -> Box<dyn PanelHooks> {
        Box::new(LoggingHooks {
            name: format!("{}#{}", template.name, template.instance.get()),
        })
    }
}

/// One scripted action. Panels are named by their routing key.
#[derive(Debug, Clone)]
pub enum Step {
    /// Routed through the root's command handler.
    Command(PushMode, &'static str),
    /// Overlay `panel` on `node`'s own stack.
    PushInto { node: &'static str, panel: &'static str },
    /// Replace the top of `node`'s stack.
    ReplaceIn { node: &'static str, panel: &'static str },
    Lock(&'static str, bool),
    Back,
    PopAll,
}

/// The walkthrough, in order.
pub fn script() -> Vec<(&'static str, Step)> {
    vec![
        ("open menu", Step::Command(PushMode::OnTop, "menu")),
        ("open settings", Step::PushInto { node: "menu", panel: "settings" }),
        ("switch to audio", Step::ReplaceIn { node: "menu", panel: "audio" }),
        ("toast", Step::Command(PushMode::OnTop, "toast")),
        ("queue confirm", Step::Command(PushMode::Queued, "confirm")),
        ("close toast", Step::Back),
        ("leave audio", Step::Back),
        ("close menu", Step::Back),
        ("lock confirm", Step::Lock("confirm", true)),
        ("second toast", Step::Command(PushMode::OnTop, "toast")),
        ("pop all", Step::PopAll),
        ("unlock confirm", Step::Lock("confirm", false)),
        ("close confirm", Step::Back),
    ]
}

pub struct Demo {
    nav: Navigator<FadeTransitions>,
    frame: Duration,
    max_frames: u32,
}

impl Demo {
    pub fn new(config: NavConfig, opts: &Opts) -> Result<Self, NavRejection> {
        let driver = FadeTransitions::from_config(&config);
        let mut nav = Navigator::new("hud", config, driver)
            .with_host(Box::new(LoggingHost))
            .with_factory(Box::new(LoggingFactory));
        let root = nav.root();
        for (name, spec) in [
            ("menu", PanelSpec::new("menu")),
            ("settings", PanelSpec::new("settings")),
            ("audio", PanelSpec::new("audio")),
            ("confirm", PanelSpec::new("confirm")),
            ("toast", PanelSpec::new("toast").use_once()),
        ] {
            let hooks: Box<dyn PanelHooks> = if spec.use_once {
                Box::new(NoHooks)
            } else {
                Box::new(LoggingHooks {
                    name: name.to_string(),
                })
            };
            nav.register(root, spec.keyed(name), hooks)?;
        }
        Ok(Self {
            nav,
            frame: Duration::from_millis(opts.frame_ms),
            max_frames: opts.max_frames,
        })
    }

    pub fn nav(&self) -> &Navigator<FadeTransitions> {
        &self.nav
    }

    fn key(&self, key: &str) -> Result<PanelId, NavRejection> {
        self.nav
            .lookup(key)
            .ok_or_else(|| NavRejection::UnknownKey(key.into()))
    }

    pub fn run(&mut self, step: &Step) -> Result<(), NavRejection> {
        let root = self.nav.root();
        match *step {
            Step::Command(mode, key) => {
                let mut cmd = PanelCommand::push(self.nav.root_key().clone(), key, mode);
                self.nav.handle_command(&mut cmd)?;
            }
            Step::PushInto { node, panel } => {
                let (node, panel) = (self.key(node)?, self.key(panel)?);
                self.nav.push_on_top(node, panel)?;
            }
            Step::ReplaceIn { node, panel } => {
                let (node, panel) = (self.key(node)?, self.key(panel)?);
                self.nav.push_replace(node, panel, false, true, false)?;
            }
            Step::Lock(key, locked) => {
                let panel = self.key(key)?;
                self.nav.lock(panel, locked)?;
            }
            Step::Back => {
                self.nav.back(root)?;
            }
            Step::PopAll => {
                self.nav.pop_all(root)?;
            }
        }
        Ok(())
    }

    /// Run frames until no transition or destruction timer is left, or the
    /// frame cap is hit. Returns the number of frames run.
    pub fn settle(&mut self) -> u32 {
        let mut frames = 0;
        while frames < self.max_frames
            && (self.nav.driver().active() > 0 || !self.nav.doomed().is_empty())
        {
            self.nav.tick(self.frame);
            frames += 1;
        }
        for event in self.nav.take_events() {
            tracing::debug!(?event, "navigation event");
        }
        frames
    }

    /// Panels that were visible at the end, for the summary line.
    pub fn visible(&self) -> Vec<String> {
        let tree = self.nav.tree();
        let mut names = Vec::new();
        let mut current = tree.root();
        while let Some(top) = tree.top(current) {
            if !tree.is_displayed(top) {
                break;
            }
            names.push(tree.name(top).unwrap_or("?").to_string());
            current = top;
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navstack::PanelState;

    fn demo(instant: bool) -> Demo {
        let config = NavConfig::default()
            .with_reduced_motion(instant)
            .with_transition_duration(Duration::from_millis(50))
            .with_destroy_grace(Duration::from_millis(100));
        Demo::new(config, &Opts::default()).unwrap()
    }

    #[test]
    fn script_runs_to_idle_root() {
        for instant in [true, false] {
            let mut demo = demo(instant);
            for (label, step) in script() {
                demo.run(&step)
                    .unwrap_or_else(|e| panic!("step {label} failed: {e}"));
                demo.settle();
            }
            assert!(!demo.nav().is_busy(), "instant={instant}");
            assert!(!demo.nav().dimmer_visible());
            assert!(demo.nav().doomed().is_empty());
        }
    }

    #[test]
    fn pop_all_spares_the_locked_dialog() {
        let mut demo = demo(true);
        let steps = script();
        let stop = steps
            .iter()
            .position(|(label, _)| *label == "pop all")
            .unwrap();
        for (_, step) in &steps[..=stop] {
            demo.run(step).unwrap();
            demo.settle();
        }
        let confirm = demo.nav().lookup("confirm").unwrap();
        assert_eq!(demo.nav().tree().stack(demo.nav().root()), &[confirm]);
        assert_eq!(demo.nav().tree().state(confirm), Some(PanelState::Shown));
        assert_eq!(demo.visible(), vec!["confirm".to_string()]);
    }

    #[test]
    fn settle_finishes_fades() {
        let mut demo = demo(false);
        demo.run(&Step::Command(PushMode::OnTop, "menu")).unwrap();
        let menu = demo.nav().lookup("menu").unwrap();
        assert_eq!(demo.nav().tree().state(menu), Some(PanelState::Showing));
        let frames = demo.settle();
        assert!(frames >= 3);
        assert_eq!(demo.nav().tree().state(menu), Some(PanelState::Shown));
        assert!(demo.nav.take_events().is_empty());
    }
}
