#![forbid(unsafe_code)]

//! Tracing integration tests.
//!
//! Navigation operations open `navstack.*` spans and report rejections as
//! `warn` events carrying the operation name and the reason.
//!
//!   cargo test -p navstack --test tracing_tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use navstack::{InstantTransitions, NavConfig, Navigator, NoHooks, PanelSpec};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
    parent_name: Option<String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    fields: HashMap<String, String>,
}

/// A tracing Layer that records span metadata and events.
struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn warnings(&self) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == tracing::Level::WARN)
            .collect()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        let parent_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span_ref| span_ref.name().to_string());
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
            parent_name,
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let spans = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = Capture {
        spans: spans.clone(),
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    CaptureHandle { spans, events }
}

fn navigator() -> Navigator {
    Navigator::new("hud", NavConfig::default(), InstantTransitions)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn push_opens_show_span_nested_under_push() {
    let handle = with_captured(|| {
        let mut nav = navigator();
        let root = nav.root();
        let menu = nav
            .register(root, PanelSpec::new("menu"), Box::new(NoHooks))
            .unwrap();
        nav.push_on_top(root, menu).unwrap();
    });

    let spans = handle.spans();
    let show = spans
        .iter()
        .find(|s| s.name == "navstack.show")
        .expect("show span recorded");
    assert_eq!(show.parent_name.as_deref(), Some("navstack.push_on_top"));
    assert_eq!(show.fields.get("panel").map(String::as_str), Some("panel#2"));
}

#[test]
fn pop_all_span_wraps_hides() {
    let handle = with_captured(|| {
        let mut nav = navigator();
        let root = nav.root();
        for name in ["a", "b", "c"] {
            let id = nav
                .register(root, PanelSpec::new(name), Box::new(NoHooks))
                .unwrap();
            nav.push_on_top(root, id).unwrap();
        }
        nav.pop_all(root).unwrap();
    });

    let spans = handle.spans();
    assert!(spans.iter().any(|s| s.name == "navstack.pop_all"));
    let hides_in_pop_all = spans
        .iter()
        .filter(|s| s.name == "navstack.hide" && s.parent_name.as_deref() == Some("navstack.pop_all"))
        .count();
    assert_eq!(hides_in_pop_all, 3, "spans: {spans:?}");
}

#[test]
fn rejections_are_logged_as_warnings() {
    let handle = with_captured(|| {
        let mut nav = navigator();
        let root = nav.root();
        assert!(nav.pop(root, false).is_err());
    });

    let warnings = handle.warnings();
    assert_eq!(warnings.len(), 1, "warnings: {warnings:?}");
    let fields = &warnings[0].fields;
    assert_eq!(fields.get("op").map(String::as_str), Some("pop"));
    assert!(
        fields
            .get("reason")
            .is_some_and(|r| r.contains("empty")),
        "fields: {fields:?}"
    );
}

#[test]
fn successful_navigation_logs_no_warnings() {
    let handle = with_captured(|| {
        let mut nav = navigator();
        let root = nav.root();
        let a = nav
            .register(root, PanelSpec::new("a"), Box::new(NoHooks))
            .unwrap();
        nav.push_on_top(root, a).unwrap();
        nav.back(root).unwrap();
    });

    assert!(handle.warnings().is_empty());
    assert!(
        handle
            .events()
            .iter()
            .any(|e| e.fields.get("message").is_some_and(|m| m.contains("hidden")))
    );
}
