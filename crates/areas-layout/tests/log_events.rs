#![forbid(unsafe_code)]

//! Log event compliance for layout operations.
//!
//! - Mutations emit DEBUG events with structured fields.
//! - Rejected operations and subscriptions emit WARN events naming the error.
//! - Construction and restore emit INFO events.
//! - Every event uses the `areas.layout` target.
//!
//! Run:
//!   cargo test -p areas-layout --test log_events

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use areas_layout::{ContentCatalog, ContentRef, Direction, Layout, LeafId};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> Option<&str> {
        self.field("message")
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn has_structured_fields(&self) -> bool {
        self.fields.keys().any(|k| k != "message")
    }
}

/// Records every event's level, target and fields into a shared buffer.
struct Recorder(Arc<Mutex<Vec<CapturedEvent>>>);

#[derive(Default)]
struct Fields(HashMap<String, String>);

impl Fields {
    fn put(&mut self, field: &tracing::field::Field, value: String) {
        let _ = self.0.insert(field.name().to_string(), value);
    }
}

impl tracing::field::Visit for Fields {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.put(field, value.to_string());
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.put(field, value.to_string());
    }
}

impl<S> tracing_subscriber::Layer<S> for Recorder
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        self.0.lock().expect("recorder lock").push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: fields.0,
        });
    }
}

/// Run `f` under a TRACE-level subscriber and return what it logged.
fn capture(f: impl FnOnce()) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(Recorder(Arc::clone(&events)));
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().expect("recorder lock").clone();
    captured
}

fn find<'a>(events: &'a [CapturedEvent], message: &str) -> Option<&'a CapturedEvent> {
    events.iter().find(|e| e.message() == Some(message))
}

fn at_level(events: &[CapturedEvent], level: tracing::Level) -> Vec<&CapturedEvent> {
    events.iter().filter(|e| e.level == level).collect()
}

fn leaf(raw: u64) -> LeafId {
    LeafId::new(raw).expect("test ID must be non-zero")
}

#[test]
fn split_emits_structured_debug_event() {
    let events = capture(|| {
        let mut layout = Layout::new(ContentCatalog::default());
        layout
            .split_leaf(leaf(1), Direction::Row, 20.0, true)
            .expect("split");
    });

    let event = find(&events, "leaf split").expect("split event");
    assert_eq!(event.level, tracing::Level::DEBUG);
    assert_eq!(event.target, "areas.layout");
    assert_eq!(event.field("leaf"), Some("1"));
    assert_eq!(event.field("new_leaf"), Some("2"));
    assert_eq!(event.field("direction"), Some("row"));
    assert_eq!(event.field("percentage"), Some("20"));
    assert_eq!(event.field("insert_after"), Some("true"));
}

#[test]
fn rejected_operation_emits_warn_with_error() {
    let events = capture(|| {
        let mut layout = Layout::new(ContentCatalog::default());
        let _ = layout.delete_leaf(leaf(1));
    });

    let warnings = at_level(&events, tracing::Level::WARN);
    assert_eq!(warnings.len(), 1, "one rejection, got {warnings:?}");
    let warning = warnings[0];
    assert_eq!(warning.field("operation"), Some("delete_leaf"));
    assert_eq!(warning.field("error_kind"), Some("RootDeletion"));
    assert!(
        warning.field("error").is_some_and(|e| e.contains("root")),
        "error field should describe the failure: {warning:?}"
    );
}

#[test]
fn rejected_subscription_emits_warn_naming_content() {
    let events = capture(|| {
        let mut layout = Layout::new(ContentCatalog::new(["editor"]));
        let _ = layout.subscribe(ContentRef::from("missing"), |_, _| {});
    });

    let warning = find(&events, "subscription rejected").expect("warn event");
    assert_eq!(warning.level, tracing::Level::WARN);
    assert_eq!(warning.field("content"), Some("\"missing\""));
    assert!(warning.field("error").is_some_and(|e| e.contains("missing")));
}

#[test]
fn construction_and_restore_emit_info() {
    let events = capture(|| {
        let mut layout = Layout::singleton(
            ContentCatalog::new(["editor"]),
            ContentRef::from("editor"),
        )
        .expect("singleton");
        layout
            .split_leaf(leaf(1), Direction::Column, 50.0, false)
            .expect("split");
        let snapshot = layout.snapshot();
        layout.restore(&snapshot).expect("restore");
    });

    let messages: Vec<_> = at_level(&events, tracing::Level::INFO)
        .into_iter()
        .filter_map(CapturedEvent::message)
        .collect();
    assert_eq!(messages, vec!["layout constructed", "layout restored"]);
    let restored = find(&events, "layout restored").expect("restore event");
    assert_eq!(restored.field("leaves"), Some("2"));
    assert_eq!(restored.field("containers"), Some("1"));
}

#[test]
fn every_event_is_structured_and_targeted() {
    let events = capture(|| {
        let mut layout = Layout::new(ContentCatalog::new(["a", "b"]));
        let split = layout
            .split_leaf(leaf(1), Direction::Row, 40.0, true)
            .expect("split");
        layout
            .change_leaf_content(split.leaf, ContentRef::Index(1))
            .expect("change content");
        layout.swap_content(leaf(1), split.leaf).expect("swap");
        let _ = layout.update_ratios(
            areas_layout::ContainerId::MIN,
            vec![10.0, 10.0],
        );
        layout
            .resize_divider(areas_layout::ContainerId::MIN, 0, 5.0)
            .expect("resize");
        layout.delete_leaf(split.leaf).expect("delete");
    });

    assert!(events.len() >= 7, "expected a full event trail, got {events:?}");
    for event in &events {
        assert_eq!(event.target, "areas.layout");
        assert!(
            event.has_structured_fields(),
            "event '{}' should carry structured fields",
            event.message().unwrap_or("<none>")
        );
    }
}
