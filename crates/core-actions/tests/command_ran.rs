mod common;

use common::*;
use core_events::KeyInput;
use core_keymap::CommandFlags;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use tracing::dispatcher::{Dispatch, with_default};
use tracing::field::{Field, Visit};
use tracing::subscriber::Interest;
use tracing::{Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;

fn record(r: &core_actions::CommandRunner) -> Rc<RefCell<Vec<String>>> {
    let fired = Rc::new(RefCell::new(Vec::new()));
    let sink = fired.clone();
    r.subscribe(move |data| {
        sink.borrow_mut()
            .push(format!("{} {:?}", data.binding.keys(), data.count));
    });
    fired
}

#[test]
fn fires_once_per_completed_command() {
    let r = runner();
    r.add(simple("x")).unwrap();
    r.add(simple("gg")).unwrap();
    r.add(counting_motion("d", &Counter::default())).unwrap();
    let fired = record(&r);

    run(&r, "x");
    run(&r, "2gg");
    run(&r, "dw");
    assert_eq!(
        fired.borrow().as_slice(),
        &["x None", "gg Some(2)", "d None"]
    );
}

#[test]
fn does_not_fire_for_other_outcomes() {
    let r = runner();
    r.add(simple("gg")).unwrap();
    r.add(counting_motion("d", &Counter::default())).unwrap();
    let fired = record(&r);

    run(&r, "g"); // need more
    r.run(KeyInput::ESCAPE); // cancelled
    run(&r, "gz"); // error
    run(&r, "dq"); // motion error
    run(&r, "d<Esc>"); // motion cancelled
    assert!(fired.borrow().is_empty());
}

#[test]
fn every_observer_is_notified() {
    let r = runner();
    r.add(simple("x")).unwrap();
    let first = record(&r);
    let second = record(&r);
    run(&r, "x");
    assert_eq!(first.borrow().len(), 1);
    assert_eq!(second.borrow().len(), 1);
}

#[test]
fn long_command_completion_fires_once() {
    let r = runner();
    let seen = Rc::new(RefCell::new(String::new()));
    r.add(collecting("i", CommandFlags::empty(), &seen, None)).unwrap();
    let fired = record(&r);
    run(&r, "iabc");
    assert!(fired.borrow().is_empty());
    r.run(KeyInput::ENTER);
    assert_eq!(fired.borrow().as_slice(), &["i None"]);
}

#[derive(Clone, Default)]
struct EventCapture {
    events: Arc<Mutex<Vec<(String, String)>>>,
}

struct MessageVisitor<'a>(&'a mut String);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{value:?}");
        }
    }
}

impl<S> Layer<S> for EventCapture
where
    S: Subscriber,
{
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        Interest::always()
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        self.events
            .lock()
            .unwrap()
            .push((event.metadata().target().to_string(), message));
    }
}

#[test]
fn outcomes_are_logged_under_runner_target() {
    let capture = EventCapture::default();
    let events = capture.events.clone();
    let dispatch = Dispatch::new(Registry::default().with(capture));

    with_default(&dispatch, || {
        let r = runner();
        r.add(simple("x")).unwrap();
        run(&r, "3x");
        run(&r, "z");
        r.run(KeyInput::ESCAPE);
    });

    let events = events.lock().unwrap();
    let runner_events: Vec<&str> = events
        .iter()
        .filter(|(target, _)| target == "actions.runner")
        .map(|(_, message)| message.as_str())
        .collect();
    assert_eq!(runner_events, vec!["command_ran", "bind_error", "bind_cancelled"]);
    assert!(
        events
            .iter()
            .any(|(target, message)| target == "input.context" && message == "count_extend")
    );
}
