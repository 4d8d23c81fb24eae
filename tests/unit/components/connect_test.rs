use whareiq::{
    action::Action,
    api::ApiError,
    components::ConnectPage,
    flows::{ConnectionField, FlowTicket},
    tui::Event,
};

use crate::test_utils::{assertions::RenderAssertions, fixtures, ComponentTestHarness, EventBuilder};

fn filled_form() -> EventBuilder {
    let mut events = EventBuilder::new();
    for value in &fixtures::CONNECT_FIELDS[..4] {
        events = events.field(value);
    }
    events.keys(fixtures::CONNECT_FIELDS[4])
}

#[test]
fn test_form_renders_every_field() {
    let mut harness = ComponentTestHarness::new(ConnectPage::new()).unwrap();
    let screen = harness.render().unwrap();
    screen.assert_contains("Connect your database");
    for label in ["Host", "Port", "Database", "Username", "Password"] {
        screen.assert_contains(label);
    }
}

#[test]
fn test_submit_builds_the_request() {
    let mut harness = ComponentTestHarness::new(ConnectPage::new()).unwrap();
    let actions = harness.send_events(filled_form().enter().build()).unwrap();
    assert_eq!(actions, vec![Action::SubmitConnection(fixtures::connection_request())]);

    let screen = harness.render().unwrap();
    screen.assert_contains("Connecting...");
}

#[test]
fn test_rejection_is_rendered_with_values_kept() {
    let mut harness = ComponentTestHarness::new(ConnectPage::new()).unwrap();
    harness.send_events(filled_form().enter().build()).unwrap();

    let rejected = ApiError::Rejected { status: 400, detail: "could not connect to db".into() };
    assert_eq!(harness.update(Action::ConnectionResolved(FlowTicket(0), Err(rejected))).unwrap(), None);

    let screen = harness.render().unwrap();
    screen.assert_contains("could not connect to db");
    screen.assert_contains("localhost");
    screen.assert_contains("sales");
}

#[test]
fn test_port_error_shown_on_the_field() {
    let mut harness = ComponentTestHarness::new(ConnectPage::new()).unwrap();
    let events = EventBuilder::new().field("localhost").field("abc").field("sales").field("alice").keys("x").enter();
    assert!(harness.send_events(events.build()).unwrap().is_empty());

    assert!(harness.component.flow().field_error(ConnectionField::Port).is_some());
    harness.render().unwrap().assert_contains("Port must be a number");
}

#[test]
fn test_paste_clears_the_field_error() {
    let mut harness = ComponentTestHarness::new(ConnectPage::new()).unwrap();
    let events = EventBuilder::new().field("localhost").field("").field("sales").field("alice").keys("x").enter();
    assert!(harness.send_events(events.build()).unwrap().is_empty());
    harness.render().unwrap().assert_contains("Port must be a number");

    let mut events = EventBuilder::new().backtab().backtab().backtab().build();
    events.push(Event::Paste("5432".into()));
    assert!(harness.send_events(events).unwrap().is_empty());

    assert_eq!(harness.component.flow().field_error(ConnectionField::Port), None);
    let screen = harness.render().unwrap();
    screen.assert_not_contains("Port must be a number");
    screen.assert_contains("5432");
}
