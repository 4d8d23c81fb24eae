use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use strum::IntoEnumIterator;
use whareiq::{
    flows::{ConnectionField, ConnectionFlow},
    models::{AuthState, ConnectionResult},
    route::Route,
};

use crate::test_utils::{assertions::RenderAssertions, fixtures, EventBuilder, TestDriver, TestEnvironment};

fn connect_form(values: [&str; 5]) -> EventBuilder {
    let mut events = EventBuilder::new();
    for value in &values[..4] {
        events = events.field(value);
    }
    events.keys(values[4]).enter()
}

fn filled_flow() -> ConnectionFlow {
    let mut flow = ConnectionFlow::new();
    for (field, value) in ConnectionField::iter().zip(fixtures::CONNECT_FIELDS) {
        flow.set_field(field, value);
    }
    flow
}

async fn on_connect_page() -> TestDriver {
    let env = TestEnvironment::signed_in().await.unwrap();
    let driver = TestDriver::start(env, Route::ConnectDb).await.unwrap();
    assert_eq!(driver.route(), Route::ConnectDb);
    driver
}

#[tokio::test]
async fn test_successful_connection_moves_to_query() {
    let mut driver = on_connect_page().await;
    driver.env.transport.respond("/connect-database", 200, fixtures::connected_body());

    driver.send(connect_form(fixtures::CONNECT_FIELDS).build()).await.unwrap();
    assert_eq!(driver.route(), Route::Query);
    assert_eq!(driver.app.auth_state(), AuthState::AuthenticatedConnected);

    let requests = driver.env.transport.requests_to("/connect-database");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].body,
        Some(json!({"host": "localhost", "port": 5432, "db_name": "sales", "username": "alice", "password": "x"}))
    );
    assert_eq!(requests[0].bearer.as_ref().map(|t| t.expose()), Some("token-alice@example.com"));

    // Coming back shows an empty form
    driver.send(EventBuilder::new().ctrl('e').build()).await.unwrap();
    assert_eq!(driver.route(), Route::ConnectDb);
    assert_eq!(driver.app.auth_state(), AuthState::AuthenticatedNoConnection);
    driver.render().unwrap().assert_not_contains("│alice");
}

#[tokio::test]
async fn test_rejected_connection_keeps_the_form() {
    let mut driver = on_connect_page().await;
    driver.env.transport.respond("/connect-database", 400, r#"{"detail":"could not connect to db"}"#);

    driver.send(connect_form(fixtures::CONNECT_FIELDS).build()).await.unwrap();
    assert_eq!(driver.route(), Route::ConnectDb);

    let screen = driver.render().unwrap();
    screen.assert_contains("could not connect to db");
    screen.assert_contains("│alice");

    // Resubmitting sends the retained values again
    driver.env.transport.respond("/connect-database", 200, fixtures::connected_body());
    driver.send(EventBuilder::new().enter().build()).await.unwrap();
    assert_eq!(driver.route(), Route::Query);
    assert_eq!(driver.env.transport.requests_to("/connect-database").len(), 2);
}

#[tokio::test]
async fn test_validation_errors_are_listed_verbatim() {
    let mut driver = on_connect_page().await;
    driver.env.transport.respond(
        "/connect-database",
        422,
        r#"{"detail":[{"loc":["body","port"],"msg":"value is not a valid integer","type":"type_error"}]}"#,
    );

    driver.send(connect_form(fixtures::CONNECT_FIELDS).build()).await.unwrap();
    driver.render().unwrap().assert_contains("value is not a valid integer");
}

#[rstest]
#[case::not_a_number("abc")]
#[case::zero("0")]
#[case::too_large("70000")]
#[case::negative("-1")]
#[case::empty("")]
#[tokio::test]
async fn test_malformed_port_never_reaches_the_service(#[case] port: &str) {
    let mut driver = on_connect_page().await;

    driver.send(connect_form(["localhost", port, "sales", "alice", "x"]).build()).await.unwrap();
    assert_eq!(driver.route(), Route::ConnectDb);
    assert!(driver.env.transport.requests_to("/connect-database").is_empty());
    driver.render().unwrap().assert_contains("Port must be a number");
}

#[tokio::test]
async fn test_submission_without_session_is_not_sent() {
    let env = TestEnvironment::new().unwrap();
    let mut flow = filled_flow();

    let result = flow.submit(&env.api).await;
    assert_eq!(result, Some(ConnectionResult::Failed { reason: "Not authenticated".to_string() }));
    assert!(env.transport.requests().is_empty());
    assert_eq!(flow.form().host, "localhost");
}

#[tokio::test]
async fn test_unreachable_service_is_reported() {
    let env = TestEnvironment::signed_in().await.unwrap();
    env.transport.fail("/connect-database", "connection refused");
    let mut flow = filled_flow();

    let Some(ConnectionResult::Failed { reason }) = flow.submit(&env.api).await else {
        panic!("expected a failure");
    };
    assert!(reason.contains("connection refused"), "{reason}");
}
