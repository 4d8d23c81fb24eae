use pretty_assertions::assert_eq;
use serde_json::json;
use whareiq::{
    action::Action,
    flows::{query::BUSY_LABEL, QueryFlow},
    route::Route,
};

use crate::test_utils::{
    assertions::{assert_json_rendered, RenderAssertions},
    fixtures, EventBuilder, TestDriver, TestEnvironment,
};

async fn on_query_page() -> TestDriver {
    let env = TestEnvironment::signed_in().await.unwrap();
    let driver = TestDriver::start(env, Route::Query).await.unwrap();
    assert_eq!(driver.route(), Route::Query);
    driver
}

#[tokio::test]
async fn test_answer_is_displayed_verbatim() {
    let mut driver = on_query_page().await;
    driver.env.transport.respond("/query", 200, &fixtures::answer().to_string());

    driver.send(EventBuilder::new().keys(fixtures::QUESTION).enter().build()).await.unwrap();

    let requests = driver.env.transport.requests_to("/query");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body, Some(json!({"question": fixtures::QUESTION})));
    assert_eq!(requests[0].method, reqwest::Method::POST);

    let screen = driver.render().unwrap();
    assert_json_rendered(&screen, &fixtures::answer());
    screen.assert_contains("SELECT COUNT(*)");
    screen.assert_not_contains(BUSY_LABEL);
}

#[tokio::test]
async fn test_blank_question_makes_no_call() {
    let mut driver = on_query_page().await;

    driver.send(EventBuilder::new().enter().build()).await.unwrap();
    driver.send(EventBuilder::new().keys("   ").enter().build()).await.unwrap();

    assert!(driver.env.transport.requests_to("/query").is_empty());
    driver.render().unwrap().assert_contains("Please enter a question");
}

#[tokio::test]
async fn test_busy_while_waiting_for_answer() {
    let mut driver = on_query_page().await;
    let release = driver.env.transport.hold("/query");
    driver.env.transport.respond("/query", 200, r#"{"answer": 7}"#);

    driver.send(EventBuilder::new().keys("How many users?").enter().build()).await.unwrap();
    driver.render().unwrap().assert_contains(BUSY_LABEL);

    // A second Enter while waiting sends nothing
    driver.send(EventBuilder::new().enter().build()).await.unwrap();
    assert_eq!(driver.env.transport.requests_to("/query").len(), 1);

    release.notify_one();
    driver.settle().await.unwrap();
    let screen = driver.render().unwrap();
    screen.assert_not_contains(BUSY_LABEL);
    screen.assert_contains("\"answer\": 7");
}

#[tokio::test]
async fn test_service_error_shown_inline() {
    let mut driver = on_query_page().await;
    driver.env.transport.respond("/query", 500, r#"{"detail":"LLM timed out"}"#);

    driver.send(EventBuilder::new().keys(fixtures::QUESTION).enter().build()).await.unwrap();
    assert_eq!(driver.route(), Route::Query);
    driver.render().unwrap().assert_contains("LLM timed out");
}

#[tokio::test]
async fn test_late_answer_after_leaving_is_dropped() {
    let mut driver = on_query_page().await;
    let release = driver.env.transport.hold("/query");
    driver.env.transport.respond("/query", 200, r#"{"answer": "stale"}"#);

    driver.send(EventBuilder::new().keys(fixtures::QUESTION).enter().build()).await.unwrap();
    let asked_at = driver.app.epoch();

    driver.send(EventBuilder::new().ctrl('e').build()).await.unwrap();
    assert_eq!(driver.route(), Route::ConnectDb);
    driver.send(EventBuilder::new().ctrl('n').build()).await.unwrap();
    assert_eq!(driver.route(), Route::Query);
    assert_ne!(driver.app.epoch(), asked_at);

    release.notify_one();
    driver.settle().await.unwrap();

    let screen = driver.render().unwrap();
    screen.assert_not_contains("stale");
    screen.assert_not_contains(BUSY_LABEL);
    screen.assert_contains("Answers appear here.");
}

#[tokio::test]
async fn test_only_current_epoch_results_are_delivered() {
    let mut driver = on_query_page().await;
    let _held = driver.env.transport.hold("/query");
    driver.send(EventBuilder::new().keys("q").enter().build()).await.unwrap();

    let epoch = driver.app.epoch();
    driver.dispatch(Action::QueryResolved(epoch.next(), Ok(json!({"answer": "future"})))).await.unwrap();
    driver.render().unwrap().assert_contains(BUSY_LABEL);

    driver.dispatch(Action::QueryResolved(epoch, Ok(json!({"answer": "fresh"})))).await.unwrap();
    let screen = driver.render().unwrap();
    screen.assert_contains("fresh");
    screen.assert_not_contains("future");
}

#[tokio::test]
async fn test_landing_keybindings() {
    let env = TestEnvironment::new().unwrap();
    let mut driver = TestDriver::start(env, Route::Landing).await.unwrap();
    assert_eq!(driver.env.transport.requests_to("/health").len(), 1);
    driver.render().unwrap().assert_contains("WhareIQ API is up");

    driver.env.transport.fail("/health", "connection refused");
    driver.send(EventBuilder::new().key('r').build()).await.unwrap();
    assert_eq!(driver.env.transport.requests_to("/health").len(), 2);
    driver.render().unwrap().assert_contains("Service unavailable");

    driver.send(EventBuilder::new().ctrl('z').build()).await.unwrap();
    assert!(driver.app.should_suspend);

    driver.send(EventBuilder::new().key('q').build()).await.unwrap();
    assert!(driver.app.should_quit);
}

#[tokio::test]
async fn test_query_flow_against_the_client() {
    let env = TestEnvironment::signed_in().await.unwrap();
    env.transport.respond("/query", 200, &fixtures::answer().to_string());
    let mut flow = QueryFlow::new();

    flow.ask(&env.api, "   ").await;
    assert!(env.transport.requests().is_empty());
    assert_eq!(flow.error(), Some("Please enter a question"));

    flow.ask(&env.api, fixtures::QUESTION).await;
    assert_eq!(flow.answer().map(|answer| &answer.0), Some(&fixtures::answer()));
    assert_eq!(flow.error(), None);
    assert!(!flow.is_pending());
}

#[tokio::test]
async fn test_query_flow_without_session() {
    let env = TestEnvironment::new().unwrap();
    let mut flow = QueryFlow::new();

    flow.ask(&env.api, fixtures::QUESTION).await;
    assert!(env.transport.requests().is_empty());
    assert_eq!(flow.error(), Some("Not authenticated"));
    assert_eq!(flow.answer(), None);
}
