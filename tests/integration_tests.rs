//! Integration tests for the vndb-link client library.
//!
//! Every test spawns an in-process mock server speaking the wire protocol
//! on a localhost TCP port. The client's endpoint points its TLS port at an
//! unreachable port, so each connection also exercises the
//! plaintext-fallback path.

mod common;

use common::{recording_handlers, MockAction, MockServer};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use vndb_link::{
    ApiStatus, Credentials, ResponseKind, Severity, Timeouts, VndbClient, VndbLinkError,
};

fn build_client(server: &MockServer) -> VndbClient {
    let (handlers, _) = recording_handlers();
    VndbClient::builder()
        .endpoint(server.endpoint())
        .credentials(Credentials::anonymous("vndb-link-tests", "0.1"))
        .event_handlers(handlers)
        .timeouts(Timeouts::for_testing())
        .build()
        .expect("build client")
}

#[tokio::test]
async fn test_login_and_execute_over_plaintext_fallback() {
    let server = MockServer::spawn(|command| {
        if command.starts_with("login ") {
            MockAction::Reply("ok".to_string())
        } else {
            MockAction::Reply("dbstats users:1000 vn:500".to_string())
        }
    })
    .await;

    let (handlers, recorded) = recording_handlers();
    let client = VndbClient::builder()
        .endpoint(server.endpoint())
        .credentials(Credentials::anonymous("vndb-link-tests", "0.1"))
        .event_handlers(handlers)
        .timeouts(Timeouts::for_testing())
        .build()
        .unwrap();

    client.open().await.unwrap();
    let status = client.login().await.unwrap();
    assert_eq!(status, "LoggedIn, Ready");

    let response = client
        .execute("dbstats", "Could not fetch database statistics.")
        .await
        .unwrap();
    assert_eq!(response.kind, ResponseKind::DbStats);
    assert_eq!(response.payload, "users:1000 vn:500");
    assert_eq!(client.status(), ApiStatus::Ready);

    // Busy entered and left exactly once for the single command.
    let statuses = recorded.statuses();
    assert_eq!(
        statuses,
        vec![ApiStatus::Ready, ApiStatus::Busy, ApiStatus::Ready]
    );

    // The wire hooks saw the login and the command.
    let sent = recorded.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[0],
        r#"login {"protocol":1,"client":"vndb-link-tests","clientver":"0.1"}"#
    );
    assert_eq!(sent[1], "dbstats");
}

#[tokio::test]
async fn test_scenario_a_throttled_then_ok() {
    let queries = Arc::new(AtomicU32::new(0));
    let server_queries = queries.clone();
    let server = MockServer::spawn(move |command| {
        if command.starts_with("login ") {
            MockAction::Reply("ok".to_string())
        } else if server_queries.fetch_add(1, Ordering::SeqCst) == 0 {
            MockAction::Reply(r#"error {"id":"throttled","fullwait":1}"#.to_string())
        } else {
            MockAction::Reply(r#"results {"num":1,"items":[{"id":17}]}"#.to_string())
        }
    })
    .await;

    let (handlers, recorded) = recording_handlers();
    let client = VndbClient::builder()
        .endpoint(server.endpoint())
        .credentials(Credentials::anonymous("vndb-link-tests", "0.1"))
        .event_handlers(handlers)
        .timeouts(Timeouts::for_testing())
        .build()
        .unwrap();

    client.open().await.unwrap();
    client.login().await.unwrap();

    assert!(client.start_operation(
        "Refreshing title list",
        true,
        Some("This may take a while.".to_string()),
        false
    ));

    let command = "get vn basic (id = 17)";
    let started = Instant::now();
    let response = client
        .execute(command, "Could not refresh the title list.")
        .await
        .unwrap();
    let elapsed = started.elapsed();

    client.set_completion("Title list refreshed.", Severity::Normal);
    client.end_operation();

    assert_eq!(response.kind, ResponseKind::Results);
    assert!(elapsed >= Duration::from_secs(1), "waited {elapsed:?}");
    assert_eq!(client.status(), ApiStatus::Ready);

    // The throttled state was observable, and the retried command was
    // byte-identical to the original.
    assert!(recorded.statuses().contains(&ApiStatus::Throttled));
    let wire_commands: Vec<String> = recorded
        .sent()
        .into_iter()
        .filter(|c| !c.starts_with("login "))
        .collect();
    assert_eq!(wire_commands, vec![command.to_string(), command.to_string()]);
    assert_eq!(queries.load(Ordering::SeqCst), 2);

    // Throttle warning plus the operation's extra warning, then the
    // completion report.
    let texts = recorded.texts();
    assert!(texts
        .iter()
        .any(|(m, s)| m.starts_with("Throttled for") && *s == Severity::Warning));
    assert!(texts
        .iter()
        .any(|(m, s)| m == "This may take a while." && *s == Severity::Warning));
    assert!(texts
        .iter()
        .any(|(m, s)| m == "Title list refreshed." && *s == Severity::Normal));

    // refresh-on-throttle fired exactly once, before the wait.
    assert_eq!(recorded.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_close_during_throttle_wait_stays_closed() {
    let queries = Arc::new(AtomicU32::new(0));
    let server_queries = queries.clone();
    let server = MockServer::spawn(move |command| {
        if command.starts_with("login ") {
            MockAction::Reply("ok".to_string())
        } else {
            server_queries.fetch_add(1, Ordering::SeqCst);
            MockAction::Reply(r#"error {"id":"throttled","fullwait":1}"#.to_string())
        }
    })
    .await;

    let client = build_client(&server);
    client.open().await.unwrap();
    client.login().await.unwrap();

    let runner = client.clone();
    let in_flight = tokio::spawn(async move {
        runner
            .execute("get vn basic (id = 9)", "Could not fetch the title.")
            .await
    });

    // Let the command reach the server and enter the throttle wait, then
    // close while the wait is still running.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(client.status(), ApiStatus::Throttled);
    client.close().await;

    let err = in_flight.await.unwrap().unwrap_err();
    assert!(matches!(err, VndbLinkError::NotReady(ApiStatus::Closed)));
    assert_eq!(client.status(), ApiStatus::Closed);
    // The throttled command was never re-sent into the closed session.
    assert_eq!(queries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_scenario_b_plain_error_fails_without_retry() {
    let queries = Arc::new(AtomicU32::new(0));
    let server_queries = queries.clone();
    let server = MockServer::spawn(move |command| {
        if command.starts_with("login ") {
            MockAction::Reply("ok".to_string())
        } else {
            server_queries.fetch_add(1, Ordering::SeqCst);
            MockAction::Reply(r#"error {"id":"parse","msg":"bad command"}"#.to_string())
        }
    })
    .await;

    let (handlers, recorded) = recording_handlers();
    let client = VndbClient::builder()
        .endpoint(server.endpoint())
        .credentials(Credentials::anonymous("vndb-link-tests", "0.1"))
        .event_handlers(handlers)
        .timeouts(Timeouts::for_testing())
        .build()
        .unwrap();

    client.open().await.unwrap();
    client.login().await.unwrap();

    let err = client
        .execute("get vn basic (id = 1)", "Could not fetch the title.")
        .await
        .unwrap_err();

    match err {
        VndbLinkError::ServerError { id, message } => {
            assert_eq!(id, "parse");
            assert_eq!(message, "bad command");
        }
        other => panic!("expected ServerError, got {other:?}"),
    }

    // No retry, connection stays usable.
    assert_eq!(queries.load(Ordering::SeqCst), 1);
    assert_eq!(client.status(), ApiStatus::Ready);
    assert!(recorded
        .texts()
        .iter()
        .any(|(m, s)| m == "Could not fetch the title." && *s == Severity::Error));
}

#[tokio::test]
async fn test_scenario_c_peer_reset_triggers_relogin_and_retry() {
    let logins = Arc::new(AtomicU32::new(0));
    let drops = Arc::new(AtomicU32::new(0));
    let server_logins = logins.clone();
    let server_drops = drops.clone();
    let server = MockServer::spawn(move |command| {
        if command.starts_with("login ") {
            server_logins.fetch_add(1, Ordering::SeqCst);
            MockAction::Reply("ok".to_string())
        } else if server_drops.fetch_add(1, Ordering::SeqCst) == 0 {
            MockAction::Close
        } else {
            MockAction::Reply(r#"results {"num":1}"#.to_string())
        }
    })
    .await;

    let client = build_client(&server);
    client.open().await.unwrap();
    client.login().await.unwrap();
    assert_eq!(logins.load(Ordering::SeqCst), 1);

    let response = client
        .execute("get vn basic (id = 4)", "Could not fetch the title.")
        .await
        .unwrap();

    assert_eq!(response.kind, ResponseKind::Results);
    // Exactly one extra login from the automatic recovery.
    assert_eq!(logins.load(Ordering::SeqCst), 2);
    assert_eq!(client.status(), ApiStatus::Ready);
}

#[tokio::test]
async fn test_scenario_d_second_operation_rejected() {
    let server = MockServer::spawn(|_| MockAction::Reply("ok".to_string())).await;
    let (handlers, recorded) = recording_handlers();
    let client = VndbClient::builder()
        .endpoint(server.endpoint())
        .credentials(Credentials::anonymous("vndb-link-tests", "0.1"))
        .event_handlers(handlers)
        .timeouts(Timeouts::for_testing())
        .build()
        .unwrap();

    assert!(client.start_operation("A", false, None, false));
    assert!(!client.start_operation("B", false, None, false));

    let active = client.active_query().unwrap();
    assert_eq!(active.name, "A");
    assert!(!active.completed);
    assert!(recorded
        .texts()
        .iter()
        .any(|(m, s)| m == "Wait until A is done." && *s == Severity::Error));

    client.end_operation();
    assert!(client.start_operation("B", false, None, false));
}

#[tokio::test]
async fn test_execute_requires_ready_status() {
    let server = MockServer::spawn(|_| MockAction::Reply("ok".to_string())).await;
    let (handlers, recorded) = recording_handlers();
    let client = VndbClient::builder()
        .endpoint(server.endpoint())
        .credentials(Credentials::anonymous("vndb-link-tests", "0.1"))
        .event_handlers(handlers)
        .timeouts(Timeouts::for_testing())
        .build()
        .unwrap();

    // Opened but not logged in: still Closed, no network touched.
    client.open().await.unwrap();
    let err = client
        .execute("dbstats", "Could not fetch stats.")
        .await
        .unwrap_err();
    assert!(matches!(err, VndbLinkError::NotReady(ApiStatus::Closed)));
    assert!(recorded.sent().is_empty());
    assert!(recorded
        .texts()
        .iter()
        .any(|(m, s)| m == "Could not fetch stats." && *s == Severity::Error));
}

#[tokio::test]
async fn test_large_chunked_response_grows_read_buffer() {
    let payload = "x".repeat(8 * 1024);
    let reply = format!(r#"results {{"description":"{payload}"}}"#);
    let server = MockServer::spawn(move |command| {
        if command.starts_with("login ") {
            MockAction::Reply("ok".to_string())
        } else {
            MockAction::ReplySplit(reply.clone())
        }
    })
    .await;

    let client = build_client(&server);
    client.open().await.unwrap();
    client.login().await.unwrap();

    let response = client
        .execute("get vn details (id = 11)", "Could not fetch details.")
        .await
        .unwrap();
    assert_eq!(response.kind, ResponseKind::Results);
    assert!(response.payload.len() > 8 * 1024);
    assert!(response.payload.contains(&payload));
}

#[tokio::test]
async fn test_close_and_reopen() {
    let server = MockServer::spawn(|_| MockAction::Reply("ok".to_string())).await;

    let (handlers, recorded) = recording_handlers();
    let client = VndbClient::builder()
        .endpoint(server.endpoint())
        .credentials(Credentials::anonymous("vndb-link-tests", "0.1"))
        .event_handlers(handlers)
        .timeouts(Timeouts::for_testing())
        .build()
        .unwrap();

    client.open().await.unwrap();
    client.login().await.unwrap();
    assert_eq!(client.status(), ApiStatus::Ready);

    client.close().await;
    assert_eq!(client.status(), ApiStatus::Closed);
    // Closing again is safe.
    client.close().await;

    // The session may be reopened after close.
    client.open().await.unwrap();
    client.login().await.unwrap();
    assert_eq!(client.status(), ApiStatus::Ready);
    assert!(recorded.statuses().contains(&ApiStatus::Closed));
}

#[tokio::test]
async fn test_unknown_keyword_is_terminal() {
    let server = MockServer::spawn(|command| {
        if command.starts_with("login ") {
            MockAction::Reply("ok".to_string())
        } else {
            MockAction::Reply("surprise {}".to_string())
        }
    })
    .await;

    let client = build_client(&server);
    client.open().await.unwrap();
    client.login().await.unwrap();

    let response = client
        .execute("get vn basic (id = 2)", "Could not fetch the title.")
        .await
        .unwrap();
    assert_eq!(response.kind, ResponseKind::Unknown);
    assert_eq!(client.status(), ApiStatus::Ready);
}
