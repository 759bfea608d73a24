mod support;

use httpmock::prelude::*;
use pos_client::api::ApiClient;
use pos_client::stock_requests::{complete_request, request_stock};
use pos_client::{ClientError, Route, TokenStore};
use serde_json::json;
use support::{session_with, unsigned_token};

fn cashier_token() -> String {
    unsigned_token(r#"{"role":"Cashier","branchid":"B1","email":"cashier@example.com"}"#)
}

#[tokio::test]
async fn request_stock_posts_into_own_branch() {
    let server = MockServer::start_async().await;
    let token = cashier_token();
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/requests")
                .header("authorization", format!("Bearer {token}"))
                .json_body(json!({
                    "frombranchid": "B2",
                    "tobranchid": "B1",
                    "productid": "P1",
                    "quantity": 6,
                    "status": "pending"
                }));
            then.status(200).json_body(json!({
                "New": {
                    "requestid": "R9",
                    "frombranchid": "B2",
                    "tobranchid": "B1",
                    "productid": "P1",
                    "quantity": 6,
                    "status": "pending",
                    "createdat": "2025-03-01T10:00:00Z"
                }
            }));
        })
        .await;

    let ctx = session_with(Some(cashier_token()));
    let api = ApiClient::new(server.base_url());
    let created = request_stock(&api, &ctx.session, " P1 ", "B2", 6)
        .await
        .expect("request created");

    mock.assert_async().await;
    assert_eq!(created.request_id, "R9");
    assert!(created.is_pending());
}

#[tokio::test]
async fn backend_rejection_is_returned_and_session_kept() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/requests");
            then.status(400)
                .json_body(json!({"error": "Not enough stock in sending branch"}));
        })
        .await;

    let ctx = session_with(Some(cashier_token()));
    let api = ApiClient::new(server.base_url());
    let err = request_stock(&api, &ctx.session, "P1", "B2", 600)
        .await
        .expect_err("rejected");

    match err {
        ClientError::Backend { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Not enough stock in sending branch");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(ctx.session.current_token().is_some());
}

#[tokio::test]
async fn unauthorized_write_logs_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/requests");
            then.status(401).json_body(json!({"error": "token expired"}));
        })
        .await;

    let ctx = session_with(Some(cashier_token()));
    ctx.session.navigator().navigate(Route::Inventory);
    let api = ApiClient::new(server.base_url());
    let err = request_stock(&api, &ctx.session, "P1", "B2", 1)
        .await
        .expect_err("unauthorized");

    assert!(matches!(err, ClientError::Unauthorized));
    assert_eq!(ctx.store.get(), None);
    assert_eq!(ctx.session.navigator().current(), Route::Login);
}

#[tokio::test]
async fn invalid_input_never_reaches_the_backend() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.path("/requests");
            then.status(500);
        })
        .await;
    let ctx = session_with(Some(cashier_token()));
    let api = ApiClient::new(server.base_url());

    for (product, from, quantity) in [("", "B2", 1), ("P1", " ", 1), ("P1", "B2", 0), ("P1", "B1", 3)] {
        let err = request_stock(&api, &ctx.session, product, from, quantity)
            .await
            .expect_err("invalid input");
        assert!(
            matches!(err, ClientError::Validation(_)),
            "{product}/{from}/{quantity}: {err:?}"
        );
    }
    assert_eq!(mock.hits_async().await, 0);
    assert!(ctx.session.current_token().is_some());
}

#[tokio::test]
async fn requesting_without_a_branch_or_session_fails_locally() {
    let server = MockServer::start_async().await;
    let api = ApiClient::new(server.base_url());

    let no_branch = session_with(Some(unsigned_token(r#"{"role":"Super Admin"}"#)));
    let err = request_stock(&api, &no_branch.session, "P1", "B2", 1)
        .await
        .expect_err("no branch");
    assert!(matches!(err, ClientError::NoBranch));
    assert!(no_branch.session.current_token().is_some());

    let logged_out = session_with(None);
    let err = request_stock(&api, &logged_out.session, "P1", "B2", 1)
        .await
        .expect_err("no session");
    assert!(matches!(err, ClientError::NoSession));
    assert_eq!(logged_out.session.navigator().current(), Route::Login);
}

#[tokio::test]
async fn complete_request_puts_status_only() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/requests/R9")
                .json_body(json!({"status": "complete"}));
            then.status(200).json_body(json!({"Updated": "Succeed"}));
        })
        .await;

    let ctx = session_with(Some(cashier_token()));
    let api = ApiClient::new(server.base_url());
    complete_request(&api, &ctx.session, "R9")
        .await
        .expect("completed");

    mock.assert_async().await;
}

#[tokio::test]
async fn complete_request_reports_missing_request() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/requests/R404");
            then.status(404).json_body(json!({"error": "Request not found"}));
        })
        .await;

    let ctx = session_with(Some(cashier_token()));
    let api = ApiClient::new(server.base_url());
    let err = complete_request(&api, &ctx.session, "R404")
        .await
        .expect_err("missing");

    assert!(matches!(err, ClientError::Backend { status: 404, .. }));
}
