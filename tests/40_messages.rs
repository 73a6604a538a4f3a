mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

use common::{token, TestServer};
use talent_api::auth::Role;

async fn send(server: &TestServer, from: i64, to: i64, text: &str) -> Result<()> {
    let res = server
        .authed(Method::POST, &format!("/api/users/{}/conversations/{}/messages", from, to), &token(from, Role::JobSeeker))
        .json(&json!({ "text": text }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "send failed: {}", res.status());
    Ok(())
}

#[tokio::test]
async fn conversation_shows_the_latest_message_per_peer() -> Result<()> {
    let server = TestServer::start().await?;
    let jwt = token(7, Role::JobSeeker);
    server.register(&jwt, 7, "Seven", "seven@example.com").await?;
    server.register(&jwt, 9, "Nine", "nine@example.com").await?;

    send(&server, 9, 7, "hello from nine").await?;
    send(&server, 7, 9, "reply from seven").await?;
    send(&server, 7, 12, "cold outreach").await?;

    let res = server.authed(Method::GET, "/api/users/7/conversations", &jwt).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let conversations = common::data(res).await?;
    let conversations = conversations.as_array().cloned().unwrap_or_default();
    assert_eq!(conversations.len(), 2, "one entry per peer");

    assert_eq!(conversations[0]["peerId"], json!(12), "newest conversation first");
    assert_eq!(conversations[0]["peerInfo"], json!(null), "unregistered peer has no info");

    assert_eq!(conversations[1]["peerId"], json!(9));
    assert_eq!(conversations[1]["lastMessage"], json!("reply from seven"));
    assert_eq!(conversations[1]["peerInfo"]["fullName"], json!("Nine"));
    Ok(())
}

#[tokio::test]
async fn history_is_oldest_first_with_sides() -> Result<()> {
    let server = TestServer::start().await?;
    let jwt = token(7, Role::JobSeeker);

    send(&server, 9, 7, "first").await?;
    send(&server, 7, 9, "second").await?;
    send(&server, 7, 3, "elsewhere").await?;

    let res = server
        .authed(Method::GET, "/api/users/7/conversations/9/messages", &jwt)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let thread = common::data(res).await?;
    let thread = thread.as_array().cloned().unwrap_or_default();
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0]["text"], json!("first"));
    assert_eq!(thread[0]["sender"], json!("other"));
    assert_eq!(thread[1]["text"], json!("second"));
    assert_eq!(thread[1]["sender"], json!("me"));
    Ok(())
}

#[tokio::test]
async fn blank_messages_are_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let jwt = token(7, Role::JobSeeker);

    let res = server
        .authed(Method::POST, "/api/users/7/conversations/9/messages", &jwt)
        .json(&json!({ "text": "   " }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.authed(Method::GET, "/api/users/7/conversations", &jwt).send().await?;
    assert_eq!(common::data(res).await?, json!([]));
    Ok(())
}
