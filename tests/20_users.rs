mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

use common::{token, TestServer};
use talent_api::auth::Role;

#[tokio::test]
async fn register_fetch_update_and_delete() -> Result<()> {
    let server = TestServer::start().await?;
    let jwt = token(11, Role::JobSeeker);

    let user = server.register(&jwt, 11, "Ada Lovelace", "ada@example.com").await?;
    assert_eq!(user["userId"], json!(11));
    assert_eq!(user["appliedFor"], json!([]));

    let res = server.authed(Method::GET, "/api/users/11", &jwt).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched = common::data(res).await?;
    assert_eq!(fetched["fullName"], json!("Ada Lovelace"));

    let res = server
        .authed(Method::PUT, "/api/users/11", &jwt)
        .json(&json!({ "location": "London" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = common::data(res).await?;
    assert_eq!(updated["location"], json!("London"));
    assert_eq!(updated["email"], json!("ada@example.com"), "untouched fields survive a partial update");

    let res = server.authed(Method::DELETE, "/api/users", &jwt).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.authed(Method::GET, "/api/users/11", &jwt).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() -> Result<()> {
    let server = TestServer::start().await?;
    let jwt = token(1, Role::JobSeeker);

    server.register(&jwt, 1, "First", "same@example.com").await?;

    let res = server
        .authed(Method::POST, "/api/users/register", &jwt)
        .json(&json!({ "userId": 2, "fullName": "Second", "email": "same@example.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn registration_requires_name_and_email() -> Result<()> {
    let server = TestServer::start().await?;
    let jwt = token(1, Role::JobSeeker);

    for payload in [
        json!({ "userId": 1, "email": "a@example.com" }),
        json!({ "userId": 1, "fullName": "A" }),
        json!({ "userId": 1, "fullName": "A", "email": "not-an-email" }),
    ] {
        let res = server
            .authed(Method::POST, "/api/users/register", &jwt)
            .json(&payload)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "payload {}", payload);
    }
    Ok(())
}

#[tokio::test]
async fn deleting_an_unknown_account_is_not_found() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .authed(Method::DELETE, "/api/users", &token(404, Role::JobSeeker))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
