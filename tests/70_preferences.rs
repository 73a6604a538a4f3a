mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use common::{token, TestServer};
use talent_api::auth::Role;

async fn create(server: &TestServer, jwt: &str) -> Result<Value> {
    let res = server
        .authed(Method::POST, "/api/preferences", jwt)
        .json(&json!({
            "userId": 4,
            "employmentType": "Full-time",
            "location": "Remote",
            "shift": "Day",
            "workplace": "Home",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    common::data(res).await
}

async fn only_preference(server: &TestServer, jwt: &str) -> Result<Value> {
    let res = server.authed(Method::GET, "/api/users/4/preferences", jwt).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(common::data(res).await?[0].clone())
}

#[tokio::test]
async fn unknown_field_is_rejected_and_nothing_changes() -> Result<()> {
    let server = TestServer::start().await?;
    let jwt = token(4, Role::JobSeeker);
    let created = create(&server, &jwt).await?;
    let path = format!("/api/preferences/{}", created["id"]);

    let res = server
        .authed(Method::DELETE, &path, &jwt)
        .json(&json!({ "field": "salary" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let stored = only_preference(&server, &jwt).await?;
    assert_eq!(stored, created);
    Ok(())
}

#[tokio::test]
async fn clearing_a_field_empties_only_that_field() -> Result<()> {
    let server = TestServer::start().await?;
    let jwt = token(4, Role::JobSeeker);
    let created = create(&server, &jwt).await?;
    let path = format!("/api/preferences/{}", created["id"]);

    let res = server
        .authed(Method::DELETE, &path, &jwt)
        .json(&json!({ "field": "shift" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::data(res).await?["message"], json!("shift cleared successfully"));

    let stored = only_preference(&server, &jwt).await?;
    assert_eq!(stored["shift"], json!(""));
    assert_eq!(stored["location"], json!("Remote"));
    assert_eq!(stored["workplace"], json!("Home"));
    Ok(())
}

#[tokio::test]
async fn update_and_missing_rows() -> Result<()> {
    let server = TestServer::start().await?;
    let jwt = token(4, Role::JobSeeker);

    let res = server.authed(Method::GET, "/api/users/4/preferences", &jwt).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND, "no preferences yet");

    let created = create(&server, &jwt).await?;
    let res = server
        .authed(Method::PUT, &format!("/api/preferences/{}", created["id"]), &jwt)
        .json(&json!({ "location": "Berlin" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(only_preference(&server, &jwt).await?["location"], json!("Berlin"));

    let res = server
        .authed(Method::PUT, "/api/preferences/999", &jwt)
        .json(&json!({ "location": "Paris" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn user_id_may_arrive_as_a_string() -> Result<()> {
    let server = TestServer::start().await?;
    let jwt = token(4, Role::JobSeeker);

    let res = server
        .authed(Method::POST, "/api/preferences", &jwt)
        .json(&json!({ "userId": "4", "location": "Remote" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(common::data(res).await?["userId"], json!(4));
    assert_eq!(only_preference(&server, &jwt).await?["location"], json!("Remote"));

    let res = server
        .authed(Method::POST, "/api/preferences", &jwt)
        .json(&json!({ "userId": "four" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
