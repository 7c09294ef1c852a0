mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn scan_without_token_is_a_bad_request() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/scan", server.base_url))
        .json(&json!({}))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn scan_of_unknown_token_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/scan", server.base_url))
        .json(&json!({ "token": "VHS-099" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["outcome"], "not_found");
    Ok(())
}

#[tokio::test]
async fn tape_listing_is_public() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/tapes", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert!(body["data"].is_array());
    Ok(())
}

#[tokio::test]
async fn tape_creation_requires_admin_auth() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/tapes", server.base_url))
        .json(&json!({
            "token": "VHS-001",
            "media_item_id": "abc",
            "title": "Back to the Future"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let challenge = res
        .headers()
        .get("www-authenticate")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(challenge.starts_with("Basic"), "challenge: {}", challenge);
    Ok(())
}

#[tokio::test]
async fn tape_creation_verifies_the_movie_exists() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Authenticated, but the configured Jellyfin is unreachable, so the
    // movie check fails and the tape must be rejected.
    let res = client
        .post(format!("{}/api/tapes", server.base_url))
        .basic_auth(common::ADMIN_USER, Some(common::ADMIN_PASS))
        .json(&json!({
            "token": "VHS-001",
            "media_item_id": "abc",
            "title": "Back to the Future"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"]["message"], "Movie not found in Jellyfin");
    Ok(())
}

#[tokio::test]
async fn missing_tape_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/tapes/424242", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
