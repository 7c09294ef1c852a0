use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::json;

use crate::config::AdminConfig;
use crate::state::AppState;

const REALM: &str = "Basic realm=\"VHS Tap Admin\"";

/// Extractor guarding the admin surface (tape mutations, movie search)
/// with HTTP Basic authentication against the configured credentials.
pub struct AdminAuth;

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| challenge("Authorization header required"))?;

        check_basic_credentials(header_value, &state.config.admin)
            .map_err(challenge)?;

        Ok(AdminAuth)
    }
}

/// Validate a `Basic base64(username:password)` header value.
fn check_basic_credentials(header_value: &str, admin: &AdminConfig) -> Result<(), &'static str> {
    let encoded = header_value
        .strip_prefix("Basic ")
        .ok_or("Invalid authorization format")?;

    let decoded = BASE64
        .decode(encoded.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or("Invalid authorization format")?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or("Invalid authorization format")?;

    if username == admin.username && password == admin.password {
        Ok(())
    } else {
        Err("Invalid credentials")
    }
}

fn challenge(message: &str) -> Response {
    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "success": false,
            "error": { "message": message }
        })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
    response
}
