//! JSON request/reply helpers shared by the panel and its server.
//!
//! Endpoints answer with a JSON body even when they fail, so the client
//! decodes the body first and only falls back to the HTTP status when the body
//! is not what it expected.
//!
//! # Example
//!
//! ```ignore
//! use led_panel::rpc;
//! use led_shared::{CommandReply, LedState};
//!
//! let reply: CommandReply = rpc::post_json("/control-led", &LedState::default()).await?;
//! ```

use serde::de::DeserializeOwned;

#[cfg(feature = "client")]
use serde::Serialize;

/// Failure to get a decodable reply out of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Failed to serialize the request body.
    #[error("could not encode request: {0}")]
    Encode(String),

    /// The request never produced a response.
    #[error("request error: {0}")]
    Request(String),

    /// Non-success status with a body that did not decode.
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// Success status with a body that did not decode.
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Decode a reply body, whatever the status.
pub fn decode_body<Resp: DeserializeOwned>(status: u16, body: &str) -> Result<Resp, ClientError> {
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(_) if !(200..300).contains(&status) => Err(ClientError::Status(status)),
        Err(e) => Err(ClientError::Decode(e.to_string())),
    }
}

/// POST `args` as JSON to `path` and decode the JSON reply.
#[cfg(feature = "client")]
pub async fn post_json<Args, Resp>(path: &str, args: &Args) -> Result<Resp, ClientError>
where
    Args: Serialize,
    Resp: DeserializeOwned,
{
    use gloo_net::http::Request;

    let response = Request::post(path)
        .header("Content-Type", "application/json")
        .json(args)
        .map_err(|e| ClientError::Encode(e.to_string()))?
        .send()
        .await
        .map_err(|e| ClientError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::Request(e.to_string()))?;

    decode_body(status, &body)
}

/// Server-side helpers for answering in the shape the client decodes.
#[cfg(feature = "server")]
pub mod server {
    use axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    };

    /// `{"error": message}` with the given status.
    pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
        let body = serde_json::json!({ "error": message.into() });
        (status, Json(body)).into_response()
    }
}

#[cfg(feature = "server")]
pub use server::error_response;
