//! Response handling shared by the account and task calls.

use log::debug;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

/// Pass successful responses through; turn anything else into an API error
/// carrying the server's `message`, or `fallback` when there is none.
pub(crate) async fn ensure_success(response: Response, fallback: &str) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| fallback.to_string());

    debug!("API call failed with status {}: {}", status, message);
    Err(Error::api(status.as_u16(), message))
}

/// `ensure_success` followed by decoding the JSON body.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, Error> {
    let response = ensure_success(response, fallback).await?;
    Ok(response.json::<T>().await?)
}
