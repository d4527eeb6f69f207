mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use reqwest::{Method, Request, Url, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Response wrapper used by every portal endpoint: `{"data": ...}`.
#[derive(Debug, serde::Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Sends `req` and returns the body bytes, failing on non-2xx with the
/// status and body text in the error.
pub async fn send<C: HttpClient + ?Sized>(client: &C, req: Request) -> Result<Vec<u8>> {
    let method = req.method().clone();
    let url = req.url().clone();

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("{method} {url} failed"))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("request failed: {method} {url} returned {status}: {body}");
    }

    let bytes = resp.bytes().await?.to_vec();
    debug!(%method, %url, bytes = bytes.len(), "Response received");
    Ok(bytes)
}

/// GETs `url` and decodes the `data` field of the JSON envelope.
pub async fn get_json<C, T>(client: &C, url: Url) -> Result<T>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    let bytes = send(client, Request::new(Method::GET, url.clone())).await?;
    decode_envelope(&bytes).with_context(|| format!("failed to parse response from {url}"))
}

/// POSTs `body` (if any) as JSON to `url` and decodes the `data` field.
pub async fn post_json<C, B, T>(client: &C, url: Url, body: Option<&B>) -> Result<T>
where
    C: HttpClient + ?Sized,
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let mut req = Request::new(Method::POST, url.clone());
    req.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    if let Some(body) = body {
        *req.body_mut() = Some(serde_json::to_vec(body)?.into());
    }

    let bytes = send(client, req).await?;
    decode_envelope(&bytes).with_context(|| format!("failed to parse response from {url}"))
}

/// Decodes `{"data": T}` from raw bytes.
pub fn decode_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_slice(bytes)?;
    Ok(envelope.data)
}
