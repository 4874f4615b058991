mod client;
mod basic;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::Result;
use bytes::Bytes;

/// GETs `url` and returns the body. Any non-2xx status is an error.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<Bytes> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse()?,
    );

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?)
}
