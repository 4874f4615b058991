use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::io::Write;
use tracing::info;

/// Uploads raw bytes to an S3 bucket under `key`.
pub async fn write_bytes_to_s3(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    body: Vec<u8>,
    content_type: &str,
) -> Result<()> {
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body))
        .content_type(content_type)
        .send()
        .await?;

    Ok(())
}

/// Serializes a value to JSON and uploads it with `application/json` content type.
pub async fn write_json_to_s3(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    value: &impl Serialize,
) -> Result<()> {
    let body = serde_json::to_vec(value)?;
    write_bytes_to_s3(client, bucket, key, body, "application/json").await
}

/// Uploads the rendered page as `index.html`, or gzip-compressed as
/// `index.html.gz`.
#[tracing::instrument(skip(client, html), fields(bytes = html.len()))]
pub async fn publish_page(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    html: &str,
    gzip: bool,
) -> Result<String> {
    let (body, key) = if gzip {
        (gzip_bytes(html.as_bytes())?, "index.html.gz")
    } else {
        (html.as_bytes().to_vec(), "index.html")
    };

    write_bytes_to_s3(client, bucket, key, body, "text/html; charset=utf-8").await?;
    info!(key, "Map page uploaded");
    Ok(key.to_string())
}

pub fn gzip_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
