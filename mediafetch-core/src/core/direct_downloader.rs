use std::path::Path;

use anyhow::{anyhow, Context};
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::core::filename;
use crate::models::media::ImageFile;

pub const BLOCK_SIZE: usize = 1024;

/// GETs `url` into `output_dir`, naming the file after the URL path.
///
/// With a known `Content-Length` the body is written in [`BLOCK_SIZE`] blocks and
/// `written / length` is sent after each one. Without it the body is buffered and
/// written at once, and nothing is sent. The destination is overwritten in place,
/// so a failed transfer can leave a partial file behind.
pub async fn download_image(
    client: &reqwest::Client,
    url: &str,
    output_dir: &Path,
    progress_tx: mpsc::Sender<f64>,
) -> anyhow::Result<ImageFile> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request to {} failed", url))?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("HTTP {} for url {}", status, url));
    }

    let filename = filename::image_filename(url, chrono::Utc::now().timestamp());
    let file_path = output_dir.join(&filename);
    let total_size = response.content_length().unwrap_or(0);

    tracing::debug!(
        "[direct] {} -> {} (content-length: {})",
        url,
        file_path.display(),
        total_size
    );

    let mut file = tokio::fs::File::create(&file_path)
        .await
        .with_context(|| format!("cannot create {}", file_path.display()))?;

    let bytes_written = if total_size == 0 {
        let body = response.bytes().await.context("reading response body")?;
        file.write_all(&body)
            .await
            .with_context(|| format!("writing {}", file_path.display()))?;
        body.len() as u64
    } else {
        stream_blocks(response, &mut file, total_size, &progress_tx)
            .await
            .with_context(|| format!("writing {}", file_path.display()))?
    };

    file.flush().await?;

    Ok(ImageFile {
        filename,
        file_path,
        bytes_written,
    })
}

async fn stream_blocks(
    response: reqwest::Response,
    file: &mut tokio::fs::File,
    total_size: u64,
    progress_tx: &mpsc::Sender<f64>,
) -> anyhow::Result<u64> {
    let mut stream = response.bytes_stream();
    let mut pending: Vec<u8> = Vec::with_capacity(BLOCK_SIZE * 2);
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| anyhow!("download stream error: {}", e))?;
        pending.extend_from_slice(&chunk);

        let full = pending.len() - pending.len() % BLOCK_SIZE;
        for block in pending[..full].chunks(BLOCK_SIZE) {
            file.write_all(block).await?;
            written += block.len() as u64;
            let _ = progress_tx.send(written as f64 / total_size as f64).await;
        }
        pending.drain(..full);
    }

    if !pending.is_empty() {
        file.write_all(&pending).await?;
        written += pending.len() as u64;
        let _ = progress_tx.send(written as f64 / total_size as f64).await;
    }

    Ok(written)
}

/// Full body of `url` for an in-memory preview; nothing touches the disk.
pub async fn fetch_preview(client: &reqwest::Client, url: &str) -> anyhow::Result<Vec<u8>> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("HTTP {} for url {}", status, url));
    }
    Ok(response.bytes().await?.to_vec())
}
