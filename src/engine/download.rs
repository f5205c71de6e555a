use futures::StreamExt;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::types::DownloadResult;

/// Drain one endpoint's response body, counting bytes as they arrive.
///
/// The body is streamed chunk by chunk and never buffered whole. Any
/// transport failure ends the download but keeps the bytes already
/// received ("partial credit"), so a connection that dies mid-transfer
/// still contributes to its trial. The response status is intentionally
/// not checked: the measurement counts bytes that crossed the wire.
///
/// `deadline` bounds the whole download. Each read waits at most for the
/// remaining slice of it, so a stalled connection cannot hang the trial's
/// fan-in barrier. The original tool waited without bound here.
pub async fn download(client: &Client, url: &str, deadline: Duration) -> DownloadResult {
    let start = Instant::now();

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!("Request to {url} failed: {e}");
            return DownloadResult {
                bytes: 0,
                succeeded: false,
            };
        }
    };

    let mut stream = response.bytes_stream();
    let mut total: u64 = 0;

    loop {
        let remaining = deadline.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            warn!("Download from {url} hit the {deadline:?} deadline after {total} bytes");
            return DownloadResult {
                bytes: total,
                succeeded: false,
            };
        }

        match timeout(remaining, stream.next()).await {
            Ok(Some(Ok(chunk))) => total += chunk.len() as u64,
            Ok(Some(Err(e))) => {
                warn!("Read from {url} failed after {total} bytes: {e}");
                return DownloadResult {
                    bytes: total,
                    succeeded: false,
                };
            }
            // End of stream.
            Ok(None) => break,
            Err(_) => {
                warn!("Download from {url} stalled after {total} bytes, giving up");
                return DownloadResult {
                    bytes: total,
                    succeeded: false,
                };
            }
        }
    }

    let elapsed = start.elapsed();
    debug!("Downloaded {total} bytes from {url} in {elapsed:.2?}");
    DownloadResult {
        bytes: total,
        succeeded: true,
    }
}
