//! HTTP retry helpers for transient errors.
//!
//! Snapshot and forecast fetchers go through [`send_json`] instead of
//! calling `reqwest::RequestBuilder::send()` directly, so every request
//! gets retry with exponential backoff on connection failures, timeouts,
//! HTTP 429 and HTTP 5xx.
//!
//! ```ignore
//! let body = retry::send_json(|| client.get(&url).query(&params), 3).await?;
//! ```

use std::time::Duration;

use crate::SourceError;

/// Default number of retry attempts after the first request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 300;

/// Sends an HTTP request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`], since builders are consumed by
/// `.send()`.
///
/// Does **not** retry HTTP 4xx (except 429) or a body that is not valid
/// JSON: those are permanent for the lifetime of the snapshot.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails after all retries, the
/// server returns a non-retryable status code, or the body is not JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(
    build_request: F,
    max_retries: u32,
) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, max_retries).await?;
    let url = response.url().to_string();
    let status = response.status();
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|e| {
        let preview = if text.len() > BODY_PREVIEW_LEN {
            format!(
                "{}...",
                text.chars().take(BODY_PREVIEW_LEN).collect::<String>()
            )
        } else {
            text.clone()
        };
        log::error!(
            "JSON parse failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             received: {} bytes\n  \
             parse error: {e}\n  \
             body preview: {preview}",
            text.len(),
        );
        SourceError::Json(e)
    })
}

/// Core retry loop.
///
/// Sends the request built by `build_request`, retrying on transient
/// errors up to `max_retries` times with exponential backoff (1s, 2s,
/// 4s, ...). Returns the successful [`reqwest::Response`].
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<SourceError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = backoff_delay(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    last_error = Some(SourceError::Http(e));
                    continue;
                }
                return Err(SourceError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if attempt < max_retries {
                        log::warn!("  HTTP {status}");
                        last_error = Some(SourceError::Unavailable {
                            message: format!("HTTP {status}"),
                        });
                        continue;
                    }
                    return Err(SourceError::Unavailable {
                        message: format!("HTTP {status} after {max_retries} retries"),
                    });
                }

                if status.is_client_error() {
                    return Err(SourceError::Unavailable {
                        message: format!("HTTP {status}"),
                    });
                }

                return Ok(response);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| SourceError::Unavailable {
        message: "request failed after all retries".to_string(),
    }))
}

/// Backoff before retry `attempt` (1-based): 1s, 2s, 4s, capped at 30s.
fn backoff_delay(attempt: u32) -> Duration {
    let secs = 1u64 << attempt.saturating_sub(1).min(5);
    Duration::from_secs(secs.min(30))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(3), Duration::from_secs(4));
        assert_eq!(backoff_delay(10), Duration::from_secs(30));
    }
}
