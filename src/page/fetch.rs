// src/page/fetch.rs
// =============================================================================
// This module downloads pages over HTTP(S).
//
// Key functionality:
// - One shared reqwest Client (connection pooling) for the whole crawl
// - Per-request timeout and a bounded redirect policy
// - TLS certificate validation is off unless --verify-certs is given
// - Transient failures are retried with exponential backoff
// - Failures are classified into a PageStatus for the final report
//
// The crawl loop only sees the PageSource trait, so tests can swap the
// network for an in-memory site.
// =============================================================================

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::error::Error as _;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::FetchConfig;

/// A downloaded page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Where the body actually came from (after redirects)
    pub url: Url,
    pub body: String,
}

// Outcome of fetching one page, as shown in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageStatus {
    /// Page fetched and scanned for links
    Ok,
    /// Redirected onto a URL this crawl already knows; not scanned again
    AlreadySeen,
    /// Redirected to another host; not scanned
    OffSite,
    /// Server answered with a non-2xx status
    HttpError { code: u16 },
    /// Request timed out
    Timeout,
    /// SSL/TLS handshake or certificate error
    TlsError,
    /// Could not connect (DNS failure, refused, unreachable)
    ConnectError,
    /// Anything else (bad body encoding, redirect loop, ...)
    Error,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {}", .0.as_u16())]
    Status(StatusCode),
    #[error("request timed out")]
    Timeout,
    #[error("TLS error: {0}")]
    Tls(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Whether trying the same request again might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::Connect(_) => true,
            FetchError::Status(code) => {
                code.is_server_error() || *code == StatusCode::TOO_MANY_REQUESTS
            }
            FetchError::Tls(_) | FetchError::TooManyRedirects | FetchError::Other(_) => false,
        }
    }

    pub fn status(&self) -> PageStatus {
        match self {
            FetchError::Status(code) => PageStatus::HttpError {
                code: code.as_u16(),
            },
            FetchError::Timeout => PageStatus::Timeout,
            FetchError::Tls(_) => PageStatus::TlsError,
            FetchError::Connect(_) => PageStatus::ConnectError,
            FetchError::TooManyRedirects | FetchError::Other(_) => PageStatus::Error,
        }
    }
}

// Categorizes reqwest errors
//
// reqwest's Display only shows the outermost layer ("error sending request"),
// so the whole source chain is flattened before looking for TLS hints.
impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        let mut chain = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push_str(": ");
            chain.push_str(&cause.to_string());
            source = cause.source();
        }
        let lower = chain.to_lowercase();

        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_redirect() {
            FetchError::TooManyRedirects
        } else if lower.contains("certificate") || lower.contains("tls") || lower.contains("ssl") {
            FetchError::Tls(chain)
        } else if error.is_connect() {
            FetchError::Connect(chain)
        } else {
            FetchError::Other(chain)
        }
    }
}

/// Anything the crawl loop can pull pages from.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Page, FetchError>;
}

/// The network-backed PageSource.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retries: u32,
    backoff: Duration,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .danger_accept_invalid_certs(!config.verify_certs)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Fetcher {
            client,
            retries: config.retries,
            backoff: config.backoff,
        })
    }

    // A single GET, no retries
    async fn fetch_once(&self, url: &Url) -> Result<Page, FetchError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let final_url = response.url().clone();
        let body = response.text().await?;
        Ok(Page {
            url: final_url,
            body,
        })
    }
}

#[async_trait]
impl PageSource for Fetcher {
    #[tracing::instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(page) => return Ok(page),
                Err(err) if err.is_retryable() && attempt < self.retries => {
                    let delay = backoff_delay(self.backoff, attempt);
                    tracing::debug!(error = %err, attempt = attempt + 1, ?delay, "transient failure, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

// base, 2*base, 4*base, ... capped so the shift can't overflow
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(16))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
    }

    // Serves the given responses in order (repeating the last one) and
    // counts the requests it has seen
    async fn serve(responses: Vec<String>) -> (Url, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let response = responses[n.min(responses.len() - 1)].clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        let url = Url::parse(&format!("http://{}/", addr)).unwrap();
        (url, hits)
    }

    fn config(retries: u32) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(5),
            retries,
            backoff: Duration::from_millis(10),
            verify_certs: false,
        }
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let (url, hits) = serve(vec![http_response("200 OK", "<a href=\"/a\">a</a>")]).await;
        let fetcher = Fetcher::new(&config(0)).unwrap();

        let page = fetcher.fetch(&url).await.unwrap();
        assert_eq!(page.url, url);
        assert_eq!(page.body, "<a href=\"/a\">a</a>");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let (url, hits) = serve(vec![http_response("404 Not Found", "")]).await;
        let fetcher = Fetcher::new(&config(3)).unwrap();

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(StatusCode::NOT_FOUND)));
        assert_eq!(err.status(), PageStatus::HttpError { code: 404 });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let (url, hits) = serve(vec![
            http_response("503 Service Unavailable", ""),
            http_response("200 OK", "recovered"),
        ])
        .await;
        let fetcher = Fetcher::new(&config(2)).unwrap();

        let page = fetcher.fetch(&url).await.unwrap();
        assert_eq!(page.body, "recovered");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (url, hits) = serve(vec![http_response("500 Internal Server Error", "")]).await;
        let fetcher = Fetcher::new(&config(2)).unwrap();

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Grab a free port, then close it again
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{}/", addr)).unwrap();
        let fetcher = Fetcher::new(&config(0)).unwrap();

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert_eq!(err.status(), PageStatus::ConnectError);
    }

    #[tokio::test]
    async fn test_timeout() {
        // Accepts connections but never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let url = Url::parse(&format!("http://{}/", addr)).unwrap();
        let mut cfg = config(0);
        cfg.timeout = Duration::from_millis(200);
        let fetcher = Fetcher::new(&cfg).unwrap();

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
        assert_eq!(err.status(), PageStatus::Timeout);
    }

    #[test]
    fn test_builds_with_and_without_cert_checks() {
        let mut cfg = config(0);
        assert!(Fetcher::new(&cfg).is_ok());
        cfg.verify_certs = true;
        assert!(Fetcher::new(&cfg).is_ok());
    }

    #[test]
    fn test_backoff_doubles() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(800));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(FetchError::Status(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(FetchError::Status(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(!FetchError::Status(StatusCode::FORBIDDEN).is_retryable());
        assert!(!FetchError::Tls("bad cert".into()).is_retryable());
    }
}
