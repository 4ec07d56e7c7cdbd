use std::time::Duration;

use thiserror::Error;

/// Transport-level probe failure. HTTP error statuses are not failures.
#[derive(Debug, Clone, Error)]
pub enum CheckError {
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Request(String),
}

/// Issues a single GET against a target.
///
/// Elapsed time is measured by the caller; implementations only report whether
/// a complete response (headers and body) arrived.
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Returns the HTTP status code of any response received in time
    async fn check(&self, url: &str) -> Result<u16, CheckError>;
}

/// HTTP/HTTPS checker
pub struct HttpChecker {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pingboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, timeout })
    }

    fn classify(&self, error: reqwest::Error) -> CheckError {
        if error.is_timeout() {
            CheckError::Timeout(self.timeout)
        } else {
            CheckError::Request(error.to_string())
        }
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn check(&self, url: &str) -> Result<u16, CheckError> {
        let response = self.client.get(url).send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();

        // The client timeout covers the body too; a stalled body is a failure
        response.bytes().await.map_err(|e| self.classify(e))?;

        Ok(status)
    }
}
