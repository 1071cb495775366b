//! The network seam used by the site fetchers.
//!
//! [`Transport`] performs exactly one GET; retrying is layered on top by
//! [`crate::retry::RetryFetch`]. Tests substitute their own transports.

use crate::error::FetchError;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Browser-like user agent; both reading sites serve plain HTML to it.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// A single network attempt.
pub trait Transport {
    /// GET `url` and return the body of a 2xx response.
    ///
    /// A connection failure, a non-success status or exceeding `timeout` is a
    /// [`FetchError`].
    async fn get(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

impl<T: Transport> Transport for &T {
    async fn get(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        (**self).get(url, timeout).await
    }
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let resp = self.client.get(url).timeout(timeout).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "non-success status");
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "received body"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jft/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<table></table>"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let body = transport
            .get(&format!("{}/jft/", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(body, "<table></table>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let err = transport
            .get(&server.uri(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Status(502));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let err = transport
            .get(&server.uri(), Duration::from_millis(50))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }
}
