//! HTTP transport abstraction.
//!
//! The client issues exactly one GET per call and only consumes the status
//! line and body, so the transport seam is a single-method trait. The
//! default implementation is backed by `reqwest`; tests and embedders can
//! inject anything else that satisfies the trait.

use async_trait::async_trait;

/// Boxed error returned by transport implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The slice of an HTTP response the client consumes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase, when the transport knows one.
    pub reason: Option<String>,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Reason phrase, falling back to the bare status code.
    pub fn reason_or_status(&self) -> String {
        match &self.reason {
            Some(reason) => reason.clone(),
            None => self.status.to_string(),
        }
    }
}

/// One-shot HTTP GET collaborator.
///
/// Implementations own connection handling, redirect policy and timeouts;
/// failures here surface to callers as transport errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Fetch `url` and return the status line and body.
    async fn get(&self, url: &str) -> std::result::Result<HttpResponse, BoxError>;
}

/// Default transport backed by a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with `reqwest` defaults.
    ///
    /// No timeout is configured at this layer; use
    /// [`ReqwestTransport::with_client`] to bring a client with timeouts,
    /// proxies or a custom redirect policy.
    pub fn new() -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    /// Wrap an already-configured `reqwest::Client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> std::result::Result<HttpResponse, BoxError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_owned),
            body,
        })
    }
}


#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Scriptable transport for tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{BoxError, HttpResponse, HttpTransport};

    /// Transport that replays queued responses and records requested URLs.
    ///
    /// With an empty queue it answers `200 OK` with an empty JSON object,
    /// so tests only script the responses they care about.
    #[derive(Default)]
    pub struct MockTransport {
        responses: Mutex<VecDeque<std::result::Result<HttpResponse, String>>>,
        requests: Mutex<Vec<String>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response for the next request.
        pub fn push_response(&self, response: HttpResponse) {
            self.responses.lock().unwrap().push_back(Ok(response));
        }

        /// Queue a status/reason/body triple for the next request.
        pub fn push_status(&self, status: u16, reason: Option<&str>, body: &str) {
            self.push_response(HttpResponse {
                status,
                reason: reason.map(str::to_owned),
                body: body.to_owned(),
            });
        }

        /// Queue a transport-level failure for the next request.
        pub fn push_error(&self, message: &str) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(message.to_owned()));
        }

        /// URLs requested so far, in order.
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(&self, url: &str) -> std::result::Result<HttpResponse, BoxError> {
            self.requests.lock().unwrap().push(url.to_owned());

            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(response)) => Ok(response),
                Some(Err(message)) => Err(message.into()),
                None => Ok(HttpResponse {
                    status: 200,
                    reason: Some("OK".to_owned()),
                    body: "{}".to_owned(),
                }),
            }
        }
    }
}
