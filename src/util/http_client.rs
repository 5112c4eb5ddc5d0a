use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use hyper::client::HttpConnector;
use hyper::header::USER_AGENT;
use hyper::{Body, Client, Request, Response, Uri};
use hyper_tls::HttpsConnector;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{FetchError, Result};

pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Caller-supplied settings for the HTTP transport. They are turned into a [RepoHttpClient] once
///  per download and never changed afterwards.
#[derive(Clone, Debug)]
pub struct ClientOptions {
    /// PEM file with an additional CA certificate to trust, e.g. for a repository behind a
    ///  company-internal certificate authority
    pub trust_anchor: Option<PathBuf>,
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}
impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            trust_anchor: None,
            request_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Issues GET requests against a Maven repository, treating every non-2xx status as an error.
///
/// Instances do HTTP connection caching internally, so one instance should be shared by all
///  requests of a download. Cloning is cheap and clones share the connection pool.
#[derive(Clone)]
pub struct RepoHttpClient {
    client: Client<HttpsConnector<HttpConnector>>,
    user_agent: String,
    request_timeout: Option<Duration>,
    cancel: CancellationToken,
}
impl RepoHttpClient {
    pub fn new(options: &ClientOptions) -> Result<RepoHttpClient> {
        let mut tls = native_tls::TlsConnector::builder();
        if let Some(path) = &options.trust_anchor {
            debug!("trusting CA certificate from {}", path.display());
            tls.add_root_certificate(load_trust_anchor(path)?);
        }
        let tls = tls.build()
            .map_err(|e| FetchError::Tls(e.to_string()))?;

        let mut http = HttpConnector::new();
        // plain http repositories are allowed, the TLS connector handles https
        http.enforce_http(false);

        Ok(RepoHttpClient {
            client: Client::builder()
                .build::<_, Body>(HttpsConnector::from((http, tokio_native_tls::TlsConnector::from(tls)))),
            user_agent: options.user_agent.clone(),
            request_timeout: options.request_timeout,
            cancel: CancellationToken::new(),
        })
    }

    /// All in-flight and future requests of this client (and its clones) fail with
    ///  [FetchError::Cancelled] once `cancel` is triggered.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> RepoHttpClient {
        self.cancel = cancel;
        self
    }

    /// Sends a GET request for `url`, returning the response if it has a success status. The
    ///  body is not read.
    pub async fn get(&self, url: &str) -> Result<Response<Body>> {
        let request = Request::builder()
            .method("GET")
            .uri(parse_uri(url)?)
            .header(USER_AGENT, self.user_agent.as_str())
            .body(Body::empty())
            .map_err(|e| FetchError::Transport { url: url.to_string(), message: e.to_string() })?;

        trace!("getting {:?}", request);

        let response = self.send(url, self.client.request(request))
            .await?;

        if !response.status().is_success() {
            debug!(url, status = response.status().as_u16(), "request failed");
            return Err(FetchError::UnexpectedStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    /// GET with the entire body read into memory - for small documents like metadata, POMs and
    ///  checksums
    pub async fn get_bytes(&self, url: &str) -> Result<Bytes> {
        let response = self.get(url).await?;
        let body = self.send(url, hyper::body::to_bytes(response.into_body()))
            .await?;
        trace!("read {} bytes from {}", body.len(), url);
        Ok(body)
    }

    /// Awaits a hyper future, bounded by the configured request timeout
    async fn send<T>(&self, url: &str, request: impl Future<Output = hyper::Result<T>>) -> Result<T> {
        self.bounded(url, async {
            request.await.map_err(|e| transport_error(url, &e))
        }).await
    }

    /// Awaits `operation`, failing with [FetchError::Transport] if it takes longer than the
    ///  configured request timeout and with [FetchError::Cancelled] on cancellation
    pub(crate) async fn bounded<T>(&self, url: &str, operation: impl Future<Output = Result<T>>) -> Result<T> {
        self.cancellable(url, async {
            match self.request_timeout {
                Some(limit) => tokio::time::timeout(limit, operation).await
                    .unwrap_or_else(|_| Err(FetchError::Transport {
                        url: url.to_string(),
                        message: format!("no response within {:?}", limit),
                    })),
                None => operation.await,
            }
        }).await
    }

    /// Races `operation` against this client's cancellation token
    async fn cancellable<T>(&self, url: &str, operation: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!(url, "cancelled");
                Err(FetchError::Cancelled { url: url.to_string() })
            }
            result = operation => result,
        }
    }
}

fn parse_uri(url: &str) -> Result<Uri> {
    Uri::try_from(url)
        .map_err(|_| FetchError::InvalidUrl { url: url.to_string() })
}

fn load_trust_anchor(path: &Path) -> Result<native_tls::Certificate> {
    let to_error = |message: String| FetchError::TrustAnchor { path: path.to_path_buf(), message };

    let pem = std::fs::read(path)
        .map_err(|e| to_error(e.to_string()))?;
    native_tls::Certificate::from_pem(&pem)
        .map_err(|e| to_error(e.to_string()))
}

/// hyper's top-level error messages are terse ("error trying to connect"), the cause chain has
///  the interesting part
fn transport_error(url: &str, e: &hyper::Error) -> FetchError {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    FetchError::Transport { url: url.to_string(), message }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client() -> RepoHttpClient {
        RepoHttpClient::new(&ClientOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn test_get_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a/b.txt"))
            .and(header("user-agent", DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client().get_bytes(&format!("{}/a/b.txt", server.uri())).await.unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn test_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/missing", server.uri());
        match client().get_bytes(&url).await {
            Err(FetchError::UnexpectedStatus { url: failed_url, status }) => {
                assert_eq!(failed_url, url);
                assert_eq!(status, 404);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = RepoHttpClient::new(&ClientOptions {
            request_timeout: Some(Duration::from_millis(100)),
            ..Default::default()
        }).unwrap();

        let result = client.get(&format!("{}/slow", server.uri())).await;
        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let result = client().get("http://127.0.0.1:1/x").await;
        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        let client = client().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        let result = client.get(&format!("{}/slow", server.uri())).await;
        assert!(matches!(result, Err(FetchError::Cancelled { .. })));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let result = client().get("http://exa mple.com/x").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[test]
    fn test_missing_trust_anchor() {
        let result = RepoHttpClient::new(&ClientOptions {
            trust_anchor: Some(PathBuf::from("/does/not/exist.pem")),
            ..Default::default()
        });
        assert!(matches!(result, Err(FetchError::TrustAnchor { .. })));
    }

    #[test]
    fn test_invalid_trust_anchor() {
        let dir = tempfile::tempdir().unwrap();
        let pem_path = dir.path().join("ca.pem");
        std::fs::write(&pem_path, "not a certificate").unwrap();

        let result = RepoHttpClient::new(&ClientOptions {
            trust_anchor: Some(pem_path),
            ..Default::default()
        });
        assert!(matches!(result, Err(FetchError::TrustAnchor { .. })));
    }
}
