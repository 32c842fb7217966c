//! The transport wrapper: one configured HTTP client plus its interceptors.
//!
//! # Design
//! `Transport` is built once and never mutated afterwards. It is an `Arc`
//! around the reqwest client, the configuration, the notifier, the request
//! interceptor and the soft-failure policy, so cloning it into many concurrent
//! calls is cheap.
//!
//! `send` runs the same pipeline for every request:
//!
//! 1. request interceptor; an `Err` is returned as-is, nothing is sent
//! 2. base URL + path, encoded into a `Url`; a path with a `.` or `..`
//!    segment (plain or percent-encoded) is refused, since URL normalization
//!    would send it to a different endpoint
//! 3. dispatch, bounded by the configured timeout
//! 4. non-2xx, timeout and connection errors: `notifier.error` with the
//!    generic message, then the original error goes back to the caller
//! 5. 2xx: if the body signals a soft failure, `notifier.warn` with its
//!    message; the response is returned either way
//!
//! Nothing here reorders, retries or deduplicates requests.

use std::fmt;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use reqwest::multipart;
use tracing::{debug, instrument, Span};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::envelope::SoftFailurePolicy;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, MultipartForm, RequestBody};
use crate::notifier::{Notifier, TracingNotifier, NETWORK_ERROR_MESSAGE};

/// Hook run on every outgoing request before it is dispatched.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: HttpRequest) -> Result<HttpRequest, ApiError>;
}

/// Interceptor that forwards the request unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl RequestInterceptor for PassThrough {
    fn intercept(&self, request: HttpRequest) -> Result<HttpRequest, ApiError> {
        Ok(request)
    }
}

impl<F> RequestInterceptor for F
where
    F: Fn(HttpRequest) -> Result<HttpRequest, ApiError> + Send + Sync,
{
    fn intercept(&self, request: HttpRequest) -> Result<HttpRequest, ApiError> {
        self(request)
    }
}

pub struct TransportBuilder {
    config: ClientConfig,
    notifier: Arc<dyn Notifier>,
    interceptor: Arc<dyn RequestInterceptor>,
    soft_failure: SoftFailurePolicy,
}

impl TransportBuilder {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            notifier: Arc::new(TracingNotifier),
            interceptor: Arc::new(PassThrough),
            soft_failure: SoftFailurePolicy::default(),
        }
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptor = Arc::new(interceptor);
        self
    }

    pub fn soft_failure(mut self, policy: SoftFailurePolicy) -> Self {
        self.soft_failure = policy;
        self
    }

    /// Validates the base URL and builds the underlying HTTP client.
    pub fn build(self) -> Result<Transport, ApiError> {
        Url::parse(self.config.base_url())
            .map_err(|e| ApiError::Config(format!("base URL {}: {e}", self.config.base_url())))?;

        let http = reqwest::Client::builder()
            .timeout(self.config.timeout())
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        debug!(
            base_url = self.config.base_url(),
            timeout_ms = self.config.timeout_ms(),
            "transport configured"
        );

        Ok(Transport {
            inner: Arc::new(Inner {
                http,
                config: self.config,
                notifier: self.notifier,
                interceptor: self.interceptor,
                soft_failure: self.soft_failure,
            }),
        })
    }
}

/// Shared HTTP client with fixed base URL, timeout and response handling.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    config: ClientConfig,
    notifier: Arc<dyn Notifier>,
    interceptor: Arc<dyn RequestInterceptor>,
    soft_failure: SoftFailurePolicy,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.inner.config.base_url())
            .field("timeout_ms", &self.inner.config.timeout_ms())
            .field("soft_failure", &self.inner.soft_failure)
            .finish_non_exhaustive()
    }
}

impl Transport {
    pub fn builder(config: ClientConfig) -> TransportBuilder {
        TransportBuilder::new(config)
    }

    /// Transport with the given notifier, pass-through interceptor and the
    /// default soft-failure policy.
    pub fn new(config: ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        Self::builder(config).notifier(notifier).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn soft_failure_policy(&self) -> &SoftFailurePolicy {
        &self.inner.soft_failure
    }

    pub async fn get(&self, path: impl Into<String>) -> Result<HttpResponse, ApiError> {
        self.send(HttpRequest::get(path)).await
    }

    pub async fn post(
        &self,
        path: impl Into<String>,
        body: RequestBody,
    ) -> Result<HttpResponse, ApiError> {
        self.send(HttpRequest::post(path, body)).await
    }

    #[instrument(
        name = "http_request",
        skip(self, request),
        fields(
            request_id = %Uuid::new_v4(),
            method = %request.method,
            path = %request.path,
            status = tracing::field::Empty,
        )
    )]
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let request = self.inner.interceptor.intercept(request)?;
        let url = self.url_for(&request.path)?;
        let builder = self.request_builder(url, request)?;

        match self.dispatch(builder).await {
            Ok(response) => {
                Span::current().record("status", response.status);
                if let Some(message) = self.inner.soft_failure.inspect(&response.body) {
                    debug!(%message, "soft failure");
                    self.inner.notifier.warn(&message);
                }
                Ok(response)
            }
            Err(err) => {
                if let Some(status) = err.status() {
                    Span::current().record("status", status);
                }
                if err.is_transport() {
                    debug!(error = %err, "request failed");
                    self.inner.notifier.error(NETWORK_ERROR_MESSAGE);
                }
                Err(err)
            }
        }
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        let raw = if path.starts_with('/') {
            format!("{}{path}", self.inner.config.base_url())
        } else {
            format!("{}/{path}", self.inner.config.base_url())
        };
        if let Some(segment) = path.split('/').find(|s| is_dot_segment(s)) {
            return Err(ApiError::InvalidUrl {
                url: raw,
                reason: format!("dot segment {segment:?} would leave its place in the path"),
            });
        }
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })
    }

    fn request_builder(
        &self,
        url: Url,
        request: HttpRequest,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let mut builder = self.inner.http.request(request.method.to_reqwest(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(multipart_form(form)?),
        };
        Ok(builder)
    }

    async fn dispatch(&self, builder: reqwest::RequestBuilder) -> Result<HttpResponse, ApiError> {
        let response = builder.send().await.map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        if !(200..300).contains(&status) {
            return Err(ApiError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(HttpResponse { status, headers, body })
    }

    fn classify(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                timeout_ms: self.inner.config.timeout_ms(),
            }
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

fn is_dot_segment(segment: &str) -> bool {
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    decoded == "." || decoded == ".."
}

fn multipart_form(form: MultipartForm) -> Result<multipart::Form, ApiError> {
    let mut out = multipart::Form::new();
    for (name, value) in form.fields {
        out = out.text(name, value);
    }
    for file in form.files {
        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| ApiError::InvalidRequest(format!("part {}: {e}", file.field)))?;
        out = out.part(file.field, part);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::http::{FilePart, HttpMethod};
    use crate::notifier::RecordingNotifier;

    fn transport(base_url: &str) -> (Transport, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let transport = Transport::new(ClientConfig::new(base_url), notifier.clone()).unwrap();
        (transport, notifier)
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = Transport::builder(ClientConfig::new("not a url")).build().unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn url_keeps_base_path_and_encoding() {
        let (transport, _) = transport("http://127.0.0.1:5000/api/");
        let url = transport.url_for("/gdp/predict/Hong%20Kong%2FMacau").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/gdp/predict/Hong%20Kong%2FMacau");

        let url = transport.url_for("spatial/available-years").unwrap();
        assert_eq!(url.path(), "/api/spatial/available-years");
    }

    #[test]
    fn url_encodes_non_ascii_table_names() {
        let (transport, _) = transport("http://127.0.0.1:5000/api");
        let url = transport.url_for("/人口数据").unwrap();
        assert_eq!(url.path(), "/api/%E4%BA%BA%E5%8F%A3%E6%95%B0%E6%8D%AE");
    }

    #[test]
    fn dot_segments_are_refused() {
        let (transport, _) = transport("http://127.0.0.1:5000/api");
        for path in [
            "/gdp/historical/%2E%2E",
            "/gdp/historical/%2e",
            "/gdp/historical/..",
            "/gdp/./metrics/x",
        ] {
            let err = transport.url_for(path).unwrap_err();
            assert!(matches!(err, ApiError::InvalidUrl { .. }), "{path}: {err:?}");
        }

        let url = transport.url_for("/gdp/historical/...").unwrap();
        assert_eq!(url.path(), "/api/gdp/historical/...");
        let url = transport.url_for("/gdp/historical/a.b").unwrap();
        assert_eq!(url.path(), "/api/gdp/historical/a.b");
    }

    #[test]
    fn multipart_rejects_bad_content_type() {
        let form = MultipartForm::new().file(FilePart {
            field: "gdp".into(),
            file_name: "gdp.csv".into(),
            content_type: "not a mime".into(),
            bytes: Bytes::from_static(b"a,b\n"),
        });
        let err = multipart_form(form).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn interceptor_error_is_returned_without_notification() {
        let notifier = Arc::new(RecordingNotifier::new());
        let transport = Transport::builder(ClientConfig::new("http://127.0.0.1:9"))
            .notifier(notifier.clone())
            .interceptor(|_req: HttpRequest| -> Result<HttpRequest, ApiError> {
                Err(ApiError::Interceptor("token missing".into()))
            })
            .build()
            .unwrap();

        let err = transport.get("/spatial/available-years").await.unwrap_err();
        assert!(matches!(err, ApiError::Interceptor(ref m) if m == "token missing"));
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn connection_refused_notifies_once() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let (transport, notifier) = transport(&format!("http://127.0.0.1:{port}/api"));

        let err = transport.get("/spatial/available-years").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(notifier.errors(), vec![NETWORK_ERROR_MESSAGE]);
        assert!(notifier.warnings().is_empty());
    }

    #[test]
    fn debug_shows_configuration() {
        let (transport, _) = transport("http://127.0.0.1:5000/api");
        let rendered = format!("{transport:?}");
        assert!(rendered.contains("http://127.0.0.1:5000/api"));
        assert!(rendered.contains("10000"));
        assert_eq!(HttpMethod::Get.to_reqwest(), reqwest::Method::GET);
    }
}
