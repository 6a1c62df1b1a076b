//! Remote HTTP sink
//!
//! Sends `{"message": text}` as JSON to a fixed endpoint. Delivery is
//! fire-and-forget: the request runs on a tokio task and its outcome is only
//! reported through tracing.

use reqwest::{Client, Method, Url};
use serde::Serialize;
use tokio::runtime::Handle;

use crate::error::{Error, Result};
use crate::formatter::{LineFormatter, MessageFormatter};
use crate::message::LogMessage;

use super::Sink;

/// Request body sent for every message
#[derive(Debug, Serialize)]
pub struct HttpPayload<'a> {
    pub message: &'a str,
}

/// Posts the raw text of each message to a remote endpoint
pub struct HttpSink {
    client: Client,
    url: Url,
    method: Method,
    runtime: Handle,
    formatter: LineFormatter,
}

impl HttpSink {
    /// Create a sink using the tokio runtime of the calling context
    pub fn new(url: &str, method: &str) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Self::with_runtime(url, method, runtime)
    }

    /// Create a sink that spawns its requests on `runtime`
    pub fn with_runtime(url: &str, method: &str, runtime: Handle) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::InvalidMethod(method.to_string()))?;

        Ok(Self {
            client: Client::new(),
            url,
            method,
            runtime,
            formatter: LineFormatter::new(),
        })
    }

    /// Use a preconfigured client (proxy, TLS or default header settings)
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }
}

impl Sink for HttpSink {
    fn name(&self) -> &'static str {
        "http"
    }

    fn formatter(&self) -> &dyn MessageFormatter {
        &self.formatter
    }

    fn emit(&self, message: &LogMessage) -> Result<()> {
        let payload = HttpPayload {
            message: message.text(),
        };
        let request = self
            .client
            .request(self.method.clone(), self.url.clone())
            .json(&payload)
            .build()?;

        let client = self.client.clone();
        self.runtime.spawn(async move {
            let url = request.url().clone();
            if let Err(e) = client.execute(request).await {
                tracing::debug!("HTTP log delivery to {} failed: {}", url, e);
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;
    use crate::message::CallSite;
    use axum::{extract::State, http::StatusCode, routing::any, Json, Router};
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::sync::mpsc;

    type Received = (String, serde_json::Value);

    async fn capture_handler(
        State(sender): State<mpsc::Sender<Received>>,
        method: axum::http::Method,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        let _ = sender.send((method.to_string(), body)).await;
        StatusCode::OK
    }

    async fn start_server() -> (SocketAddr, mpsc::Receiver<Received>) {
        let (tx, rx) = mpsc::channel(8);
        let app = Router::new()
            .route("/logs", any(capture_handler))
            .with_state(tx);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        (addr, rx)
    }

    fn direct_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    fn message(text: &str) -> LogMessage {
        LogMessage::at(text, LogLevel::Error, CallSite::new("src/api.rs", "call", 5))
    }

    #[tokio::test]
    async fn test_posts_message_as_json() {
        let (addr, mut rx) = start_server().await;
        let sink = HttpSink::new(&format!("http://{}/logs", addr), "post")
            .unwrap()
            .with_client(direct_client());
        assert_eq!(sink.method(), &Method::POST);

        sink.emit(&message("payment failed")).unwrap();

        let (method, body) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(method, "POST");
        assert_eq!(body, serde_json::json!({ "message": "payment failed" }));
    }

    #[tokio::test]
    async fn test_uses_configured_method() {
        let (addr, mut rx) = start_server().await;
        let sink = HttpSink::new(&format!("http://{}/logs", addr), "PUT")
            .unwrap()
            .with_client(direct_client());

        sink.emit(&message("hello")).unwrap();

        let (method, _) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(method, "PUT");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_does_not_fail_emit() {
        // Port 9 (discard) on localhost is normally closed
        let sink = HttpSink::new("http://127.0.0.1:9/logs", "POST").unwrap();
        assert!(sink.emit(&message("nobody listening")).is_ok());
    }

    #[test]
    fn test_requires_runtime() {
        assert!(matches!(
            HttpSink::new("http://127.0.0.1/logs", "POST"),
            Err(Error::NoRuntime)
        ));
    }

    #[tokio::test]
    async fn test_rejects_invalid_configuration() {
        assert!(matches!(
            HttpSink::new("not a url", "POST"),
            Err(Error::InvalidUrl { .. })
        ));
        assert!(matches!(
            HttpSink::new("http://127.0.0.1/logs", "BAD METHOD"),
            Err(Error::InvalidMethod(_))
        ));
    }
}
