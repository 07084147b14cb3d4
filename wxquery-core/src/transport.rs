use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

use crate::{
    error::TransportError,
    model::{QueryRequest, ResponseEnvelope},
};

/// Backend the dispatcher talks to.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// `POST /process_request` with `{ "query": ... }`.
    async fn process_request(&self, query: &str) -> Result<ResponseEnvelope, TransportError>;

    /// Link target for `GET /download_csv/{csv_id}`. Never fetched here.
    fn download_url(&self, csv_id: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base(base_url.into()),
            http: Client::new(),
        }
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url: normalize_base(base_url.into()), http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn process_request(&self, query: &str) -> Result<ResponseEnvelope, TransportError> {
        let url = self.endpoint("process_request");
        log::debug!("POST {url}");

        let res = self
            .http
            .post(&url)
            .json(&QueryRequest { query: query.to_string() })
            .send()
            .await?;

        // Error statuses still carry an `{ "error": ... }` envelope.
        let status = res.status();
        if !status.is_success() {
            log::warn!("{url} answered with status {status}");
        }

        let body = res.text().await?;
        let envelope: ResponseEnvelope = serde_json::from_str(&body).inspect_err(|_| {
            log::debug!("Unparseable response body: {}", truncate_body(&body));
        })?;

        Ok(envelope)
    }

    fn download_url(&self, csv_id: &str) -> String {
        self.endpoint(&format!("download_csv/{csv_id}"))
    }
}

fn normalize_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    /// Answers exactly one HTTP request with `status` and `body`, yielding
    /// the raw request it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request_complete(&request) {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    #[tokio::test]
    async fn posts_query_as_json_and_decodes_answer() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"llm_summary": "Dry.", "csv_id": "7", "weather_data": {"url": "u", "features": []}}"#,
        )
        .await;

        let envelope = HttpTransport::new(base).process_request("rain tomorrow?").await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("POST /process_request HTTP/1.1\r\n"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"query":"rain tomorrow?"}"#));
        assert_eq!(envelope.llm_summary.as_deref(), Some("Dry."));
        assert_eq!(envelope.csv_id.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn error_status_body_is_still_decoded() {
        let (base, _server) =
            serve_once("500 Internal Server Error", r#"{"error": "upstream timeout"}"#).await;

        let envelope = HttpTransport::new(base).process_request("q").await.unwrap();

        assert_eq!(envelope.error.as_deref(), Some("upstream timeout"));
    }

    #[tokio::test]
    async fn non_json_body_is_invalid_json() {
        let (base, _server) = serve_once("502 Bad Gateway", "<html>bad gateway</html>").await;

        let err = HttpTransport::new(base).process_request("q").await.unwrap_err();

        assert!(matches!(err, TransportError::InvalidJson(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HttpTransport::new(format!("http://{addr}"))
            .process_request("q")
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Request(_)));
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let t = HttpTransport::new("http://localhost:5000/");
        assert_eq!(t.base_url(), "http://localhost:5000");
        assert_eq!(t.endpoint("process_request"), "http://localhost:5000/process_request");
    }

    #[test]
    fn download_url_points_at_csv_endpoint() {
        let t = HttpTransport::new("http://localhost:5000");
        assert_eq!(t.download_url("abc"), "http://localhost:5000/download_csv/abc");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }

    #[test]
    fn query_request_wire_format() {
        let body = serde_json::to_string(&QueryRequest { query: "rain tomorrow?".into() }).unwrap();
        assert_eq!(body, r#"{"query":"rain tomorrow?"}"#);
    }
}
