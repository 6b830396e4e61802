//! Blocking HTTP transport for Lutrabox submissions.
//!
//! Sends a [`FormPayload`] as one `multipart/form-data` POST and maps the
//! response onto a [`TransferOutcome`]: the body for a success status, the
//! status code and reason phrase otherwise. Requests that never got a
//! response report status `0`.

mod error;
mod multipart;

use std::time::Duration;

use lutrabox_widgets::{FormPayload, TransferError, TransferOutcome, Transport};
use tracing::{info, warn};
use ureq::Agent;

pub use error::ClientError;
pub use multipart::MultipartForm;

/// Reason used when a non-success status has no canonical phrase.
const UNKNOWN_STATUS_REASON: &str = "HTTP error";

/// Create an agent with a whole-request timeout that reports HTTP error
/// statuses as responses.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// [`Transport`] posting to a fixed endpoint with `ureq`.
pub struct HttpTransport {
    agent: Agent,
    url: String,
}

impl HttpTransport {
    /// Create a transport for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `url` is not an absolute
    /// `http` or `https` URL.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let invalid = |reason: &str| ClientError::InvalidUrl {
            url: url.to_owned(),
            reason: reason.to_owned(),
        };
        let uri: ureq::http::Uri = url.parse().map_err(|_| invalid("not a valid URI"))?;
        match uri.scheme_str() {
            Some("http" | "https") => {}
            _ => return Err(invalid("scheme must be http or https")),
        }
        if uri.host().is_none() {
            return Err(invalid("missing host"));
        }

        Ok(Self {
            agent: create_agent(timeout),
            url: url.to_owned(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn submit(&self, payload: &FormPayload) -> TransferOutcome {
        let form = MultipartForm::encode(payload);
        info!(url = %self.url, fields = payload.len(), "Posting form");

        let response = self
            .agent
            .post(&self.url)
            .header("Content-Type", &form.content_type())
            .header("Accept", "text/plain")
            .send(form.body())
            .map_err(|e| {
                warn!(url = %self.url, "Request failed: {e}");
                TransferError::new(0, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or(UNKNOWN_STATUS_REASON);
            warn!(status = status.as_u16(), reason, "Endpoint returned error status");
            return Err(TransferError::new(status.as_u16(), reason));
        }

        let mut body = response.into_body();
        body.read_to_string()
            .map_err(|e| TransferError::new(status.as_u16(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve one request with a canned response and hand back the raw request.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/lutra/expand", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            tx.send(request).unwrap();
        });

        (url, rx)
    }

    fn read_request(stream: &mut impl Read) -> String {
        let mut data = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&data);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    fn payload() -> FormPayload {
        let mut payload = FormPayload::new();
        payload.push("input", "ex:T(ex:a) .");
        payload.push("mode", "expand");
        payload.push("prefixes", "@prefix ex: <http://example.com/ns#> .");
        payload
    }

    #[test]
    fn test_success_returns_body() {
        let (url, rx) = serve_once("200 OK", "ex:a a ex:T .");
        let transport = HttpTransport::new(&url, Duration::from_secs(5)).unwrap();

        assert_eq!(transport.submit(&payload()), Ok("ex:a a ex:T .".to_owned()));

        let request = rx.recv().unwrap();
        assert!(request.starts_with("POST /lutra/expand HTTP/1.1\r\n"));
        assert!(request.contains("multipart/form-data; boundary=----LutraboxFormBoundary"));
        assert!(request.contains("name=\"mode\"\r\n\r\nexpand\r\n"));
        assert!(request.contains("name=\"prefixes\"\r\n\r\n@prefix ex: <http://example.com/ns#> .\r\n"));
    }

    #[test]
    fn test_error_status_maps_to_reason() {
        let (url, _rx) = serve_once("500 Internal Server Error", "stack trace");
        let transport = HttpTransport::new(&url, Duration::from_secs(5)).unwrap();

        let err = transport.submit(&payload()).unwrap_err();
        assert_eq!(err, TransferError::new(500, "Internal Server Error"));
        assert_eq!(err.to_string(), "Error: 500\nInternal Server Error");
    }

    #[test]
    fn test_connection_refused_reports_status_zero() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/lutra/expand", listener.local_addr().unwrap());
        drop(listener);

        let transport = HttpTransport::new(&url, Duration::from_secs(5)).unwrap();
        let err = transport.submit(&payload()).unwrap_err();
        assert_eq!(err.status, 0);
        assert!(!err.message.trim().is_empty());
    }

    #[test]
    fn test_rejects_invalid_urls() {
        for url in ["sws.ifi.uio.no/lutra", "ftp://example.com/x", "not a url"] {
            assert!(
                matches!(
                    HttpTransport::new(url, Duration::from_secs(1)),
                    Err(ClientError::InvalidUrl { .. })
                ),
                "{url} accepted"
            );
        }
    }
}
