// crates/infohub-clients/tests/common/mod.rs
// ============================================================================
// Module: Client Test Support
// Description: One-shot HTTP servers for adapter tests.
// Purpose: Capture outbound requests and reply with canned responses.
// Dependencies: tiny_http
// ============================================================================

#![allow(dead_code, reason = "Helpers are shared across test binaries.")]

use std::io::Read;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use infohub_clients::HttpClientConfig;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// Request as observed by the fake service.
#[derive(Debug, Clone)]
pub struct Captured {
    /// HTTP method.
    pub method: String,
    /// Request path including query.
    pub url: String,
    /// Lowercased header names with values.
    pub headers: Vec<(String, String)>,
    /// Raw request body.
    pub body: Vec<u8>,
}

impl Captured {
    /// Returns the first value of `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Canned reply.
pub struct Reply {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl Reply {
    /// Reply with a status and text body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Fake service answering a fixed sequence of requests.
pub struct OneShot {
    /// Base address of the server.
    pub addr: String,
    /// Receives the captured request.
    captured: mpsc::Receiver<Captured>,
}

impl OneShot {
    /// Starts a server that answers one request with `reply`.
    pub fn start(reply: Reply) -> Self {
        Self::script(vec![reply])
    }

    /// Starts a server that answers one request per reply, in order.
    pub fn script(replies: Vec<Reply>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = format!("http://{}", server.server_addr().to_ip().unwrap());
        let (sender, captured) = mpsc::channel();
        thread::spawn(move || {
            for reply in replies {
                let Ok(Some(request)) = server.recv_timeout(Duration::from_secs(5)) else {
                    return;
                };
                answer(request, reply, &sender);
            }
        });
        Self { addr, captured }
    }

    /// Client configuration pointed at this server.
    pub fn config(&self) -> HttpClientConfig {
        let mut config = HttpClientConfig::new(self.addr.clone());
        config.timeout_ms = 5_000;
        config
    }

    /// Returns the captured request, if one arrived.
    pub fn request(&self) -> Option<Captured> {
        self.captured.recv_timeout(Duration::from_secs(5)).ok()
    }

    /// Returns true when no request arrived within a short window.
    pub fn untouched(&self) -> bool {
        self.captured.recv_timeout(Duration::from_millis(200)).is_err()
    }
}

/// Captures `request` and responds with `reply`.
fn answer(mut request: tiny_http::Request, reply: Reply, sender: &mpsc::Sender<Captured>) {
    let mut body = Vec::new();
    let _ = request.as_reader().read_to_end(&mut body);
    let headers = request
        .headers()
        .iter()
        .map(|header| (header.field.as_str().as_str().to_ascii_lowercase(), header.value.to_string()))
        .collect();
    let _ = sender.send(Captured {
        method: request.method().as_str().to_string(),
        url: request.url().to_string(),
        headers,
        body,
    });
    let content_type = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
    let response =
        Response::from_data(reply.body).with_status_code(reply.status).with_header(content_type);
    let _ = request.respond(response);
}
