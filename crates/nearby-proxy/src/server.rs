//! Minimal HTTP/1.1 responder for the proxy endpoint
//!
//! One endpoint, one worker: requests are handled sequentially on a
//! background thread with a non-blocking accept loop and an mpsc shutdown
//! channel. The request handling itself is a pure function over the request
//! line and a [`NearbySearch`] implementation, so the whole contract is
//! unit-testable without sockets.

use crate::upstream::NearbySearch;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

/// Path of the single proxy endpoint
pub const PLACES_PATH: &str = "/api/places";

/// A response ready to be written back to the client
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json(status: u16, reason: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            reason,
            body: body.into(),
        }
    }

    /// Serialize the status line, headers and body to wire format
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Cache-Control: no-cache\r\n\
             \r\n",
            self.status,
            self.reason,
            self.body.len()
        );

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}

/// Answer one request against the places endpoint contract
///
/// - `GET /api/places?lat=<v>&lng=<v>` relays the upstream search result;
/// - a missing or empty coordinate parameter is a 400 with
///   `{"error":"Missing coordinates"}`;
/// - any upstream failure is a 500 with
///   `{"error":"Failed to fetch locations"}`;
/// - unknown paths are 404, other methods on the endpoint 405.
pub fn handle_request(method: &str, target: &str, upstream: &dyn NearbySearch) -> HttpResponse {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };

    if path != PLACES_PATH {
        return HttpResponse::json(404, "Not Found", r#"{"error":"Not found"}"#);
    }
    if method != "GET" {
        return HttpResponse::json(405, "Method Not Allowed", r#"{"error":"Method not allowed"}"#);
    }

    let lat = query_param(query, "lat");
    let lng = query_param(query, "lng");
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return HttpResponse::json(400, "Bad Request", r#"{"error":"Missing coordinates"}"#);
    };

    match upstream.nearby(lat, lng) {
        Ok(body) => HttpResponse::json(200, "OK", body),
        Err(err) => {
            tracing::error!("Nearby search failed: {err}");
            HttpResponse::json(
                500,
                "Internal Server Error",
                r#"{"error":"Failed to fetch locations"}"#,
            )
        }
    }
}

/// Find a query parameter, treating an empty value as absent
///
/// Coordinate values are plain decimal numbers, so no percent-decoding is
/// applied.
fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Handle to a running proxy server thread
///
/// Dropping the handle signals the serve loop to stop and joins the thread.
pub struct ProxyServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl ProxyServer {
    /// Bind `bind_addr` and serve the places endpoint on a background thread
    ///
    /// Bind to port 0 to let the OS pick a free port; the effective address
    /// is available via [`ProxyServer::addr`].
    pub fn spawn(bind_addr: &str, upstream: Arc<dyn NearbySearch>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(bind_addr)?;
        let addr = listener.local_addr()?;
        // Non-blocking so the loop can check for shutdown between accepts
        listener.set_nonblocking(true)?;

        let (shutdown_tx, shutdown_rx) = mpsc::channel();
        let thread = std::thread::spawn(move || serve_loop(listener, shutdown_rx, upstream));

        tracing::info!("✓ Location proxy listening on {addr}");

        Ok(Self {
            addr,
            shutdown_tx,
            thread: Some(thread),
        })
    }

    /// The address the server actually bound
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL clients should target
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for ProxyServer {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn serve_loop(
    listener: TcpListener,
    shutdown_rx: mpsc::Receiver<()>,
    upstream: Arc<dyn NearbySearch>,
) {
    loop {
        // Check for shutdown signal
        if shutdown_rx.try_recv().is_ok() {
            tracing::info!("Shutting down location proxy");
            break;
        }

        match listener.accept() {
            Ok((mut stream, addr)) => {
                tracing::debug!("Connection from {addr}");
                handle_connection(&mut stream, upstream.as_ref());
            }
            Err(ref err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                // No connection, sleep a bit
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(err) => {
                tracing::warn!("Failed to accept connection: {err}");
            }
        }
    }
}

fn handle_connection(stream: &mut TcpStream, upstream: &dyn NearbySearch) {
    // The accepted stream must not stay non-blocking, and a silent client
    // must not stall the single-threaded loop forever.
    stream.set_nonblocking(false).ok();
    stream.set_read_timeout(Some(Duration::from_secs(2))).ok();

    let mut buffer = [0u8; 1024];
    let bytes_read = stream.read(&mut buffer).unwrap_or(0);
    let head = String::from_utf8_lossy(&buffer[..bytes_read]);

    let response = match parse_request_line(&head) {
        Some((method, target)) => handle_request(method, target, upstream),
        None => HttpResponse::json(400, "Bad Request", r#"{"error":"Bad request"}"#),
    };

    if let Err(err) = stream.write_all(&response.to_bytes()) {
        tracing::warn!("Failed to write response: {err}");
        return;
    }
    if let Err(err) = stream.flush() {
        tracing::warn!("Failed to flush stream: {err}");
    }
}

/// Split the request head into method and target
fn parse_request_line(head: &str) -> Option<(&str, &str)> {
    let request_line = head.lines().next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    Some((method, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamError;
    use std::sync::Mutex;

    /// Scripted upstream that records the coordinates it was asked about
    struct StubSearch {
        outcome: std::result::Result<String, ()>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl StubSearch {
        fn ok(body: &str) -> Self {
            Self {
                outcome: Ok(body.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                outcome: Err(()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl NearbySearch for StubSearch {
        fn nearby(&self, lat: &str, lng: &str) -> Result<String, UpstreamError> {
            self.calls
                .lock()
                .unwrap()
                .push((lat.to_string(), lng.to_string()));
            match &self.outcome {
                Ok(body) => Ok(body.clone()),
                Err(()) => Err(UpstreamError::Status(reqwest::StatusCode::BAD_GATEWAY)),
            }
        }
    }

    #[test]
    fn test_missing_lat_is_400_with_exact_body() {
        let stub = StubSearch::ok("[]");
        let response = handle_request("GET", "/api/places?lng=72.8777", &stub);

        assert_eq!(response.status, 400);
        assert_eq!(response.body, r#"{"error":"Missing coordinates"}"#);
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn test_missing_lng_is_400() {
        let stub = StubSearch::ok("[]");
        let response = handle_request("GET", "/api/places?lat=19.0760", &stub);
        assert_eq!(response.status, 400);
        assert_eq!(response.body, r#"{"error":"Missing coordinates"}"#);
    }

    #[test]
    fn test_no_query_at_all_is_400() {
        let stub = StubSearch::ok("[]");
        let response = handle_request("GET", "/api/places", &stub);
        assert_eq!(response.status, 400);
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let stub = StubSearch::ok("[]");
        let response = handle_request("GET", "/api/places?lat=&lng=72.8777", &stub);
        assert_eq!(response.status, 400);
        assert_eq!(response.body, r#"{"error":"Missing coordinates"}"#);
    }

    #[test]
    fn test_success_relays_raw_body() {
        let body = r#"[{"name":"St. Mary's School","geometry":{"location":{"lat":18.969,"lng":72.8397}}}]"#;
        let stub = StubSearch::ok(body);
        let response = handle_request("GET", "/api/places?lat=19.0760&lng=72.8777", &stub);

        assert_eq!(response.status, 200);
        assert_eq!(response.body, body);
        assert_eq!(
            stub.calls(),
            vec![("19.0760".to_string(), "72.8777".to_string())]
        );
    }

    #[test]
    fn test_reversed_parameter_order_parses() {
        let stub = StubSearch::ok("[]");
        let response = handle_request("GET", "/api/places?lng=72.8777&lat=19.0760", &stub);

        assert_eq!(response.status, 200);
        assert_eq!(
            stub.calls(),
            vec![("19.0760".to_string(), "72.8777".to_string())]
        );
    }

    #[test]
    fn test_upstream_failure_is_500_with_exact_body() {
        let stub = StubSearch::failing();
        let response = handle_request("GET", "/api/places?lat=19.0760&lng=72.8777", &stub);

        assert_eq!(response.status, 500);
        assert_eq!(response.body, r#"{"error":"Failed to fetch locations"}"#);
    }

    #[test]
    fn test_unknown_path_is_404() {
        let stub = StubSearch::ok("[]");
        let response = handle_request("GET", "/api/health", &stub);
        assert_eq!(response.status, 404);
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn test_non_get_is_405() {
        let stub = StubSearch::ok("[]");
        let response = handle_request("POST", "/api/places?lat=1&lng=2", &stub);
        assert_eq!(response.status, 405);
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn test_response_wire_format() {
        let response = HttpResponse::json(400, "Bad Request", r#"{"error":"Missing coordinates"}"#);
        let bytes = response.to_bytes();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(text.contains("Content-Type: application/json\r\n"));
        assert!(text.contains("Content-Length: 31\r\n"));
        assert!(text.ends_with("\r\n\r\n{\"error\":\"Missing coordinates\"}"));
    }

    #[test]
    fn test_loopback_round_trip() {
        let stub = Arc::new(StubSearch::ok(r#"[{"name":"A"}]"#));
        let server = ProxyServer::spawn("127.0.0.1:0", stub).unwrap();

        let mut stream = TcpStream::connect(server.addr()).unwrap();
        stream
            .write_all(b"GET /api/places?lat=19.0760&lng=72.8777 HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with(r#"[{"name":"A"}]"#));
    }
}
