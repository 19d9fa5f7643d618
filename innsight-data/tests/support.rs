//! One-shot HTTP server for exercising the routing client end to end.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// Request captured by [`OneShotServer`].
#[derive(Debug, Default, Clone)]
pub struct CapturedRequest {
    /// Request line, e.g. `POST /isochrones/driving-car HTTP/1.1`.
    pub request_line: String,
    /// Header lines, lower-cased names.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: String,
}

impl CapturedRequest {
    /// Value of the first header called `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Server answering exactly one request with a canned response.
pub struct OneShotServer {
    /// Base URL the server listens on.
    pub base_url: String,
    handle: JoinHandle<CapturedRequest>,
}

impl OneShotServer {
    /// Bind to an ephemeral port and answer with `status` and `body`.
    pub fn respond(status: u16, reason: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local address");
        let response = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept connection");
            let captured = read_request(&mut BufReader::new(&mut stream));
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            stream.flush().expect("flush response");
            captured
        });
        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    /// Wait for the request to be served and return it.
    pub fn captured(self) -> CapturedRequest {
        self.handle.join().expect("server thread panicked")
    }
}

fn read_request(reader: &mut impl BufRead) -> CapturedRequest {
    let mut captured = CapturedRequest::default();
    let mut line = String::new();
    reader.read_line(&mut line).expect("read request line");
    captured.request_line = line.trim_end().to_owned();

    loop {
        line.clear();
        reader.read_line(&mut line).expect("read header");
        let header = line.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            captured
                .headers
                .push((name.trim().to_ascii_lowercase(), value.trim().to_owned()));
        }
    }

    let length = captured
        .header("content-length")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_default();
    let mut body = vec![0; length];
    reader.read_exact(&mut body).expect("read body");
    captured.body = String::from_utf8(body).expect("utf-8 body");
    captured
}
