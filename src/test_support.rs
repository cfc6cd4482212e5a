//! Loopback HTTP server used to exercise the real `reqwest` clients in unit tests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// Accepts a single connection, answers it with a canned response and hands back
/// the raw request it received.
pub(crate) struct CannedServer {
    base_url: String,
    handle: JoinHandle<String>,
}

impl CannedServer {
    /// Starts listening on an ephemeral loopback port. `status` is the status
    /// line without the protocol, e.g. `"404 Not Found"`.
    pub(crate) fn start(status: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
        let base_url = format!("http://{}", listener.local_addr().expect("listener address"));
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept connection");
            let mut reader = BufReader::new(stream);
            let mut request = String::new();
            let mut content_length = 0;

            loop {
                let mut line = String::new();
                let read = reader.read_line(&mut line).expect("read request head");
                if let Some((name, value)) = line.split_once(':') {
                    if name.trim().eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().expect("numeric content-length");
                    }
                }
                request.push_str(&line);
                if read == 0 || line == "\r\n" {
                    break;
                }
            }

            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).expect("read request body");
            request.push_str(&String::from_utf8_lossy(&body));

            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).expect("write response");
            stream.flush().expect("flush response");
            request
        });

        Self { base_url, handle }
    }

    /// `http://127.0.0.1:<port>` of the listener.
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits for the exchange to finish and returns the raw request text.
    pub(crate) fn request(self) -> String {
        self.handle.join().expect("server thread finished")
    }
}

/// Blocking client that ignores proxy settings from the environment.
pub(crate) fn direct_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .no_proxy()
        .build()
        .expect("client builds")
}
