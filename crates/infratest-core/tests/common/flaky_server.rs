//! Minimal HTTP/1.1 server for probe tests.
//!
//! Answers the first `failures` requests with a configurable error status,
//! then serves a fixed body with 200 OK. Counts every request it handles.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct FlakyServerOptions {
    /// Number of requests answered with `failure_status` before succeeding.
    pub failures: u32,
    pub failure_status: u32,
}

impl Default for FlakyServerOptions {
    fn default() -> Self {
        Self {
            failures: 0,
            failure_status: 503,
        }
    }
}

pub struct FlakyServer {
    pub url: String,
    hits: Arc<AtomicU32>,
}

impl FlakyServer {
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. The server runs until the process exits.
pub fn start(body: &str, opts: FlakyServerOptions) -> FlakyServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body.to_string());
    let hits = Arc::new(AtomicU32::new(0));
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let n = server_hits.fetch_add(1, Ordering::SeqCst) + 1;
            handle(stream, &body, n, opts);
        }
    });
    FlakyServer {
        url: format!("http://127.0.0.1:{}/", port),
        hits,
    }
}

fn handle(mut stream: std::net::TcpStream, body: &str, request_no: u32, opts: FlakyServerOptions) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }
    let (status_line, payload) = if request_no <= opts.failures {
        (format!("{} Service Unavailable", opts.failure_status), "not yet")
    } else {
        ("200 OK".to_string(), body)
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        payload.len(),
        payload
    );
    let _ = stream.write_all(response.as_bytes());
}
