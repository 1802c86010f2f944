//! Minimal HTTP/1.1 server that replays a script of responses for integration tests.
//!
//! The n-th connection gets the n-th scripted response; once the script runs
//! out, the last entry repeats. Every connection is closed after one response.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Scripted {
    /// Status line after the protocol, e.g. "503 Service Unavailable".
    pub status: &'static str,
    pub body: String,
    /// Sleep before answering (simulates a slow backend).
    pub delay: Duration,
}

impl Scripted {
    pub fn new(status: &'static str, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Handle to a running stub server.
pub struct StubServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl StubServer {
    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(script: Vec<Scripted>) -> StubServer {
    assert!(!script.is_empty(), "script must not be empty");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let script = Arc::new(script);
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_srv = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let n = hits_srv.fetch_add(1, Ordering::SeqCst);
            let entry = script[n.min(script.len() - 1)].clone();
            thread::spawn(move || handle(stream, entry));
        }
    });
    StubServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        hits,
    }
}

/// A base URL nothing listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn handle(mut stream: std::net::TcpStream, entry: Scripted) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    if !matches!(stream.read(&mut buf), Ok(n) if n > 0) {
        return;
    }
    if !entry.delay.is_zero() {
        thread::sleep(entry.delay);
    }
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        entry.status,
        entry.body.len(),
        entry.body
    );
    let _ = stream.write_all(response.as_bytes());
}
