#![allow(dead_code)]
//! Shared test helpers: an in-process mock server speaking the
//! terminator-delimited wire protocol over localhost TCP, plus recording
//! event handlers.

use std::net::SocketAddr;
use std::sync::atomic::AtomicU32;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use vndb_link::{ApiStatus, Endpoint, EventHandlers, Severity};

pub const TERMINATOR: u8 = 0x04;

/// What the mock server does with a received command.
pub enum MockAction {
    /// Reply with the given message (terminator appended).
    Reply(String),
    /// Reply in two chunks with a pause, terminator at the very end.
    ReplySplit(String),
    /// Drop the connection without replying.
    Close,
}

type Handler = Arc<dyn Fn(&str) -> MockAction + Send + Sync>;

/// Mock API server. Accepts connections sequentially (the client under test
/// holds one connection at a time) and routes every received command through
/// the supplied handler.
pub struct MockServer {
    addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl MockServer {
    pub async fn spawn(handler: impl Fn(&str) -> MockAction + Send + Sync + 'static) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server addr");
        let handler: Handler = Arc::new(handler);
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                handle_connection(stream, handler.clone()).await;
            }
        });
        Self { addr, handle }
    }

    /// Endpoint whose TLS port is unreachable, so the client falls back to
    /// the plaintext port served by this mock.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("127.0.0.1", 1, self.addr.port())
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(mut stream: TcpStream, handler: Handler) {
    loop {
        let mut command = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match stream.read(&mut byte).await {
                Ok(0) | Err(_) => return,
                Ok(_) if byte[0] == TERMINATOR => break,
                Ok(_) => command.push(byte[0]),
            }
        }
        let command = String::from_utf8_lossy(&command).to_string();

        match handler(&command) {
            MockAction::Reply(text) => {
                let mut bytes = text.into_bytes();
                bytes.push(TERMINATOR);
                if stream.write_all(&bytes).await.is_err() {
                    return;
                }
            }
            MockAction::ReplySplit(text) => {
                let bytes = text.into_bytes();
                let mid = bytes.len() / 2;
                if stream.write_all(&bytes[..mid]).await.is_err() {
                    return;
                }
                let _ = stream.flush().await;
                tokio::time::sleep(Duration::from_millis(30)).await;
                let mut rest = bytes[mid..].to_vec();
                rest.push(TERMINATOR);
                if stream.write_all(&rest).await.is_err() {
                    return;
                }
            }
            MockAction::Close => {
                let _ = stream.shutdown().await;
                return;
            }
        }
    }
}

/// Event sinks shared with recording handlers.
#[derive(Clone, Default)]
pub struct Recorded {
    pub texts: Arc<Mutex<Vec<(String, Severity)>>>,
    pub statuses: Arc<Mutex<Vec<ApiStatus>>>,
    pub sent: Arc<Mutex<Vec<String>>>,
    pub received: Arc<Mutex<Vec<String>>>,
    pub refreshes: Arc<AtomicU32>,
}

impl Recorded {
    pub fn texts(&self) -> Vec<(String, Severity)> {
        self.texts.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<ApiStatus> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

/// Handlers that record every event into the returned sinks.
pub fn recording_handlers() -> (EventHandlers, Recorded) {
    let recorded = Recorded::default();

    let texts = recorded.texts.clone();
    let statuses = recorded.statuses.clone();
    let sent = recorded.sent.clone();
    let received = recorded.received.clone();
    let refreshes = recorded.refreshes.clone();

    let handlers = EventHandlers::new()
        .on_text(move |message, severity| {
            texts.lock().unwrap().push((message.to_string(), severity))
        })
        .on_status(move |status| statuses.lock().unwrap().push(status))
        .on_send(move |raw| sent.lock().unwrap().push(raw.to_string()))
        .on_receive(move |raw| received.lock().unwrap().push(raw.to_string()))
        .on_refresh_list(move || {
            refreshes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

    (handlers, recorded)
}
