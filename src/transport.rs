//! TCP + TLS transport with sentinel-terminated message reads.
//!
//! The API lives at a fixed address: a TLS port and a documented plaintext
//! fallback port. Opening retries the whole connect sequence up to
//! [`OPEN_ATTEMPTS`] times with a fixed delay, then falls back once to the
//! plaintext port (itself retried). A certificate-name mismatch is fatal
//! for the attempt and is never retried.
//!
//! Mid-message failures are never retried here; recovery happens at the
//! query-executor level.

use crate::error::{Result, VndbLinkError};
use crate::framing::TERMINATOR;
use crate::timeouts::Timeouts;
use bytes::{Bytes, BytesMut};
use log::{debug, warn};
use rustls_pki_types::ServerName;
use std::future::Future;
use std::io;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_rustls::{client::TlsStream, TlsConnector};

/// Production API hostname.
pub const API_HOST: &str = "api.vndb.org";
/// Production TLS port.
pub const API_TLS_PORT: u16 = 19535;
/// Production plaintext fallback port.
pub const API_TCP_PORT: u16 = 19534;

/// Connection-open attempts per port before giving up.
pub(crate) const OPEN_ATTEMPTS: u32 = 5;

/// Initial size of the growable read buffer; doubled on exhaustion.
const INITIAL_READ_BUFFER: usize = 1024;

/// Remote address of the API server.
///
/// The production address is fixed, not negotiated; a non-default endpoint
/// exists for tests and mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub tls_port: u16,
    pub tcp_port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, tls_port: u16, tcp_port: u16) -> Self {
        Self {
            host: host.into(),
            tls_port,
            tcp_port,
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(API_HOST, API_TLS_PORT, API_TCP_PORT)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.tls_port, self.tcp_port)
    }
}

enum Stream {
    Tls(Box<TlsStream<TcpStream>>),
    Plain(TcpStream),
}

/// Authenticated, encrypted byte channel to the API server.
pub struct Transport {
    stream: Stream,
    tls: bool,
    peer: String,
    receive_timeout: Duration,
    send_timeout: Duration,
}

impl Transport {
    /// Open a connection to the endpoint's TLS port, falling back to the
    /// plaintext port when all TLS attempts fail.
    pub async fn open(endpoint: &Endpoint, timeouts: &Timeouts) -> Result<Self> {
        debug!(
            "[VNDB_CONN] opening {}:{} (TLS)",
            endpoint.host, endpoint.tls_port
        );
        match Self::open_with_retry(endpoint, timeouts, true).await {
            Ok(stream) => Ok(Self::from_stream(stream, endpoint, timeouts, true)),
            Err(err @ VndbLinkError::CertificateMismatch { .. }) => Err(err),
            Err(err) => {
                warn!(
                    "[VNDB_CONN] TLS connect failed ({err}); falling back to plaintext port {}",
                    endpoint.tcp_port
                );
                let stream = Self::open_with_retry(endpoint, timeouts, false).await?;
                Ok(Self::from_stream(stream, endpoint, timeouts, false))
            }
        }
    }

    fn from_stream(stream: Stream, endpoint: &Endpoint, timeouts: &Timeouts, tls: bool) -> Self {
        let port = if tls { endpoint.tls_port } else { endpoint.tcp_port };
        let peer = format!("{}:{}", endpoint.host, port);
        debug!("[VNDB_CONN] connected to {peer} (tls={tls})");
        Self {
            stream,
            tls,
            peer,
            receive_timeout: timeouts.receive_timeout,
            send_timeout: timeouts.send_timeout,
        }
    }

    async fn open_with_retry(
        endpoint: &Endpoint,
        timeouts: &Timeouts,
        tls: bool,
    ) -> Result<Stream> {
        let label = if tls { "TLS" } else { "plaintext" };
        let mut last_err = VndbLinkError::NotConnected;
        for attempt in 1..=OPEN_ATTEMPTS {
            match Self::open_once(endpoint, timeouts, tls).await {
                Ok(stream) => return Ok(stream),
                Err(err @ VndbLinkError::CertificateMismatch { .. }) => return Err(err),
                Err(err) => {
                    warn!(
                        "[VNDB_CONN] {label} connect attempt {attempt}/{OPEN_ATTEMPTS} failed: {err}"
                    );
                    last_err = err;
                    if attempt < OPEN_ATTEMPTS {
                        sleep(timeouts.open_retry_delay).await;
                    }
                }
            }
        }
        Err(last_err)
    }

    async fn open_once(endpoint: &Endpoint, timeouts: &Timeouts, tls: bool) -> Result<Stream> {
        let port = if tls { endpoint.tls_port } else { endpoint.tcp_port };
        let tcp = match timeout(
            timeouts.connection_timeout,
            TcpStream::connect((endpoint.host.as_str(), port)),
        )
        .await
        {
            Ok(Ok(tcp)) => tcp,
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => return Err(timed_out("connect", timeouts.connection_timeout)),
        };
        // Small request/response exchanges; don't batch them.
        let _ = tcp.set_nodelay(true);

        if !tls {
            return Ok(Stream::Plain(tcp));
        }

        let server_name = ServerName::try_from(endpoint.host.clone()).map_err(|e| {
            VndbLinkError::ConfigurationError(format!("invalid hostname {:?}: {e}", endpoint.host))
        })?;
        let connector = TlsConnector::from(tls_config());
        let stream = match timeout(timeouts.connection_timeout, connector.connect(server_name, tcp))
            .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => return Err(map_tls_error(err, &endpoint.host)),
            Err(_) => return Err(timed_out("TLS handshake", timeouts.connection_timeout)),
        };
        Ok(Stream::Tls(Box::new(stream)))
    }

    /// Whether the connection went over the TLS port.
    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// The remote address this transport is connected to.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Write the full buffer to the socket.
    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let send_timeout = self.send_timeout;
        let stream = &mut self.stream;
        let fut = async move {
            match stream {
                Stream::Tls(s) => {
                    s.write_all(bytes).await?;
                    s.flush().await?;
                }
                Stream::Plain(s) => {
                    s.write_all(bytes).await?;
                    s.flush().await?;
                }
            }
            Ok(())
        };
        maybe_timeout(send_timeout, "write", fut).await
    }

    /// Read one terminator-delimited message, excluding the terminator.
    ///
    /// A zero-byte read is a fatal connection-closed condition for the
    /// in-flight call.
    pub async fn read_message(&mut self) -> Result<Bytes> {
        let receive_timeout = self.receive_timeout;
        match &mut self.stream {
            Stream::Tls(s) => maybe_timeout(receive_timeout, "read", read_terminated(s)).await,
            Stream::Plain(s) => maybe_timeout(receive_timeout, "read", read_terminated(s)).await,
        }
    }

    /// Shut the socket down. Errors are the caller's to log and swallow.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        match &mut self.stream {
            Stream::Tls(s) => s.shutdown().await,
            Stream::Plain(s) => s.shutdown().await,
        }
    }
}

/// Read into a growable buffer until the most recently read byte is the
/// terminator; the returned bytes exclude it.
async fn read_terminated<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(INITIAL_READ_BUFFER);
    loop {
        if buf.len() == buf.capacity() {
            buf.reserve(buf.capacity());
        }
        let n = reader.read_buf(&mut buf).await?;
        if n == 0 {
            return Err(VndbLinkError::ConnectionClosed);
        }
        if buf.last() == Some(&TERMINATOR) {
            let len = buf.len();
            buf.truncate(len - 1);
            return Ok(buf.freeze());
        }
    }
}

async fn maybe_timeout<T>(
    dur: Duration,
    what: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    if Timeouts::is_no_timeout(dur) {
        return fut.await;
    }
    match timeout(dur, fut).await {
        Ok(result) => result,
        Err(_) => Err(timed_out(what, dur)),
    }
}

fn timed_out(what: &str, dur: Duration) -> VndbLinkError {
    VndbLinkError::Io(io::Error::new(
        io::ErrorKind::TimedOut,
        format!("{what} timed out after {dur:?}"),
    ))
}

/// Client TLS configuration: webpki trust anchors, rustls defaults
/// (TLS 1.2 minimum, hostname verification against the endpoint host).
fn tls_config() -> Arc<rustls::ClientConfig> {
    static CONFIG: OnceLock<Arc<rustls::ClientConfig>> = OnceLock::new();
    CONFIG
        .get_or_init(|| {
            let mut roots = rustls::RootCertStore::empty();
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            Arc::new(
                rustls::ClientConfig::builder()
                    .with_root_certificates(roots)
                    .with_no_client_auth(),
            )
        })
        .clone()
}

fn map_tls_error(err: io::Error, host: &str) -> VndbLinkError {
    if let Some(rustls_err) = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>())
    {
        if matches!(
            rustls_err,
            rustls::Error::InvalidCertificate(
                rustls::CertificateError::NotValidForName
                    | rustls::CertificateError::NotValidForNameContext { .. }
            )
        ) {
            return VndbLinkError::CertificateMismatch {
                host: host.to_string(),
            };
        }
        return VndbLinkError::Tls(rustls_err.to_string());
    }
    VndbLinkError::Io(err)
}
