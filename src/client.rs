//! Contains the probe client that talks to a 4DIAC runtime.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{error, info, info_span, warn, Span};

use crate::analysis::Analysis;
use crate::errors::ErrContext;
use crate::{Error, Result, FORTE_PORT, RECV_BUFFER_SIZE};

/// Holds the different timeouts that will be used by the Client.
/// None means no timeout in every case.
#[derive(Clone, Copy, Debug, Default)]
pub struct Timeouts {
    /// Connect timeout
    pub connect: Option<Duration>,
    /// Socket read timeout
    pub read: Option<Duration>,
    /// Socket write timeout
    pub write: Option<Duration>,
}

impl Timeouts {
    /// Create a new `Timeouts` where all values are identical.
    pub fn new(duration: Duration) -> Self {
        Self {
            connect: Some(duration),
            read: Some(duration),
            write: Some(duration),
        }
    }

    /// Create a new `Timeouts` without any timeouts specified.
    pub fn none() -> Self {
        Self::default()
    }
}

/// A diagnostic client for a 4DIAC runtime.
///
/// The client sends raw buffers and reads whatever a single receive returns;
/// there is no framing.  Every buffer that goes over the wire is analysed
/// and the analysis is written to the report sink (stdout by default).
///
/// Log events are emitted inside the client's span, which the caller can
/// supply with [`Client::with_span`] to tell several clients apart.
pub struct Client {
    host: String,
    port: u16,
    timeouts: Timeouts,
    socket: Option<TcpStream>,
    span: Span,
    report: Box<dyn Write + Send>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new("localhost", FORTE_PORT)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl Client {
    /// Create a client for the given target.  Nothing is connected yet.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let span = info_span!("probe", host = %host, port);
        Client {
            host,
            port,
            timeouts: Timeouts::none(),
            socket: None,
            span,
            report: Box::new(io::stdout()),
        }
    }

    /// Use the given socket timeouts for subsequent connections.
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Emit log events inside `span` instead of the default per-target span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Write connection notices and data analyses to `report`.
    pub fn with_report(mut self, report: Box<dyn Write + Send>) -> Self {
        self.report = report;
        self
    }

    /// Return the configured target as `(host, port)`.
    pub fn target(&self) -> (&str, u16) {
        (&self.host, self.port)
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// Open the connection.  Exactly one attempt is made.
    ///
    /// An existing connection is closed first.
    pub fn connect(&mut self) -> Result<()> {
        self.disconnect();
        let _guard = self.span.clone().entered();
        match self.open_socket() {
            Ok(socket) => {
                self.socket = Some(socket);
                let target = format!("{}:{}", self.host, self.port);
                info!("connected successfully to {}", target);
                self.note(format_args!("\n[+] Connected to 4DIAC at {}", target));
                Ok(())
            }
            Err(e) => {
                self.socket = None;
                error!("connection failed: {}", e);
                self.note(format_args!("\n[-] Connection failed: {}", e));
                Err(e)
            }
        }
    }

    fn open_socket(&self) -> Result<TcpStream> {
        let socket = if let Some(timeout) = self.timeouts.connect {
            // connect_timeout wants a single SocketAddr
            let addr = (self.host.as_str(), self.port)
                .to_socket_addrs()
                .ctx("resolving target address")?
                .next()
                .ok_or_else(|| Error::Io("resolving target address",
                                         io::ErrorKind::NotFound.into()))?;
            TcpStream::connect_timeout(&addr, timeout).ctx("connecting TCP socket with timeout")?
        } else {
            TcpStream::connect((self.host.as_str(), self.port)).ctx("connecting TCP socket")?
        };
        socket.set_read_timeout(self.timeouts.read).ctx("setting read timeout")?;
        socket.set_write_timeout(self.timeouts.write).ctx("setting write timeout")?;
        Ok(socket)
    }

    /// Close the connection, if any.  Calling this when already disconnected
    /// does nothing.
    pub fn disconnect(&mut self) {
        if let Some(socket) = self.socket.take() {
            let _guard = self.span.clone().entered();
            let _ = socket.shutdown(Shutdown::Both);
            info!("disconnected from 4DIAC runtime");
            self.note("\n[*] Disconnected from 4DIAC runtime");
        }
    }

    /// Send the whole buffer, then report its analysis.
    ///
    /// Fails without touching the network if not connected.
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        let _guard = self.span.clone().entered();
        let sent = match &mut self.socket {
            Some(socket) => socket.write_all(data).ctx("sending data"),
            None => return Err(self.not_connected()),
        };
        if let Err(e) = sent {
            error!("error sending data: {}", e);
            self.note(format_args!("\n[-] Error sending data: {}", e));
            return Err(e);
        }
        info!(len = data.len(), "sent data: {}", data.escape_ascii());
        self.note("\n[>] Sending data:");
        self.note(Analysis::of(data, "Sent"));
        Ok(())
    }

    /// Perform exactly one read of up to `max_bytes`.
    ///
    /// Returns `Ok(None)` if the peer closed the connection (empty read).
    pub fn receive(&mut self, max_bytes: usize) -> Result<Option<Vec<u8>>> {
        let _guard = self.span.clone().entered();
        if !self.is_connected() {
            return Err(self.not_connected());
        }
        self.note("\n[*] Waiting for data...");
        let mut buf = vec![0; max_bytes];
        let read = match &mut self.socket {
            Some(socket) => socket.read(&mut buf).ctx("receiving data"),
            None => Err(Error::NotConnected),
        };
        let n = match read {
            Ok(n) => n,
            Err(e) => {
                error!("error receiving data: {}", e);
                self.note(format_args!("\n[-] Error receiving data: {}", e));
                return Err(e);
            }
        };
        if n == 0 {
            warn!("no data received, peer closed the connection");
            self.note("\n[-] No data received");
            return Ok(None);
        }
        buf.truncate(n);
        info!(len = n, "received data: {}", buf.escape_ascii());
        self.note("\n[<] Received data:");
        self.note(Analysis::of(&buf, "Received"));
        Ok(Some(buf))
    }

    /// Receive with the default buffer size.
    pub fn receive_default(&mut self) -> Result<Option<Vec<u8>>> {
        self.receive(RECV_BUFFER_SIZE)
    }

    fn not_connected(&mut self) -> Error {
        error!("not connected to 4DIAC runtime");
        self.note("\n[-] Error: Not connected to 4DIAC runtime");
        Error::NotConnected
    }

    // The report is purely diagnostic, so failing to write it is not an error
    // for the socket operation that produced it.
    fn note(&mut self, item: impl std::fmt::Display) {
        if writeln!(self.report, "{}", item).is_err() {
            warn!("could not write to the report sink");
        }
    }
}
