//! Contains the request stub server.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;

use tracing::{debug, info, info_span, warn};

use crate::errors::ErrContext;
use crate::response::respond;
use crate::{Result, RECV_BUFFER_SIZE};

/// A listening request stub.
///
/// By default connections are served one after the other: a second client
/// waits in the listen backlog until the first one disconnects.
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Bind the listening socket.
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self> {
        let listener = TcpListener::bind(addr).ctx("binding listening socket")?;
        if let Ok(addr) = listener.local_addr() {
            info!("server listening on {}", addr);
        }
        Ok(Server { listener })
    }

    /// Return the address the server is actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().ctx("getting local socket address")
    }

    /// Serve connections serially, forever.
    ///
    /// Only a failing `accept` ends the loop; errors on a single connection
    /// just close that connection.
    pub fn serve(&self) -> Result<()> {
        loop {
            self.serve_one()?;
        }
    }

    /// Accept one connection and serve it until the peer closes it.
    pub fn serve_one(&self) -> Result<()> {
        let (stream, peer) = self.listener.accept().ctx("accepting connection")?;
        handle_connection(stream, peer);
        Ok(())
    }

    /// Serve every connection on its own thread.
    ///
    /// Requests are answered without any state, so the handlers share
    /// nothing.
    pub fn serve_concurrent(&self) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().ctx("accepting connection")?;
            thread::Builder::new()
                .name(format!("connection {}", peer))
                .spawn(move || handle_connection(stream, peer))
                .ctx("spawning connection handler")?;
        }
    }
}

/// Serve one accepted connection to completion, logging how it ended.
pub fn handle_connection(mut stream: TcpStream, peer: SocketAddr) {
    let span = info_span!("connection", %peer);
    let _guard = span.enter();
    info!("connected by {}", peer);
    match serve_stream(&mut stream) {
        Ok(()) => info!("connection closed by peer"),
        Err(e) => warn!("connection aborted: {}", e),
    }
}

/// Answer requests on a stream until it reports end of file.
///
/// Each read of up to [`RECV_BUFFER_SIZE`] bytes is taken as one request.
pub fn serve_stream<S: Read + Write>(stream: &mut S) -> Result<()> {
    let mut buf = [0; RECV_BUFFER_SIZE];
    loop {
        let n = stream.read(&mut buf).ctx("receiving request")?;
        if n == 0 {
            return Ok(());
        }
        info!("received: {}", buf[..n].escape_ascii());
        let response = respond(&buf[..n]);
        if response.is_error() {
            debug!(?response, "answering with an error");
        }
        let response = response.to_string();
        info!("sending: {}", response);
        stream.write_all(response.as_bytes()).ctx("sending response")?;
    }
}
