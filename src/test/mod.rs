// Code used in the crate test suite.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::thread;

use once_cell::sync::Lazy;

use crate::Server;

mod test_request;


// Since Cargo tests run multi-threaded, start one stub server per thread and
// connect to it from the test functions in that thread.
thread_local! {
    pub static STUB: Lazy<SocketAddr> = Lazy::new(|| {
        let server = Server::bind("127.0.0.1:0").unwrap();
        let addr = server.local_addr().unwrap();
        thread::spawn(move || {
            // Connections are handled one after the other, like the real thing.
            let _ = server.serve();
        });
        addr
    });
}

pub fn stub_addr() -> SocketAddr {
    STUB.with(|addr| **addr)
}

/// A peer that accepts one connection and plays back canned replies: for
/// every entry it reads once, then writes the entry.  Afterwards it closes
/// the connection.  Returns the port and a handle yielding everything read.
pub fn scripted_peer(replies: Vec<Vec<u8>>) -> (u16, thread::JoinHandle<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (mut socket, _) = listener.accept().unwrap();
        let mut seen = vec![];
        let mut buf = [0; 1024];
        for reply in replies {
            let n = socket.read(&mut buf).unwrap();
            seen.push(buf[..n].to_vec());
            socket.write_all(&reply).unwrap();
        }
        seen
    });
    (port, handle)
}

/// A report sink that can be inspected after the client wrote to it.
#[derive(Clone, Default)]
pub struct SharedReport(Arc<Mutex<Vec<u8>>>);

impl SharedReport {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedReport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
