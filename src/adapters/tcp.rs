//! Plain TCP client adapter.
//!
//! Implements [`Connector`] on `std::net::TcpStream`. ESP-IDF's `std` port
//! routes this through lwIP, so the same code runs on the device and on the
//! host; no cfg gating is needed.
//!
//! The caller's timeout bounds the connect itself and every read and write
//! on the returned stream.

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::debug;

use crate::app::ports::Connector;

#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

impl TcpConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn open(&mut self, host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
        let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
        if addrs.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "host resolved to no addresses",
            ));
        }

        let mut last_err = None;
        for addr in addrs {
            debug!("tcp: connecting to {}", addr);
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(timeout))?;
                    stream.set_write_timeout(Some(timeout))?;
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| io::Error::other("no address connected")))
    }
}
