//! Minimal HTTP/1.1 GET over a raw byte stream.
//!
//! Not an HTTP client: no redirects, no chunk decoding, no
//! keep-alive. The response is consumed line by line:
//!
//! ```text
//! HTTP/1.1 200 OK\r          ← status code at bytes 9..12
//! <headers>\r
//! \r                         ← end of headers
//! <one skipped line>\r
//! {"dataSetCount":1650}\r    ← body (kept verbatim)
//! <drained>
//! ```
//!
//! Every read is bounded by the stream timeout set in
//! [`Connector::open`] and by an overall deadline for the whole response.
//! Status and header lines are capped at [`MAX_LINE_BYTES`], the body line
//! at [`MAX_BODY_BYTES`]. Once the body is captured, nothing that follows
//! can fail the fetch.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::app::ports::Connector;
use crate::config::GaugeConfig;

/// Longest accepted status or header line, including the trailing `\r`.
pub const MAX_LINE_BYTES: usize = 2048;
/// Longest accepted body line. Anything past the body line is drained
/// without a cap.
pub const MAX_BODY_BYTES: usize = 32 * 1024;

/// Where to fetch from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub endpoint: String,
    pub read_deadline: Duration,
}

impl FetchRequest {
    pub fn from_config(config: &GaugeConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            path: config.base_path.clone(),
            endpoint: config.endpoint.clone(),
            read_deadline: Duration::from_millis(u64::from(config.read_timeout_ms)),
        }
    }

    /// Request bytes exactly as written to the socket.
    pub fn to_wire(&self) -> String {
        format!(
            "GET {}{} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            self.path, self.endpoint, self.host
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Ok,
    ConnectFailed,
    NonSuccessStatus,
    Unknown,
}

impl FetchOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::ConnectFailed => "ConnectFailed",
            Self::NonSuccessStatus => "NonSuccessStatus",
            Self::Unknown => "Unknown",
        }
    }
}

impl core::fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one fetch. `body` is empty unless `outcome == Ok`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub status_code: u16,
    pub body: Vec<u8>,
    pub outcome: FetchOutcome,
}

impl FetchResult {
    fn empty(status_code: u16, outcome: FetchOutcome) -> Self {
        Self {
            status_code,
            body: Vec::new(),
            outcome,
        }
    }

    /// The configured resource does not exist; polling it again is pointless.
    pub fn invalidates_device(&self) -> bool {
        self.outcome == FetchOutcome::NonSuccessStatus && self.status_code == 404
    }
}

/// Status code from the three bytes after `"HTTP/1.1 "`. Unparsable → 0.
pub fn parse_status_code(line: &[u8]) -> u16 {
    match line.get(9..12) {
        Some(digits) if digits.iter().all(u8::is_ascii_digit) => digits
            .iter()
            .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0')),
        _ => 0,
    }
}

/// Issue the request and classify the response.
pub fn fetch(connector: &mut impl Connector, request: &FetchRequest, show_headers: bool) -> FetchResult {
    let mut stream = match connector.open(&request.host, request.port, request.read_deadline) {
        Ok(s) => s,
        Err(e) => {
            warn!("fetch: connect to {}:{} failed: {}", request.host, request.port, e);
            return FetchResult::empty(0, FetchOutcome::ConnectFailed);
        }
    };

    let wire = request.to_wire();
    if let Err(e) = stream.write_all(wire.as_bytes()).and_then(|()| stream.flush()) {
        warn!("fetch: request write failed: {}", e);
        return FetchResult::empty(0, FetchOutcome::ConnectFailed);
    }
    debug!("fetch: GET {}{}", request.path, request.endpoint);

    let deadline = Instant::now() + request.read_deadline;
    let mut reader = LineReader::new(stream, deadline);
    read_response(&mut reader, show_headers)
}

fn read_response<R: Read>(reader: &mut LineReader<R>, show_headers: bool) -> FetchResult {
    let mut status_code = None;
    loop {
        let line = match reader.next_line(MAX_LINE_BYTES) {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("fetch: header read failed: {}", e);
                return FetchResult::empty(status_code.unwrap_or(0), FetchOutcome::Unknown);
            }
        };
        if status_code.is_none() {
            status_code = Some(parse_status_code(&line));
        }
        if show_headers {
            debug!("fetch: < {}", String::from_utf8_lossy(&line).trim_end());
        }
        if line == b"\r" {
            break;
        }
    }
    let status_code = status_code.unwrap_or(0);

    match status_code {
        200 => read_body(reader),
        404 => {
            warn!("fetch: 404, endpoint does not exist");
            FetchResult::empty(status_code, FetchOutcome::NonSuccessStatus)
        }
        other => {
            warn!("fetch: unexpected status {}", other);
            FetchResult::empty(status_code, FetchOutcome::Unknown)
        }
    }
}

/// Skip one line, keep the next, drain the rest.
fn read_body<R: Read>(reader: &mut LineReader<R>) -> FetchResult {
    let body = match reader.skip_line() {
        Ok(true) => reader.next_line(MAX_BODY_BYTES),
        Ok(false) => Ok(None),
        Err(e) => Err(e),
    };
    let body = match body {
        Ok(line) => line.unwrap_or_default(),
        Err(e) => {
            warn!("fetch: body read failed: {}", e);
            return FetchResult::empty(200, FetchOutcome::Unknown);
        }
    };

    let drained = reader.drain();
    debug!("fetch: body {} bytes, drained {} bytes", body.len(), drained);
    FetchResult {
        status_code: 200,
        body,
        outcome: FetchOutcome::Ok,
    }
}

/// Newline-delimited reader with an overall deadline.
struct LineReader<R> {
    inner: BufReader<R>,
    deadline: Instant,
}

impl<R: Read> LineReader<R> {
    fn new(inner: R, deadline: Instant) -> Self {
        Self {
            inner: BufReader::new(inner),
            deadline,
        }
    }

    fn check_deadline(&self) -> io::Result<()> {
        if Instant::now() > self.deadline {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "response deadline exceeded"));
        }
        Ok(())
    }

    /// Next line with `\n` stripped and `\r` kept. `None` at end of stream.
    /// A line longer than `limit` is an error.
    fn next_line(&mut self, limit: usize) -> io::Result<Option<Vec<u8>>> {
        self.check_deadline()?;
        let mut line = Vec::new();
        let n = (&mut self.inner)
            .take(limit as u64 + 1)
            .read_until(b'\n', &mut line)?;
        if n == 0 {
            return Ok(None);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.len() > limit {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "response line too long"));
        }
        Ok(Some(line))
    }

    /// Discard one line of any length. `false` if the stream ended first.
    fn skip_line(&mut self) -> io::Result<bool> {
        loop {
            self.check_deadline()?;
            let buf = self.inner.fill_buf()?;
            if buf.is_empty() {
                return Ok(false);
            }
            let newline = buf.iter().position(|&b| b == b'\n');
            let len = buf.len();
            match newline {
                Some(i) => {
                    self.inner.consume(i + 1);
                    return Ok(true);
                }
                None => self.inner.consume(len),
            }
        }
    }

    /// Discard everything up to end of stream, the deadline or the first
    /// read error. Returns the number of bytes dropped.
    fn drain(&mut self) -> usize {
        let mut total = 0;
        while self.check_deadline().is_ok() {
            let len = match self.inner.fill_buf() {
                Ok([]) => break,
                Ok(buf) => buf.len(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("fetch: drain stopped: {}", e);
                    break;
                }
            };
            self.inner.consume(len);
            total += len;
        }
        total
    }
}
