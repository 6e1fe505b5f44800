//! Fuzz target: `fetcher::fetch`
//!
//! Serves arbitrary bytes as the HTTP response and asserts the fetcher
//! never panics, never keeps a body outside a 200, and never returns a
//! body line longer than the body cap.
//!
//! cargo fuzz run fuzz_response_parser

#![no_main]

use std::io::{self, Cursor, Read, Write};
use std::time::Duration;

use gaugearm::app::ports::Connector;
use gaugearm::net::fetcher::{self, FetchOutcome, FetchRequest, MAX_BODY_BYTES};
use libfuzzer_sys::fuzz_target;

struct Replay<'a>(&'a [u8]);

struct Stream(Cursor<Vec<u8>>);

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Connector for Replay<'_> {
    type Stream = Stream;

    fn open(&mut self, _: &str, _: u16, _: Duration) -> io::Result<Stream> {
        Ok(Stream(Cursor::new(self.0.to_vec())))
    }
}

fuzz_target!(|data: &[u8]| {
    let request = FetchRequest {
        host: "fuzz.local".into(),
        port: 80,
        path: "/api".into(),
        endpoint: "/x".into(),
        read_deadline: Duration::from_secs(5),
    };
    let result = fetcher::fetch(&mut Replay(data), &request, true);

    assert!(result.body.len() <= MAX_BODY_BYTES);
    if result.outcome != FetchOutcome::Ok {
        assert!(result.body.is_empty(), "body kept outside a 200");
    }
});
