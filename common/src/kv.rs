//! Key/value records and their on-disk encoding.
//!
//! Partition and reduce-output files are JSON Lines: one `{"key":..,"value":..}`
//! object per line. The format needs no record count up front, can be appended
//! to, and a bad line only costs that line.

use serde::{Deserialize, Serialize};
use std::{
    fmt,
    io::{self, BufRead, BufWriter, Write},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A line that could not be decoded as a `KeyValue`.
#[derive(Debug)]
pub struct MalformedRecord {
    /// 1-based line number inside the file
    pub line: usize,
    pub error: serde_json::Error,
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed record at line {}: {}", self.line, self.error)
    }
}

/// Sequential decoder over a record stream.
///
/// Yields `Err(io::Error)` when the underlying reader fails and
/// `Ok(Err(MalformedRecord))` for a line that is not a valid record; the
/// caller decides whether either is fatal. Blank lines are skipped.
pub struct KeyValueReader<R> {
    inner: R,
    buf: Vec<u8>,
    line: usize,
}

impl<R: BufRead> KeyValueReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for KeyValueReader<R> {
    type Item = io::Result<Result<KeyValue, MalformedRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.inner.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
            self.line += 1;

            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let line = self.line;
            let decoded = serde_json::from_slice::<KeyValue>(&self.buf)
                .map_err(|error| MalformedRecord { line, error });
            return Some(Ok(decoded));
        }
    }
}

/// Buffered encoder; nothing is guaranteed on disk until `finish`.
pub struct KeyValueWriter<W: Write> {
    inner: BufWriter<W>,
}

impl<W: Write> KeyValueWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
        }
    }

    pub fn write(&mut self, kv: &KeyValue) -> io::Result<()> {
        serde_json::to_writer(&mut self.inner, kv)?;
        self.inner.write_all(b"\n")
    }

    /// Flushes everything and hands back the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        self.inner.into_inner().map_err(|e| e.into_error())
    }
}
