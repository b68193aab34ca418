//! Serial console adapter.
//!
//! The shell and the interrupt report both print through `core::fmt::Write`.
//! On ESP-IDF stdout is the UART / USB-CDC console; on the host it is the
//! terminal. Writes are unbuffered so output from the IRQ path interleaves
//! line by line with the command's own output.

use core::fmt;
use std::io::{self, BufRead, Read, Write as _};

use crate::shell::MAX_LINE_CAPACITY;

/// `fmt::Write` over the process stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl StdoutConsole {
    pub const fn new() -> Self {
        Self
    }

    pub fn flush(&mut self) {
        if let Err(e) = io::stdout().flush() {
            log::warn!("console: flush failed: {}", e);
        }
    }
}

impl fmt::Write for StdoutConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        io::stdout().lock().write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

/// Line source for the shell loop.
///
/// A line holds at most [`MAX_LINE_CAPACITY`] + 1 bytes. Anything longer is
/// cut there and the remainder up to the next newline is discarded, so the
/// shell sees an over-length line and reports it instead of the reader
/// buffering without bound.
pub struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
}

/// The shell's line source on the process stdin.
pub type StdinLines = LineReader<io::StdinLock<'static>>;

impl StdinLines {
    pub fn stdin() -> Self {
        LineReader::new(io::stdin().lock())
    }
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(MAX_LINE_CAPACITY + 1),
        }
    }

    /// Next raw line including its terminator. `Ok(None)` at end of input.
    pub fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        self.buf.clear();
        let limit = MAX_LINE_CAPACITY as u64 + 1;
        let n = (&mut self.reader).take(limit).read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }
        if n as u64 == limit && self.buf.last() != Some(&b'\n') {
            let dropped = self.discard_rest_of_line()?;
            log::debug!("console: dropped {} bytes of an over-length line", dropped);
        }
        Ok(Some(self.buf.as_slice()))
    }

    fn discard_rest_of_line(&mut self) -> io::Result<usize> {
        let mut dropped = 0;
        loop {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                return Ok(dropped);
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => {
                    self.reader.consume(i + 1);
                    return Ok(dropped + i + 1);
                }
                None => {
                    let len = available.len();
                    self.reader.consume(len);
                    dropped += len;
                }
            }
        }
    }
}
