//! Line splitting and classification for the event stream.

use std::borrow::Cow;
use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

/// Classification of one line of the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `:` comment, typically a keep-alive.
    Comment(&'a str),
    /// `event:` field; holds the trimmed event name.
    Event(&'a str),
    /// `data:` field; holds the value after one separator space.
    Data(&'a str),
    /// Empty line terminating a frame.
    Blank,
    /// Anything else.
    Other(&'a str),
}

impl<'a> LineKind<'a> {
    /// Classify a line with its terminator already removed.
    pub fn classify(line: &'a str) -> Self {
        if line.is_empty() {
            LineKind::Blank
        } else if let Some(comment) = line.strip_prefix(':') {
            LineKind::Comment(comment)
        } else if let Some(name) = line.strip_prefix("event:") {
            LineKind::Event(name.trim())
        } else if let Some(value) = line.strip_prefix("data:") {
            LineKind::Data(value.strip_prefix(' ').unwrap_or(value))
        } else {
            LineKind::Other(line)
        }
    }
}

/// Default longest line accepted, in bytes, excluding the terminator.
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

/// One read from a [`LineReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLine {
    /// A complete line without its terminator.
    Line(String),
    /// A line longer than the limit, already discarded.
    TooLong { len: usize },
    /// The peer closed the stream. An unterminated last line is dropped.
    Eof,
}

/// Newline-delimited reader over an async byte stream.
///
/// `\n` and an optional preceding `\r` are removed. Invalid UTF-8 is
/// replaced rather than rejected. Lines over the limit are skipped through
/// their terminator without being buffered.
#[derive(Debug)]
pub struct LineReader<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
    max_len: usize,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Create a reader with the default line limit.
    pub fn new(reader: R) -> Self {
        Self::with_max_len(reader, DEFAULT_MAX_LINE_LEN)
    }

    /// Create a reader that rejects lines longer than `max_len` bytes.
    pub fn with_max_len(reader: R, max_len: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            buf: Vec::new(),
            max_len,
        }
    }

    /// Read the next line.
    pub async fn next_line(&mut self) -> io::Result<RawLine> {
        // Room for the limit plus "\r\n"
        let limit = self.max_len as u64 + 2;

        self.buf.clear();
        let n = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut self.buf)
            .await?;

        if n == 0 {
            return Ok(RawLine::Eof);
        }
        if self.buf.last() == Some(&b'\n') {
            let len = strip_terminator(&self.buf).len();
            if len > self.max_len {
                return Ok(RawLine::TooLong { len });
            }
            return Ok(RawLine::Line(line_text(&self.buf).into_owned()));
        }
        if (n as u64) < limit {
            return Ok(RawLine::Eof);
        }

        // Over the limit without a terminator: skip through the next one.
        let mut len = n;
        loop {
            self.buf.clear();
            let n = (&mut self.reader)
                .take(limit)
                .read_until(b'\n', &mut self.buf)
                .await?;
            if n == 0 {
                return Ok(RawLine::Eof);
            }
            if self.buf.last() == Some(&b'\n') {
                return Ok(RawLine::TooLong {
                    len: len + strip_terminator(&self.buf).len(),
                });
            }
            len += n;
        }
    }
}

/// Strip the line terminator and decode lossily.
pub fn line_text(raw: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(strip_terminator(raw))
}

fn strip_terminator(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}
