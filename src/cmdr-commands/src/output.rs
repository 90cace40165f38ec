//! Output sink shared between a program and its commands.
//!
//! All usage, help, version and "unknown command" text is written to an
//! [`Output`]. An unset output writes to standard error so that piped
//! standard output stays clean.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Cloneable handle to a writer.
///
/// Clones write to the same underlying writer. A single writer at a time is
/// assumed; the lock only makes the handle `Send`.
#[derive(Clone, Default)]
pub struct Output {
    sink: Option<Sink>,
}

impl Output {
    /// Output that writes to the process's standard error.
    pub fn stderr() -> Self {
        Self::default()
    }

    /// Output that writes to `writer`.
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Some(Arc::new(Mutex::new(Box::new(writer)))),
        }
    }

    /// Output backed by an in-memory buffer, plus a handle to read it back.
    pub fn buffer() -> (Self, Buffer) {
        let buffer = Buffer::default();
        (Self::new(buffer.clone()), buffer)
    }

    /// Whether this output falls back to standard error.
    pub fn is_stderr(&self) -> bool {
        self.sink.is_none()
    }

    /// Whether both handles write to the same destination.
    pub fn same_sink(&self, other: &Output) -> bool {
        match (&self.sink, &other.sink) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Write all of `bytes` in one call and flush.
    pub fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        match &self.sink {
            Some(sink) => {
                let mut writer = sink.lock();
                writer.write_all(bytes)?;
                writer.flush()
            }
            None => {
                let mut stderr = io::stderr().lock();
                stderr.write_all(bytes)?;
                stderr.flush()
            }
        }
    }

    /// Write a string.
    pub fn write_str(&self, s: &str) -> io::Result<()> {
        self.write_all(s.as_bytes())
    }

    /// Target of `write!(output, ...)`.
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) -> io::Result<()> {
        match args.as_str() {
            Some(s) => self.write_str(s),
            None => self.write_str(&args.to_string()),
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sink {
            Some(_) => f.write_str("Output(custom)"),
            None => f.write_str("Output(stderr)"),
        }
    }
}

/// In-memory writer whose clones share the same bytes.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl Buffer {
    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.bytes.lock().is_empty()
    }

    /// Discard the buffered bytes.
    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_stderr() {
        let output = Output::default();
        assert!(output.is_stderr());
        assert!(output.same_sink(&Output::stderr()));
    }

    #[test]
    fn test_buffer_round_trip() {
        let (output, buffer) = Output::buffer();
        assert!(buffer.is_empty());

        output.write_str("hello ").unwrap();
        output.clone().write_str("world\n").unwrap();

        assert_eq!(buffer.contents(), "hello world\n");
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_same_sink() {
        let (a, _) = Output::buffer();
        let (b, _) = Output::buffer();

        assert!(a.same_sink(&a.clone()));
        assert!(!a.same_sink(&b));
        assert!(!a.same_sink(&Output::stderr()));
    }

    #[test]
    fn test_write_macro() {
        let (output, buffer) = Output::buffer();
        write!(output, "{} + {}", 1, 2).unwrap();
        writeln!(output, " = 3").unwrap();
        assert_eq!(buffer.contents(), "1 + 2 = 3\n");
    }
}
