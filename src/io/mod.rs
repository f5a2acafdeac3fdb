//! Types for managing engine output and problem files.
//!

use crate::solver::traits::MessageSink;
use std::fs::File;
use std::io::{stdout, Error, ErrorKind, Result, Stdout, Write};
use std::sync::Mutex;

mod format;
mod json;
mod lp;
mod mps;
pub use format::*;
pub use json::JsonFormat;
pub use lp::LpFormat;
pub use mps::MpsFormat;

/// Container for managing multiple print targets
pub(crate) enum PrintTarget {
    Stdout(Stdout),
    File(File),
    Buffer(Vec<u8>),
    Stream(Box<dyn Write + Send + Sync>), // Supports any stream that implements `Write`
    Sink,
}

impl std::fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrintTarget::Stdout(_) => write!(f, "PrintTarget::Stdout"),
            PrintTarget::File(_) => write!(f, "PrintTarget::File"),
            PrintTarget::Buffer(_) => write!(f, "PrintTarget::Buffer"),
            PrintTarget::Stream(_) => write!(f, "PrintTarget::Stream"),
            PrintTarget::Sink => write!(f, "PrintTarget::Sink"),
        }
    }
}

impl Default for PrintTarget {
    fn default() -> Self {
        PrintTarget::Stdout(stdout())
    }
}

impl Write for PrintTarget {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self {
            PrintTarget::Stdout(stdout) => stdout.write(buf),
            PrintTarget::File(file) => file.write(buf),
            PrintTarget::Buffer(buffer) => {
                buffer.extend_from_slice(buf);
                Ok(buf.len())
            }
            PrintTarget::Stream(stream) => stream.write(buf),
            PrintTarget::Sink => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            PrintTarget::Stdout(stdout) => stdout.flush(),
            PrintTarget::File(file) => file.flush(),
            PrintTarget::Buffer(_) | PrintTarget::Sink => Ok(()),
            PrintTarget::Stream(stream) => stream.flush(),
        }
    }
}

impl PrintTarget {
    fn buffer_contents(&self) -> Result<String> {
        match self {
            PrintTarget::Buffer(buffer) => Ok(String::from_utf8_lossy(buffer).to_string()),
            _ => Err(Error::new(
                ErrorKind::Other,
                "Print buffering is not configured.",
            )),
        }
    }
}

/// Trait implemented by sinks that allow configurable print targets
pub trait ConfigurablePrintTarget {
    /// redirect print output to stdout
    fn print_to_stdout(&mut self);
    /// redirect print output to a file
    fn print_to_file(&mut self, file: File);
    /// redirect print output to a stream
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>);
    /// redirect print output to an internal buffer
    fn print_to_buffer(&mut self);
    /// discard all print output
    fn print_to_sink(&mut self);
    /// get the contents of the internal print buffer
    fn get_print_buffer(&mut self) -> Result<String>;
}

/// A [`MessageSink`] writing one line per message to a print target.
///
/// Sinks are shared with engines through `Arc`, so the target sits
/// behind a lock.   Defaults to stdout.
#[derive(Debug, Default)]
pub struct PrintSink {
    target: Mutex<PrintTarget>,
}

impl PrintSink {
    /// sink writing to stdout
    pub fn stdout() -> Self {
        Self::default()
    }

    /// sink collecting messages in memory
    pub fn buffer() -> Self {
        Self::with_target(PrintTarget::Buffer(Vec::new()))
    }

    /// sink writing to a file
    pub fn file(file: File) -> Self {
        Self::with_target(PrintTarget::File(file))
    }

    /// sink writing to any stream
    pub fn stream(stream: Box<dyn Write + Send + Sync>) -> Self {
        Self::with_target(PrintTarget::Stream(stream))
    }

    /// sink discarding every message
    pub fn sink() -> Self {
        Self::with_target(PrintTarget::Sink)
    }

    fn with_target(target: PrintTarget) -> Self {
        Self {
            target: Mutex::new(target),
        }
    }

    /// contents of the internal buffer, for sinks shared through `Arc`
    pub fn contents(&self) -> Result<String> {
        match self.target.lock() {
            Ok(target) => target.buffer_contents(),
            Err(_) => Err(Error::new(ErrorKind::Other, "print target lock poisoned")),
        }
    }

    fn set(&mut self, target: PrintTarget) {
        match self.target.get_mut() {
            Ok(t) => *t = target,
            Err(poisoned) => *poisoned.into_inner() = target,
        }
    }
}

impl ConfigurablePrintTarget for PrintSink {
    fn print_to_stdout(&mut self) {
        self.set(PrintTarget::Stdout(stdout()));
    }

    fn print_to_file(&mut self, file: File) {
        self.set(PrintTarget::File(file));
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.set(PrintTarget::Stream(stream));
    }

    fn print_to_buffer(&mut self) {
        self.set(PrintTarget::Buffer(Vec::new()));
    }

    fn print_to_sink(&mut self) {
        self.set(PrintTarget::Sink);
    }

    fn get_print_buffer(&mut self) -> Result<String> {
        self.contents()
    }
}

impl MessageSink for PrintSink {
    // write failures are dropped, a broken log must not fail a solve
    fn message(&self, text: &str) {
        if let Ok(mut target) = self.target.lock() {
            let _ = writeln!(target, "{}", text.trim_end());
            let _ = target.flush();
        }
    }
}
