//! Direct access to the controlling terminal
//!
//! The terminal is opened by name (`/dev/tty` on Unix, `CONIN$`/`CONOUT$`
//! on Windows) rather than through the process's standard streams, so
//! prompting keeps working when stdin and stdout are redirected.
//!
//! Everything above this module talks to the terminal through the
//! [`Console`] trait only.

use std::io;

pub mod scripted;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::TerminalConsole;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::TerminalConsole;

use crate::error::Result;

/// How the device terminates a line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// Lines end in `\n`. A Unix tty in canonical mode with `ICRNL` delivers
    /// carriage returns already translated.
    Lf,
    /// Lines end in `\r\n`, as the Windows console delivers them.
    CrLf,
}

/// Capabilities needed to read a secret from a terminal-like device.
pub trait Console {
    /// Snapshot of the device's input-processing flags.
    type Mode: Clone;

    /// Capture the current mode.
    fn query_mode(&self) -> io::Result<Self::Mode>;

    /// Replace the device's mode with `mode`.
    fn apply_mode(&mut self, mode: &Self::Mode) -> io::Result<()>;

    /// Derive the no-echo, line-buffered, signal-enabled mode from `mode`.
    fn silenced(&self, mode: &Self::Mode) -> Self::Mode;

    /// Read at most `buf.len()` raw bytes. Zero means end-of-stream.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `bytes` to the terminal.
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Terminator a completed line arrives with in the silent mode.
    fn line_ending(&self) -> LineEnding;

    /// Close the channel and report any error the OS gives for it.
    /// Dropping the console closes it as well, silently.
    fn release(self) -> io::Result<()>
    where
        Self: Sized;
}

/// Open the controlling terminal for reading and writing.
///
/// Fails with [`ErrorKind::DeviceUnavailable`](crate::ErrorKind::DeviceUnavailable)
/// when the process has no controlling terminal.
pub fn open() -> Result<TerminalConsole> {
    TerminalConsole::open()
}
