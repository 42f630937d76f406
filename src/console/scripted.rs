//! In-memory console for exercising the reader without a terminal
//!
//! Input is queued as deliveries. A delivery is handed out across
//! consecutive reads, at most one buffer's worth at a time, the way a
//! canonical-mode tty returns one line per `read`. An empty delivery or an
//! empty queue produces a zero-length read.

use std::collections::VecDeque;
use std::io;

use super::{Console, LineEnding};

/// Mode flags tracked by [`ScriptedConsole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedMode {
    pub echo: bool,
    pub canonical: bool,
    pub signals: bool,
    pub translate_cr: bool,
}

impl Default for ScriptedMode {
    /// A cooked terminal: echo on, canonical, signals, CR translation.
    fn default() -> Self {
        Self {
            echo: true,
            canonical: true,
            signals: true,
            translate_cr: true,
        }
    }
}

#[derive(Debug)]
pub struct ScriptedConsole {
    deliveries: VecDeque<Vec<u8>>,
    mode: ScriptedMode,
    line_ending: LineEnding,
    written: Vec<u8>,
    reads: usize,
    applies: usize,
    fail_query: bool,
    fail_apply_at: Option<usize>,
    fail_next_read: Option<io::ErrorKind>,
    released: bool,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::with_mode(ScriptedMode::default())
    }

    pub fn with_mode(mode: ScriptedMode) -> Self {
        Self {
            deliveries: VecDeque::new(),
            mode,
            line_ending: LineEnding::Lf,
            written: Vec::new(),
            reads: 0,
            applies: 0,
            fail_query: false,
            fail_apply_at: None,
            fail_next_read: None,
            released: false,
        }
    }

    /// Queue one delivery of input.
    pub fn push_input(&mut self, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.deliveries.push_back(bytes.into());
        self
    }

    /// Choose the line ending reported by `line_ending`.
    pub fn set_line_ending(&mut self, line_ending: LineEnding) -> &mut Self {
        self.line_ending = line_ending;
        self
    }

    /// Make every `query_mode` call fail.
    pub fn fail_query(&mut self) -> &mut Self {
        self.fail_query = true;
        self
    }

    /// Make the `index`-th call to `apply_mode` (counting from zero) fail.
    pub fn fail_apply_at(&mut self, index: usize) -> &mut Self {
        self.fail_apply_at = Some(index);
        self
    }

    /// Make the next `read_chunk` call fail with `kind`.
    pub fn fail_next_read(&mut self, kind: io::ErrorKind) -> &mut Self {
        self.fail_next_read = Some(kind);
        self
    }

    /// The mode most recently applied, or the starting mode.
    pub fn mode(&self) -> ScriptedMode {
        self.mode
    }

    /// Everything written to the console so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Number of `read_chunk` calls, including failed ones.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Number of `apply_mode` calls, including failed ones.
    pub fn applies(&self) -> usize {
        self.applies
    }

    /// Whether `release` was called through `&mut ScriptedConsole`.
    pub fn released(&self) -> bool {
        self.released
    }
}

impl Default for ScriptedConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for ScriptedConsole {
    type Mode = ScriptedMode;

    fn query_mode(&self) -> io::Result<ScriptedMode> {
        if self.fail_query {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "scripted query failure"));
        }
        Ok(self.mode)
    }

    fn apply_mode(&mut self, mode: &ScriptedMode) -> io::Result<()> {
        let index = self.applies;
        self.applies += 1;
        if self.fail_apply_at == Some(index) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "scripted apply failure"));
        }
        self.mode = *mode;
        Ok(())
    }

    fn silenced(&self, mode: &ScriptedMode) -> ScriptedMode {
        let mut silent = *mode;
        silent.echo = false;
        silent.canonical = true;
        silent.signals = true;
        silent.translate_cr = true;
        silent
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        if let Some(kind) = self.fail_next_read.take() {
            return Err(io::Error::new(kind, "scripted read failure"));
        }
        let Some(front) = self.deliveries.front_mut() else {
            return Ok(0);
        };
        let n = front.len().min(buf.len());
        buf[..n].copy_from_slice(&front[..n]);
        front.drain(..n);
        if front.is_empty() {
            self.deliveries.pop_front();
        }
        Ok(n)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    fn release(self) -> io::Result<()> {
        Ok(())
    }
}

/// Lets tests keep ownership of the console and inspect it afterwards.
impl Console for &mut ScriptedConsole {
    type Mode = ScriptedMode;

    fn query_mode(&self) -> io::Result<ScriptedMode> {
        (**self).query_mode()
    }

    fn apply_mode(&mut self, mode: &ScriptedMode) -> io::Result<()> {
        (**self).apply_mode(mode)
    }

    fn silenced(&self, mode: &ScriptedMode) -> ScriptedMode {
        (**self).silenced(mode)
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_chunk(buf)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_bytes(bytes)
    }

    fn line_ending(&self) -> LineEnding {
        (**self).line_ending()
    }

    fn release(self) -> io::Result<()> {
        self.released = true;
        Ok(())
    }
}
