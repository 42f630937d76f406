//! Interchangeable sources of a secret
//!
//! Applications that normally prompt on the terminal often also need to take
//! the secret from a pipe or a redirected file. The
//! [`PassphraseReader`] trait lets them switch sources without caring which
//! one is in use.

use std::io::{self, Read};

use zeroize::Zeroizing;

use crate::buffer::extend_wiped;
use crate::error::{ErrorKind, Result, TtypassError};
use crate::reader;

/// Trait for reading passphrases from various sources
pub trait PassphraseReader {
    /// Read a passphrase as arbitrary bytes (not necessarily UTF-8)
    ///
    /// Returns the passphrase wrapped in `Zeroizing` to ensure it is securely
    /// wiped from memory when dropped.
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>>;
}

/// Reads passphrase from any io::Read source
///
/// The source is read to the end. One trailing `\n` or `\r\n` is removed so
/// that `echo secret | app` and a file with a final newline both yield
/// `secret`; everything else, including non-UTF-8 bytes, is kept.
pub struct ReaderPassphraseReader {
    reader: Box<dyn Read>,
}

impl ReaderPassphraseReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl PassphraseReader for ReaderPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut data = Zeroizing::new(Vec::new());
        let mut chunk = Zeroizing::new([0u8; 64]);
        loop {
            match self.reader.read(&mut chunk[..]) {
                Ok(0) => break,
                Ok(n) => extend_wiped(&mut data, &chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(TtypassError::with_source(
                        ErrorKind::Io,
                        format!("error reading passphrase: {}", e),
                        e,
                    ));
                }
            }
        }
        if data.last() == Some(&b'\n') {
            data.pop();
            if data.last() == Some(&b'\r') {
                data.pop();
            }
        }
        Ok(data)
    }
}

/// Reads passphrase from the controlling terminal with no echo
pub struct TerminalPassphraseReader {
    prompt: String,
    times: usize,
}

impl TerminalPassphraseReader {
    pub const DEFAULT_PROMPT: &'static str = "Password: ";

    pub fn new() -> Self {
        Self::with_prompt(Self::DEFAULT_PROMPT)
    }

    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            times: 1,
        }
    }

    /// Require the passphrase to be typed `times` times in total.
    pub fn times(mut self, times: usize) -> Self {
        self.times = times;
        self
    }
}

impl Default for TerminalPassphraseReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PassphraseReader for TerminalPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        reader::read_secret_bytes(&self.prompt, self.times)
    }
}
