//! `/dev/tty` backed console

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::{IntoRawFd, OwnedFd};

use nix::sys::termios::{self, InputFlags, LocalFlags, SetArg, Termios};
use tracing::debug;

use super::{Console, LineEnding};
use crate::error::{ErrorKind, Result, TtypassError};

const TTY_PATH: &str = "/dev/tty";

/// The process's controlling terminal, opened read+write.
#[derive(Debug)]
pub struct TerminalConsole {
    file: File,
}

impl TerminalConsole {
    pub fn open() -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(TTY_PATH)
            .map_err(|e| {
                TtypassError::with_source(
                    ErrorKind::DeviceUnavailable,
                    format!("no controlling terminal: cannot open {TTY_PATH}"),
                    e,
                )
            })?;
        debug!(path = TTY_PATH, "opened controlling terminal");
        Ok(Self { file })
    }
}

impl Console for TerminalConsole {
    type Mode = Termios;

    fn query_mode(&self) -> io::Result<Termios> {
        Ok(termios::tcgetattr(&self.file)?)
    }

    fn apply_mode(&mut self, mode: &Termios) -> io::Result<()> {
        Ok(termios::tcsetattr(&self.file, SetArg::TCSANOW, mode)?)
    }

    fn silenced(&self, mode: &Termios) -> Termios {
        let mut silent = mode.clone();
        silent.local_flags.remove(LocalFlags::ECHO);
        silent.local_flags.insert(LocalFlags::ICANON | LocalFlags::ISIG);
        silent.input_flags.insert(InputFlags::ICRNL);
        silent
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)?;
        self.file.flush()
    }

    fn line_ending(&self) -> LineEnding {
        LineEnding::Lf
    }

    fn release(self) -> io::Result<()> {
        let fd: OwnedFd = self.file.into();
        nix::unistd::close(fd.into_raw_fd())?;
        debug!(path = TTY_PATH, "released controlling terminal");
        Ok(())
    }
}
