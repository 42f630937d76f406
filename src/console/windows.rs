//! `CONIN$`/`CONOUT$` backed console
//!
//! Opening the console buffers by name gives handles to the real console
//! even when the standard handles point at files or pipes. The handles are
//! closed by `Drop` unless `release` already did so.

#![allow(unsafe_code)]

use std::ffi::OsStr;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::ptr;

use tracing::debug;
use winapi::shared::minwindef::{DWORD, FALSE};
use winapi::um::consoleapi::{GetConsoleMode, SetConsoleMode};
use winapi::um::fileapi::{CreateFileW, OPEN_EXISTING, ReadFile, WriteFile};
use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::wincon::{ENABLE_ECHO_INPUT, ENABLE_LINE_INPUT, ENABLE_PROCESSED_INPUT};
use winapi::um::winnt::{FILE_SHARE_READ, FILE_SHARE_WRITE, GENERIC_READ, GENERIC_WRITE, HANDLE};

use super::{Console, LineEnding};
use crate::error::{ErrorKind, Result, TtypassError};

/// Console input and output buffers of the process's console.
#[derive(Debug)]
pub struct TerminalConsole {
    input: HANDLE,
    output: HANDLE,
}

fn open_buffer(name: &str, share_mode: DWORD) -> io::Result<HANDLE> {
    let wide: Vec<u16> = OsStr::new(name).encode_wide().chain(Some(0)).collect();
    // SAFETY: `wide` is NUL-terminated and outlives the call.
    let handle = unsafe {
        CreateFileW(
            wide.as_ptr(),
            GENERIC_READ | GENERIC_WRITE,
            share_mode,
            ptr::null_mut(),
            OPEN_EXISTING,
            0,
            ptr::null_mut(),
        )
    };
    if handle == INVALID_HANDLE_VALUE {
        return Err(io::Error::last_os_error());
    }
    Ok(handle)
}

fn close_handle(handle: HANDLE) -> io::Result<()> {
    // SAFETY: the handle came from CreateFileW and is closed exactly once.
    if unsafe { CloseHandle(handle) } == FALSE {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

impl TerminalConsole {
    pub fn open() -> Result<Self> {
        let unavailable = |e: io::Error| {
            TtypassError::with_source(
                ErrorKind::DeviceUnavailable,
                "no console attached: cannot open CONIN$/CONOUT$",
                e,
            )
        };

        let input = open_buffer("CONIN$", FILE_SHARE_READ).map_err(unavailable)?;
        let output = match open_buffer("CONOUT$", FILE_SHARE_WRITE) {
            Ok(handle) => handle,
            Err(e) => {
                let _ = close_handle(input);
                return Err(unavailable(e));
            }
        };
        debug!("opened console buffers");
        Ok(Self { input, output })
    }

    fn close_all(&mut self) -> io::Result<()> {
        let input = std::mem::replace(&mut self.input, INVALID_HANDLE_VALUE);
        let output = std::mem::replace(&mut self.output, INVALID_HANDLE_VALUE);
        let mut result = Ok(());
        for handle in [input, output] {
            if handle != INVALID_HANDLE_VALUE {
                if let Err(e) = close_handle(handle) {
                    result = Err(e);
                }
            }
        }
        result
    }
}

impl Console for TerminalConsole {
    type Mode = DWORD;

    fn query_mode(&self) -> io::Result<DWORD> {
        let mut mode: DWORD = 0;
        // SAFETY: `self.input` is an open console input handle.
        if unsafe { GetConsoleMode(self.input, &mut mode) } == FALSE {
            return Err(io::Error::last_os_error());
        }
        Ok(mode)
    }

    fn apply_mode(&mut self, mode: &DWORD) -> io::Result<()> {
        // SAFETY: `self.input` is an open console input handle.
        if unsafe { SetConsoleMode(self.input, *mode) } == FALSE {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn silenced(&self, mode: &DWORD) -> DWORD {
        (*mode & !ENABLE_ECHO_INPUT) | ENABLE_PROCESSED_INPUT | ENABLE_LINE_INPUT
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = DWORD::try_from(buf.len()).unwrap_or(DWORD::MAX);
        let mut read: DWORD = 0;
        // SAFETY: `buf` is valid for `len` bytes for the duration of the call.
        let ok = unsafe {
            ReadFile(
                self.input,
                buf.as_mut_ptr().cast(),
                len,
                &mut read,
                ptr::null_mut(),
            )
        };
        if ok == FALSE {
            return Err(io::Error::last_os_error());
        }
        Ok(read as usize)
    }

    fn write_bytes(&mut self, mut bytes: &[u8]) -> io::Result<()> {
        while !bytes.is_empty() {
            let len = DWORD::try_from(bytes.len()).unwrap_or(DWORD::MAX);
            let mut written: DWORD = 0;
            // SAFETY: `bytes` is valid for `len` bytes for the duration of the call.
            let ok = unsafe {
                WriteFile(
                    self.output,
                    bytes.as_ptr().cast(),
                    len,
                    &mut written,
                    ptr::null_mut(),
                )
            };
            if ok == FALSE {
                return Err(io::Error::last_os_error());
            }
            if written == 0 {
                return Err(io::Error::from(io::ErrorKind::WriteZero));
            }
            bytes = &bytes[written as usize..];
        }
        Ok(())
    }

    fn line_ending(&self) -> LineEnding {
        LineEnding::CrLf
    }

    fn release(mut self) -> io::Result<()> {
        let result = self.close_all();
        debug!("released console buffers");
        result
    }
}

impl Drop for TerminalConsole {
    fn drop(&mut self) {
        let _ = self.close_all();
    }
}
