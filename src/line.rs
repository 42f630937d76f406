//! Reading a single line of raw bytes from a console
//!
//! Bytes are read in fixed-size chunks. A chunk ending in a newline, or one
//! shorter than the buffer, completes the line. A full chunk without a
//! newline means more of the same line may be pending, so reading continues.
//! Line terminators are never part of the result.

use std::io;

use zeroize::Zeroizing;

use crate::buffer::extend_wiped;
use crate::console::{Console, LineEnding};
use crate::error::{ErrorKind, Result, TtypassError};

/// Read buffer size used by [`read_line`].
pub const CHUNK_SIZE: usize = 16;

/// Read one line from `console` using [`CHUNK_SIZE`] byte reads.
pub fn read_line<C: Console + ?Sized>(console: &mut C) -> Result<Zeroizing<Vec<u8>>> {
    read_line_chunked(console, CHUNK_SIZE)
}

/// Read one line from `console`, `chunk_size` bytes at a time.
///
/// Fails with [`ErrorKind::EndOfInput`] if the console reports end-of-stream
/// before any byte arrives; end-of-stream after some bytes completes the line.
pub fn read_line_chunked<C: Console + ?Sized>(
    console: &mut C,
    chunk_size: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let chunk_size = chunk_size.max(1);
    let strip_cr = console.line_ending() == LineEnding::CrLf;
    let mut buf = Zeroizing::new(vec![0u8; chunk_size]);
    let mut line = Zeroizing::new(Vec::new());

    loop {
        let n = read_chunk(console, &mut buf)?;
        if n == 0 {
            if line.is_empty() {
                return Err(TtypassError::new(
                    ErrorKind::EndOfInput,
                    "end of input before a line was entered",
                ));
            }
            break;
        }

        if buf[n - 1] == b'\n' {
            extend_wiped(&mut line, &buf[..n - 1]);
            // The \r may have closed the previous chunk.
            if strip_cr && line.last() == Some(&b'\r') {
                line.pop();
            }
            break;
        }

        extend_wiped(&mut line, &buf[..n]);
        if n < chunk_size {
            break;
        }
    }

    Ok(line)
}

fn read_chunk<C: Console + ?Sized>(console: &mut C, buf: &mut [u8]) -> Result<usize> {
    loop {
        match console.read_chunk(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(TtypassError::with_source(
                    ErrorKind::ReadFailed,
                    "failed to read from terminal",
                    e,
                ));
            }
        }
    }
}
