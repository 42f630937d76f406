//! Prompting for a secret on the controlling terminal

use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::console::{self, Console};
use crate::error::{ErrorKind, Result, TtypassError};
use crate::line;
use crate::silent::with_silent_mode;

/// Written before the prompt for every confirmation read.
pub const RETYPE_PREFIX: &str = "(retype) ";

/// Prompt on the controlling terminal and read a line with echo disabled.
///
/// With `times > 1` the user has to type the line again `times - 1` times,
/// each time after a `"(retype) "` prefix; the call fails with
/// [`ErrorKind::Mismatch`] on the first confirmation that differs. A `times`
/// of 0 behaves like 1.
///
/// Works when stdin and stdout are redirected, since the terminal device is
/// opened directly.
pub fn read_secret(prompt: &str, times: usize) -> Result<Zeroizing<String>> {
    let bytes = read_secret_bytes(prompt, times)?;
    decode(bytes)
}

/// Like [`read_secret`], returning the raw captured bytes.
pub fn read_secret_bytes(prompt: &str, times: usize) -> Result<Zeroizing<Vec<u8>>> {
    let console = console::open()?;
    read_secret_from(console, prompt, times)
}

/// Run the prompt-and-confirm cycle against `console` and release it.
///
/// The console is released on every path. A release failure is logged and
/// does not change the result.
pub fn read_secret_from<C: Console>(
    mut console: C,
    prompt: &str,
    times: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let result = prompt_and_confirm(&mut console, prompt, times);
    if let Err(e) = console.release() {
        warn!(error = %e, "failed to release terminal");
    }
    result
}

fn prompt_and_confirm<C: Console>(
    console: &mut C,
    prompt: &str,
    times: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let first = capture(console, prompt.as_bytes())?;

    let retype_prompt = Zeroizing::new([RETYPE_PREFIX.as_bytes(), prompt.as_bytes()].concat());
    for attempt in 1..times {
        let again = capture(console, &retype_prompt)?;
        if *again != *first {
            debug!(attempt, "confirmation did not match");
            return Err(TtypassError::new(
                ErrorKind::Mismatch,
                "answers did not match",
            ));
        }
    }

    Ok(first)
}

/// One silent prompt-read-newline cycle.
fn capture<C: Console>(console: &mut C, prompt: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    with_silent_mode(console, |console| {
        console.write_bytes(prompt).map_err(|e| {
            TtypassError::with_source(ErrorKind::Io, "failed to write prompt", e)
        })?;
        let captured = line::read_line(console);
        // Echo is off, so the user's Enter did not move the cursor.
        let newline = console.write_bytes(b"\n");
        let captured = captured?;
        newline.map_err(|e| {
            TtypassError::with_source(ErrorKind::Io, "failed to write newline", e)
        })?;
        Ok(captured)
    })
}

fn decode(mut bytes: Zeroizing<Vec<u8>>) -> Result<Zeroizing<String>> {
    match String::from_utf8(std::mem::take(&mut *bytes)) {
        Ok(text) => Ok(Zeroizing::new(text)),
        Err(e) => {
            let utf8_error = e.utf8_error();
            e.into_bytes().zeroize();
            Err(TtypassError::with_source(
                ErrorKind::InvalidUtf8,
                "entered text is not valid UTF-8",
                utf8_error,
            ))
        }
    }
}
