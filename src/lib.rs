//! ttypass - read secrets from the controlling terminal
//!
//! Prompts on the terminal device itself (`/dev/tty`, or `CONIN$`/`CONOUT$`
//! on Windows), so a password can be read while stdin and stdout are
//! redirected. Echo is disabled for the duration of each read and the
//! terminal's previous mode is always put back.
//!
//! ```no_run
//! let password = ttypass::read_secret("Password: ", 2)?;
//! # Ok::<(), ttypass::TtypassError>(())
//! ```

#![deny(unsafe_code)]

mod buffer;
pub mod console;
pub mod error;
pub mod line;
pub mod passphrase;
pub mod reader;
pub mod silent;

pub use error::{ErrorCategory, ErrorKind, Result, TtypassError};
pub use reader::{read_secret, read_secret_bytes, read_secret_from};
