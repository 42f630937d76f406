//! Scoped no-echo terminal mode
//!
//! [`SilentMode`] captures the console's mode, applies the silent variant
//! and puts the captured mode back when dropped. Restoring is best-effort:
//! a failed restore is logged and never replaces the result of the work
//! done while silent. Call [`SilentMode::restore`] to observe the restore
//! error instead.

use std::io;
use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::console::Console;
use crate::error::{ErrorKind, Result, TtypassError};

/// Keeps a console in silent mode for as long as it is alive.
///
/// The guard holds the console's mutable borrow, so a second guard on the
/// same console cannot be created while this one exists.
pub struct SilentMode<'a, C: Console> {
    console: &'a mut C,
    original: Option<C::Mode>,
}

impl<'a, C: Console> SilentMode<'a, C> {
    /// Switch `console` into silent mode.
    ///
    /// Nothing needs restoring if this fails: either the mode was never
    /// read, or applying the silent mode did not take effect.
    pub fn enter(console: &'a mut C) -> Result<Self> {
        let original = console.query_mode().map_err(|e| {
            TtypassError::with_source(
                ErrorKind::ModeQueryFailed,
                "failed to read terminal mode",
                e,
            )
        })?;
        let silent = console.silenced(&original);
        console.apply_mode(&silent).map_err(|e| {
            TtypassError::with_source(
                ErrorKind::ModeSetFailed,
                "failed to disable terminal echo",
                e,
            )
        })?;
        debug!("terminal echo disabled");
        Ok(Self {
            console,
            original: Some(original),
        })
    }

    /// Put the captured mode back and report whether that worked.
    pub fn restore(mut self) -> io::Result<()> {
        self.put_back()
    }

    fn put_back(&mut self) -> io::Result<()> {
        match self.original.take() {
            Some(original) => {
                self.console.apply_mode(&original)?;
                debug!("terminal mode restored");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl<C: Console> Deref for SilentMode<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.console
    }
}

impl<C: Console> DerefMut for SilentMode<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.console
    }
}

impl<C: Console> Drop for SilentMode<'_, C> {
    fn drop(&mut self) {
        if let Err(e) = self.put_back() {
            warn!(error = %e, "failed to restore terminal mode");
        }
    }
}

/// Run `body` with echo disabled on `console`.
///
/// Returns `body`'s result unchanged. The original mode is restored on every
/// path out of `body`, including errors and panics; a restore failure is
/// logged at warn level and not returned.
pub fn with_silent_mode<C, T, F>(console: &mut C, body: F) -> Result<T>
where
    C: Console,
    F: FnOnce(&mut C) -> Result<T>,
{
    let mut guard = SilentMode::enter(console)?;
    body(&mut *guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::scripted::{ScriptedConsole, ScriptedMode};

    #[test]
    fn test_body_runs_silent_and_mode_is_restored() {
        let mut console = ScriptedConsole::new();
        let before = console.mode();

        let seen = with_silent_mode(&mut console, |c| Ok(c.mode())).unwrap();

        assert!(!seen.echo);
        assert!(seen.canonical && seen.signals && seen.translate_cr);
        assert_eq!(console.mode(), before);
    }

    #[test]
    fn test_silenced_sets_line_buffering_and_signals() {
        let raw = ScriptedMode {
            echo: true,
            canonical: false,
            signals: false,
            translate_cr: false,
        };
        let mut console = ScriptedConsole::with_mode(raw);

        let seen = with_silent_mode(&mut console, |c| Ok(c.mode())).unwrap();

        assert_eq!(
            seen,
            ScriptedMode {
                echo: false,
                canonical: true,
                signals: true,
                translate_cr: true,
            }
        );
        assert_eq!(console.mode(), raw);
    }

    #[test]
    fn test_body_error_is_returned_and_mode_restored() {
        let mut console = ScriptedConsole::new();
        let before = console.mode();

        let err = with_silent_mode(&mut console, |_| -> Result<()> {
            Err(TtypassError::new(ErrorKind::EndOfInput, "simulated"))
        })
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::EndOfInput);
        assert_eq!(console.mode(), before);
        assert_eq!(console.applies(), 2);
    }

    #[test]
    fn test_query_failure_touches_nothing() {
        let mut console = ScriptedConsole::new();
        console.fail_query();

        let mut ran = false;
        let err = with_silent_mode(&mut console, |_| {
            ran = true;
            Ok(())
        })
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::ModeQueryFailed);
        assert!(!ran);
        assert_eq!(console.applies(), 0);
    }

    #[test]
    fn test_set_failure_skips_body_and_restore() {
        let mut console = ScriptedConsole::new();
        console.fail_apply_at(0);

        let mut ran = false;
        let err = with_silent_mode(&mut console, |_| {
            ran = true;
            Ok(())
        })
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::ModeSetFailed);
        assert!(!ran);
        assert_eq!(console.applies(), 1);
    }

    #[test]
    fn test_restore_failure_does_not_replace_body_result() {
        let mut console = ScriptedConsole::new();
        console.fail_apply_at(1);

        let value = with_silent_mode(&mut console, |_| Ok(42)).unwrap();

        assert_eq!(value, 42);
        assert_eq!(console.applies(), 2);
    }

    #[test]
    fn test_explicit_restore_reports_failure() {
        let mut console = ScriptedConsole::new();
        console.fail_apply_at(1);

        let guard = SilentMode::enter(&mut console).unwrap();
        assert!(guard.restore().is_err());
        // The failed restore is not retried on drop.
        assert_eq!(console.applies(), 2);
    }

    #[test]
    fn test_mode_restored_on_panic() {
        let mut console = ScriptedConsole::new();
        let before = console.mode();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = with_silent_mode(&mut console, |_| -> Result<()> { panic!("boom") });
        }));

        assert!(result.is_err());
        assert_eq!(console.mode(), before);
    }
}
