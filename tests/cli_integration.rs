//! CLI integration tests
//!
//! Tests the command-line interface end-to-end.

use std::fs::File;
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::NamedTempFile;

/// Run ttypass with stdin redirected from a file containing `input`
fn run_ttypass_with_stdin_file(args: &[&str], input: &[u8]) -> Output {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(input).unwrap();
    file.flush().unwrap();

    Command::new(env!("CARGO_BIN_EXE_ttypass"))
        .args(args)
        .stdin(Stdio::from(File::open(file.path()).unwrap()))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .unwrap()
}

#[test]
fn test_stdin_secret_printed_on_stdout() {
    let result = run_ttypass_with_stdin_file(&["--stdin"], b"hunter2\n");

    assert!(
        result.status.success(),
        "ttypass failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert_eq!(result.stdout, b"hunter2\n");
}

#[test]
fn test_stdin_secret_without_trailing_newline() {
    let result = run_ttypass_with_stdin_file(&["--stdin"], b"hunter2");

    assert!(result.status.success());
    assert_eq!(result.stdout, b"hunter2\n");
}

#[test]
fn test_stdin_non_utf8_secret_preserved() {
    let result = run_ttypass_with_stdin_file(&["--stdin"], &[0xff, 0xfe, b'\n']);

    assert!(result.status.success());
    assert_eq!(result.stdout, [0xff, 0xfe, b'\n']);
}

#[test]
fn test_retype_zero_rejected() {
    let result = run_ttypass_with_stdin_file(&["--retype", "0"], b"x\n");

    assert!(!result.status.success());
    assert!(result.stdout.is_empty());
}

#[test]
fn test_attempts_zero_rejected() {
    let result = run_ttypass_with_stdin_file(&["--attempts", "0"], b"x\n");

    assert!(!result.status.success());
    assert!(result.stdout.is_empty());
}

/// Terminal-only options would be silently ignored with `--stdin`, so the
/// combination is refused before any input is read.
#[test]
fn test_stdin_with_retype_rejected() {
    let result = run_ttypass_with_stdin_file(&["--stdin", "--retype", "2"], b"secret\n");

    assert_eq!(result.status.code(), Some(2));
    assert!(result.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("cannot be used with"), "stderr: {}", stderr);
}

/// Without a controlling terminal the prompt cannot be shown, so the call
/// must fail up front and print nothing on stdout, even though stdin has
/// data available.
#[cfg(unix)]
#[test]
fn test_no_controlling_terminal_fails() {
    use std::os::unix::process::CommandExt;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"secret\n").unwrap();
    file.flush().unwrap();

    let mut command = Command::new(env!("CARGO_BIN_EXE_ttypass"));
    command
        .args(["--prompt", "Password: "])
        .stdin(Stdio::from(File::open(file.path()).unwrap()))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    // SAFETY: setsid is async-signal-safe; it detaches the child from our
    // terminal so /dev/tty cannot be opened.
    unsafe {
        command.pre_exec(|| {
            nix::unistd::setsid()?;
            Ok(())
        });
    }
    let result = command.output().unwrap();

    assert!(!result.status.success());
    assert!(result.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(
        stderr.contains("no controlling terminal"),
        "Expected error about the missing terminal, got: {}",
        stderr
    );
}
