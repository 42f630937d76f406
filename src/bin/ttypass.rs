//! ttypass CLI - askpass-style secret prompt
//!
//! Prompts on the controlling terminal with echo disabled and prints the
//! entered secret on stdout, so it can be captured by a calling program
//! while the prompt still reaches the user.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use ttypass::passphrase::{PassphraseReader, ReaderPassphraseReader, TerminalPassphraseReader};
use ttypass::{ErrorKind, Result, TtypassError};

#[derive(Parser)]
#[command(name = "ttypass")]
#[command(version)]
#[command(about = "Read a secret from the terminal without echo.", long_about = None)]
struct Cli {
    /// Prompt written to the terminal before reading
    #[arg(short, long, default_value = TerminalPassphraseReader::DEFAULT_PROMPT, conflicts_with = "stdin")]
    prompt: String,

    /// How many times the secret must be typed; values above 1 ask for confirmation
    #[arg(
        short,
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..),
        conflicts_with = "stdin"
    )]
    retype: u32,

    /// How many times to start over when the confirmation does not match
    #[arg(
        short,
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..),
        conflicts_with = "stdin"
    )]
    attempts: u32,

    /// Read the secret from stdin instead of from the terminal
    #[arg(long)]
    stdin: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut reader = get_passphrase_reader(&cli);
    let result = read_with_attempts(&mut *reader, cli.attempts, &mut io::stderr())
        .and_then(|secret| print_secret(&secret));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Read from `reader`, starting over after a mismatch until `attempts` reads
/// have been made. Each retry is announced on `notice`.
fn read_with_attempts(
    reader: &mut dyn PassphraseReader,
    attempts: u32,
    notice: &mut dyn Write,
) -> Result<Zeroizing<Vec<u8>>> {
    let mut attempt = 1;
    loop {
        match reader.read_passphrase() {
            Err(e) if e.is_mismatch() && attempt < attempts => {
                // Best effort; the next prompt follows regardless.
                let _ = writeln!(notice, "{}, try again", e);
                attempt += 1;
            }
            result => return result,
        }
    }
}

fn get_passphrase_reader(cli: &Cli) -> Box<dyn PassphraseReader> {
    if cli.stdin {
        Box::new(ReaderPassphraseReader::new(Box::new(io::stdin())))
    } else {
        Box::new(TerminalPassphraseReader::with_prompt(cli.prompt.as_str()).times(cli.retype as usize))
    }
}

fn print_secret(secret: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(secret)
        .and_then(|()| stdout.write_all(b"\n"))
        .and_then(|()| stdout.flush())
        .map_err(|e| TtypassError::with_source(ErrorKind::Io, "failed to write secret to stdout", e))
}
