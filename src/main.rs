use clap::Parser;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Mutex;
use tedit::{Editor, Error, Result, StdinRawMode};

/// Small terminal text editor
#[derive(Parser, Debug)]
#[command(name = "tedit", version)]
struct Cli {
    /// File to open. Saving an unnamed buffer prompts for a file name
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Path to log file for editor diagnostics. Filter with RUST_LOG
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

// Terminal is owned by the editor so logs only go to a file when requested
fn init_logging(path: &Path) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    // Editor owns the raw mode guard through its input, so the terminal is restored when it drops
    let input = StdinRawMode::new()?.input_keys();
    let window_size = term_size::dimensions_stdout().ok_or(Error::UnknownWindowSize)?;
    let output = io::stdout();

    let mut editor = match cli.file {
        Some(path) => Editor::open(path, input, output, window_size)?,
        None => Editor::new(input, output, window_size)?,
    };
    editor.edit()
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        tracing::error!(%err, "fatal error");
        eprintln!("Error: {}", err);
        exit(1);
    }
}
