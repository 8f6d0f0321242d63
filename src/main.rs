use std::fs;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use monty::error::{report, MontyError};
use monty::interpreter;

#[derive(Parser, Debug)]
#[command(name = "monty")]
#[command(about = "Run a Monty bytecode file", version)]
struct Cli {
    /// Path to the bytecode file
    file: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "monty=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => return ExitCode::from(report(&MontyError::Usage, &mut io::stderr())),
    };

    let source = match fs::read(&cli.file) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(source) => {
            let err = MontyError::FileOpen {
                path: cli.file.display().to_string(),
                source,
            };
            return ExitCode::from(report(&err, &mut io::stderr()));
        }
    };
    debug!(file = %cli.file.display(), bytes = source.len(), "loaded bytecode");

    let out = BufWriter::new(io::stdout().lock());
    ExitCode::from(interpreter::run(&source, out, &mut io::stderr()))
}
