//! `aas-patch`: apply, invert, classify or validate a patch.
//!
//! Usage:
//!   aas-patch <apply|invert|classify|validate> '<patch-array-json>'
//!
//! `apply` and `invert` read the document from stdin. Classification rules
//! come from the TOML file named by `AAS_PATCH_RULES`, if set. Log output
//! goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use std::io::{self, Read, Write};

use aas_patch::cli::{run, CliError, Command};
use aas_patch::config::rules_from_env;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: aas-patch <apply|invert|classify|validate> '<patch-array-json>'";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main_inner() -> Result<String, CliError> {
    let args: Vec<String> = std::env::args().collect();
    let command = match args.get(1) {
        Some(c) => Command::parse(c)?,
        None => return Err(CliError::Usage(USAGE.to_string())),
    };
    let patch = args
        .get(2)
        .ok_or_else(|| CliError::Usage("Second argument must be a JSON patch array.".to_string()))?;

    let mut doc = String::new();
    if command.needs_document() {
        io::stdin().read_to_string(&mut doc)?;
    }

    let classifier = rules_from_env()?;
    run(command, patch, doc.trim(), &classifier)
}

fn main() {
    init_logging();
    match main_inner() {
        Ok(result) => {
            let mut stdout = io::stdout();
            if let Err(e) = stdout.write_all(result.as_bytes()).and_then(|()| stdout.write_all(b"\n")) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
