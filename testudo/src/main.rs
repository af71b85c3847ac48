//! Command-line front-end.

use clap::Parser;
use std::fs;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use testudo::{
    parse_nquads, parse_ntriples, parse_trig, parse_turtle, OutputMode, ParserConfig, Warning,
};
use tracing_subscriber::EnvFilter;

/// Parse RDF Turtle-family documents into canonical N-Triples/N-Quads.
#[derive(Parser, Debug)]
#[command(name = "testudo", author, about, disable_version_flag = true)]
struct Args {
    /// Only validate the input, do not emit canonical output.
    #[arg(short = 'v', long)]
    validate: bool,
    /// Output format: `N3` (canonical, the default) or `raw` (no
    /// normalization, statements are echoed as recognized).
    #[arg(long, default_value = "N3")]
    out: String,
    /// Base IRI relative references resolve against.
    #[arg(long, default_value = "")]
    base: String,
    /// Verbose logging on stderr.
    #[arg(long)]
    verbose: bool,
    /// Print version information and exit.
    #[arg(long)]
    version: bool,
    /// Input file; the extension picks the dialect
    /// (`.ttl` Turtle, `.trig` TriG, `.nt` N-Triples, `.nq` N-Quads).
    #[arg(required_unless_present = "version")]
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if err.kind() == clap::error::ErrorKind::DisplayHelp => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(1);
        }
    };
    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return ExitCode::from(2);
    }
    init_logging(args.verbose);
    match run(&args) {
        Ok(count) => {
            tracing::info!(count, "input processed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<u64, Box<dyn std::error::Error>> {
    let Some(file) = args.file.as_ref() else {
        return Err("no input file given".into());
    };
    let mode = match args.out.as_str() {
        "N3" | "n3" => OutputMode::Canonical,
        "raw" => OutputMode::Raw,
        other => return Err(format!("unsupported output format '{}'", other).into()),
    };
    let doc = fs::read_to_string(file)?;
    let label = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let config = ParserConfig {
        validate: args.validate,
        base: args.base.clone(),
        label,
        mode,
    };
    let out = BufWriter::new(io::stdout());
    let warn = |warning: Warning| eprintln!("{}", warning);
    let extension = file.extension().and_then(|e| e.to_str()).unwrap_or("");
    let count = match extension {
        "trig" => parse_trig(&doc, out, warn, &config),
        "nt" => parse_ntriples(&doc, out, warn, &config),
        "nq" => parse_nquads(&doc, out, warn, &config),
        _ => parse_turtle(&doc, out, warn, &config),
    }?;
    Ok(count)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
