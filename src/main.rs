use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glob::glob;
use rooftop_templates::{
    config::DEFAULT_MAX_COLUMN_WIDTH,
    generate,
    ingest::{load_inputs, render_tables},
    Settings,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Generate dealership outreach and CSM follow-up emails from call-volume exports.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// ZIP archives, CSV files, or glob patterns matching them.
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,

    /// Text encoding to try, in order. Repeat to try several; defaults to utf-8 then windows-1252.
    #[arg(long = "encoding", value_name = "LABEL")]
    encodings: Vec<String>,

    /// Column cap for `--show-tables`.
    #[arg(long, default_value_t = DEFAULT_MAX_COLUMN_WIDTH)]
    max_column_width: usize,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print every parsed file as a fixed-width table to stderr. Without it the
    /// tables are still logged at debug level.
    #[arg(long, default_value_t = false)]
    show_tables: bool,

    /// Print only the template bodies, separated by rules (text format only).
    #[arg(long, default_value_t = false)]
    copy_all: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // ─── 2) settings ─────────────────────────────────────────────────
    let settings = Settings::default()
        .with_encoding_labels(cli.encodings.as_slice())?
        .with_max_column_width(cli.max_column_width);
    info!(encodings = ?settings.encoding_names(), "startup");

    // ─── 3) load inputs ──────────────────────────────────────────────
    let paths = expand_inputs(&cli.inputs)?;
    let files = load_inputs(paths.as_slice(), &settings);
    if files.is_empty() {
        warn!("no CSV files found in the given inputs");
    }

    let tables = render_tables(&files, settings.max_column_width);
    if cli.show_tables {
        eprint!("{tables}");
    } else {
        debug!("parsed inputs\n{tables}");
    }

    // ─── 4) transform + output ───────────────────────────────────────
    let result = generate(files, &settings);
    match cli.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        Format::Text if cli.copy_all => print!("{}", result.copy_all_text()),
        Format::Text => print!("{}", result.render_text()),
    }

    if !result.has_templates() {
        warn!("no templates generated; see diagnostics above");
    }
    Ok(())
}

/// Expand glob patterns; plain paths are passed through untouched.
fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(input));
            continue;
        }
        let before = paths.len();
        for entry in glob(input).with_context(|| format!("Failed to read glob pattern '{}'", input))? {
            paths.push(entry?);
        }
        if paths.len() == before {
            warn!(pattern = %input, "glob matched nothing");
        }
    }
    Ok(paths)
}
