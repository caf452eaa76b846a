//! Inkflux CLI - Command-line interface for Inkflux
//!
//! Commands:
//! - normalize: Turn a drawing into the 28×28 classifier input
//! - analyze: Compute stroke metrics and fatigue for a recorded session

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use inkflux::preprocess::{save_preview, ImageNormalizer};
use inkflux::strokes::{analyze_session, parse_ndjson, parse_samples, DEFAULT_FATIGUE_THRESHOLD_PCT};
use inkflux::types::Profile;
use inkflux::{ComputeError, INKFLUX_VERSION};

/// Inkflux - Drawing normalization and pen-stroke metrics for handwriting therapy
#[derive(Parser)]
#[command(name = "inkflux")]
#[command(version = INKFLUX_VERSION)]
#[command(about = "Normalize digit drawings and analyze pen strokes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a drawing into the 28×28 classifier input
    Normalize {
        /// Input image path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Preprocessing profile
        #[arg(long, default_value = "auto")]
        profile: ProfileArg,

        /// Write a PNG of what the classifier sees
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Analyze recorded stroke samples
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Speed drop (percent) above which fatigue is reported
        #[arg(long, default_value_t = DEFAULT_FATIGUE_THRESHOLD_PCT)]
        threshold: f64,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    /// Pick the profile from the ink statistics
    Auto,
    /// Keep grayscale values
    Standard,
    /// Smooth, dilate and binarize faint or shaky drawings
    Enhanced,
}

impl ProfileArg {
    fn resolve(self) -> Option<Profile> {
        match self {
            ProfileArg::Auto => None,
            ProfileArg::Standard => Some(Profile::Standard),
            ProfileArg::Enhanced => Some(Profile::Enhanced),
        }
    }
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of samples, or an object with a "strokes" array
    Json,
    /// Newline-delimited JSON (one sample per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), InkfluxCliError> {
    match cli.command {
        Commands::Normalize {
            input,
            output,
            profile,
            preview,
            output_format,
        } => cmd_normalize(&input, &output, profile, preview.as_deref(), &output_format),
        Commands::Analyze {
            input,
            output,
            input_format,
            threshold,
            output_format,
        } => cmd_analyze(&input, &output, &input_format, threshold, &output_format),
    }
}

fn is_stdio(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn read_input(input: &Path) -> Result<Vec<u8>, InkfluxCliError> {
    if !is_stdio(input) {
        return Ok(fs::read(input)?);
    }
    if atty::is(atty::Stream::Stdin) {
        return Err(InkfluxCliError::NoInput);
    }
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer)?;
    Ok(buffer)
}

fn write_output(output: &Path, content: &str) -> Result<(), InkfluxCliError> {
    if is_stdio(output) {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", content)?;
        stdout.flush()?;
    } else {
        fs::write(output, format!("{}\n", content))?;
    }
    Ok(())
}

fn cmd_normalize(
    input: &Path,
    output: &Path,
    profile: ProfileArg,
    preview: Option<&Path>,
    output_format: &OutputFormat,
) -> Result<(), InkfluxCliError> {
    let bytes = read_input(input)?;
    if bytes.is_empty() {
        return Err(InkfluxCliError::EmptyInput);
    }

    let normalizer = ImageNormalizer::new().with_preview(preview.is_some());
    let result = normalizer.normalize_bytes(&bytes, profile.resolve())?;

    if let (Some(path), Some(image)) = (preview, &result.preview) {
        save_preview(image, path)?;
        log::info!("preview written to {}", path.display());
    }

    write_output(output, &format_output(&result, output_format)?)
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    input_format: &InputFormat,
    threshold: f64,
    output_format: &OutputFormat,
) -> Result<(), InkfluxCliError> {
    let bytes = read_input(input)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| InkfluxCliError::ParseError(format!("input is not UTF-8: {}", e)))?;

    let samples = match input_format {
        InputFormat::Json => parse_samples(&text)?,
        InputFormat::Ndjson => parse_ndjson(&text)?,
    };
    if samples.is_empty() {
        return Err(InkfluxCliError::EmptyInput);
    }

    let analysis = analyze_session(&samples, threshold);
    write_output(output, &format_output(&analysis, output_format)?)
}

fn format_output<T: Serialize>(value: &T, format: &OutputFormat) -> Result<String, InkfluxCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(value)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
    }
}

#[derive(Debug)]
enum InkfluxCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoInput,
    EmptyInput,
    ParseError(String),
}

impl From<io::Error> for InkfluxCliError {
    fn from(e: io::Error) -> Self {
        InkfluxCliError::Io(e)
    }
}

impl From<ComputeError> for InkfluxCliError {
    fn from(e: ComputeError) -> Self {
        InkfluxCliError::Compute(e)
    }
}

impl From<serde_json::Error> for InkfluxCliError {
    fn from(e: serde_json::Error) -> Self {
        InkfluxCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<InkfluxCliError> for CliError {
    fn from(e: InkfluxCliError) -> Self {
        match e {
            InkfluxCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            InkfluxCliError::Compute(e) => {
                let (code, hint) = match &e {
                    ComputeError::InputDecode(_) => {
                        ("DECODE_ERROR", "Supported image formats are PNG, JPEG, BMP and GIF")
                    }
                    ComputeError::InvalidSample(_) => {
                        ("INVALID_SAMPLE", "Positions must be finite and pressure within [0, 1]")
                    }
                    ComputeError::EncodingError(_) => {
                        ("ENCODING_ERROR", "Check the output path and use a .png, .jpg, .bmp or .gif extension")
                    }
                    _ => ("PARSE_ERROR", "Samples need x, y and timestamp fields"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            InkfluxCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            InkfluxCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a terminal".to_string(),
                hint: Some("Pipe data into the command or pass -i <file>".to_string()),
            },
            InkfluxCliError::EmptyInput => CliError {
                code: "EMPTY_INPUT".to_string(),
                message: "Input contained no data".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            InkfluxCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: None,
            },
        }
    }
}
