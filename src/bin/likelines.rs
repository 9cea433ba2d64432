//! LikeLines CLI - Command-line interface for LikeLines
//!
//! Commands:
//! - heatmap: Compute the interest heat-map of an aggregate record
//! - keyframes: Rank the top-N keyframes of an aggregate record
//! - report: Produce a full interest report
//! - inspect: Summarize an aggregate record (duration, playback, series)
//! - motion: Convert motion analyzer output into a content-analysis record
//! - validate: Check an aggregate record's structure

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use likelines::config::AnalysisConfig;
use likelines::logging::init_logging;
use likelines::motion::MotionActivityProcessor;
use likelines::pipeline::LikeLinesProcessor;
use likelines::schema::RawAggregate;
use likelines::smoothing::Kernel;
use likelines::{ComputeError, LIKELINES_VERSION, PRODUCER_NAME};

/// LikeLines - Interest heat-maps and keyframes for videos
#[derive(Parser)]
#[command(name = "likelines")]
#[command(author = "LikeLines Contributors")]
#[command(version = LIKELINES_VERSION)]
#[command(about = "Turn video interaction data into heat-maps and keyframes", long_about = None)]
struct Cli {
    /// Analysis configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter (overrides the configuration; RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the interest heat-map of an aggregate record
    Heatmap {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Number of bins (defaults to the configured heat-map size)
        #[arg(long)]
        size: Option<usize>,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Rank the top-N keyframes of an aggregate record
    Keyframes {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Number of keyframes
        #[arg(short = 'n', long = "count", default_value = "5", allow_negative_numbers = true)]
        n: i64,

        /// Include the heat-map score of every keyframe
        #[arg(long)]
        scores: bool,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Produce a full interest report
    Report {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Number of keyframes
        #[arg(short = 'n', long = "count", default_value = "5")]
        n: usize,

        /// Video identifier recorded in the report
        #[arg(long)]
        video_id: Option<String>,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Summarize an aggregate record
    Inspect {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Include the per-second playback histogram
        #[arg(long)]
        histogram: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert motion analyzer output (one value per line) into an `mca` record
    Motion {
        /// Analyzer output file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Weight recorded for the series
        #[arg(long)]
        weight: Option<f64>,

        /// Activity clipping threshold
        #[arg(long, default_value = "32")]
        threshold: f64,
    },

    /// Check an aggregate record's structure
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Per-run overrides of the analysis configuration
#[derive(clap::Args)]
struct AnalysisArgs {
    /// Peak detection hysteresis
    #[arg(long)]
    delta: Option<f64>,

    /// Smoothing bandwidth in seconds
    #[arg(long)]
    bandwidth: Option<f64>,

    /// Smoothing kernel
    #[arg(long)]
    kernel: Option<KernelArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum KernelArg {
    Gaussian,
    Triangular,
    Epanechnikov,
}

impl From<KernelArg> for Kernel {
    fn from(arg: KernelArg) -> Self {
        match arg {
            KernelArg::Gaussian => Kernel::Gaussian,
            KernelArg::Triangular => Kernel::Triangular,
            KernelArg::Epanechnikov => Kernel::Epanechnikov,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// One value per line
    Lines,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), LikeLinesCliError> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.log_json {
        config.logging.json = true;
    }
    init_logging(&config.logging);

    match cli.command {
        Commands::Heatmap {
            input,
            size,
            analysis,
            output_format,
        } => cmd_heatmap(&input, size, apply_overrides(config, &analysis), output_format),
        Commands::Keyframes {
            input,
            n,
            scores,
            analysis,
            output_format,
        } => cmd_keyframes(&input, n, scores, apply_overrides(config, &analysis), output_format),
        Commands::Report {
            input,
            n,
            video_id,
            analysis,
        } => cmd_report(&input, n, video_id, apply_overrides(config, &analysis)),
        Commands::Inspect {
            input,
            histogram,
            json,
        } => cmd_inspect(&input, histogram, json, config),
        Commands::Motion {
            input,
            weight,
            threshold,
        } => cmd_motion(&input, weight, threshold),
        Commands::Validate { input, json } => cmd_validate(&input, json),
    }
}

fn cmd_heatmap(
    input: &Path,
    size: Option<usize>,
    config: AnalysisConfig,
    output_format: OutputFormat,
) -> Result<(), LikeLinesCliError> {
    let processor = LikeLinesProcessor::with_config(config)?;
    let snapshot = processor.snapshot(&read_input(input)?)?;

    let heatmap = match size {
        Some(size) => processor.heatmap(&snapshot, size),
        None => processor.heatmap_default(&snapshot),
    };
    info!(
        bins = heatmap.len(),
        duration_estimate = snapshot.duration_estimate(),
        "computed heat-map"
    );

    print!("{}", format_values(&heatmap, &output_format)?);
    Ok(())
}

fn cmd_keyframes(
    input: &Path,
    n: i64,
    scores: bool,
    config: AnalysisConfig,
    output_format: OutputFormat,
) -> Result<(), LikeLinesCliError> {
    let processor = LikeLinesProcessor::with_config(config)?;
    let snapshot = processor.snapshot(&read_input(input)?)?;

    if scores {
        let keyframes = processor.keyframes(&snapshot, usize::try_from(n).unwrap_or(0))?;
        info!(keyframes = keyframes.len(), "ranked keyframes");
        let output = match output_format {
            OutputFormat::Json => serde_json::to_string(&keyframes)? + "\n",
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&keyframes)? + "\n",
            OutputFormat::Lines => keyframes
                .iter()
                .map(|k| format!("{}\t{}\n", k.timecode, k.score))
                .collect(),
        };
        print!("{}", output);
    } else {
        let timecodes = processor.top_n_keyframes(&snapshot, n)?;
        info!(keyframes = timecodes.len(), "ranked keyframes");
        print!("{}", format_values(&timecodes, &output_format)?);
    }
    Ok(())
}

fn cmd_report(
    input: &Path,
    n: usize,
    video_id: Option<String>,
    config: AnalysisConfig,
) -> Result<(), LikeLinesCliError> {
    let processor = LikeLinesProcessor::with_config(config)?;
    let report = processor.report(&read_input(input)?, n, video_id)?;
    println!("{}", report);
    Ok(())
}

fn cmd_inspect(
    input: &Path,
    histogram: bool,
    json: bool,
    config: AnalysisConfig,
) -> Result<(), LikeLinesCliError> {
    let processor = LikeLinesProcessor::with_config(config)?;
    let snapshot = processor.snapshot(&read_input(input)?)?;

    let report = InspectReport {
        producer: PRODUCER_NAME.to_string(),
        version: LIKELINES_VERSION.to_string(),
        duration_estimate: snapshot.duration_estimate(),
        time_watched: snapshot.time_watched(),
        liked_points: snapshot.liked_points().len(),
        sessions: snapshot.playbacks().len(),
        segments: snapshot.playbacks().iter().map(|s| s.len()).sum(),
        series: snapshot
            .content_series()
            .map(|s| SeriesSummary {
                name: s.name.clone(),
                kind: s.kind.to_string(),
                weight: s.weight,
                values: s.values.len(),
            })
            .collect(),
        histogram: histogram.then(|| snapshot.playback_histogram()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Aggregate Summary");
        println!("=================");
        println!("Duration estimate: {} s", report.duration_estimate);
        println!("Time watched:      {:.1} s", report.time_watched);
        println!("Liked points:      {}", report.liked_points);
        println!(
            "Playback:          {} sessions, {} segments",
            report.sessions, report.segments
        );

        if !report.series.is_empty() {
            println!("\nContent analysis:");
            for series in &report.series {
                println!(
                    "  - {} ({}, weight {}): {} values",
                    series.name, series.kind, series.weight, series.values
                );
            }
        }

        if let Some(histogram) = &report.histogram {
            println!("\nPlayback histogram:");
            for (second, count) in histogram.iter().enumerate() {
                println!("  {:>6} {}", second, count);
            }
        }
    }

    Ok(())
}

fn cmd_motion(input: &Path, weight: Option<f64>, threshold: f64) -> Result<(), LikeLinesCliError> {
    let processor = MotionActivityProcessor::with_clipping_threshold(threshold)?;
    let scores = processor.process_output(&read_input(input)?)?;
    info!(frames = scores.len(), "processed motion analyzer output");

    let record = MotionActivityProcessor::into_record(scores, weight);
    println!("{}", serde_json::to_string(&record)?);
    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), LikeLinesCliError> {
    let raw = RawAggregate::from_json(&read_input(input)?)?;
    let issues = raw.validation_issues();

    let report = ValidationReport {
        liked_points: raw.liked_points.len(),
        sessions: raw.playbacks.len(),
        series: raw.mca.len(),
        valid: issues.is_empty(),
        errors: issues.iter().map(|e| e.to_string()).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Liked points: {}", report.liked_points);
        println!("Sessions:     {}", report.sessions);
        println!("MCA series:   {}", report.series);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - {}", err);
            }
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(LikeLinesCliError::ValidationFailed(report.errors.len()))
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, LikeLinesCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            warn!("reading input from an interactive terminal; end it with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn apply_overrides(mut config: AnalysisConfig, args: &AnalysisArgs) -> AnalysisConfig {
    if let Some(delta) = args.delta {
        config.peak_delta = delta;
    }
    if let Some(bandwidth) = args.bandwidth {
        config.smoothing.bandwidth = bandwidth;
    }
    if let Some(kernel) = args.kernel {
        config.smoothing.kernel = kernel.into();
    }
    config
}

fn format_values(values: &[f64], format: &OutputFormat) -> Result<String, LikeLinesCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(values)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(values)? + "\n"),
        OutputFormat::Lines => Ok(values.iter().map(|v| format!("{}\n", v)).collect()),
    }
}

// Error types

#[derive(Debug)]
enum LikeLinesCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for LikeLinesCliError {
    fn from(e: io::Error) -> Self {
        LikeLinesCliError::Io(e)
    }
}

impl From<ComputeError> for LikeLinesCliError {
    fn from(e: ComputeError) -> Self {
        LikeLinesCliError::Compute(e)
    }
}

impl From<serde_json::Error> for LikeLinesCliError {
    fn from(e: serde_json::Error) -> Self {
        LikeLinesCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LikeLinesCliError> for CliError {
    fn from(e: LikeLinesCliError) -> Self {
        match e {
            LikeLinesCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            LikeLinesCliError::Compute(ComputeError::InvalidArgument(msg)) => CliError {
                code: "INVALID_ARGUMENT".to_string(),
                message: msg,
                hint: Some("Check --delta, --bandwidth and the configuration file".to_string()),
            },
            LikeLinesCliError::Compute(ComputeError::MalformedInput(msg)) => CliError {
                code: "MALFORMED_INPUT".to_string(),
                message: msg,
                hint: Some("Run 'likelines validate' for details".to_string()),
            },
            LikeLinesCliError::Compute(ComputeError::ParseError(msg)) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Expected one number per line".to_string()),
            },
            LikeLinesCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            LikeLinesCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            LikeLinesCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} structural problems found", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct InspectReport {
    producer: String,
    version: String,
    duration_estimate: usize,
    time_watched: f64,
    liked_points: usize,
    sessions: usize,
    segments: usize,
    series: Vec<SeriesSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    histogram: Option<Vec<f64>>,
}

#[derive(serde::Serialize)]
struct SeriesSummary {
    name: String,
    kind: String,
    weight: f64,
    values: usize,
}

#[derive(serde::Serialize)]
struct ValidationReport {
    liked_points: usize,
    sessions: usize,
    series: usize,
    valid: bool,
    errors: Vec<String>,
}
