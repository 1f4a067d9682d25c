//! filterstack: apply stacked image filters from the command line.
//!
//! Uploads an image into an in-memory session, applies each requested
//! filter in order (every filter runs on the previous result), and
//! writes the session's current image as PNG. Useful for:
//!
//! - Previewing what a filter stack does to a given image
//! - Timing individual filters on large inputs
//! - Checking which identifiers fall back to the default glow
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin filterstack -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use filterstack_core::{
    FilterError, FilterKind, MemoryStore, Notice, SessionKey, Studio, StudioConfig, codec,
};

/// Apply stacked spatial filters to an image.
///
/// Each `--filter` runs on the output of the previous one. Identifiers
/// not in the catalog (see `--list`) apply the default glow.
#[derive(Parser)]
#[command(name = "filterstack", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, WebP).
    #[arg(required_unless_present = "list")]
    image_path: Option<PathBuf>,

    /// Filter to apply; repeat to stack.
    #[arg(short, long = "filter", value_name = "ID")]
    filters: Vec<String>,

    /// Reset to the original image after applying filters.
    #[arg(long)]
    reset: bool,

    /// Write the current image (processed, else original) as PNG.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the session record as JSON instead of a step report.
    #[arg(long)]
    json: bool,

    /// Print the filter catalog and exit.
    #[arg(long)]
    list: bool,

    /// Reject uploads larger than this many bytes.
    #[arg(long)]
    max_upload_bytes: Option<usize>,

    /// Full studio config as a JSON string.
    ///
    /// When provided, `--max-upload-bytes` is ignored. The JSON must be
    /// a valid `StudioConfig` serialization; missing fields take their
    /// defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build a [`StudioConfig`] from CLI arguments.
fn config_from_cli(cli: &Cli) -> Result<StudioConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(StudioConfig {
        max_upload_bytes: cli.max_upload_bytes,
        ..StudioConfig::default()
    })
}

/// One timed step of the session.
struct Step {
    label: String,
    duration: Duration,
}

fn print_catalog() {
    println!("{:<16} {}", "ID", "Filter");
    println!("{}", "-".repeat(40));
    for kind in FilterKind::ALL {
        println!("{:<16} {}", kind.id(), kind.label());
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Print the user-facing message and log the failure at a level that
/// matches its cause.
fn report_failure(step: &str, e: &FilterError) {
    eprintln!("{}", e.user_message());
    if e.is_user_error() {
        tracing::warn!(error = %e, "{step} rejected");
    } else {
        tracing::error!(error = %e, "{step} failed");
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.list {
        print_catalog();
        return ExitCode::SUCCESS;
    }

    let Some(ref image_path) = cli.image_path else {
        eprintln!("An image path is required.");
        return ExitCode::FAILURE;
    };

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let studio = Studio::with_config(MemoryStore::new(), config);
    tracing::debug!(config = ?studio.config(), "studio ready");
    let mut steps = Vec::with_capacity(cli.filters.len() + 2);

    let start = Instant::now();
    let key: SessionKey = match studio.upload(None, &file_name(image_path), &image_bytes) {
        Ok(key) => key,
        Err(e) => {
            report_failure("upload", &e);
            return ExitCode::FAILURE;
        }
    };
    eprintln!("{}", Notice::Uploaded);
    steps.push(Step {
        label: format!("upload {}", image_path.display()),
        duration: start.elapsed(),
    });

    for id in &cli.filters {
        let kind = FilterKind::from_id(id);
        if kind == FilterKind::Glow {
            tracing::info!(id = %id, "unrecognized filter id, applying glow");
        }
        let start = Instant::now();
        if let Err(e) = studio.apply_filter(Some(&key), id) {
            report_failure(kind.id(), &e);
            return ExitCode::FAILURE;
        }
        eprintln!("{}", Notice::FilterApplied);
        steps.push(Step {
            label: format!("filter {kind}"),
            duration: start.elapsed(),
        });
    }

    if cli.reset {
        let start = Instant::now();
        if let Err(e) = studio.reset(Some(&key)) {
            report_failure("reset", &e);
            return ExitCode::FAILURE;
        }
        eprintln!("{}", Notice::Reset);
        steps.push(Step {
            label: "reset".to_owned(),
            duration: start.elapsed(),
        });
    }

    if let Some(ref output) = cli.output {
        let written = studio
            .current_image(Some(&key))
            .and_then(|img| codec::encode_png(&img));
        match written.map(|png| std::fs::write(output, &png).map(|()| png.len())) {
            Ok(Ok(len)) => eprintln!("PNG written to {} ({len} bytes)", output.display()),
            Ok(Err(e)) => {
                eprintln!("Error writing {}: {e}", output.display());
                return ExitCode::FAILURE;
            }
            Err(e) => {
                eprintln!("Error encoding output: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(&studio.view(Some(&key))) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing session record: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_report(&steps);
    }

    ExitCode::SUCCESS
}

/// Print per-step timings.
fn print_report(steps: &[Step]) {
    println!("{:<40} {:>12}", "Step", "Time (ms)");
    println!("{}", "-".repeat(54));
    let mut total = Duration::ZERO;
    for step in steps {
        total += step.duration;
        println!(
            "{:<40} {:>10.3}ms",
            step.label,
            step.duration.as_secs_f64() * 1000.0
        );
    }
    println!("{}", "-".repeat(54));
    println!("{:<40} {:>10.3}ms", "total", total.as_secs_f64() * 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_takes_last_component() {
        assert_eq!(file_name(Path::new("/tmp/photos/cat.JPG")), "cat.JPG");
        assert_eq!(file_name(Path::new("/")), "");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_file_name_keeps_extension() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/tmp/caf\xe9.png"));
        let name = file_name(path);
        assert!(!name.is_empty());
        assert!(StudioConfig::default().is_allowed(&name));
    }
}
