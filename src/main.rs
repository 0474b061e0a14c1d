use clap::{Parser, Subcommand};
use imgconv::config::{self, ConverterConfig};
use imgconv::convert::ProgressEvent;
use imgconv::delivery::{Delivery, DirectoryDelivery, deliver_each};
use imgconv::imaging::{Dimensions, ImageCodec, OutputFormat, Quality, RustCodec};
use imgconv::output;
use imgconv::package::{ARCHIVE_NAME, DOCUMENT_NAME};
use imgconv::session::Session;
use imgconv::types::InputImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "imgconv")]
#[command(about = "Batch image converter: JPG, PNG, WebP and GIF, with zip and PDF output")]
#[command(long_about = "\
Batch image converter: JPG, PNG, WebP and GIF, with zip and PDF output

Each invocation loads one drop of files. Directories are expanded one level
deep, sorted by name. Files of an unsupported type are skipped, and at most
input.max_files files (default 10) are accepted per drop.

Outputs are named after their source with the new extension:
  photo.jpeg  →  photo.png
  converted-images.zip   (convert --zip)
  converted-images.pdf   (pdf)

Run 'imgconv gen-config' to generate a documented imgconv.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILE_NAME, global = true)]
    config: PathBuf,

    /// Output directory
    #[arg(long, default_value = "converted", global = true)]
    output: PathBuf,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert images to one format and quality
    Convert {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Target format (overrides conversion.format)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Quality 10-100, snapped to steps of 5 (overrides conversion.quality)
        #[arg(long, value_parser = clap::value_parser!(u32).range(10..=100))]
        quality: Option<u32>,

        /// Bundle the results into a single zip instead of separate files
        #[arg(long)]
        zip: bool,

        /// Print a JSON report instead of progress lines
        #[arg(long)]
        json: bool,
    },
    /// Lay out the original images one per page into a PDF
    Pdf {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Load images and report what would be converted
    Check {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Print a stock imgconv.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let codec = RustCodec::new();
    let delivery = DirectoryDelivery::new(&cli.output);

    match cli.command {
        Command::Convert {
            inputs,
            format,
            quality,
            zip,
            json,
        } => {
            let config = prepare(&cli.config)?;
            let mut request = config.conversion.request();
            if let Some(format) = format {
                request.format = format;
            }
            if let Some(quality) = quality {
                request.quality = Quality::new(quality);
            }

            let mut session = load_drop(&inputs, &config, !json);
            if session.selected_images().is_empty() {
                eprintln!("Nothing to convert");
                return Ok(());
            }

            let (tx, printer) = if json {
                (None, None)
            } else {
                println!("{}", output::format_request(&request));
                let (tx, printer) = spawn_printer();
                (Some(tx), Some(printer))
            };
            session.convert_selected(&codec, request, tx);
            if let Some(printer) = printer {
                let _ = printer.join();
            }

            let mut paths = Vec::new();
            let mut archive = None;
            if zip {
                if session.results().is_empty() {
                    eprintln!("No converted images to archive");
                } else {
                    let bytes = session.pack_results_archive().inspect_err(|e| {
                        tracing::error!("failed to create {}: {}", ARCHIVE_NAME, e);
                    })?;
                    let path = delivery.deliver(&bytes, ARCHIVE_NAME)?;
                    if !json {
                        println!("{}", output::format_written(&path, bytes.len()));
                    }
                    archive = Some(path);
                }
            } else {
                paths = deliver_each(&delivery, session.results())?;
                if !json {
                    for (path, result) in paths.iter().zip(session.results()) {
                        println!("{}", output::format_written(path, result.bytes.len()));
                    }
                }
            }

            if json {
                let report =
                    output::ConversionReport::new(request, session.last_run(), &paths, archive);
                println!("{}", output::format_json_report(&report)?);
            } else {
                println!();
                output::print_batch_summary(session.last_run());
            }
        }
        Command::Pdf { inputs } => {
            let config = prepare(&cli.config)?;
            let session = load_drop(&inputs, &config, true);
            if session.selected_images().is_empty() {
                eprintln!("Nothing to lay out");
                return Ok(());
            }

            let (tx, printer) = spawn_printer();
            let document = session.pack_selected_document(&codec, Some(tx));
            let _ = printer.join();

            let bytes = document.inspect_err(|e| {
                tracing::error!("failed to create {}: {}", DOCUMENT_NAME, e);
            })?;
            let path = delivery.deliver(&bytes, DOCUMENT_NAME)?;
            println!("{}", output::format_written(&path, bytes.len()));
        }
        Command::Check { inputs } => {
            let config = prepare(&cli.config)?;
            let session = load_drop(&inputs, &config, true);
            let entries: Vec<_> = session
                .images()
                .iter()
                .map(|image| {
                    let dims = codec.decode(image.bytes()).map(|r| Dimensions::of(&r));
                    (image.clone(), dims)
                })
                .collect();
            output::print_check(&entries);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load and validate the config, then size the thread pool from it.
fn prepare(path: &Path) -> Result<ConverterConfig, config::ConfigError> {
    let config = config::load_config(path)?;
    init_thread_pool(&config.processing);
    Ok(config)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("imgconv={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Print progress events as they arrive. The thread ends when every sender
/// has been dropped.
fn spawn_printer() -> (Sender<ProgressEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_progress_event(&event) {
                println!("{}", line);
            }
        }
    });
    (tx, printer)
}

/// Read the command-line inputs as one drop into a fresh session.
fn load_drop(inputs: &[PathBuf], config: &ConverterConfig, report: bool) -> Session {
    let mut files = Vec::new();
    for path in expand_inputs(inputs) {
        match InputImage::from_path(&path) {
            Ok(image) => files.push(image),
            Err(e) => {
                tracing::warn!("{}", e);
                eprintln!("Skipped {}: {}", path.display(), e);
            }
        }
    }

    let mut session = Session::new();
    let drop_report = session.add_drop(files, &config.input);
    if report {
        output::print_drop_report(&drop_report);
    }
    session
}

/// Expand directories one level deep, sorted by file name. Plain file
/// arguments are kept in the order given.
fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(list_dir(input));
        } else {
            files.push(input.clone());
        }
    }
    files
}

fn list_dir(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("cannot read {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}
