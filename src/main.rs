//! cxr-prep - Chest X-ray dataset preparation.
//!
//! Usage:
//!   cxr-prep fetch --id ID            Download and extract the dataset archive
//!   cxr-prep tree [PATH]              Print the directory structure
//!   cxr-prep stats [PATH]             Chart files per folder
//!   cxr-prep duplicates [ROOT]        Report duplicate images per class
//!   cxr-prep clean SRC DST            Rebuild the dataset without duplicates
//!   cxr-prep --help                   Show help

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cxr_prep_analyze::{ClassDuplicates, DuplicateConfig, DuplicateFinder, DuplicateReporter, scan_classes};
use cxr_prep_core::PrepConfig;
use cxr_prep_ops::{
    ClassPhase, ConflictPolicy, DatasetRebuilder, MirrorOutcome, drive_url, fetch_archive, mirror_split,
};
use cxr_prep_scan::{count_files, discover_classes, print_structure};

const BAR_WIDTH: usize = 40;
const THUMBNAIL_SIZE: (u32, u32) = (24, 10);

#[derive(Parser)]
#[command(
    name = "cxr-prep",
    version,
    about = "Prepare chest X-ray image datasets",
    long_about = "cxr-prep finds byte-identical images inside each class of a \
                  training split and rebuilds the dataset without them.\n\n\
                  The test split is copied unchanged."
)]
struct Cli {
    /// TOML config file (flags override its values)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download (if missing) and extract the dataset archive
    Fetch {
        /// Google Drive file id of the archive
        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        id: Option<String>,

        /// Direct URL of the archive
        #[arg(long)]
        url: Option<String>,

        /// Where the archive is stored
        #[arg(short, long, default_value = "ChestXRay2017.zip")]
        archive: PathBuf,

        /// Directory to extract into
        #[arg(short, long, default_value = "dataset")]
        dest: PathBuf,
    },

    /// Print the directory structure
    Tree {
        /// Directory to print
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Files listed per directory before the rest is collapsed
        #[arg(short = 'n', long)]
        max_files: Option<usize>,
    },

    /// Chart the number of files per folder
    Stats {
        /// Dataset root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Hide folders with fewer files than this
        #[arg(short, long)]
        min_files: Option<usize>,
    },

    /// Find duplicate images in each training class
    Duplicates {
        /// Dataset root (containing the train split)
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Scan classes in parallel
        #[arg(short, long)]
        parallel: bool,

        /// Example pairs shown per class
        #[arg(short = 'n', long)]
        max_examples: Option<usize>,

        /// Skip image thumbnails
        #[arg(long)]
        no_preview: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Rebuild the dataset without duplicate training images
    Clean {
        /// Source dataset root
        source: PathBuf,

        /// Destination dataset root
        dest: PathBuf,

        /// Scan classes in parallel
        #[arg(short, long)]
        parallel: bool,

        /// Example pairs shown per class
        #[arg(short = 'n', long)]
        max_examples: Option<usize>,

        /// Skip image thumbnails
        #[arg(long)]
        no_preview: bool,

        /// What to do with test files already at the destination
        #[arg(long, default_value = "overwrite")]
        mirror_policy: ConflictPolicy,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => PrepConfig::from_file(path)
            .with_context(|| format!("Invalid config file {}", path.display()))?,
        None => PrepConfig::default(),
    };

    match cli.command {
        Command::Fetch {
            id,
            url,
            archive,
            dest,
        } => {
            let url = match (url, id) {
                (Some(url), _) => url,
                (None, Some(id)) => drive_url(&id),
                (None, None) => bail!("Either --id or --url is required"),
            };
            run_fetch(&url, &archive, &dest)?;
        }
        Command::Tree { path, max_files } => {
            let max_files = max_files.unwrap_or(config.tree_max_files);
            print_structure(&path, max_files, &mut io::stdout().lock())?;
        }
        Command::Stats { path, min_files } => {
            if let Some(min_files) = min_files {
                config.min_files_per_dir = min_files;
            }
            run_stats(&config, &path)?;
        }
        Command::Duplicates {
            root,
            parallel,
            max_examples,
            no_preview,
            format,
        } => {
            apply_scan_flags(&mut config, parallel, max_examples);
            run_duplicates(&config, &root, no_preview, format)?;
        }
        Command::Clean {
            source,
            dest,
            parallel,
            max_examples,
            no_preview,
            mirror_policy,
        } => {
            apply_scan_flags(&mut config, parallel, max_examples);
            run_clean(&config, &source, &dest, no_preview, mirror_policy, cli.quiet)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn apply_scan_flags(config: &mut PrepConfig, parallel: bool, max_examples: Option<usize>) {
    config.parallel_scan |= parallel;
    if let Some(max_examples) = max_examples {
        config.max_examples = max_examples;
    }
}

/// Download and extract the archive.
fn run_fetch(url: &str, archive: &Path, dest: &Path) -> Result<()> {
    let stats = fetch_archive(url, archive, dest).context("Fetching dataset failed")?;
    println!(
        "Extracted {} files ({} directories) into {}",
        stats.files,
        stats.dirs,
        dest.display()
    );
    Ok(())
}

/// Print the per-folder file chart.
fn run_stats(config: &PrepConfig, path: &Path) -> Result<()> {
    let report = count_files(path, config.min_files_per_dir, &config.ignored_dirs)
        .context("Counting files failed")?;
    report.render(&mut io::stdout().lock(), BAR_WIDTH)?;
    Ok(())
}

/// Scan every training class for duplicates.
fn run_duplicates(config: &PrepConfig, root: &Path, no_preview: bool, format: OutputFormat) -> Result<()> {
    let train_root = config.train_root(root);
    let classes = resolve_classes(config, &train_root)?;
    let duplicates = scan(config, &train_root, &classes)?;

    match format {
        OutputFormat::Text => {
            let mut out = io::stdout().lock();
            reporter(config, no_preview).render_classes(&duplicates, &mut out)?;
            writeln!(out)?;
            writeln!(
                out,
                "{} duplicate pairs across {} classes ({} images hashed)",
                duplicates.total_pairs(),
                duplicates.len(),
                duplicates.total_files()
            )?;
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&duplicates)?);
        }
    }

    Ok(())
}

/// Full pipeline: scan, report, rebuild the train split, mirror the test split.
fn run_clean(
    config: &PrepConfig,
    source: &Path,
    dest: &Path,
    no_preview: bool,
    mirror_policy: ConflictPolicy,
    quiet: bool,
) -> Result<()> {
    let train_root = config.train_root(source);
    let classes = resolve_classes(config, &train_root)?;
    let duplicates = scan(config, &train_root, &classes)?;

    let reporter = reporter(config, no_preview);
    let mut out = io::stdout().lock();
    reporter.render_classes(&duplicates, &mut out)?;
    out.flush()?;

    let bar = rebuild_bar(classes.len(), quiet)?;
    let rebuilder = DatasetRebuilder::new(config.image_extensions.clone());
    let result = rebuilder.rebuild_with_progress(
        &train_root,
        &config.train_root(dest),
        &classes,
        &duplicates,
        |progress| match progress.phase {
            ClassPhase::Started => bar.set_message(progress.class.clone()),
            ClassPhase::Finished => bar.set_position(progress.classes_done as u64),
        },
    );
    bar.finish_and_clear();
    let summary = result.context("Rebuilding training split failed")?;

    match mirror_split(source, dest, &config.test_dir, mirror_policy).context("Copying test split failed")? {
        MirrorOutcome::Copied {
            destination, stats, ..
        } => {
            writeln!(
                out,
                "Test split copied to {} ({} files, {})",
                destination.display(),
                stats.files,
                format_size(stats.bytes)
            )?;
        }
        MirrorOutcome::NotFound { expected } => {
            writeln!(out, "Test split not found at {}", expected.display())?;
        }
    }

    writeln!(out)?;
    reporter.render_totals(&summary.tally, &mut out)?;
    writeln!(out, "Bytes copied: {}", format_size(summary.tally.bytes_copied))?;
    Ok(())
}

/// Classes from the config, or the subdirectories of the train split.
fn resolve_classes(config: &PrepConfig, train_root: &Path) -> Result<Vec<String>> {
    let classes = match &config.classes {
        Some(classes) => classes.clone(),
        None => discover_classes(train_root, &config.ignored_dirs)
            .with_context(|| format!("Cannot list classes in {}", train_root.display()))?,
    };
    if classes.is_empty() {
        warn!(root = %train_root.display(), "no classes found");
    } else {
        info!(count = classes.len(), classes = ?classes, "classes selected");
    }
    Ok(classes)
}

fn scan(config: &PrepConfig, train_root: &Path, classes: &[String]) -> Result<ClassDuplicates> {
    let dup_config = DuplicateConfig::builder()
        .extensions(config.image_extensions.clone())
        .build()?;
    let finder = DuplicateFinder::with_config(dup_config);

    eprintln!("Scanning {} classes in {}...", classes.len(), train_root.display());
    let duplicates = scan_classes(train_root, classes, &finder, config.parallel_scan)
        .context("Duplicate scan failed")?;
    Ok(duplicates)
}

fn reporter(config: &PrepConfig, no_preview: bool) -> DuplicateReporter {
    let thumbnail = (!no_preview).then_some(THUMBNAIL_SIZE);
    DuplicateReporter::new(config.max_examples).with_thumbnail(thumbnail)
}

/// Per-class progress bar on stderr.
fn rebuild_bar(classes: usize, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(classes as u64);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {prefix:.bold}▕{bar:30.blue}▏{pos}/{len} {msg}")?
            .progress_chars("█▓▒░  "),
    );
    bar.set_prefix("Copying");
    Ok(bar)
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
