//! vidset - dataset pipeline CLI.
//!
//! Usage:
//!   vds convert              Convert the TSV manifest to the JSON lookup
//!   vds download [NAMES]...  Download archives (all when no names given)
//!   vds extract [NAMES]...   Extract downloaded archives
//!   vds cleanup              Keep only retained extensions in the dataset
//!   vds list                 Show available, downloaded, and extracted files
//!   vds run                  Full pipeline: convert, download, extract, cleanup
//!   vds --help               Show help

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use vidset_clean::{
    AlwaysConfirm, CleanupEngine, ConfirmationProvider, FileSystem, InteractiveConfirm,
    RealFileSystem,
};
use vidset_core::{CleanupConfig, RetentionPolicy, ScanError, extension_token};
use vidset_extract::{extract_all, extract_named, find_archives};
use vidset_fetch::Downloader;
use vidset_manifest::{LinkTable, load_manifest};

#[derive(Parser)]
#[command(
    name = "vidset",
    version,
    about = "Dataset pipeline: manifest conversion, archive download, extraction, and cleanup",
    long_about = "vidset turns a tab-separated manifest of dataset file names and CDN \
                  links into a lookup table, downloads the archives it names, extracts \
                  them, and trims the extracted tree down to a retained extension set \
                  (default: .mp4)."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert the TSV manifest to the JSON lookup file
    Convert {
        /// Input TSV manifest with file_name and cdn_link columns
        #[arg(short, long, default_value = "dataset_links.tsv")]
        manifest: PathBuf,

        /// Output JSON lookup file
        #[arg(short, long, default_value = "dataset_links.json")]
        links_file: PathBuf,
    },

    /// Download archives named in the lookup file
    Download {
        /// Archive names to download (all when empty)
        names: Vec<String>,

        /// JSON lookup file produced by `convert`
        #[arg(short, long, default_value = "dataset_links.json")]
        links_file: PathBuf,

        /// Directory downloads are written into
        #[arg(short, long, default_value = "downloads")]
        downloads_dir: PathBuf,
    },

    /// Extract downloaded archives into the dataset directory
    Extract {
        /// Archive names to extract (all found when empty)
        names: Vec<String>,

        /// Directory holding the downloaded archives
        #[arg(short, long, default_value = "downloads")]
        downloads_dir: PathBuf,

        /// Destination tree for extracted files
        #[arg(short = 'o', long, default_value = "dataset")]
        dataset_dir: PathBuf,
    },

    /// Delete every extracted file outside the retained extension set
    Cleanup {
        /// Directory tree to clean
        #[arg(short = 'o', long, default_value = "dataset")]
        dataset_dir: PathBuf,

        /// Extension to keep (repeatable)
        #[arg(short, long = "keep-ext", default_value = ".mp4")]
        keep_ext: Vec<String>,

        /// Report intended deletions without performing them
        #[arg(long)]
        dry_run: bool,

        /// Skip the interactive confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Maximum paths shown in the dry-run preview
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List available, downloaded, and extracted files
    List {
        /// JSON lookup file produced by `convert`
        #[arg(short, long, default_value = "dataset_links.json")]
        links_file: PathBuf,

        /// Directory holding the downloaded archives
        #[arg(short, long, default_value = "downloads")]
        downloads_dir: PathBuf,

        /// Extracted dataset tree
        #[arg(short = 'o', long, default_value = "dataset")]
        dataset_dir: PathBuf,
    },

    /// Full pipeline: convert, download all, extract all, cleanup
    Run {
        /// Input TSV manifest
        #[arg(short, long, default_value = "dataset_links.tsv")]
        manifest: PathBuf,

        /// JSON lookup file
        #[arg(short, long, default_value = "dataset_links.json")]
        links_file: PathBuf,

        /// Directory downloads are written into
        #[arg(short, long, default_value = "downloads")]
        downloads_dir: PathBuf,

        /// Destination tree for extracted files
        #[arg(short = 'o', long, default_value = "dataset")]
        dataset_dir: PathBuf,

        /// Extension to keep during cleanup (repeatable)
        #[arg(short, long = "keep-ext", default_value = ".mp4")]
        keep_ext: Vec<String>,
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
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let success = match cli.command {
        Command::Convert {
            manifest,
            links_file,
        } => run_convert(&manifest, &links_file),
        Command::Download {
            names,
            links_file,
            downloads_dir,
        } => run_download(&names, &links_file, &downloads_dir),
        Command::Extract {
            names,
            downloads_dir,
            dataset_dir,
        } => run_extract(&names, &downloads_dir, &dataset_dir),
        Command::Cleanup {
            dataset_dir,
            keep_ext,
            dry_run,
            yes,
            limit,
            format,
        } => run_cleanup(&dataset_dir, &keep_ext, dry_run, yes, limit, format),
        Command::List {
            links_file,
            downloads_dir,
            dataset_dir,
        } => run_list(&links_file, &downloads_dir, &dataset_dir),
        Command::Run {
            manifest,
            links_file,
            downloads_dir,
            dataset_dir,
            keep_ext,
        } => run_pipeline(
            &manifest,
            &links_file,
            &downloads_dir,
            &dataset_dir,
            &keep_ext,
        ),
    };

    if !success {
        eprintln!("Some operations failed");
        std::process::exit(1);
    }
    Ok(())
}

/// Convert the TSV manifest into the JSON lookup file.
fn run_convert(manifest: &Path, links_file: &Path) -> bool {
    let table = match load_manifest(manifest) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("Error converting manifest: {err}");
            return false;
        }
    };
    if let Err(err) = table.save(links_file) {
        eprintln!("Error writing lookup file: {err}");
        return false;
    }
    println!("Converted {} entries", table.len());
    println!("Created {}", links_file.display());
    true
}

/// Download the requested archives (all when `names` is empty).
fn run_download(names: &[String], links_file: &Path, downloads_dir: &Path) -> bool {
    let table = match LinkTable::load(links_file) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!("Run `vidset convert` first.");
            return false;
        }
    };

    let names: Vec<String> = if names.is_empty() {
        table.names().map(str::to_string).collect()
    } else {
        names.to_vec()
    };
    if names.is_empty() {
        println!("Nothing to download");
        return true;
    }

    eprintln!("Downloading {} file(s)...", names.len());
    let downloader = Downloader::new(downloads_dir);
    let report = downloader.download_all(&table, &names, |progress| {
        draw_bytes_progress(progress.name, progress.received, progress.total);
    });
    finish_progress_line();

    for (name, err) in &report.failed {
        eprintln!("  {name}: {err}");
    }
    println!(
        "Download complete: {}/{} files downloaded successfully",
        report.succeeded.len(),
        report.attempted()
    );
    report.is_success()
}

/// Extract the requested archives (all found when `names` is empty).
fn run_extract(names: &[String], downloads_dir: &Path, dataset_dir: &Path) -> bool {
    let report = if names.is_empty() {
        let archives = find_archives(downloads_dir);
        if archives.is_empty() {
            eprintln!("No archives found in {}", downloads_dir.display());
            return false;
        }
        eprintln!("Found {} archive(s)", archives.len());
        extract_all(downloads_dir, dataset_dir, |progress| {
            draw_count_progress(progress.archive, progress.entries_done, progress.entries_total);
        })
    } else {
        extract_named(names, downloads_dir, dataset_dir, |progress| {
            draw_count_progress(progress.archive, progress.entries_done, progress.entries_total);
        })
    };
    finish_progress_line();

    for (name, err) in &report.failed {
        eprintln!("  {name}: {err}");
    }
    println!(
        "Extraction complete: {}/{} archives extracted successfully",
        report.succeeded.len(),
        report.attempted()
    );
    report.is_success()
}

/// Clean the dataset tree down to the retained extensions.
fn run_cleanup(
    dataset_dir: &Path,
    keep_ext: &[String],
    dry_run: bool,
    yes: bool,
    limit: usize,
    format: OutputFormat,
) -> bool {
    let policy = RetentionPolicy::new(keep_ext);
    let config = match CleanupConfig::builder()
        .root(dataset_dir)
        .policy(policy)
        .dry_run(dry_run)
        .preview_limit(limit)
        .build()
    {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid cleanup configuration: {err}");
            return false;
        }
    };
    let engine = CleanupEngine::new(RealFileSystem::new(), config);

    eprintln!("Scanning {}...", dataset_dir.display());
    let scan = match engine.scan() {
        Ok(scan) => scan,
        Err(err @ ScanError::RootNotFound { .. }) => {
            eprintln!("{err}");
            return false;
        }
        Err(err) => {
            eprintln!("Scan failed: {err}");
            return false;
        }
    };

    let summary = scan.summary();
    println!("{summary}");

    if dry_run {
        let preview = scan.preview(limit);
        println!("=== DRY RUN - files that would be removed: ===");
        for path in preview.iter() {
            println!("  {}", path.display());
        }
        if preview.remaining > 0 {
            println!("  ... and {} more file(s)", preview.remaining);
        }
        return true;
    }

    if scan.to_remove.is_empty() {
        println!("No files to remove!");
        return true;
    }

    let prompt = format!(
        "This will delete {} file(s) ({})",
        summary.remove_count,
        humansize::format_size(summary.total_remove_bytes, humansize::BINARY)
    );
    let confirmed = if yes {
        AlwaysConfirm::new().confirm(&prompt)
    } else {
        InteractiveConfirm::new().confirm(&prompt)
    };
    if !confirmed {
        println!("Cancelled");
        return true;
    }

    let outcome = engine.execute_with_progress(&scan, confirmed, |progress| {
        draw_count_progress("Removing", progress.completed, progress.total);
    });
    finish_progress_line();

    match format {
        OutputFormat::Text => {
            for err in &outcome.errors {
                eprintln!("  {err}");
            }
            println!("{}", outcome.summary());
            println!(
                "Cleanup complete! {} retained file(s) remaining",
                outcome.kept_remaining
            );
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("Failed to render outcome: {err}");
                return false;
            }
        },
    }
    outcome.is_clean()
}

/// Show what is available, downloaded, and extracted.
fn run_list(links_file: &Path, downloads_dir: &Path, dataset_dir: &Path) -> bool {
    match LinkTable::load(links_file) {
        Ok(table) => {
            println!("Available for download: {} file(s)", table.len());
            for (index, name) in table.names().take(10).enumerate() {
                println!("  {}. {name}", index + 1);
            }
            if table.len() > 10 {
                println!("  ... and {} more file(s)", table.len() - 10);
            }
        }
        Err(_) => {
            println!(
                "No lookup file at {}. Run `vidset convert` first.",
                links_file.display()
            );
        }
    }

    let archives = find_archives(downloads_dir);
    println!();
    println!("Downloaded: {} archive(s)", archives.len());
    for archive in archives.iter().take(5) {
        if let Some(name) = archive.file_name() {
            println!("  {}", name.to_string_lossy());
        }
    }
    if archives.len() > 5 {
        println!("  ... and {} more archive(s)", archives.len() - 5);
    }

    println!();
    show_dataset_summary(dataset_dir);
    true
}

/// Aggregate file count, size, and top extensions of the dataset tree.
fn show_dataset_summary(dataset_dir: &Path) {
    let fs = RealFileSystem::new();
    if !fs.dir_exists(dataset_dir) {
        println!("No extracted dataset at {}", dataset_dir.display());
        return;
    }
    let files = match fs.walk_files(dataset_dir) {
        Ok(files) => files,
        Err(err) => {
            eprintln!("Could not inspect {}: {err}", dataset_dir.display());
            return;
        }
    };

    let total_bytes: u64 = files.iter().filter_map(|entry| entry.size).sum();
    let mut by_extension: HashMap<String, usize> = HashMap::new();
    for entry in &files {
        let token = extension_token(&entry.path);
        let label = if token.is_empty() {
            "(no extension)".to_string()
        } else {
            token.to_string()
        };
        *by_extension.entry(label).or_default() += 1;
    }
    let mut counts: Vec<_> = by_extension.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    println!(
        "Extracted: {} file(s), {}",
        files.len(),
        humansize::format_size(total_bytes, humansize::BINARY)
    );
    for (extension, count) in counts.into_iter().take(5) {
        println!("  {extension}: {count}");
    }
}

/// Full pipeline with sequential-AND stage semantics: a failed stage
/// skips the rest.
fn run_pipeline(
    manifest: &Path,
    links_file: &Path,
    downloads_dir: &Path,
    dataset_dir: &Path,
    keep_ext: &[String],
) -> bool {
    eprintln!("Running full pipeline...");

    println!("=== STEP 1: Converting manifest ===");
    let mut success = run_convert(manifest, links_file);

    if success {
        println!("=== STEP 2: Downloading files ===");
        success = run_download(&[], links_file, downloads_dir);
    }
    if success {
        println!("=== STEP 3: Extracting archives ===");
        success = run_extract(&[], downloads_dir, dataset_dir);
    }
    if success {
        println!("=== STEP 4: Cleaning up extracted files ===");
        success = run_cleanup(
            dataset_dir,
            keep_ext,
            false,
            true,
            vidset_core::DEFAULT_PREVIEW_LIMIT,
            OutputFormat::Text,
        );
    }

    if success {
        println!("All operations completed successfully");
    }
    success
}

/// Inline stderr progress bar for byte-counted work.
fn draw_bytes_progress(label: &str, done: u64, total: Option<u64>) {
    match total {
        Some(total) if total > 0 => {
            let ratio = done as f64 / total as f64;
            eprint!(
                "\r{label} {} {} / {}",
                make_bar(ratio, 20),
                format_size(done),
                format_size(total)
            );
        }
        _ => eprint!("\r{label} {}", format_size(done)),
    }
    let _ = std::io::stderr().flush();
}

/// Inline stderr progress bar for item-counted work.
fn draw_count_progress(label: &str, done: usize, total: usize) {
    let ratio = if total > 0 {
        done as f64 / total as f64
    } else {
        0.0
    };
    eprint!("\r{label} {} {done}/{total}", make_bar(ratio, 20));
    let _ = std::io::stderr().flush();
}

/// Terminate an inline progress line.
fn finish_progress_line() {
    eprintln!();
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
