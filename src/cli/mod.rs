//! # CLI Module
//!
//! Command-line interface for the media organizer.
//!
//! ## Usage
//! ```bash
//! # Organize a manifest into an album
//! media-organize organize manifest.json --dest ~/Archive --album Family
//!
//! # Walk source folders instead of reading a manifest
//! media-organize organize --walk ~/Camera --walk /media/sd --dest ~/Archive --album Trip
//!
//! # Build or extend a manifest without copying anything
//! media-organize scan ~/Camera --manifest manifest.json
//!
//! # Revert a run, list past runs, export for upload
//! media-organize undo --dest ~/Archive --run-id 5f0c...
//! media-organize history --dest ~/Archive
//! media-organize export ~/Archive/Family --target ~/Upload
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_organizer::core::classify::Classifier;
use media_organizer::core::config::{parse_tags, OrganizerConfig};
use media_organizer::core::export::{CleanExporter, ExportReport};
use media_organizer::core::history::HistoryRepository;
use media_organizer::core::manifest::{DirectoryWalker, Manifest, WalkConfig};
use media_organizer::core::organize::{Area, OperationMode};
use media_organizer::core::pipeline::{OrganizerPipeline, RunSummary};
use media_organizer::core::recovery::{undo_run, UndoReport};
use media_organizer::error::Result;
use media_organizer::events::{
    Event, EventChannel, EventReceiver, ItemEvent, PipelineEvent, WalkEvent,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// Media Organizer - one deduplicated, date-organized archive
#[derive(Parser, Debug)]
#[command(name = "media-organize")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the user config dir when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy media into an album, deduplicated and sorted by date
    Organize {
        /// Manifest files ({"images": [...], "videos": [...]})
        #[arg(required_unless_present = "walk")]
        manifests: Vec<PathBuf>,

        /// Walk a source directory instead of (or on top of) manifests
        #[arg(long)]
        walk: Vec<PathBuf>,

        /// Base directory the album folder is created in
        #[arg(short, long)]
        dest: PathBuf,

        /// Album name (falls back to the batch default album)
        #[arg(short, long)]
        album: Option<String>,

        /// Comma-separated tags for every photo of this run
        #[arg(short, long)]
        tags: Option<String>,

        /// Move files instead of copying them
        #[arg(long = "move")]
        move_files: bool,
    },

    /// Walk directories and write (or extend) a manifest
    Scan {
        /// Directories to walk
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Manifest file to write; existing entries are kept
        #[arg(short, long, default_value = "manifest.json")]
        manifest: PathBuf,

        /// Directory tree to leave out, usually the archive
        #[arg(long)]
        exclude: Option<PathBuf>,
    },

    /// Revert the files a run placed
    Undo {
        /// Base directory the run wrote into
        #[arg(short, long)]
        dest: PathBuf,

        /// Run id from the run summary or `history`
        #[arg(long)]
        run_id: String,
    },

    /// List past runs, newest first
    History {
        /// Base directory holding scan_history.json
        #[arg(short, long)]
        dest: PathBuf,

        #[arg(long, default_value = "20")]
        limit: usize,

        #[arg(long, default_value = "0")]
        offset: usize,
    },

    /// Copy organized albums into a clean folder for upload
    Export {
        /// Album folders to export
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Folder to copy into
        #[arg(long)]
        target: PathBuf,

        /// Also copy the duplicates, junk and review folders
        #[arg(long)]
        include_flagged: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    media_organizer::init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let term = Term::stderr();

    match cli.command {
        Commands::Organize {
            manifests,
            walk,
            dest,
            album,
            tags,
            move_files,
        } => {
            let mut config = config;
            if move_files {
                config.operation = OperationMode::Move;
            }
            let request = OrganizeRequest {
                manifests,
                walk,
                dest,
                album,
                tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
            };
            let summary = run_organize(&term, config, request, cli.output, cli.verbose)?;
            match cli.output {
                OutputFormat::Pretty => print_summary(&term, &summary, cli.verbose),
                OutputFormat::Json => print_json(&summary),
            }
        }
        Commands::Scan {
            paths,
            manifest,
            exclude,
        } => run_scan(&term, &config, paths, &manifest, exclude, cli.output)?,
        Commands::Undo { dest, run_id } => {
            let report = undo_run(&dest, &run_id)?;
            match cli.output {
                OutputFormat::Pretty => print_undo(&term, &run_id, &report),
                OutputFormat::Json => print_json(&report),
            }
        }
        Commands::History {
            dest,
            limit,
            offset,
        } => run_history(&term, &dest, limit, offset, cli.output)?,
        Commands::Export {
            sources,
            target,
            include_flagged,
        } => {
            let report = CleanExporter::from_config(&config)
                .include_flagged(include_flagged)
                .export(&sources, &target)?;
            match cli.output {
                OutputFormat::Pretty => print_export(&term, &target, &report),
                OutputFormat::Json => print_json(&report),
            }
        }
    }

    Ok(())
}

/// Explicit `--config`, else the user config file when it exists, else defaults
fn load_config(explicit: Option<&Path>) -> Result<OrganizerConfig> {
    if let Some(path) = explicit {
        return Ok(OrganizerConfig::load(path)?);
    }
    match OrganizerConfig::default_location() {
        Some(path) if path.is_file() => {
            tracing::debug!("Using config {}", path.display());
            Ok(OrganizerConfig::load(&path)?)
        }
        _ => Ok(OrganizerConfig::default()),
    }
}

struct OrganizeRequest {
    manifests: Vec<PathBuf>,
    walk: Vec<PathBuf>,
    dest: PathBuf,
    album: Option<String>,
    tags: Vec<String>,
}

fn run_organize(
    term: &Term,
    config: OrganizerConfig,
    request: OrganizeRequest,
    output: OutputFormat,
    verbose: bool,
) -> Result<RunSummary> {
    if matches!(output, OutputFormat::Pretty) {
        print_header(term);
    }

    let sources: Vec<String> = request
        .manifests
        .iter()
        .chain(request.walk.iter())
        .map(|p| p.display().to_string())
        .collect();

    let walk_config = WalkConfig::from_config(&config);
    let classifier = Classifier::from_config(&config);

    // Validates everything before a file is read or written
    let mut builder = OrganizerPipeline::builder()
        .config(config)
        .destination(&request.dest)
        .tags(request.tags)
        .sources(sources);
    if let Some(album) = request.album {
        builder = builder.album(album);
    }
    let pipeline = builder.build()?;

    let (sender, receiver) = EventChannel::new();
    let progress = matches!(output, OutputFormat::Pretty).then(new_progress_bar);
    let renderer = spawn_renderer(receiver, progress, verbose);

    let mut manifest = Manifest::default();
    for (i, path) in request.manifests.iter().enumerate() {
        let loaded = Manifest::load(path)?;
        // A single manifest keeps its own order
        if i == 0 {
            manifest = loaded;
        } else {
            manifest.merge(loaded);
        }
    }
    if !request.walk.is_empty() {
        let walker = DirectoryWalker::new(walk_config.excluding(pipeline.album_root()), classifier);
        let walked = walker.walk_with_events(&request.walk, &sender)?;
        manifest.merge(walked);
    }

    let handle = pipeline.spawn(manifest, sender);
    let result = handle.join();
    renderer.join().ok();
    result
}

fn run_scan(
    term: &Term,
    config: &OrganizerConfig,
    paths: Vec<PathBuf>,
    manifest_path: &Path,
    exclude: Option<PathBuf>,
    output: OutputFormat,
) -> Result<()> {
    let mut walk_config = WalkConfig::from_config(config);
    if let Some(exclude) = exclude {
        walk_config = walk_config.excluding(exclude);
    }
    let walker = DirectoryWalker::new(walk_config, Classifier::from_config(config));

    let (sender, receiver) = EventChannel::new();
    let progress = matches!(output, OutputFormat::Pretty).then(new_spinner);
    let renderer = spawn_renderer(receiver, progress, false);

    let walked = walker.walk_with_events(&paths, &sender);
    drop(sender);
    renderer.join().ok();
    let walked = walked?;

    let mut manifest = Manifest::load_or_default(manifest_path)?;
    let before = manifest.len();
    manifest.merge(walked);
    manifest.save(manifest_path)?;

    match output {
        OutputFormat::Pretty => {
            term.write_line(&format!(
                "{} {} ({} images, {} videos, {} new)",
                style("✓").green().bold(),
                manifest_path.display(),
                style(manifest.images.len()).cyan(),
                style(manifest.videos.len()).cyan(),
                manifest.len().saturating_sub(before)
            ))
            .ok();
        }
        OutputFormat::Json => print_json(&manifest),
    }
    Ok(())
}

fn run_history(
    term: &Term,
    dest: &Path,
    limit: usize,
    offset: usize,
    output: OutputFormat,
) -> Result<()> {
    let history = HistoryRepository::open(dest)?;
    let page = history.list_scans(limit, offset);

    if let OutputFormat::Json = output {
        print_json(&page);
        return Ok(());
    }

    if page.entries.is_empty() {
        term.write_line("No runs recorded").ok();
        return Ok(());
    }
    for entry in &page.entries {
        let when = chrono::DateTime::from_timestamp(entry.scan_time, 0)
            .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        term.write_line(&format!(
            "{}  {}  {:<12} {:>5} copied {:>5} dup {:>5} skipped  {}",
            style(&entry.id).dim(),
            when,
            entry.album,
            entry.counts.copied,
            entry.counts.duplicates,
            entry.counts.skipped,
            entry.status.as_str()
        ))
        .ok();
    }
    term.write_line(&format!(
        "{}",
        style(format!("{} of {} runs", page.entries.len(), page.total_count)).dim()
    ))
    .ok();
    Ok(())
}

fn print_header(term: &Term) {
    term.write_line(&format!(
        "{} {}",
        style("Media Organizer").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();
}

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
}

fn new_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(bar_style(
        "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    ));
    pb
}

fn new_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(bar_style("{spinner:.green} {pos} media files {msg}"));
    pb
}

/// Render events on a separate thread until every sender is dropped
fn spawn_renderer(
    receiver: EventReceiver,
    progress: Option<ProgressBar>,
    verbose: bool,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress.as_ref() else {
                continue;
            };
            match event {
                Event::Walk(WalkEvent::Progress(p)) => {
                    pb.set_position(p.media_found as u64);
                    if verbose {
                        pb.set_message(p.current_path.display().to_string());
                    }
                }
                Event::Walk(WalkEvent::Completed { images, videos }) => {
                    pb.set_message(format!("found {} images, {} videos", images, videos));
                }
                Event::Pipeline(PipelineEvent::Started { total_items, .. }) => {
                    pb.set_length(total_items as u64);
                    pb.set_position(0);
                }
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Pipeline(PipelineEvent::Progress(p)) => {
                    pb.set_length(p.total as u64);
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Item(ItemEvent::Failed { message, .. }) => {
                    pb.println(format!("{} {}", style("✗").red(), message));
                }
                Event::Item(ItemEvent::Routed {
                    source,
                    area: Area::Review,
                    ..
                }) if verbose => {
                    pb.println(format!("{} review: {}", style("!").yellow(), source.display()));
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Cancelled { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
    })
}

fn print_summary(term: &Term, summary: &RunSummary, verbose: bool) {
    let counts = &summary.counts;
    let headline = if summary.is_cancelled() {
        format!("{} Run cancelled", style("!").yellow().bold())
    } else {
        format!("{} Run complete", style("✓").green().bold())
    };
    term.write_line(&headline).ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} items processed in {:.1}s into {}",
        style(counts.processed).cyan(),
        summary.duration_ms as f64 / 1000.0,
        style(summary.album_root.display()).bold()
    ))
    .ok();

    let rows = [
        ("copied", counts.copied),
        ("exact duplicates", counts.duplicates),
        ("superseded by a larger namesake", counts.superseded),
        ("junk", counts.junk),
        ("for review", counts.reviewed),
        ("skipped", counts.skipped),
        ("outside the date range", counts.filtered),
        ("unsupported", counts.ignored),
        ("failed", counts.failed),
    ];
    for (label, count) in rows.iter().filter(|(_, n)| *n > 0) {
        term.write_line(&format!("  {:>6} {}", style(count).cyan(), label))
            .ok();
    }

    if counts.store_failures > 0 {
        term.write_line(&format!(
            "  {} side-file writes failed; the recovery log may be incomplete",
            style(counts.store_failures).red()
        ))
        .ok();
    }

    if verbose {
        for item in &summary.superseded {
            term.write_line(&format!(
                "  {} {} (kept {})",
                style("○").dim(),
                item.source.display(),
                item.canonical.display()
            ))
            .ok();
        }
        for item in &summary.duplicates {
            term.write_line(&format!(
                "  {} {} = {}",
                style("○").dim(),
                item.source.display(),
                item.original.display()
            ))
            .ok();
        }
        for error in &summary.errors {
            term.write_line(&format!("  {} {}", style("✗").red(), error))
                .ok();
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style(format!(
            "Run id {}. Sources were not modified; `undo --run-id` reverts this run.",
            summary.run_id
        ))
        .dim()
    ))
    .ok();
}

fn print_undo(term: &Term, run_id: &str, report: &UndoReport) {
    term.write_line(&format!(
        "{} Undo of {}: {} removed, {} restored, {} already gone",
        style("✓").green().bold(),
        run_id,
        style(report.removed).cyan(),
        style(report.restored).cyan(),
        report.missing
    ))
    .ok();
    for error in &report.errors {
        term.write_line(&format!("  {} {}", style("✗").red(), error))
            .ok();
    }
}

fn print_export(term: &Term, target: &Path, report: &ExportReport) {
    term.write_line(&format!(
        "{} Exported {} files to {} ({} already there, {} folders skipped)",
        style("✓").green().bold(),
        style(report.copied).cyan(),
        target.display(),
        report.skipped_existing,
        report.skipped_folders
    ))
    .ok();
    for error in &report.errors {
        term.write_line(&format!("  {} {}", style("✗").red(), error))
            .ok();
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("Failed to serialize output: {}", e),
    }
}
