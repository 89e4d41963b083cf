//! Pipeline execution implementation.

use super::lock::RootLock;
use super::types::{
    CancellationToken, DuplicateItem, RunCounts, RunSummary, SupersededItem,
};
use crate::core::album::{AlbumStore, PhotoRecord};
use crate::core::classify::{Classification, Classifier, MediaItem, MediaKind};
use crate::core::config::{AlbumSpec, OrganizerConfig};
use crate::core::dedup::{
    resolve_same_name, Deduplicator, DigestStatus, NameCandidate, SameNameResolution,
};
use crate::core::digest::{ContentDigest, ContentHasher};
use crate::core::history::{HistoryRepository, ScanHistoryEntry, ScanStatus};
use crate::core::manifest::Manifest;
use crate::core::organize::{
    ensure_dir, Area, DateBucketer, PathAllocator, PlacementDecision, PlacementExecutor,
    ReviewReason, SkipReason,
};
use crate::core::quality::{Inspection, QualityInspector, Resolution};
use crate::core::recovery::{RecoveryLog, RecoveryLogEntry};
use crate::error::{ConfigError, ItemError, OrganizerError, Result, StoreError};
use crate::events::{
    null_sender, Event, EventSender, ItemEvent, PipelineEvent, PipelinePhase, PlacementProgress,
};
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Builder for pipeline configuration
#[derive(Default)]
pub struct PipelineBuilder {
    config: OrganizerConfig,
    destination: Option<PathBuf>,
    album: Option<String>,
    tags: Vec<String>,
    sources: Vec<String>,
    cancel: CancellationToken,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: OrganizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Base directory the album root is created in
    pub fn destination(mut self, base: impl Into<PathBuf>) -> Self {
        self.destination = Some(base.into());
        self
    }

    /// Album name; falls back to the batch default when not set
    pub fn album(mut self, name: impl Into<String>) -> Self {
        self.album = Some(name.into());
        self
    }

    /// Tags for every photo of the run; falls back to the batch default tags
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Manifest files or directories the run was fed from, kept in the
    /// scan history
    pub fn sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Validate the configuration and build the pipeline.
    /// Nothing on disk is touched.
    pub fn build(self) -> Result<OrganizerPipeline> {
        self.config.validate()?;

        let base = self.destination.unwrap_or_default();
        if !base.is_dir() {
            return Err(ConfigError::DestinationNotFound { path: base }.into());
        }

        let album = self
            .config
            .resolve_album(self.album.as_deref(), &self.tags)?;

        Ok(OrganizerPipeline {
            classifier: Classifier::from_config(&self.config),
            inspector: QualityInspector::new(self.config.min_width, self.config.min_height),
            hasher: ContentHasher::new(),
            bucketer: DateBucketer::new(self.config.folder_structure),
            executor: PlacementExecutor::new(self.config.operation),
            config: self.config,
            base,
            album,
            sources: self.sources,
            cancel: self.cancel,
        })
    }
}

/// The organizer pipeline.
///
/// One pipeline writes one album. Items go through three phases:
/// discovering (metadata, date filter, classification, image inspection),
/// resolving (same-name resolution between images) and placing (hashing,
/// content dedup, bucketing, allocation, copy, logging). A failing item never
/// aborts the run.
pub struct OrganizerPipeline {
    config: OrganizerConfig,
    base: PathBuf,
    album: AlbumSpec,
    sources: Vec<String>,
    cancel: CancellationToken,
    classifier: Classifier,
    inspector: QualityInspector,
    hasher: ContentHasher,
    bucketer: DateBucketer,
    executor: PlacementExecutor,
}

/// An item that made it through discovery
#[derive(Debug)]
struct Discovered {
    source: PathBuf,
    /// `None` for junk
    media: Option<MediaItem>,
    modified: DateTime<Local>,
    inspection: Option<Inspection>,
}

impl Discovered {
    /// Source file name, byte for byte
    fn file_name(&self) -> OsString {
        self.source
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_else(|| OsString::from("unknown"))
    }

    fn is_image(&self) -> bool {
        self.media.as_ref().map(|m| m.kind) == Some(MediaKind::Image)
    }
}

/// Decision for one item plus what the album metadata needs
struct Outcome {
    decision: PlacementDecision,
    digest: Option<ContentDigest>,
    /// Below the minimum size, whether or not it went to review
    low_quality: bool,
}

impl Outcome {
    fn new(decision: PlacementDecision) -> Self {
        Self {
            decision,
            digest: None,
            low_quality: false,
        }
    }
}

/// Mutable state of one run
struct RunState {
    run_id: String,
    album_root: PathBuf,
    recovery: RecoveryLog,
    album: AlbumStore,
    dedup: Deduplicator,
    placed_sources: HashSet<PathBuf>,
    allocator: PathAllocator,
    counts: RunCounts,
    superseded: Vec<SupersededItem>,
    duplicates: Vec<DuplicateItem>,
    errors: Vec<String>,
    cancelled: bool,
}

impl RunState {
    fn skip(&mut self, source: &Path, reason: SkipReason, events: &EventSender) {
        self.counts.skipped += 1;
        if reason == SkipReason::NotFound {
            tracing::warn!("Skipping {}: {}", source.display(), reason);
        } else {
            tracing::debug!("Skipping {}: {}", source.display(), reason);
        }
        events.send(Event::Item(ItemEvent::Skipped {
            source: source.to_path_buf(),
            reason,
        }));
    }

    fn fail(&mut self, source: &Path, error: ItemError, events: &EventSender) {
        self.counts.failed += 1;
        tracing::warn!("{}", error);
        let message = error.to_string();
        events.send(Event::Item(ItemEvent::Failed {
            source: source.to_path_buf(),
            message: message.clone(),
        }));
        self.errors.push(message);
    }

    fn store_failure(&mut self, error: StoreError) {
        self.counts.store_failures += 1;
        tracing::warn!("{}", error);
        self.errors.push(error.to_string());
    }
}

impl OrganizerPipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn album(&self) -> &AlbumSpec {
        &self.album
    }

    /// `<base>/<Album>`
    pub fn album_root(&self) -> PathBuf {
        self.base.join(&self.album.name)
    }

    /// Token that stops this pipeline between items
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the pipeline without events
    pub fn run(&self, manifest: &Manifest) -> Result<RunSummary> {
        self.run_with_events(manifest, &null_sender())
    }

    /// Run the pipeline with event reporting.
    ///
    /// Errors are only returned for problems found before the first item is
    /// touched; once items are being processed a summary is always returned.
    pub fn run_with_events(&self, manifest: &Manifest, events: &EventSender) -> Result<RunSummary> {
        let result = self.execute(manifest, events);
        if let Err(e) = &result {
            tracing::error!("Run not started: {}", e);
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    /// Run on a dedicated thread
    pub fn spawn(self, manifest: Manifest, events: EventSender) -> RunHandle {
        let token = self.cancel.clone();
        let handle = thread::spawn(move || self.run_with_events(&manifest, &events));
        RunHandle { token, handle }
    }

    fn execute(&self, manifest: &Manifest, events: &EventSender) -> Result<RunSummary> {
        let start_time = Instant::now();
        let started_at = Local::now();

        // Shared side files are checked before anything is created
        let recovery = RecoveryLog::open(&self.base)?;
        let mut history = HistoryRepository::open(&self.base)?;

        let album_root = self.album_root();
        ensure_dir(&album_root).map_err(|source| OrganizerError::Io {
            path: album_root.clone(),
            source,
        })?;
        let _lock = RootLock::acquire(&album_root)?;
        let album = AlbumStore::open(&album_root, &self.album)?;

        let (dedup, placed_sources) = if self.config.persist_digests {
            (
                Deduplicator::seeded(album.digests()),
                recovery.placed_sources(&self.album.name),
            )
        } else {
            (Deduplicator::new(), HashSet::new())
        };

        let run_id = HistoryRepository::generate_id();
        tracing::info!(
            "Run {} into {} ({} manifest entries)",
            run_id,
            album_root.display(),
            manifest.len()
        );
        events.send(Event::Pipeline(PipelineEvent::Started {
            run_id: run_id.clone(),
            total_items: manifest.len(),
        }));

        let mut state = RunState {
            run_id,
            album_root,
            recovery,
            album,
            dedup,
            placed_sources,
            allocator: PathAllocator::new(),
            counts: RunCounts::default(),
            superseded: Vec::new(),
            duplicates: Vec::new(),
            errors: Vec::new(),
            cancelled: false,
        };

        // Phase 1: Discovering
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Discovering,
        }));
        let discovered = self.discover(manifest, &mut state, events);

        // Phase 2: Resolving
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Resolving,
        }));
        let resolution = self.resolve(&discovered);

        // Phase 3: Placing
        if !state.cancelled {
            events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: PipelinePhase::Placing,
            }));
            self.place(&discovered, &resolution, &mut state, events);
        }

        let status = if state.cancelled {
            ScanStatus::Cancelled
        } else {
            ScanStatus::Completed
        };
        let duration_ms = start_time.elapsed().as_millis() as u64;

        let entry = ScanHistoryEntry {
            id: state.run_id.clone(),
            album: self.album.name.clone(),
            scan_time: started_at.timestamp(),
            sources: self.sources.clone(),
            counts: state.counts,
            duration_ms,
            status: status.clone(),
        };
        if let Err(e) = history.save_scan(&entry) {
            state.store_failure(e);
        }

        let summary = RunSummary {
            run_id: state.run_id,
            album: self.album.name.clone(),
            album_root: state.album_root,
            counts: state.counts,
            duration_ms,
            status,
            superseded: state.superseded,
            duplicates: state.duplicates,
            errors: state.errors,
        };

        let counts = &summary.counts;
        tracing::info!(
            "Run {} {}: {} copied, {} duplicates, {} superseded, {} junk, {} review, {} skipped, {} failed",
            summary.run_id,
            summary.status.as_str(),
            counts.copied,
            counts.duplicates,
            counts.superseded,
            counts.junk,
            counts.reviewed,
            counts.skipped,
            counts.failed
        );

        if summary.is_cancelled() {
            events.send(Event::Pipeline(PipelineEvent::Cancelled {
                summary: summary.clone(),
            }));
        } else {
            events.send(Event::Pipeline(PipelineEvent::Completed {
                summary: summary.clone(),
            }));
        }

        Ok(summary)
    }

    fn discover(
        &self,
        manifest: &Manifest,
        state: &mut RunState,
        events: &EventSender,
    ) -> Vec<Discovered> {
        let mut discovered = Vec::new();

        for source in manifest.images.iter().chain(manifest.videos.iter()) {
            if self.cancel.is_cancelled() {
                state.cancelled = true;
                break;
            }
            state.counts.processed += 1;

            let metadata = match fs::metadata(source) {
                Ok(metadata) if metadata.is_file() => metadata,
                _ => {
                    state.skip(source, SkipReason::NotFound, events);
                    continue;
                }
            };

            // Never feed the archive back into itself
            if source.starts_with(&state.album_root) {
                tracing::debug!("Ignoring {}: inside the album root", source.display());
                state.counts.ignored += 1;
                continue;
            }

            let modified = DateBucketer::timestamp_of(&metadata);
            if let Some(range) = self.config.date_range {
                if !range.contains(modified.date_naive()) {
                    tracing::debug!("Filtered {}: modified {}", source.display(), modified);
                    state.counts.filtered += 1;
                    continue;
                }
            }

            let (media, inspection) = match self.classifier.classify(source) {
                Classification::Ignored => {
                    tracing::debug!("Ignoring {}: unsupported type", source.display());
                    state.counts.ignored += 1;
                    continue;
                }
                Classification::Junk => (None, None),
                Classification::Image => (
                    self.classifier.media_item(source),
                    Some(self.inspector.inspect(source)),
                ),
                Classification::Video => (self.classifier.media_item(source), None),
            };

            discovered.push(Discovered {
                source: source.clone(),
                media,
                modified,
                inspection,
            });
        }

        tracing::debug!("Discovered {} items", discovered.len());
        discovered
    }

    fn resolve(&self, discovered: &[Discovered]) -> SameNameResolution {
        let candidates: Vec<NameCandidate> = discovered
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_image())
            .filter_map(|(index, item)| {
                let media = item.media.as_ref()?;
                Some(NameCandidate {
                    index,
                    base_name: media.base_name(),
                    resolution: item
                        .inspection
                        .as_ref()
                        .map(Inspection::resolution)
                        .unwrap_or(Resolution::UNREADABLE),
                })
            })
            .collect();

        let resolution = resolve_same_name(&candidates);
        if !resolution.superseded.is_empty() {
            tracing::info!(
                "{} images superseded by higher-resolution namesakes",
                resolution.superseded.len()
            );
        }
        resolution
    }

    fn place(
        &self,
        discovered: &[Discovered],
        resolution: &SameNameResolution,
        state: &mut RunState,
        events: &EventSender,
    ) {
        let total = discovered.len();

        for (index, item) in discovered.iter().enumerate() {
            if self.cancel.is_cancelled() {
                state.cancelled = true;
                break;
            }

            let outcome = self.decide(index, item, discovered, resolution, state);
            self.apply(item, outcome, state, events);

            events.send(Event::Pipeline(PipelineEvent::Progress(PlacementProgress {
                completed: index + 1,
                total,
                current_path: item.source.clone(),
            })));
        }
    }

    fn decide(
        &self,
        index: usize,
        item: &Discovered,
        discovered: &[Discovered],
        resolution: &SameNameResolution,
        state: &mut RunState,
    ) -> Outcome {
        if state.placed_sources.contains(&item.source) {
            return Outcome::new(PlacementDecision::Skip {
                reason: SkipReason::AlreadyProcessed,
            });
        }

        let areas = &self.config.areas;
        let file_name = item.file_name();

        if item.media.is_none() {
            return Outcome::new(PlacementDecision::Junk {
                dest_subpath: Path::new(&areas.junk).join(&file_name),
            });
        }

        if let Some(canonical) = resolution.superseded_by(index) {
            return Outcome::new(PlacementDecision::SupersedeDuplicate {
                dest_subpath: Path::new(&areas.junk).join(&file_name),
                superseded_by: discovered[canonical].source.clone(),
            });
        }

        let digest = match self.hasher.hash(&item.source) {
            Ok(digest) => digest,
            Err(e) => {
                tracing::warn!("{}", e);
                state.errors.push(e.to_string());
                return Outcome::new(PlacementDecision::Review {
                    dest_subpath: Path::new(&areas.review).join(&file_name),
                    reason: ReviewReason::HashFailure,
                });
            }
        };

        let mut low_quality = false;
        let decision = match state.dedup.check(&digest) {
            DigestStatus::DuplicateOf(original) => PlacementDecision::Duplicate {
                dest_subpath: Path::new(&areas.duplicates).join(&file_name),
                original,
            },
            DigestStatus::AlreadyArchived => PlacementDecision::Skip {
                reason: SkipReason::AlreadyArchived,
            },
            DigestStatus::FirstSeen => match &item.inspection {
                Some(inspection) if self.inspector.needs_review(inspection) => match inspection {
                    Inspection::Unreadable { reason } => {
                        let error = ItemError::Unreadable {
                            path: item.source.clone(),
                            reason: reason.clone(),
                        };
                        tracing::warn!("{}", error);
                        state.errors.push(error.to_string());
                        PlacementDecision::Review {
                            dest_subpath: Path::new(&areas.review).join(&file_name),
                            reason: ReviewReason::Unreadable,
                        }
                    }
                    Inspection::Readable(size) => {
                        low_quality = true;
                        if self.config.review_low_quality {
                            PlacementDecision::Review {
                                dest_subpath: Path::new(&areas.review).join(&file_name),
                                reason: ReviewReason::LowQuality(*size),
                            }
                        } else {
                            PlacementDecision::Place {
                                dest_subpath: self.bucketer.subdir(item.modified).join(&file_name),
                            }
                        }
                    }
                },
                _ => PlacementDecision::Place {
                    dest_subpath: self.bucketer.subdir(item.modified).join(&file_name),
                },
            },
        };

        Outcome {
            decision,
            digest: Some(digest),
            low_quality,
        }
    }

    fn apply(&self, item: &Discovered, outcome: Outcome, state: &mut RunState, events: &EventSender) {
        let Outcome {
            decision,
            digest,
            low_quality,
        } = outcome;

        let (Some(subpath), Some(area)) = (decision.dest_subpath(), decision.area()) else {
            if let PlacementDecision::Skip { reason } = &decision {
                state.skip(&item.source, *reason, events);
            }
            return;
        };

        let dir = match subpath.parent() {
            Some(parent) => state.album_root.join(parent),
            None => state.album_root.clone(),
        };
        let desired = subpath
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_else(|| item.file_name());
        let destination = state.allocator.allocate(&dir, &desired);

        if let Err(e) = self.executor.transfer(&item.source, &destination) {
            state.allocator.release(&destination);
            match e {
                ItemError::NotFound { .. } => {
                    state.skip(&item.source, SkipReason::NotFound, events)
                }
                other => state.fail(&item.source, other, events),
            }
            return;
        }

        match &decision {
            PlacementDecision::Place { .. } => state.counts.copied += 1,
            PlacementDecision::SupersedeDuplicate { superseded_by, .. } => {
                state.counts.superseded += 1;
                state.superseded.push(SupersededItem {
                    source: item.source.clone(),
                    canonical: superseded_by.clone(),
                    destination: destination.clone(),
                });
            }
            PlacementDecision::Duplicate { original, .. } => {
                state.counts.duplicates += 1;
                state.duplicates.push(DuplicateItem {
                    source: item.source.clone(),
                    original: original.clone(),
                    destination: destination.clone(),
                });
            }
            PlacementDecision::Junk { .. } => state.counts.junk += 1,
            PlacementDecision::Review { reason, .. } => {
                state.counts.reviewed += 1;
                tracing::info!("Review: {} ({})", item.source.display(), reason);
            }
            PlacementDecision::Skip { .. } => {}
        }

        // First-seen content is remembered and listed in the album
        if let (
            Some(digest),
            PlacementDecision::Place { .. } | PlacementDecision::Review { .. },
        ) = (digest, &decision)
        {
            state.dedup.record(digest, &destination);
            let photo = PhotoRecord {
                filename: destination
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                digest,
                tags: self.album.tags.clone(),
                flagged_for_review: low_quality || area == Area::Review,
            };
            if state.album.record(photo) {
                if let Err(e) = state.album.save() {
                    state.store_failure(e);
                }
            }
        }

        let mut entry = RecoveryLogEntry::now(&item.source, &destination, &self.album.name);
        entry.run_id = Some(state.run_id.clone());
        entry.area = Some(area);
        entry.operation = Some(self.executor.operation());
        entry.digest = digest;
        if let Err(e) = state.recovery.append(entry) {
            state.store_failure(e);
        }

        tracing::debug!(
            "{} -> {} ({})",
            item.source.display(),
            destination.display(),
            area
        );
        events.send(Event::Item(ItemEvent::Routed {
            source: item.source.clone(),
            destination,
            area,
        }));
    }
}

/// A run started with [`OrganizerPipeline::spawn`]
pub struct RunHandle {
    token: CancellationToken,
    handle: JoinHandle<Result<RunSummary>>,
}

impl RunHandle {
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Ask the run to stop after the current item
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the run to finish
    pub fn join(self) -> Result<RunSummary> {
        match self.handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::organize::FolderStructure;
    use chrono::TimeZone;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    fn set_mtime(path: &Path, year: i32, month: u32, day: u32) {
        let when = Local.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap();
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(when.into())
            .unwrap();
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 7]));
        buffer
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();
        set_mtime(&path, 2024, 8, 5);
        path
    }

    fn pipeline(base: &Path) -> OrganizerPipeline {
        OrganizerPipeline::builder()
            .destination(base)
            .album("Family")
            .build()
            .unwrap()
    }

    #[test]
    fn build_rejects_missing_destination() {
        let result = OrganizerPipeline::builder()
            .destination("/nonexistent/archive")
            .album("Family")
            .build();
        assert!(matches!(
            result,
            Err(OrganizerError::Config(ConfigError::DestinationNotFound { .. }))
        ));
    }

    #[test]
    fn build_requires_an_album() {
        let temp = TempDir::new().unwrap();
        let result = OrganizerPipeline::builder().destination(temp.path()).build();
        assert!(matches!(
            result,
            Err(OrganizerError::Config(ConfigError::MissingAlbum))
        ));
    }

    #[test]
    fn places_first_seen_images_by_date() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let image = write_png(src.path(), "IMG_1.png", 200, 150);

        let summary = pipeline(out.path())
            .run(&Manifest::new(vec![image], vec![]))
            .unwrap();

        assert_eq!(summary.counts.copied, 1);
        assert_eq!(summary.status, ScanStatus::Completed);
        assert!(out.path().join("Family/2024/08/IMG_1.png").exists());
        assert!(out.path().join("Family/Family.json").exists());
        assert!(out.path().join("recovery_log.json").exists());
        assert!(out.path().join("scan_history.json").exists());
        assert!(!out.path().join("Family/.organizer.lock").exists());
    }

    #[test]
    fn named_month_folders() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let image = write_png(src.path(), "a.png", 120, 120);

        let config = OrganizerConfig {
            folder_structure: FolderStructure::YearMonthNamed,
            ..Default::default()
        };
        OrganizerPipeline::builder()
            .config(config)
            .destination(out.path())
            .album("Family")
            .build()
            .unwrap()
            .run(&Manifest::new(vec![image], vec![]))
            .unwrap();

        assert!(out.path().join("Family/2024/08-August/a.png").exists());
    }

    #[test]
    fn missing_source_is_skipped_not_fatal() {
        let out = TempDir::new().unwrap();
        let summary = pipeline(out.path())
            .run(&Manifest::new(vec![PathBuf::from("/nonexistent/a.jpg")], vec![]))
            .unwrap();

        assert_eq!(summary.counts.processed, 1);
        assert_eq!(summary.counts.skipped, 1);
    }

    #[test]
    fn unreadable_image_goes_to_review() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let broken = src.path().join("broken.jpg");
        fs::write(&broken, b"not an image").unwrap();

        let summary = pipeline(out.path())
            .run(&Manifest::new(vec![broken], vec![]))
            .unwrap();

        assert_eq!(summary.counts.reviewed, 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("broken.jpg"));
        assert!(out.path().join("Family/review/broken.jpg").exists());
        let album = fs::read_to_string(out.path().join("Family/Family.json")).unwrap();
        assert!(album.contains("\"review\": true"));
    }

    #[test]
    fn small_images_can_stay_in_place_but_flagged() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let tiny = write_png(src.path(), "tiny.png", 40, 40);

        let config = OrganizerConfig {
            review_low_quality: false,
            ..Default::default()
        };
        let summary = OrganizerPipeline::builder()
            .config(config)
            .destination(out.path())
            .album("Family")
            .build()
            .unwrap()
            .run(&Manifest::new(vec![tiny], vec![]))
            .unwrap();

        assert_eq!(summary.counts.copied, 1);
        assert!(out.path().join("Family/2024/08/tiny.png").exists());
        let album = fs::read_to_string(out.path().join("Family/Family.json")).unwrap();
        assert!(album.contains("\"review\": true"));
    }

    #[test]
    fn videos_are_hashed_and_deduplicated() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let a = src.path().join("a.mov");
        let b = src.path().join("b.mov");
        fs::write(&a, b"same clip").unwrap();
        fs::write(&b, b"same clip").unwrap();
        set_mtime(&a, 2023, 12, 24);
        set_mtime(&b, 2023, 12, 24);

        let summary = pipeline(out.path())
            .run(&Manifest::new(vec![], vec![a, b.clone()]))
            .unwrap();

        assert_eq!(summary.counts.copied, 1);
        assert_eq!(summary.counts.duplicates, 1);
        assert_eq!(summary.duplicates[0].source, b);
        assert!(out.path().join("Family/2023/12/a.mov").exists());
        assert!(out.path().join("Family/duplicates/b.mov").exists());
    }

    #[test]
    fn cancelled_before_start_still_summarizes() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let image = write_png(src.path(), "a.png", 120, 120);

        let token = CancellationToken::new();
        let pipeline = OrganizerPipeline::builder()
            .destination(out.path())
            .album("Family")
            .cancellation_token(token.clone())
            .build()
            .unwrap();
        token.cancel();
        assert!(pipeline.cancellation_token().is_cancelled());
        let summary = pipeline.run(&Manifest::new(vec![image], vec![])).unwrap();

        assert!(summary.is_cancelled());
        assert_eq!(summary.counts.copied, 0);
        let history = HistoryRepository::open(out.path()).unwrap();
        assert_eq!(
            history.list_scans(1, 0).entries[0].status,
            ScanStatus::Cancelled
        );
    }
}
