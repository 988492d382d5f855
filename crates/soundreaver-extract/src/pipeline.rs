//! Batch extraction pipeline
//!
//! For each container in order: parse, fingerprint each clip, ask the
//! deduplicator, plan the destination and hand the clip to the encoder.
//! Every failure is local to its clip or container and lands in the
//! [`RunSummary`] — a multi-file batch always processes everything it can.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use soundreaver_smf::SmfContainer;

use crate::dedup::{fingerprint, Decision, Deduplicator};
use crate::encoder::ClipEncoder;
use crate::plan::OutputPlanner;

/// One input archive: caller-owned bytes plus the source file stem used as
/// naming prefix.
#[derive(Debug, Clone, Copy)]
pub struct Container<'a> {
    pub id: &'a str,
    pub data: &'a [u8],
}

impl<'a> Container<'a> {
    pub fn new(id: &'a str, data: &'a [u8]) -> Self {
        Self { id, data }
    }
}

/// Per-run policy switches.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Skip clips whose payload was already kept earlier in the run.
    pub dedup_enabled: bool,
    /// Place each container's clips in their own output subdirectory.
    pub group_by_container: bool,
    /// Output root; `output` when unset.
    pub output_root: Option<PathBuf>,
}

impl ExtractOptions {
    fn planner(&self) -> OutputPlanner {
        let root = self
            .output_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("output"));
        OutputPlanner::new(root, self.group_by_container)
    }
}

/// Outcome for one syntactically valid clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClipOutcome {
    Kept { path: PathBuf },
    SkippedDuplicate { original: String },
    EncodeFailed { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipRecord {
    pub container: String,
    pub sound_id: i16,
    #[serde(flatten)]
    pub outcome: ClipOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerFailure {
    pub container: String,
    pub reason: String,
}

/// Two kept clips resolved to the same destination — the later write
/// overwrites the earlier one on disk. Advisory, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathCollision {
    pub path: PathBuf,
    pub first: String,
    pub second: String,
}

/// Aggregate result of one pipeline run.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub containers_processed: usize,
    pub containers_failed: usize,
    pub clips_kept: usize,
    pub clips_skipped: usize,
    pub clips_failed: usize,
    pub records: Vec<ClipRecord>,
    pub failures: Vec<ContainerFailure>,
    pub collisions: Vec<PathCollision>,
}

impl RunSummary {
    fn record(&mut self, container: &str, sound_id: i16, outcome: ClipOutcome) {
        match &outcome {
            ClipOutcome::Kept { .. } => self.clips_kept += 1,
            ClipOutcome::SkippedDuplicate { .. } => self.clips_skipped += 1,
            ClipOutcome::EncodeFailed { .. } => self.clips_failed += 1,
        }
        self.records.push(ClipRecord {
            container: container.to_owned(),
            sound_id,
            outcome,
        });
    }
}

/// Run the extraction pipeline over `containers` in order. The dedup
/// registry lives exactly as long as this call, so repeated runs over the
/// same input are independent and reproducible.
pub fn run(
    containers: &[Container<'_>],
    options: &ExtractOptions,
    encoder: &mut dyn ClipEncoder,
) -> RunSummary {
    let planner = options.planner();
    let mut dedup = Deduplicator::new();
    let mut summary = RunSummary::default();
    // Destination -> base name of the clip first planned there.
    let mut planned: HashMap<PathBuf, String> = HashMap::new();

    for container in containers {
        tracing::info!("Loading container: {}...", container.id);

        let smf = match SmfContainer::parse(container.data) {
            Ok(smf) => smf,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", container.id, e);
                summary.containers_failed += 1;
                summary.failures.push(ContainerFailure {
                    container: container.id.to_owned(),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        tracing::info!("  {} sounds", smf.clip_count());

        let mut dir_ready = !options.group_by_container;
        let mut container_failed = false;

        for clip in smf.clips() {
            let clip = match clip {
                Ok(clip) => clip,
                Err(e) => {
                    // Alignment is lost; the rest of this container is
                    // unreachable. Clips already emitted stay emitted.
                    tracing::warn!("Skipping rest of {}: {}", container.id, e);
                    summary.failures.push(ContainerFailure {
                        container: container.id.to_owned(),
                        reason: e.to_string(),
                    });
                    container_failed = true;
                    break;
                }
            };

            let base = planner.base_name(container.id, clip.sound_id);
            let fp = fingerprint(clip.raw_samples);

            match dedup.consider(fp, &base, options.dedup_enabled) {
                Decision::Keep => {}
                Decision::SkipDuplicate(original) => {
                    tracing::debug!("ID: {}\tduplicate of {} - skipped", clip.sound_id, original);
                    summary.record(
                        container.id,
                        clip.sound_id,
                        ClipOutcome::SkippedDuplicate { original },
                    );
                    continue;
                }
            }

            if !dir_ready {
                let dir = planner.container_dir(container.id);
                if let Err(e) = encoder.ensure_dir(&dir) {
                    tracing::warn!("Cannot provision {}: {}", dir.display(), e);
                    summary.record(
                        container.id,
                        clip.sound_id,
                        ClipOutcome::EncodeFailed {
                            path: planner.clip_path(container.id, clip.sound_id),
                            reason: e.to_string(),
                        },
                    );
                    continue;
                }
                dir_ready = true;
            }

            let dest = planner.clip_path(container.id, clip.sound_id);
            if let Some(first) = planned.insert(dest.clone(), base.clone()) {
                tracing::warn!(
                    "Path collision: {} overwrites {}",
                    base,
                    first
                );
                summary.collisions.push(PathCollision {
                    path: dest.clone(),
                    first,
                    second: base.clone(),
                });
            }

            match encoder.encode(clip.raw_samples, clip.sample_rate, &dest) {
                Ok(()) => {
                    tracing::debug!(
                        "ID: {}\trate: {}\tlen: {}\t-> {}",
                        clip.sound_id,
                        clip.sample_rate,
                        clip.payload_len,
                        dest.display()
                    );
                    summary.record(container.id, clip.sound_id, ClipOutcome::Kept { path: dest });
                }
                Err(e) => {
                    tracing::warn!("Encode failed for {}: {}", dest.display(), e);
                    summary.record(
                        container.id,
                        clip.sound_id,
                        ClipOutcome::EncodeFailed {
                            path: dest,
                            reason: e.to_string(),
                        },
                    );
                }
            }
        }

        if container_failed {
            summary.containers_failed += 1;
        } else {
            summary.containers_processed += 1;
        }
    }

    summary
}
