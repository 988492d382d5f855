//! Encoder collaborator seam
//!
//! The pipeline hands every kept clip to a [`ClipEncoder`] and never learns
//! how the playable file is produced. The original tool shelled out to
//! `sox.exe` here; the CLI crate replaces that with in-process WAV writing,
//! and tests substitute a recording double.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encoder rejected clip: {0}")]
    Rejected(String),
}

/// Turns one extracted clip into a playable file at `dest`.
pub trait ClipEncoder {
    /// Encode `raw_samples` (16-bit signed mono PCM at `sample_rate`) into a
    /// playable file at `dest`. A failure only fails this clip; the pipeline
    /// carries on with the next one.
    fn encode(
        &mut self,
        raw_samples: &[u8],
        sample_rate: u32,
        dest: &Path,
    ) -> Result<(), EncodeError>;

    /// Provision an output directory before clips are planned into it.
    /// Called once per container, only in grouped mode.
    fn ensure_dir(&mut self, _dir: &Path) -> Result<(), EncodeError> {
        Ok(())
    }
}
