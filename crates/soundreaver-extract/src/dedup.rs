//! Content fingerprinting and duplicate tracking
//!
//! Most sounds are repeated across the archives of one game, so extraction
//! optionally keeps only the first occurrence of each payload. Identity is
//! decided by a BLAKE3 digest of the raw sample bytes; the registry lives
//! for exactly one pipeline run.

use std::collections::HashMap;

/// Digest of a clip's raw sample bytes. 256 bits; equal payloads always
/// produce equal fingerprints, and collisions between unequal payloads are
/// negligible for this use.
pub type Fingerprint = blake3::Hash;

/// Fingerprint a payload. Pure; the empty payload hashes to the BLAKE3
/// empty-input digest rather than erroring.
pub fn fingerprint(raw_samples: &[u8]) -> Fingerprint {
    blake3::hash(raw_samples)
}

/// Outcome of a dedup check for one clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Keep,
    /// The payload was already kept under this output identifier.
    SkipDuplicate(String),
}

/// Run-scoped registry of fingerprints already kept. First write wins: the
/// first clip in processing order to produce a fingerprint becomes the
/// canonical copy, and later matches are skipped pointing back at it.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashMap<Fingerprint, String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide keep/skip for one clip. With `dedup_enabled` false the
    /// registry is neither consulted nor updated — duplicates across
    /// containers are legitimate in the format, skipping them is a policy.
    pub fn consider(
        &mut self,
        fp: Fingerprint,
        candidate: &str,
        dedup_enabled: bool,
    ) -> Decision {
        if !dedup_enabled {
            return Decision::Keep;
        }
        match self.seen.get(&fp) {
            Some(original) => Decision::SkipDuplicate(original.clone()),
            None => {
                self.seen.insert(fp, candidate.to_owned());
                Decision::Keep
            }
        }
    }

    /// Number of distinct payloads registered so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
