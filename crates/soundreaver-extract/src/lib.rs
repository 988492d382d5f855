//! Extraction engine for SMF sound archives
//!
//! Orchestrates the steps between a parsed container and a playable file:
//!   dedup    — content fingerprinting and the run-wide duplicate registry
//!   plan     — output naming and placement rules
//!   pipeline — batch orchestration and run statistics
//!
//! Actual audio encoding stays behind the [`ClipEncoder`] trait so the
//! engine never touches the filesystem itself; the CLI supplies a WAV
//! implementation, tests supply a recording double.

pub mod dedup;
pub mod encoder;
pub mod plan;
pub mod pipeline;

pub use dedup::{fingerprint, Decision, Deduplicator, Fingerprint};
pub use encoder::{ClipEncoder, EncodeError};
pub use plan::OutputPlanner;
pub use pipeline::{
    run, ClipOutcome, ClipRecord, Container, ContainerFailure, ExtractOptions, PathCollision,
    RunSummary,
};
