/// SoundReaver — extracts sound effects from the PC version of Soul Reaver 2
///
/// Architecture:
///   soundreaver-smf     — SMF container format parser
///   soundreaver-extract — dedup, output planning, pipeline
///   this crate          — CLI, archive discovery, WAV encoding

mod wav;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use soundreaver_extract::{Container, ExtractOptions};
use tracing_subscriber::EnvFilter;

use wav::WavEncoder;

#[derive(Parser, Debug)]
#[command(
    name = "soundreaver",
    version,
    about = "Extracts sound effects from Soul Reaver 2 *.smf archives"
)]
struct Cli {
    /// Directory scanned for *.smf archives
    #[arg(long, default_value = "input")]
    input: PathBuf,

    /// Output root for the extracted .wav files
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Keep only the first copy of each sound (most sounds repeat across
    /// the archives of one game)
    #[arg(long)]
    unique: bool,

    /// Group the sounds into folders named after their source archive
    #[arg(long)]
    group: bool,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let archives = discover_archives(&cli.input)?;
    if archives.is_empty() {
        bail!(
            "No *.smf archives found in {}.\n\
             The archives live in the \"pcenglish\" folder inside bigfile.dat; \
             the \"Soul Spiral\" tool can unpack it:\n\
             https://www.thelostworlds.net/Software/Soul_Spiral.html",
            cli.input.display()
        );
    }
    tracing::info!(
        "Found {} archive(s) in {}",
        archives.len(),
        cli.input.display()
    );

    let loaded = archives
        .iter()
        .map(|path| {
            let id = archive_id(path);
            let data = fs::read(path)
                .with_context(|| format!("Reading {}", path.display()))?;
            Ok((id, data))
        })
        .collect::<Result<Vec<_>>>()?;
    let containers: Vec<Container<'_>> = loaded
        .iter()
        .map(|(id, data)| Container::new(id, data))
        .collect();

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("Creating output directory {}", cli.output.display()))?;

    let options = ExtractOptions {
        dedup_enabled: cli.unique,
        group_by_container: cli.group,
        output_root: Some(cli.output.clone()),
    };
    let mut encoder = WavEncoder;
    let summary = soundreaver_extract::run(&containers, &options, &mut encoder);

    tracing::info!(
        "Done: {} archive(s) processed, {} failed; {} sound(s) kept, {} duplicate(s) skipped, {} encode failure(s)",
        summary.containers_processed,
        summary.containers_failed,
        summary.clips_kept,
        summary.clips_skipped,
        summary.clips_failed
    );

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(path, json)
            .with_context(|| format!("Writing report to {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}

/// Naming prefix for a container: the archive's file stem.
fn archive_id(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Find `*.smf` files (extension matched case-insensitively) in `dir`,
/// sorted by path so dedup's first-write-wins order is reproducible.
fn discover_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Reading input directory {}", dir.display()))?;

    let mut found = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_smf = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("smf"))
            == Some(true);
        if is_smf {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}
