//! Batch generation.
//!
//! Phases:
//! - **Collect** - expand directories (jwalk) into marked identifiers
//! - **Process** - run every request concurrently on the tokio runtime
//! - **Write** - one `<stem>.jsx` module per asset under the modules dir

use anyhow::{Context, Result, bail};
use jwalk::WalkDir;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::core::{AssetIdentifier, AssetKind, MARKER};
use crate::logger::ProgressLine;
use crate::pipeline::{Claim, ImagePipeline};
use crate::{debug, log};

const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Counts reported after a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub raster: usize,
    pub vector: usize,
    pub skipped: usize,
}

/// Generate modules for `paths` into `modules_dir`.
pub async fn build_modules(
    pipeline: Arc<ImagePipeline>,
    paths: &[String],
    modules_dir: &Path,
) -> Result<BuildSummary> {
    let requests = collect_requests(paths);
    let mut summary = BuildSummary::default();

    let mut claimed = Vec::with_capacity(requests.len());
    for raw in requests {
        match pipeline.classify(&raw) {
            Claim::Raster => summary.raster += 1,
            Claim::Vector => summary.vector += 1,
            Claim::Ignored => {
                log!("build"; "pipeline disabled for this build mode");
                return Ok(summary);
            }
            Claim::Unclaimed => {
                debug!("build"; "skipping {}", raw);
                summary.skipped += 1;
                continue;
            }
        }
        claimed.push(raw);
    }

    tokio::fs::create_dir_all(modules_dir)
        .await
        .with_context(|| format!("Failed to create {}", modules_dir.display()))?;

    let progress = ProgressLine::new(&[
        (AssetKind::Raster.name(), summary.raster),
        (AssetKind::Vector.name(), summary.vector),
    ]);

    // Names are assigned in request order so collisions resolve the same way
    // on every run, whatever order the tasks finish in.
    let mut names = FxHashSet::default();
    let mut tasks = JoinSet::new();
    for raw in claimed {
        let file_name = module_file_name(&AssetIdentifier::parse(&raw), &mut names);
        let pipeline = Arc::clone(&pipeline);
        tasks.spawn(async move {
            let result = pipeline.process(&raw).await;
            (raw, file_name, result)
        });
    }

    let mut failed = 0;
    while let Some(joined) = tasks.join_next().await {
        let (raw, file_name, result) = joined.context("build task panicked")?;
        match result {
            Ok(Some(module)) => {
                let path = modules_dir.join(file_name);
                tokio::fs::write(&path, &module.code)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                debug!("build"; "{} -> {}", raw, path.display());
                progress.inc(module.kind.name());
            }
            Ok(None) => summary.skipped += 1,
            Err(e) => {
                log!("error"; "{}", e);
                failed += 1;
            }
        }
    }
    progress.finish();

    if failed > 0 {
        bail!("{failed} asset(s) failed");
    }
    Ok(summary)
}

/// Expand paths into identifiers carrying the marker.
///
/// Directories are scanned recursively for supported extensions; other paths
/// are taken as identifiers and get the marker appended when missing.
pub fn collect_requests(paths: &[String]) -> Vec<String> {
    let default = [".".to_string()];
    let paths = if paths.is_empty() { &default[..] } else { paths };

    let mut requests = Vec::new();
    for raw in paths {
        let id = AssetIdentifier::parse(raw);
        if Path::new(&id.path).is_dir() {
            requests.extend(
                scan_dir(Path::new(&id.path))
                    .into_iter()
                    .map(|file| with_marker(&file.display().to_string())),
            );
        } else {
            requests.push(with_marker(raw));
        }
    }
    requests
}

fn scan_dir(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| AssetKind::from_extension(&format!(".{ext}")).is_some())
        })
        .collect();
    files.sort();
    files
}

/// Append the marker parameter unless already present.
pub fn with_marker(raw: &str) -> String {
    let id = AssetIdentifier::parse(raw);
    if id.params.has(MARKER) {
        raw.to_string()
    } else if id.query.is_empty() {
        format!("{raw}?{MARKER}")
    } else {
        format!("{raw}&{MARKER}")
    }
}

/// `<stem>.jsx`, then `<stem>.<ext>.jsx`, then `<stem>.<ext>.<n>.jsx` for
/// every further asset sharing the stem.
fn module_file_name(id: &AssetIdentifier, used: &mut FxHashSet<String>) -> String {
    let stem = id.stem();
    let ext = id.extension();

    [format!("{stem}.jsx"), format!("{stem}{ext}.jsx")]
        .into_iter()
        .chain((2usize..).map(|n| format!("{stem}{ext}.{n}.jsx")))
        .find(|name| used.insert(name.clone()))
        .unwrap_or_default()
}
