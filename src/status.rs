use crate::errors::AppResult;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Snapshot of the on-disk output tree.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub total_files: u64,
    pub total_bytes: u64,
    /// CSV count per collection type directory
    pub by_type: BTreeMap<String, u64>,
    /// CSV count per `level1/level2/level3` region
    pub by_region: BTreeMap<String, u64>,
    /// CSV count per variable directory
    pub by_variable: BTreeMap<String, u64>,
    /// Earliest interval start seen in filenames, `YYYYMMDD`
    pub earliest: Option<String>,
    /// Latest interval start seen in filenames, `YYYYMMDD`
    pub latest: Option<String>,
}

/// Walks the output tree and tallies collected CSV files.
///
/// Expects the layout the downloader produces:
/// `<base>/<type>/<level1>/<level2>/<level3>/<variable>/<file>.csv`. Files
/// at other depths are counted in the totals but not classified. A missing
/// base directory yields empty stats rather than an error.
pub fn scan_tree(base_dir: &Path) -> AppResult<TreeStats> {
    let mut stats = TreeStats::default();
    if !base_dir.exists() {
        return Ok(stats);
    }

    for entry in WalkDir::new(base_dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Failed to read directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }

        stats.total_files += 1;
        if let Ok(metadata) = entry.metadata() {
            stats.total_bytes += metadata.len();
        }

        classify(path, base_dir, &mut stats);
    }

    Ok(stats)
}

fn classify(path: &Path, base_dir: &Path, stats: &mut TreeStats) {
    let relative = match path.strip_prefix(base_dir) {
        Ok(rel) => rel,
        Err(_) => return,
    };
    let parts: Vec<&str> = relative
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    // type / level1 / level2 / level3 / variable / file
    if parts.len() != 6 {
        return;
    }

    *stats.by_type.entry(parts[0].to_string()).or_insert(0) += 1;
    *stats
        .by_region
        .entry(format!("{}/{}/{}", parts[1], parts[2], parts[3]))
        .or_insert(0) += 1;
    *stats.by_variable.entry(parts[4].to_string()).or_insert(0) += 1;

    // <level3>_<variable>_<start>_<end>.csv; track the start date range
    let stem = parts[5].trim_end_matches(".csv");
    let pieces: Vec<&str> = stem.split('_').collect();
    if pieces.len() >= 3 {
        let start = pieces[pieces.len() - 2];
        if start.len() == 8 && start.chars().all(|c| c.is_ascii_digit()) {
            // YYYYMMDD sorts lexicographically
            if stats
                .earliest
                .as_deref()
                .map(|e| start < e)
                .unwrap_or(true)
            {
                stats.earliest = Some(start.to_string());
            }
            if stats.latest.as_deref().map(|l| start > l).unwrap_or(true) {
                stats.latest = Some(start.to_string());
            }
        }
    }
}

/// Logs a human-readable summary of the scan.
pub fn log_stats(stats: &TreeStats) {
    info!(
        total_files = stats.total_files,
        total_mb = format!("{:.2}", stats.total_bytes as f64 / 1_048_576.0),
        "Collection status"
    );
    if let (Some(earliest), Some(latest)) = (&stats.earliest, &stats.latest) {
        info!(earliest = %earliest, latest = %latest, "Covered date range");
    }
    for (name, count) in &stats.by_type {
        info!(collection_type = %name, files = count, "Files per collection type");
    }
    for (region, count) in &stats.by_region {
        info!(region = %region, files = count, "Files per region");
    }
    for (variable, count) in &stats.by_variable {
        info!(variable = %variable, files = count, "Files per variable");
    }
}
