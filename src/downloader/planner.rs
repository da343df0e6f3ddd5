use crate::errors::{AppError, AppResult};
use crate::models::{DateInterval, IntervalMode, Region, VariableSpec, WorkUnit};
use chrono::{Datelike, Months, NaiveDate};
use std::path::Path;
use tracing::{info, warn};

/// Splits `[start, end]` into the date intervals the portal is queried with.
///
/// Range mode emits month-wide `[s, e)` chunks, clipping the last chunk to
/// `end` exactly. Monthly mode emits one `YYYYMM` label per calendar month
/// touched by the range. Both orderings are ascending; range chunks are
/// contiguous and non-overlapping and together cover the full range.
pub fn build_intervals(start: NaiveDate, end: NaiveDate, mode: IntervalMode) -> Vec<DateInterval> {
    let mut intervals = Vec::new();
    match mode {
        IntervalMode::Range => {
            let mut current = start;
            while current < end {
                let mut next = match current.checked_add_months(Months::new(1)) {
                    Some(date) => date,
                    None => end,
                };
                if next > end {
                    next = end;
                }
                intervals.push(DateInterval {
                    start: current.format("%Y%m%d").to_string(),
                    end: next.format("%Y%m%d").to_string(),
                });
                current = next;
            }
        }
        IntervalMode::Monthly => {
            let mut current = start.with_day(1).unwrap_or(start);
            while current <= end {
                let label = current.format("%Y%m").to_string();
                intervals.push(DateInterval {
                    start: label.clone(),
                    end: label,
                });
                current = match current.checked_add_months(Months::new(1)) {
                    Some(date) => date,
                    None => break,
                };
            }
        }
    }
    intervals
}

/// Expands regions, intervals and variables into the ordered work plan.
///
/// The plan is the Cartesian product iterated region-major, interval-second,
/// variable-minor, so reruns are reproducible and progress percentages are
/// stable. An empty region list means there is nothing to do and is reported
/// as a configuration error for this collection type.
pub fn build_plan(
    regions: &[Region],
    intervals: &[DateInterval],
    variables: &[VariableSpec],
) -> AppResult<Vec<WorkUnit>> {
    if regions.is_empty() {
        return Err(AppError::ConfigError(
            "Region list is empty, nothing to download".to_string(),
        ));
    }

    let mut plan = Vec::with_capacity(regions.len() * intervals.len() * variables.len());
    for region in regions {
        for interval in intervals {
            for variable in variables {
                plan.push(WorkUnit {
                    region: region.clone(),
                    interval: interval.clone(),
                    variable: variable.clone(),
                });
            }
        }
    }
    Ok(plan)
}

/// Loads the region list produced by the region scraper.
///
/// Expects a CSV with a `Level1,Level2,Level3,ReqList_Last` header (UTF-8,
/// optional BOM). Rows with missing fields are skipped with a warning; a
/// missing file or header is a configuration error.
pub fn load_regions(path: &Path) -> AppResult<Vec<Region>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::ConfigError(format!("Region list not found: {}: {e}", path.display()))
    })?;
    let contents = contents.trim_start_matches('\u{feff}');

    let mut lines = contents.lines();
    let header = lines.next().ok_or_else(|| {
        AppError::ConfigError(format!("Region list is empty: {}", path.display()))
    })?;

    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let index_of = |name: &str| -> AppResult<usize> {
        columns.iter().position(|c| *c == name).ok_or_else(|| {
            AppError::ConfigError(format!(
                "Region list is missing column '{name}': {}",
                path.display()
            ))
        })
    };
    let level1_idx = index_of("Level1")?;
    let level2_idx = index_of("Level2")?;
    let level3_idx = index_of("Level3")?;
    let code_idx = index_of("ReqList_Last")?;

    let mut regions = Vec::new();
    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let max_idx = level1_idx.max(level2_idx).max(level3_idx).max(code_idx);
        if fields.len() <= max_idx {
            warn!(line = line_no + 2, "Skipping malformed region list row");
            continue;
        }
        regions.push(Region {
            level1: fields[level1_idx].to_string(),
            level2: fields[level2_idx].to_string(),
            level3: fields[level3_idx].to_string(),
            code: fields[code_idx].to_string(),
        });
    }

    info!(regions = regions.len(), file = %path.display(), "Region list loaded");
    Ok(regions)
}
