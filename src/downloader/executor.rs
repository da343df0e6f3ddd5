use crate::config::ResolvedConfig;
use crate::constants::DOWNLOAD_PATH;
use crate::downloader::session::Session;
use crate::errors::{AppError, AppResult};
use crate::extractor;
use crate::models::{CollectionProfile, WorkUnit};
use crate::progress::ProgressReporter;
use std::path::Path;
use tracing::{debug, warn};

/// Terminal state of one work unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    /// The expected CSV already exists; no network traffic was issued.
    Skipped,
    /// Archive downloaded, extracted and removed.
    Succeeded,
}

/// Runs one work unit through the download protocol.
///
/// Steps: skip-if-exists check, generation request, download request,
/// archive persistence and extraction. Any error is unit-scoped; the caller
/// decides how to recover (it replaces the session and moves on). A
/// non-success status on the *generation* request is tolerated by design:
/// the portal frequently answers it with throwaway markup, and a genuine
/// preparation failure surfaces as a failed download right after.
pub async fn execute_unit(
    client: &reqwest::Client,
    session: &Session,
    unit: &WorkUnit,
    profile: &CollectionProfile,
    type_dir: &Path,
    config: &ResolvedConfig,
    reporter: &dyn ProgressReporter,
) -> AppResult<UnitOutcome> {
    let region_dir = type_dir
        .join(&unit.region.level1)
        .join(&unit.region.level2)
        .join(&unit.region.level3);
    let var_dir = region_dir.join(&unit.variable.name);
    let csv_name = unit.expected_csv_name();
    let csv_path = var_dir.join(&csv_name);

    if csv_path.exists() {
        debug!(file = %csv_path.display(), "File already exists, skipping unit");
        return Ok(UnitOutcome::Skipped);
    }

    tokio::fs::create_dir_all(&region_dir).await.map_err(|e| {
        AppError::IoError(format!(
            "Failed to create directory {}: {e}",
            region_dir.display()
        ))
    })?;

    let base_url = &config.portal_base_url;

    // Phase 1: trigger server-side file preparation. The response body is
    // irrelevant; only the side effect matters.
    let generate_url = url::Url::parse(base_url)?.join(profile.request_path)?;
    let generate_body = generation_request_body(unit, profile);
    let generate_response = client
        .post(generate_url)
        .form(&generate_body)
        .headers(session.generate_headers(base_url)?)
        .send()
        .await
        .map_err(|e| AppError::NetworkError(format!("Generation request failed: {e}")))?;
    if !generate_response.status().is_success() {
        debug!(
            status = %generate_response.status(),
            unit = %unit.description(),
            "Generation request returned non-success status, continuing"
        );
    }

    // Phase 2: fetch the prepared archive as a stream.
    let download_url = url::Url::parse(base_url)?.join(DOWNLOAD_PATH)?;
    let download_body = [("downFile", csv_name.as_str())];
    let response = client
        .post(download_url)
        .form(&download_body)
        .headers(session.download_headers(base_url)?)
        .send()
        .await
        .map_err(|e| AppError::NetworkError(format!("Download request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::NetworkError(format!(
            "Download returned HTTP {status} for {csv_name}"
        )));
    }

    let zip_path = region_dir.join(format!(
        "{}_{}_{}_{}.zip",
        unit.region.level3, unit.variable.name, unit.interval.start, unit.interval.end
    ));
    extractor::persist_archive(response, &zip_path).await?;

    // Extraction is blocking (zip + std::fs), keep it off the async worker.
    let extracted = {
        let zip_path = zip_path.clone();
        let var_dir = var_dir.clone();
        tokio::task::spawn_blocking(move || extractor::extract_archive(&zip_path, &var_dir))
            .await
            .map_err(|e| AppError::IoError(format!("Extraction task failed: {e}")))??
    };

    for path in &extracted {
        reporter.on_file_written(path);
    }

    // The archive is transient; a leftover only wastes space, so deletion
    // failure does not fail the unit.
    if let Err(e) = tokio::fs::remove_file(&zip_path).await {
        warn!(
            zip_file = %zip_path.display(),
            error = %e,
            "Failed to delete downloaded archive"
        );
    }

    debug!(
        unit = %unit.description(),
        files = extracted.len(),
        "Unit downloaded and extracted"
    );
    Ok(UnitOutcome::Succeeded)
}

/// Builds the generation request form body.
///
/// Field names and redundant date encodings are the portal's undocumented
/// contract, reproduced verbatim.
fn generation_request_body(unit: &WorkUnit, profile: &CollectionProfile) -> Vec<(&'static str, String)> {
    let start = &unit.interval.start;
    let end = &unit.interval.end;
    vec![
        ("apiCd", profile.api_code.to_string()),
        ("data_code", profile.data_code.to_string()),
        ("hour", String::new()),
        ("pageIndex", "1".to_string()),
        ("from", start.clone()),
        ("to", end.clone()),
        ("reqst_purpose_cd", profile.purpose_code.to_string()),
        ("recordCountPerPage", "10".to_string()),
        ("txtVar1Nm", unit.variable.name.clone()),
        ("selectType", profile.select_type.to_string()),
        ("startDt", start[..4].to_string()),
        ("startMt", start[4..6].to_string()),
        ("endDt", end[..4].to_string()),
        ("endMt", end[4..6].to_string()),
        ("from_", start.clone()),
        ("to_", end.clone()),
        ("var1", unit.variable.code.to_string()),
        ("var3", unit.region.code.clone()),
        ("stnm", unit.region.level3.clone()),
        ("elcd", unit.variable.name.clone()),
        ("strtm", start.clone()),
        ("endtm", end.clone()),
        (
            "req_list",
            format!(
                "{start}|{end}|{}|{}|{}",
                profile.data_code, unit.variable.code, unit.region.code
            ),
        ),
    ]
}
