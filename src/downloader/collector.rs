use crate::config::ResolvedConfig;
use crate::downloader::executor::{execute_unit, UnitOutcome};
use crate::downloader::session::{authenticate, Credential, Session};
use crate::errors::{AppError, AppResult};
use crate::models::{CollectionType, WorkUnit};
use crate::progress::ProgressReporter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Aggregate result of one collection-type sub-run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// True when a graceful stop was requested and the run ended early.
    pub stopped: bool,
}

/// Drives one collection type's work plan to completion.
///
/// Units run strictly sequentially: the session is rate-sensitive and a
/// failed unit replaces it, which the next unit must observe. Only
/// `AuthError` (initial login or a failed re-authentication) escalates out
/// of here; every unit-scoped error is logged as a FAILED unit and the run
/// continues. The `stop` flag is honored between units only, so an
/// in-flight unit always finishes and is never interrupted mid-extraction.
pub async fn run_collection(
    client: &reqwest::Client,
    credential: &Credential,
    collection_type: CollectionType,
    plan: &[WorkUnit],
    config: &ResolvedConfig,
    reporter: &dyn ProgressReporter,
    stop: &AtomicBool,
) -> AppResult<RunSummary> {
    let profile = collection_type.profile();
    let type_dir = config.base_dir.join(collection_type.display_name());
    let settle = Duration::from_millis(config.login_settle_ms);
    let unit_delay = Duration::from_millis(config.unit_delay_ms);

    let mut session: Session =
        authenticate(client, &config.portal_base_url, credential, settle).await?;

    let mut summary = RunSummary {
        total: plan.len(),
        ..RunSummary::default()
    };

    info!(
        collection_type = collection_type.display_name(),
        units = plan.len(),
        "Starting collection run"
    );

    for (index, unit) in plan.iter().enumerate() {
        if stop.load(Ordering::Relaxed) {
            summary.stopped = true;
            info!(
                completed = index,
                total = plan.len(),
                "Stop requested, ending run between units"
            );
            break;
        }

        match execute_unit(client, &session, unit, &profile, &type_dir, config, reporter).await {
            Ok(UnitOutcome::Skipped) => {
                summary.skipped += 1;
                info!(unit = %unit.description(), outcome = "SKIPPED", "Unit finished");
            }
            Ok(UnitOutcome::Succeeded) => {
                summary.succeeded += 1;
                info!(unit = %unit.description(), outcome = "SUCCEEDED", "Unit finished");
            }
            Err(e) => {
                summary.failed += 1;
                warn!(
                    unit = %unit.description(),
                    outcome = "FAILED",
                    reason = %e,
                    "Unit finished"
                );
                // The failure may have invalidated the session; replace it
                // wholesale before the next unit. A failed login here is an
                // AuthError and aborts the sub-run.
                session =
                    authenticate(client, &config.portal_base_url, credential, settle).await?;
            }
        }

        reporter.on_progress(index + 1, plan.len(), &unit.description());

        if !unit_delay.is_zero() {
            tokio::time::sleep(unit_delay).await;
        }
    }

    info!(
        collection_type = collection_type.display_name(),
        total = summary.total,
        succeeded = summary.succeeded,
        skipped = summary.skipped,
        failed = summary.failed,
        stopped = summary.stopped,
        "Collection run completed"
    );

    Ok(summary)
}

/// Escalation policy helper: true for the error kinds that abort a sub-run.
pub fn aborts_sub_run(error: &AppError) -> bool {
    matches!(error, AppError::ConfigError(_) | AppError::AuthError(_))
}
