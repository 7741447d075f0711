use crate::config::Config;
use crate::engine::batch::{BatchExecutor, BatchSummary, CODE_ACCEPTED};
use crate::engine::eligibility;
use crate::engine::TagGroup;
use crate::error::RunError;
use crate::partner::types::{DailyTaskBatch, ExtraTaskBatch};
use crate::partner::PartnerApi;
use rand::Rng;

/// What one run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub daily: BatchSummary,
    pub extra: BatchSummary,
    pub extra_quota: u32,
    pub session_refreshed: bool,
}

/// Runs the daily evaluation pipeline once:
/// gate → daily batch → extra batch → session refresh.
pub struct RunCoordinator<R> {
    config: Config,
    rng: R,
}

impl<R: Rng + Send> RunCoordinator<R> {
    pub fn new(config: Config, rng: R) -> Self {
        Self { config, rng }
    }

    /// Validate the configuration, then acquire a client with `connect` and
    /// run. The client is closed on every path once it has been created.
    pub async fn execute<A, F>(&mut self, connect: F) -> Result<RunReport, RunError>
    where
        A: PartnerApi,
        F: FnOnce() -> anyhow::Result<A>,
    {
        let tags = self.config.tag_group()?;
        self.config.validate(&tags)?;

        let api = connect().map_err(|e| RunError::ClientInit(format!("{:#}", e)))?;
        let result = self.run(&api, &tags).await;
        if let Err(e) = api.close().await {
            tracing::warn!(error = %format!("{:#}", e), "failed to close session");
        }
        result
    }

    async fn run<A: PartnerApi>(&mut self, api: &A, tags: &TagGroup) -> Result<RunReport, RunError> {
        eligibility::check(api).await?;

        let daily: DailyTaskBatch = api.daily_batch().await.map_err(|e| RunError::BatchFetchFailed {
            batch: "daily",
            message: format!("{:#}", e),
        })?;
        tracing::info!(task_id = daily.task_id, works = daily.items.len(), "daily batch fetched");

        let pacing = self.config.pacing.policy();
        let stars = self.config.run.stars.clone();

        let daily_summary = BatchExecutor::new(api, &stars, tags, pacing, &mut self.rng)
            .run_daily(&daily)
            .await?;
        tracing::info!(
            accepted = daily_summary.accepted,
            already = daily_summary.already_evaluated,
            failed = daily_summary.failed,
            skipped = daily_summary.skipped,
            "daily batch done"
        );

        let quota = self
            .rng
            .gen_range(self.config.extra.quota_min..=self.config.extra.quota_max);
        let items = api.extra_batch().await.map_err(|e| RunError::BatchFetchFailed {
            batch: "extra",
            message: format!("{:#}", e),
        })?;
        tracing::info!(works = items.len(), quota, "extra batch fetched");
        let extra = ExtraTaskBatch::new(items, quota);

        let extra_summary = BatchExecutor::new(api, &stars, tags, pacing, &mut self.rng)
            .run_extra(&extra, Some(daily.task_id))
            .await?;
        tracing::info!(
            accepted = extra_summary.accepted,
            already = extra_summary.already_evaluated,
            failed = extra_summary.failed,
            report_failed = extra_summary.report_failed,
            quota_met = extra_summary.quota_met,
            "extra batch done"
        );

        let session_refreshed = match api.refresh_session().await {
            Ok(CODE_ACCEPTED) => true,
            Ok(code) => {
                tracing::warn!(code, "session refresh rejected");
                false
            }
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "session refresh failed");
                false
            }
        };

        Ok(RunReport {
            daily: daily_summary,
            extra: extra_summary,
            extra_quota: quota,
            session_refreshed,
        })
    }
}
