//! Per-item lifecycle for the daily and extra batches.

use super::pacing::PacingPolicy;
use super::tags::{TagGroup, TagSet};
use crate::error::RunError;
use crate::partner::types::{
    DailyTaskBatch, EvaluationRequest, ExtraTaskBatch, InteractionReport, WorkItem,
};
use crate::partner::PartnerApi;
use rand::seq::SliceRandom;
use rand::Rng;

pub const CODE_ACCEPTED: i64 = 200;
pub const CODE_ALREADY_EVALUATED: i64 = 405;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationOutcome {
    Accepted,
    AlreadyEvaluated,
    Failed(i64),
}

impl EvaluationOutcome {
    pub fn from_code(code: i64) -> Self {
        match code {
            CODE_ACCEPTED => EvaluationOutcome::Accepted,
            CODE_ALREADY_EVALUATED => EvaluationOutcome::AlreadyEvaluated,
            other => EvaluationOutcome::Failed(other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub skipped: u32,
    pub accepted: u32,
    pub already_evaluated: u32,
    pub failed: u32,
    pub report_failed: u32,
    /// The extra batch stopped early because its quota was used up.
    pub quota_met: bool,
}

impl BatchSummary {
    fn record(&mut self, outcome: EvaluationOutcome) {
        match outcome {
            EvaluationOutcome::Accepted => self.accepted += 1,
            EvaluationOutcome::AlreadyEvaluated => self.already_evaluated += 1,
            EvaluationOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Drives one batch at a time. Strictly sequential: an item's pacing delay,
/// report and evaluation finish before the next item starts.
pub struct BatchExecutor<'a, A: ?Sized, R: ?Sized> {
    api: &'a A,
    stars: &'a [u8],
    tags: &'a TagGroup,
    pacing: PacingPolicy,
    rng: &'a mut R,
}

impl<'a, A, R> BatchExecutor<'a, A, R>
where
    A: PartnerApi + ?Sized,
    R: Rng + ?Sized,
{
    pub fn new(
        api: &'a A,
        stars: &'a [u8],
        tags: &'a TagGroup,
        pacing: PacingPolicy,
        rng: &'a mut R,
    ) -> Self {
        Self { api, stars, tags, pacing, rng }
    }

    /// Evaluate every open work of the daily batch. Unexpected response codes
    /// are logged; the batch never stops early.
    pub async fn run_daily(&mut self, batch: &DailyTaskBatch) -> Result<BatchSummary, RunError> {
        let mut summary = BatchSummary::default();

        for item in &batch.items {
            if item.completed {
                tracing::warn!(work_id = item.work_id, name = %item.name, "daily work already completed");
                summary.skipped += 1;
                continue;
            }

            self.listen().await;
            let (stars, tags) = self.pick()?;

            let req = EvaluationRequest::daily(batch.task_id, item.work_id, stars, tags);
            let code = self
                .api
                .submit_evaluation(&req)
                .await
                .map_err(|e| RunError::transport("evaluate", e))?;

            let outcome = EvaluationOutcome::from_code(code);
            log_outcome(item, &req, outcome);
            summary.record(outcome);
        }

        Ok(summary)
    }

    /// Report and evaluate extra works until the quota of accepted
    /// evaluations is used up.
    pub async fn run_extra(
        &mut self,
        batch: &ExtraTaskBatch,
        task_id: Option<i64>,
    ) -> Result<BatchSummary, RunError> {
        let mut summary = BatchSummary::default();
        let mut remaining = batch.quota;

        if remaining == 0 {
            summary.quota_met = true;
            return Ok(summary);
        }

        for item in &batch.items {
            if item.completed {
                tracing::warn!(work_id = item.work_id, name = %item.name, "extra work already completed");
                summary.skipped += 1;
                continue;
            }

            self.listen().await;
            let (stars, tags) = self.pick()?;

            let Some(resource_id) = item.resource_id else {
                tracing::error!(work_id = item.work_id, "extra work has no resource id, skipping");
                summary.report_failed += 1;
                continue;
            };
            let report = InteractionReport::play_end(item.work_id, resource_id);
            let code = self
                .api
                .report_interaction(&report)
                .await
                .map_err(|e| RunError::transport("report", e))?;
            if code != CODE_ACCEPTED {
                tracing::error!(work_id = item.work_id, resource_id, code, "play report rejected, skipping evaluation");
                summary.report_failed += 1;
                continue;
            }

            let req = EvaluationRequest::extra(task_id, item.work_id, stars, tags);
            let code = self
                .api
                .submit_evaluation(&req)
                .await
                .map_err(|e| RunError::transport("evaluate", e))?;

            let outcome = EvaluationOutcome::from_code(code);
            log_outcome(item, &req, outcome);
            summary.record(outcome);
            if outcome == EvaluationOutcome::Accepted {
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
        }

        if remaining == 0 {
            summary.quota_met = true;
            tracing::info!(quota = batch.quota, "extra quota reached");
        }
        Ok(summary)
    }

    async fn listen(&mut self) {
        let delay = self.pacing.delay(&mut *self.rng);
        tracing::debug!(secs = delay.as_secs(), "listening");
        tokio::time::sleep(delay).await;
    }

    /// Rating and tag set for one item, held fixed for all of its calls.
    fn pick(&mut self) -> Result<(u8, TagSet), RunError> {
        let stars = *self
            .stars
            .choose(&mut *self.rng)
            .ok_or_else(|| RunError::ConfigInvalid("no star ratings configured".to_string()))?;
        let tags = self.tags.select(stars, &mut *self.rng)?.clone();
        Ok((stars, tags))
    }
}

fn log_outcome(item: &WorkItem, req: &EvaluationRequest, outcome: EvaluationOutcome) {
    match outcome {
        EvaluationOutcome::Accepted => {
            tracing::info!(work_id = item.work_id, name = %item.name, score = req.score, tags = %req.tags.join(","), "evaluated");
        }
        EvaluationOutcome::AlreadyEvaluated => {
            tracing::info!(work_id = item.work_id, name = %item.name, "work was already evaluated");
        }
        EvaluationOutcome::Failed(code) => {
            tracing::error!(work_id = item.work_id, code, request = ?req, "unexpected evaluate response");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_code() {
        assert_eq!(EvaluationOutcome::from_code(200), EvaluationOutcome::Accepted);
        assert_eq!(EvaluationOutcome::from_code(405), EvaluationOutcome::AlreadyEvaluated);
        assert_eq!(EvaluationOutcome::from_code(400), EvaluationOutcome::Failed(400));
        assert_eq!(EvaluationOutcome::from_code(-1), EvaluationOutcome::Failed(-1));
    }

    #[test]
    fn test_summary_record() {
        let mut s = BatchSummary::default();
        s.record(EvaluationOutcome::Accepted);
        s.record(EvaluationOutcome::AlreadyEvaluated);
        s.record(EvaluationOutcome::Failed(500));
        s.record(EvaluationOutcome::Accepted);
        assert_eq!(s.accepted, 2);
        assert_eq!(s.already_evaluated, 1);
        assert_eq!(s.failed, 1);
        assert!(!s.quota_met);
    }
}
