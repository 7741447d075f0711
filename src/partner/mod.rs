pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use types::{DailyTaskBatch, EvaluationRequest, InteractionReport, StatusReply, WorkItem};

/// Remote partner-program operations the engine depends on.
///
/// Calls return `Err` only for transport-level failures. Service response
/// codes come back as values so callers can interpret them per item.
#[async_trait]
pub trait PartnerApi: Send + Sync {
    async fn needs_login(&self) -> bool;
    async fn account_status(&self) -> Result<StatusReply>;
    async fn daily_batch(&self) -> Result<DailyTaskBatch>;
    async fn extra_batch(&self) -> Result<Vec<WorkItem>>;
    async fn report_interaction(&self, report: &InteractionReport) -> Result<i64>;
    async fn submit_evaluation(&self, req: &EvaluationRequest) -> Result<i64>;
    async fn refresh_session(&self) -> Result<i64>;
    /// Release the session. Called once at the end of every run.
    async fn close(&self) -> Result<()>;
}
