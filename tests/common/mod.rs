//! Scripted in-memory `PartnerApi` shared by the integration tests.
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use partner_eval::partner::types::{
    DailyTaskBatch, EvaluationRequest, InteractionReport, StatusReply, WorkItem,
};
use partner_eval::partner::PartnerApi;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Status,
    Daily,
    Extra,
    Report(InteractionReport),
    Evaluate(EvaluationRequest),
    Refresh,
}

struct State {
    logged_in: bool,
    status: StatusReply,
    daily: Option<DailyTaskBatch>,
    extra: Option<Vec<WorkItem>>,
    report_codes: VecDeque<i64>,
    evaluate_codes: VecDeque<i64>,
    evaluate_transport_error: bool,
    refresh_code: Option<i64>,
    calls: Vec<Call>,
    closed: u32,
}

/// Unscripted calls answer 200. Clones share state, so a test keeps one
/// clone as a probe after handing the other to the code under test.
#[derive(Clone)]
pub struct ScriptedApi {
    state: Arc<Mutex<State>>,
}

impl Default for ScriptedApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                logged_in: true,
                status: StatusReply {
                    code: 200,
                    status: "NORMAL".to_string(),
                    message: String::new(),
                },
                daily: Some(DailyTaskBatch { task_id: 1, items: vec![] }),
                extra: Some(vec![]),
                report_codes: VecDeque::new(),
                evaluate_codes: VecDeque::new(),
                evaluate_transport_error: false,
                refresh_code: Some(200),
                calls: vec![],
                closed: 0,
            })),
        }
    }

    pub fn logged_out(self) -> Self {
        self.state.lock().unwrap().logged_in = false;
        self
    }

    pub fn with_status(self, code: i64, status: &str) -> Self {
        self.state.lock().unwrap().status = StatusReply {
            code,
            status: status.to_string(),
            message: format!("code {code}"),
        };
        self
    }

    /// `None` makes the fetch fail.
    pub fn with_daily(self, daily: Option<DailyTaskBatch>) -> Self {
        self.state.lock().unwrap().daily = daily;
        self
    }

    /// `None` makes the fetch fail.
    pub fn with_extra(self, extra: Option<Vec<WorkItem>>) -> Self {
        self.state.lock().unwrap().extra = extra;
        self
    }

    pub fn with_report_codes(self, codes: &[i64]) -> Self {
        self.state.lock().unwrap().report_codes = codes.iter().copied().collect();
        self
    }

    pub fn with_evaluate_codes(self, codes: &[i64]) -> Self {
        self.state.lock().unwrap().evaluate_codes = codes.iter().copied().collect();
        self
    }

    pub fn failing_evaluations(self) -> Self {
        self.state.lock().unwrap().evaluate_transport_error = true;
        self
    }

    /// `None` makes the refresh fail at the transport level.
    pub fn with_refresh(self, code: Option<i64>) -> Self {
        self.state.lock().unwrap().refresh_code = code;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn evaluations(&self) -> Vec<EvaluationRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Evaluate(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    pub fn reports(&self) -> Vec<InteractionReport> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Report(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn closed(&self) -> u32 {
        self.state.lock().unwrap().closed
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl PartnerApi for ScriptedApi {
    async fn needs_login(&self) -> bool {
        !self.state.lock().unwrap().logged_in
    }

    async fn account_status(&self) -> Result<StatusReply> {
        self.record(Call::Status);
        Ok(self.state.lock().unwrap().status.clone())
    }

    async fn daily_batch(&self) -> Result<DailyTaskBatch> {
        self.record(Call::Daily);
        let daily = self.state.lock().unwrap().daily.clone();
        daily.ok_or_else(|| anyhow::anyhow!("daily task query returned code 500"))
    }

    async fn extra_batch(&self) -> Result<Vec<WorkItem>> {
        self.record(Call::Extra);
        let extra = self.state.lock().unwrap().extra.clone();
        extra.ok_or_else(|| anyhow::anyhow!("extra task query returned code 500"))
    }

    async fn report_interaction(&self, report: &InteractionReport) -> Result<i64> {
        self.record(Call::Report(report.clone()));
        Ok(self.state.lock().unwrap().report_codes.pop_front().unwrap_or(200))
    }

    async fn submit_evaluation(&self, req: &EvaluationRequest) -> Result<i64> {
        self.record(Call::Evaluate(req.clone()));
        let mut state = self.state.lock().unwrap();
        if state.evaluate_transport_error {
            anyhow::bail!("connection reset");
        }
        Ok(state.evaluate_codes.pop_front().unwrap_or(200))
    }

    async fn refresh_session(&self) -> Result<i64> {
        self.record(Call::Refresh);
        let code = self.state.lock().unwrap().refresh_code;
        code.ok_or_else(|| anyhow::anyhow!("token refresh timed out"))
    }

    async fn close(&self) -> Result<()> {
        self.state.lock().unwrap().closed += 1;
        Ok(())
    }
}

pub fn daily_item(work_id: i64, completed: bool) -> WorkItem {
    WorkItem {
        work_id,
        resource_id: None,
        name: format!("daily-{work_id}"),
        completed,
    }
}

pub fn extra_item(work_id: i64, completed: bool) -> WorkItem {
    WorkItem {
        work_id,
        resource_id: Some(work_id * 100),
        name: format!("extra-{work_id}"),
        completed,
    }
}
