use super::session::Session;
use super::types::*;
use crate::config::ApiConfig;
use crate::partner::types::{DailyTaskBatch, EvaluationRequest, InteractionReport, StatusReply, WorkItem};
use crate::partner::PartnerApi;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const USER_INFO_PATH: &str = "/weapi/music/partner/user/info";
const DAILY_TASK_PATH: &str = "/weapi/music/partner/daily/task/get";
const EXTRA_TASK_PATH: &str = "/weapi/music/partner/extra/wait/evaluate/work/list";
const INTERACT_REPORT_PATH: &str = "/weapi/partner/resource/interact/report";
const EVALUATE_PATH: &str = "/weapi/music/partner/work/evaluate";
const TOKEN_REFRESH_PATH: &str = "/weapi/login/token/refresh";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// HTTP client for the partner endpoints. Bodies are plain JSON; the gateway
/// behind `base_url` owns any transport encryption.
pub struct MusicRest {
    client: Client,
    base_url: String,
    session: Mutex<Session>,
    cookie_file: Option<PathBuf>,
    session_changed: AtomicBool,
}

impl MusicRest {
    pub fn new(session: Session, config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(2)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session: Mutex::new(session),
            cookie_file: config.cookie_file.clone(),
            session_changed: AtomicBool::new(false),
        })
    }

    /// Session from `cookie_file` when configured, otherwise the environment.
    pub fn connect(config: &ApiConfig, env_session: (String, Option<String>)) -> Result<Self> {
        let session = match &config.cookie_file {
            Some(path) if path.exists() => Session::load(path)?,
            _ => Session::new(env_session.0, env_session.1),
        };
        Self::new(session, config)
    }

    pub fn session(&self) -> Session {
        self.session.lock().map(|s| s.clone()).unwrap_or_default()
    }

    async fn send<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let (cookie, csrf) = {
            let session = self
                .session
                .lock()
                .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
            (session.cookie_header(), session.csrf_token().to_string())
        };

        let resp = self
            .client
            .post(&url)
            .query(&[("csrf_token", csrf.as_str())])
            .header(COOKIE, cookie)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", path))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("POST {} failed ({}): {}", path, status, body);
        }
        Ok(resp)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<Envelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(path, body).await?;
        resp.json()
            .await
            .with_context(|| format!("failed to parse {} response", path))
    }
}

#[async_trait]
impl PartnerApi for MusicRest {
    async fn needs_login(&self) -> bool {
        !self.session().is_logged_in()
    }

    async fn account_status(&self) -> Result<StatusReply> {
        let resp: Envelope<PartnerUserInfo> = self.post(USER_INFO_PATH, &serde_json::json!({})).await?;
        Ok(StatusReply {
            code: resp.code,
            status: resp.data.as_ref().map(|d| d.status.clone()).unwrap_or_default(),
            message: resp.message(),
        })
    }

    async fn daily_batch(&self) -> Result<DailyTaskBatch> {
        let resp: Envelope<DailyTask> = self.post(DAILY_TASK_PATH, &serde_json::json!({})).await?;
        if resp.code != 200 {
            anyhow::bail!("daily task query returned code {}: {}", resp.code, resp.message());
        }
        let task = resp.data.context("daily task response has no data")?;
        Ok(task.into())
    }

    async fn extra_batch(&self) -> Result<Vec<WorkItem>> {
        let resp: Envelope<Vec<TaskWork>> = self.post(EXTRA_TASK_PATH, &serde_json::json!({})).await?;
        if resp.code != 200 {
            anyhow::bail!("extra task query returned code {}: {}", resp.code, resp.message());
        }
        Ok(resp
            .data
            .unwrap_or_default()
            .into_iter()
            .map(TaskWork::into_extra_item)
            .collect())
    }

    async fn report_interaction(&self, report: &InteractionReport) -> Result<i64> {
        let resp: Envelope<serde_json::Value> = self.post(INTERACT_REPORT_PATH, report).await?;
        Ok(resp.code)
    }

    async fn submit_evaluation(&self, req: &EvaluationRequest) -> Result<i64> {
        let resp: Envelope<serde_json::Value> = self.post(EVALUATE_PATH, req).await?;
        Ok(resp.code)
    }

    async fn refresh_session(&self) -> Result<i64> {
        let resp = self.send(TOKEN_REFRESH_PATH, &serde_json::json!({})).await?;
        let set_cookies: Vec<String> = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let reply: Envelope<serde_json::Value> = resp
            .json()
            .await
            .context("failed to parse token refresh response")?;

        if reply.code == 200 {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
            for value in &set_cookies {
                if session.absorb_set_cookie(value) {
                    self.session_changed.store(true, Ordering::Relaxed);
                }
            }
        }
        Ok(reply.code)
    }

    async fn close(&self) -> Result<()> {
        let Some(path) = &self.cookie_file else {
            return Ok(());
        };
        if !self.session_changed.load(Ordering::Relaxed) {
            return Ok(());
        }
        self.session().save(path)?;
        tracing::info!(path = %path.display(), "session cookie saved");
        Ok(())
    }
}
