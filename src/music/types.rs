use crate::partner::types::{DailyTaskBatch, WorkItem};
use serde::Deserialize;

/// Common reply envelope: `{code, message, data}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn message(&self) -> String {
        self.message.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct PartnerUserInfo {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub number: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: i64,
    #[serde(default)]
    pub resource_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author_name: String,
}

impl Work {
    fn display_name(&self) -> String {
        if self.author_name.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.author_name)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskWork {
    pub work: Work,
    #[serde(default)]
    pub completed: bool,
}

impl TaskWork {
    pub fn into_daily_item(self) -> WorkItem {
        WorkItem {
            work_id: self.work.id,
            resource_id: None,
            name: self.work.display_name(),
            completed: self.completed,
        }
    }

    pub fn into_extra_item(self) -> WorkItem {
        WorkItem {
            work_id: self.work.id,
            resource_id: Some(self.work.resource_id).filter(|id| *id != 0),
            name: self.work.display_name(),
            completed: self.completed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyTask {
    pub id: i64,
    #[serde(default)]
    pub works: Vec<TaskWork>,
}

impl From<DailyTask> for DailyTaskBatch {
    fn from(task: DailyTask) -> Self {
        DailyTaskBatch {
            task_id: task.id,
            items: task.works.into_iter().map(TaskWork::into_daily_item).collect(),
        }
    }
}
