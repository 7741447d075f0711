use serde::{Serialize, Serializer};

/// Fixed `source` value the partner page sends with every evaluation.
pub const EVALUATION_SOURCE: &str = "mp-music-partner";

/// Interaction type reported once a track has been "listened" to.
pub const PLAY_END: &str = "PLAY_END";

/// Result of the partner membership query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReply {
    pub code: i64,
    pub status: String,
    pub message: String,
}

/// One evaluable track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub work_id: i64,
    /// Only present on extra-batch items.
    pub resource_id: Option<i64>,
    pub name: String,
    /// Set by the service when the work was already evaluated.
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTaskBatch {
    pub task_id: i64,
    pub items: Vec<WorkItem>,
}

/// Extra works plus the number of accepted evaluations after which the
/// batch is abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraTaskBatch {
    pub items: Vec<WorkItem>,
    pub quota: u32,
}

impl ExtraTaskBatch {
    pub fn new(items: Vec<WorkItem>, quota: u32) -> Self {
        Self { items, quota }
    }
}

/// Evaluation submitted for a single work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
    pub work_id: i64,
    pub score: u8,
    #[serde(serialize_with = "join_tags")]
    pub tags: Vec<String>,
    pub custom_tags: String,
    pub comment: String,
    pub sync_yun_circle: bool,
    pub sync_comment: bool,
    pub source: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub extra_resource: bool,
}

impl EvaluationRequest {
    pub fn daily(task_id: i64, work_id: i64, score: u8, tags: Vec<String>) -> Self {
        Self {
            task_id: Some(task_id),
            work_id,
            score,
            tags,
            custom_tags: "[]".to_string(),
            comment: String::new(),
            sync_yun_circle: false,
            sync_comment: true,
            source: EVALUATION_SOURCE.to_string(),
            extra_resource: false,
        }
    }

    pub fn extra(task_id: Option<i64>, work_id: i64, score: u8, tags: Vec<String>) -> Self {
        Self {
            task_id,
            extra_resource: true,
            ..Self::daily(0, work_id, score, tags)
        }
    }
}

fn join_tags<S: Serializer>(tags: &[String], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&tags.join(","))
}

/// "Listened to the end" report that must precede an extra evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionReport {
    pub work_id: i64,
    pub resource_id: i64,
    pub biz_resource_id: String,
    pub interact_type: String,
}

impl InteractionReport {
    pub fn play_end(work_id: i64, resource_id: i64) -> Self {
        Self {
            work_id,
            resource_id,
            biz_resource_id: String::new(),
            interact_type: PLAY_END.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_request_wire_shape() {
        let req = EvaluationRequest::daily(77, 1001, 4, vec!["4-A-1".into(), "4-B-2".into()]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["taskId"], 77);
        assert_eq!(json["workId"], 1001);
        assert_eq!(json["score"], 4);
        assert_eq!(json["tags"], "4-A-1,4-B-2");
        assert_eq!(json["customTags"], "[]");
        assert_eq!(json["comment"], "");
        assert_eq!(json["syncYunCircle"], false);
        assert_eq!(json["syncComment"], true);
        assert_eq!(json["source"], "mp-music-partner");
        assert!(json.get("extraResource").is_none());
    }

    #[test]
    fn test_extra_request_flags_extra_resource() {
        let req = EvaluationRequest::extra(None, 5, 3, vec!["3-A-1".into()]);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("taskId").is_none());
        assert_eq!(json["extraResource"], true);
        assert_eq!(json["source"], "mp-music-partner");
    }

    #[test]
    fn test_play_end_report() {
        let report = InteractionReport::play_end(9, 42);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["interactType"], "PLAY_END");
        assert_eq!(json["resourceId"], 42);
        assert_eq!(json["bizResourceId"], "");
    }
}
