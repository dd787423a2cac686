use crate::domain::ids::{LeadId, MemberId, OrgId, TaskId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

label_enum! {
    TaskKind {
        FollowUp => "FOLLOW_UP",
    }
}

label_enum! {
    TaskStatus {
        Pending => "PENDING",
        Done => "DONE",
        Cancelled => "CANCELLED",
    }
}

impl TaskStatus {
    /// Only pending tasks move, and only to a closed state.
    pub fn ensure_transition(&self, to: &TaskStatus) -> Result<(), CoreError> {
        match (self, to) {
            (TaskStatus::Pending, TaskStatus::Done | TaskStatus::Cancelled) => Ok(()),
            _ => Err(CoreError::InvalidTaskTransition {
                from: self.clone(),
                to: to.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Call,
    Sms,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Call => "CALL",
            Channel::Sms => "SMS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub message_draft: String,
    pub suggested_channel: Channel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub org_id: OrgId,
    pub lead_id: LeadId,
    pub owner_id: Option<MemberId>,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub title: String,
    pub rationale: String,
    pub payload: TaskPayload,
    pub due_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNew {
    pub org_id: OrgId,
    pub lead_id: LeadId,
    pub owner_id: Option<MemberId>,
    pub kind: TaskKind,
    pub title: String,
    pub rationale: String,
    pub payload: TaskPayload,
    pub due_at: i64,
    pub created_at: i64,
}
