use crate::domain::{LeadId, MemberId, OrgId, TaskId, TaskStatus};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("display name is required")]
    EmptyDisplayName,
    #[error("lead id is required")]
    MissingLeadId,
    #[error("invalid temperature: {0} (expected 0-100)")]
    InvalidTemperature(i64),
    #[error("invalid candidate page size: {0}")]
    InvalidPageSize(i64),
    #[error("lead not found: {0}")]
    LeadNotFound(LeadId),
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),
    #[error("member {member} does not belong to organization {org}")]
    MemberOutsideOrg { member: MemberId, org: OrgId },
    #[error("no assignable candidates")]
    NoCandidates,
    #[error("cannot move task from {from} to {to}")]
    InvalidTaskTransition { from: TaskStatus, to: TaskStatus },
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::LeadNotFound(_) | CoreError::TaskNotFound(_) | CoreError::MemberNotFound(_)
        )
    }
}
