use crate::domain::ids::{MemberId, OrgId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

label_enum! {
    MemberRole {
        Agent => "AGENT",
        Manager => "MANAGER",
        Owner => "OWNER",
    }
}

impl MemberRole {
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            MemberRole::Agent | MemberRole::Manager | MemberRole::Owner
        )
    }
}

/// Roles that may receive lead assignments.
pub fn assignable_roles() -> [MemberRole; 3] {
    [MemberRole::Agent, MemberRole::Manager, MemberRole::Owner]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgMember {
    pub id: MemberId,
    pub org_id: OrgId,
    pub role: MemberRole,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: i64,
}

impl OrgMember {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.display_name.trim().is_empty() {
            return Err(CoreError::EmptyDisplayName);
        }
        Ok(())
    }
}
