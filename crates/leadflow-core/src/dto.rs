use crate::domain::{
    Interaction, InteractionId, InteractionKind, Lead, LeadId, LeadStatus, MemberId, OrgId, Task,
    Temperature,
};
use crate::engine::FollowUpOutcome;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadListItemDto {
    pub id: LeadId,
    pub display_name: String,
    pub status: LeadStatus,
    pub temperature: Temperature,
    pub owner_id: Option<MemberId>,
    pub last_contact_at: Option<i64>,
    pub next_action_at: Option<i64>,
}

impl From<&Lead> for LeadListItemDto {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id,
            display_name: lead.display_name.clone(),
            status: lead.status.clone(),
            temperature: lead.temperature,
            owner_id: lead.owner_id,
            last_contact_at: lead.last_contact_at,
            next_action_at: lead.next_action_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionDto {
    pub id: InteractionId,
    pub kind: InteractionKind,
    pub actor_id: Option<MemberId>,
    pub content: String,
    pub created_at: i64,
}

impl From<&Interaction> for InteractionDto {
    fn from(interaction: &Interaction) -> Self {
        Self {
            id: interaction.id,
            kind: interaction.kind.clone(),
            actor_id: interaction.actor_id,
            content: interaction.content.clone(),
            created_at: interaction.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDetailDto {
    pub id: LeadId,
    pub org_id: OrgId,
    pub owner_id: Option<MemberId>,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: LeadStatus,
    pub temperature: Temperature,
    pub last_contact_at: Option<i64>,
    pub next_action_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub recent_interactions: Vec<InteractionDto>,
    pub pending_follow_up: Option<Task>,
}

impl LeadDetailDto {
    pub fn new(lead: Lead, recent: &[Interaction], pending_follow_up: Option<Task>) -> Self {
        Self {
            id: lead.id,
            org_id: lead.org_id,
            owner_id: lead.owner_id,
            display_name: lead.display_name,
            email: lead.email,
            phone: lead.phone,
            source: lead.source,
            status: lead.status,
            temperature: lead.temperature,
            last_contact_at: lead.last_contact_at,
            next_action_at: lead.next_action_at,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
            recent_interactions: recent.iter().map(InteractionDto::from).collect(),
            pending_follow_up,
        }
    }
}

/// One line of a follow-up sweep report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepItemDto {
    pub lead_id: LeadId,
    #[serde(flatten)]
    pub outcome: FollowUpOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionLoggedDto {
    pub interaction: InteractionDto,
    pub lead: LeadListItemDto,
    pub follow_up: Option<FollowUpOutcome>,
}
