//! Orchestration of the engagement rules against a lead store.
//!
//! These functions own no state. Callers that need exact results under
//! concurrency must run each call inside their store's serialization
//! point (a write transaction, a per-org lock, ...).

use crate::domain::{
    assignable_roles, Interaction, Lead, LeadId, LeadUpdate, MemberId, MemberRole, OrgId,
    OrgMember, Task, TaskKind, TaskNew,
};
use crate::error::CoreError;
use crate::rules::{assign_least, plan_follow_up, score_temperature, Assignment, LeadSnapshot};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Storage the engine reads snapshots from and writes decisions to.
pub trait LeadStore {
    type Error: From<CoreError>;

    fn fetch_lead(&self, id: LeadId) -> Result<Option<Lead>, Self::Error>;

    fn list_interactions(&self, lead_id: LeadId) -> Result<Vec<Interaction>, Self::Error>;

    /// Owned-lead counts per member across every lead status.
    fn count_leads_by_owner(&self, org_id: OrgId) -> Result<HashMap<MemberId, i64>, Self::Error>;

    /// Members with one of `roles`, oldest first, at most `limit`.
    fn list_org_members(
        &self,
        org_id: OrgId,
        roles: &[MemberRole],
        limit: usize,
    ) -> Result<Vec<OrgMember>, Self::Error>;

    /// Leads whose status is not terminal.
    fn list_open_leads(&self, org_id: OrgId) -> Result<Vec<Lead>, Self::Error>;

    fn update_lead(
        &self,
        id: LeadId,
        update: LeadUpdate,
        now_utc: i64,
    ) -> Result<Lead, Self::Error>;

    fn find_pending_task(
        &self,
        lead_id: LeadId,
        kind: &TaskKind,
    ) -> Result<Option<Task>, Self::Error>;

    fn create_task(&self, input: TaskNew) -> Result<Task, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "task", rename_all = "snake_case")]
pub enum FollowUpOutcome {
    Created(Task),
    Existing(Task),
    NotNeeded,
}

impl FollowUpOutcome {
    pub fn task(&self) -> Option<&Task> {
        match self {
            FollowUpOutcome::Created(task) | FollowUpOutcome::Existing(task) => Some(task),
            FollowUpOutcome::NotNeeded => None,
        }
    }
}

fn require_lead<S: LeadStore>(store: &S, id: LeadId) -> Result<Lead, S::Error> {
    store
        .fetch_lead(id)?
        .ok_or_else(|| CoreError::LeadNotFound(id).into())
}

/// Recomputes temperature and last contact from the full interaction
/// history and writes both back.
pub fn rescore_lead<S: LeadStore>(
    store: &S,
    lead_id: LeadId,
    now_utc: i64,
) -> Result<Lead, S::Error> {
    let lead = require_lead(store, lead_id)?;
    let interactions = store.list_interactions(lead_id)?;
    let score = score_temperature(&lead.status, &interactions, now_utc);
    debug!(
        lead_id = %lead_id,
        status = %lead.status,
        interactions = interactions.len(),
        previous = %lead.temperature,
        temperature = %score.temperature,
        "lead rescored"
    );

    store.update_lead(
        lead_id,
        LeadUpdate {
            temperature: Some(score.temperature),
            last_contact_at: Some(score.last_contact_at),
            ..Default::default()
        },
        now_utc,
    )
}

/// Plans a follow-up and persists it unless the lead already has a pending
/// one, in which case the existing task is returned and the plan dropped.
pub fn materialize_follow_up<S: LeadStore>(
    store: &S,
    lead_id: LeadId,
    now_utc: i64,
) -> Result<FollowUpOutcome, S::Error> {
    let lead = require_lead(store, lead_id)?;
    materialize_for_lead(store, &lead, now_utc)
}

/// Runs the follow-up planner over every open lead of an organization.
pub fn sweep_follow_ups<S: LeadStore>(
    store: &S,
    org_id: OrgId,
    now_utc: i64,
) -> Result<Vec<(LeadId, FollowUpOutcome)>, S::Error> {
    let leads = store.list_open_leads(org_id)?;
    let mut outcomes = Vec::with_capacity(leads.len());
    for lead in leads {
        let outcome = materialize_for_lead(store, &lead, now_utc)?;
        outcomes.push((lead.id, outcome));
    }
    debug!(org_id = %org_id, leads = outcomes.len(), "follow-up sweep finished");
    Ok(outcomes)
}

fn materialize_for_lead<S: LeadStore>(
    store: &S,
    lead: &Lead,
    now_utc: i64,
) -> Result<FollowUpOutcome, S::Error> {
    let Some(proposal) = plan_follow_up(&LeadSnapshot::from(lead), now_utc) else {
        debug!(lead_id = %lead.id, status = %lead.status, "no follow-up for terminal lead");
        return Ok(FollowUpOutcome::NotNeeded);
    };

    if let Some(existing) = store.find_pending_task(lead.id, &TaskKind::FollowUp)? {
        debug!(lead_id = %lead.id, task_id = %existing.id, "pending follow-up already exists");
        return Ok(FollowUpOutcome::Existing(existing));
    }

    let task = store.create_task(TaskNew {
        org_id: lead.org_id,
        lead_id: lead.id,
        owner_id: lead.owner_id,
        kind: TaskKind::FollowUp,
        title: proposal.title,
        rationale: proposal.rationale,
        payload: proposal.payload,
        due_at: proposal.due_at,
        created_at: now_utc,
    })?;
    store.update_lead(
        lead.id,
        LeadUpdate {
            next_action_at: Some(Some(task.due_at)),
            ..Default::default()
        },
        now_utc,
    )?;
    debug!(
        lead_id = %lead.id,
        task_id = %task.id,
        due_at = task.due_at,
        channel = task.payload.suggested_channel.as_str(),
        "follow-up created"
    );

    Ok(FollowUpOutcome::Created(task))
}

/// Routes a lead to the least-loaded assignable member of its organization
/// and records the owner.
pub fn assign_owner<S: LeadStore>(
    store: &S,
    lead_id: LeadId,
    page_size: usize,
    now_utc: i64,
) -> Result<(Lead, Assignment), S::Error> {
    let lead = require_lead(store, lead_id)?;
    let roles = assignable_roles();
    let members = store.list_org_members(lead.org_id, &roles, page_size)?;
    let candidates: Vec<MemberId> = members
        .iter()
        .filter(|member| member.org_id == lead.org_id && member.role.is_assignable())
        .map(|member| member.id)
        .collect();
    let load_counts = store.count_leads_by_owner(lead.org_id)?;

    let assignment = assign_least(candidates.iter().copied(), &load_counts)?;
    debug!(
        lead_id = %lead_id,
        org_id = %lead.org_id,
        candidates = candidates.len(),
        agent_id = %assignment.agent_id,
        load = assignment.count_at_decision,
        "lead assigned"
    );

    let lead = store.update_lead(
        lead_id,
        LeadUpdate {
            owner_id: Some(Some(assignment.agent_id)),
            ..Default::default()
        },
        now_utc,
    )?;
    Ok((lead, assignment))
}
