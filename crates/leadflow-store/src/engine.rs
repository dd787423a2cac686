use crate::error::{Result, StoreError};
use crate::repo::{InteractionNew, InteractionsRepo, LeadNew, LeadsRepo, MembersRepo, TasksRepo};
use crate::Store;
use leadflow_core::domain::{
    Interaction, Lead, LeadId, LeadStatus, LeadUpdate, MemberId, MemberRole, OrgId, OrgMember,
    Task, TaskKind, TaskNew,
};
use leadflow_core::engine::{self, FollowUpOutcome, LeadStore};
use leadflow_core::rules::Assignment;
use leadflow_core::CoreError;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::HashMap;

/// `LeadStore` over a single SQLite connection (or open transaction).
pub struct SqliteLeadStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteLeadStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl LeadStore for SqliteLeadStore<'_> {
    type Error = StoreError;

    fn fetch_lead(&self, id: LeadId) -> Result<Option<Lead>> {
        LeadsRepo::new(self.conn).get(id)
    }

    fn list_interactions(&self, lead_id: LeadId) -> Result<Vec<Interaction>> {
        InteractionsRepo::new(self.conn).list_for_lead(lead_id)
    }

    fn count_leads_by_owner(&self, org_id: OrgId) -> Result<HashMap<MemberId, i64>> {
        LeadsRepo::new(self.conn).count_by_owner(org_id)
    }

    fn list_org_members(
        &self,
        org_id: OrgId,
        roles: &[MemberRole],
        limit: usize,
    ) -> Result<Vec<OrgMember>> {
        MembersRepo::new(self.conn).list_for_org(org_id, roles, limit)
    }

    fn list_open_leads(&self, org_id: OrgId) -> Result<Vec<Lead>> {
        LeadsRepo::new(self.conn).list_open_for_org(org_id)
    }

    fn update_lead(&self, id: LeadId, update: LeadUpdate, now_utc: i64) -> Result<Lead> {
        LeadsRepo::new(self.conn).update(now_utc, id, update)
    }

    fn find_pending_task(&self, lead_id: LeadId, kind: &TaskKind) -> Result<Option<Task>> {
        TasksRepo::new(self.conn).find_pending(lead_id, kind)
    }

    fn create_task(&self, input: TaskNew) -> Result<Task> {
        TasksRepo::new(self.conn).create(input)
    }
}

#[derive(Debug, Clone)]
pub struct LeadCreated {
    pub lead: Lead,
    pub assignment: Option<Assignment>,
}

#[derive(Debug, Clone)]
pub struct InteractionRecorded {
    pub interaction: Interaction,
    pub lead: Lead,
    pub follow_up: Option<FollowUpOutcome>,
}

/// Engine entry points. Each runs in one immediate transaction and holds the
/// database write lock from the first read to the last write. Calls made
/// while a transaction is already open join it.
impl Store {
    fn in_write_tx<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.connection();
        if !conn.is_autocommit() {
            return f(conn);
        }
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        let value = f(&*tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Creates a lead; when `auto_assign_page_size` is set and the lead has
    /// no owner it is routed to the least-loaded member.
    pub fn create_lead(
        &self,
        now_utc: i64,
        input: LeadNew,
        auto_assign_page_size: Option<usize>,
    ) -> Result<LeadCreated> {
        self.in_write_tx(|conn| {
            let lead = LeadsRepo::new(conn).create(now_utc, input)?;
            let page_size = match auto_assign_page_size {
                Some(page_size) if lead.owner_id.is_none() => page_size,
                _ => {
                    return Ok(LeadCreated {
                        lead,
                        assignment: None,
                    })
                }
            };
            let port = SqliteLeadStore::new(conn);
            match engine::assign_owner(&port, lead.id, page_size, now_utc) {
                Ok((lead, assignment)) => Ok(LeadCreated {
                    lead,
                    assignment: Some(assignment),
                }),
                // An organization without agents yet keeps its leads unassigned.
                Err(StoreError::Core(CoreError::NoCandidates)) => Ok(LeadCreated {
                    lead,
                    assignment: None,
                }),
                Err(err) => Err(err),
            }
        })
    }

    pub fn record_interaction(
        &self,
        now_utc: i64,
        input: InteractionNew,
        plan_follow_up: bool,
    ) -> Result<InteractionRecorded> {
        self.in_write_tx(|conn| {
            let port = SqliteLeadStore::new(conn);
            let interaction = InteractionsRepo::new(conn).add(input)?;
            let mut lead = engine::rescore_lead(&port, interaction.lead_id, now_utc)?;
            let follow_up = if plan_follow_up {
                let outcome = engine::materialize_follow_up(&port, lead.id, now_utc)?;
                if let Some(refreshed) = port.fetch_lead(lead.id)? {
                    lead = refreshed;
                }
                Some(outcome)
            } else {
                None
            };
            Ok(InteractionRecorded {
                interaction,
                lead,
                follow_up,
            })
        })
    }

    /// Moves a lead to `status` and rescores it against its history.
    pub fn change_status(&self, now_utc: i64, lead_id: LeadId, status: LeadStatus) -> Result<Lead> {
        self.in_write_tx(|conn| {
            let port = SqliteLeadStore::new(conn);
            port.update_lead(
                lead_id,
                LeadUpdate {
                    status: Some(status),
                    ..Default::default()
                },
                now_utc,
            )?;
            engine::rescore_lead(&port, lead_id, now_utc)
        })
    }

    pub fn rescore_lead(&self, now_utc: i64, lead_id: LeadId) -> Result<Lead> {
        self.in_write_tx(|conn| engine::rescore_lead(&SqliteLeadStore::new(conn), lead_id, now_utc))
    }

    pub fn plan_follow_up(&self, now_utc: i64, lead_id: LeadId) -> Result<FollowUpOutcome> {
        self.in_write_tx(|conn| {
            engine::materialize_follow_up(&SqliteLeadStore::new(conn), lead_id, now_utc)
        })
    }

    pub fn sweep_follow_ups(
        &self,
        now_utc: i64,
        org_id: OrgId,
    ) -> Result<Vec<(LeadId, FollowUpOutcome)>> {
        self.in_write_tx(|conn| {
            engine::sweep_follow_ups(&SqliteLeadStore::new(conn), org_id, now_utc)
        })
    }

    pub fn assign_lead(
        &self,
        now_utc: i64,
        lead_id: LeadId,
        page_size: usize,
    ) -> Result<(Lead, Assignment)> {
        self.in_write_tx(|conn| {
            engine::assign_owner(&SqliteLeadStore::new(conn), lead_id, page_size, now_utc)
        })
    }
}
