use leadflow_core::domain::{
    Interaction, InteractionId, InteractionKind, Lead, LeadId, LeadStatus, LeadUpdate, MemberId,
    MemberRole, OrgId, OrgMember, Task, TaskId, TaskKind, TaskNew, TaskStatus, Temperature,
};
use leadflow_core::engine::{
    assign_owner, materialize_follow_up, rescore_lead, sweep_follow_ups, FollowUpOutcome,
    LeadStore,
};
use leadflow_core::time::{SECONDS_PER_DAY, SECONDS_PER_HOUR};
use leadflow_core::CoreError;
use std::cell::RefCell;
use std::collections::HashMap;

const NOW: i64 = 1_700_000_000;

#[derive(Debug, PartialEq, Eq)]
enum MemoryError {
    Core(CoreError),
}

impl From<CoreError> for MemoryError {
    fn from(value: CoreError) -> Self {
        MemoryError::Core(value)
    }
}

#[derive(Default)]
struct MemoryStore {
    leads: RefCell<Vec<Lead>>,
    interactions: RefCell<Vec<Interaction>>,
    members: RefCell<Vec<OrgMember>>,
    tasks: RefCell<Vec<Task>>,
}

impl MemoryStore {
    fn add_lead(&self, org_id: OrgId, status: LeadStatus, owner_id: Option<MemberId>) -> LeadId {
        let id = LeadId::new();
        self.leads.borrow_mut().push(Lead {
            id,
            org_id,
            owner_id,
            display_name: "Maya Chen".to_string(),
            email: None,
            phone: None,
            source: None,
            status,
            temperature: Temperature::new(50).unwrap(),
            last_contact_at: None,
            next_action_at: None,
            created_at: NOW - 10 * SECONDS_PER_DAY,
            updated_at: NOW - 10 * SECONDS_PER_DAY,
        });
        id
    }

    fn add_member(&self, org_id: OrgId, role: MemberRole, created_at: i64) -> MemberId {
        let id = MemberId::new();
        self.members.borrow_mut().push(OrgMember {
            id,
            org_id,
            role,
            display_name: "Agent".to_string(),
            email: None,
            phone: None,
            created_at,
        });
        id
    }

    fn log(&self, lead_id: LeadId, kind: InteractionKind, created_at: i64) {
        self.interactions.borrow_mut().push(Interaction {
            id: InteractionId::new(),
            lead_id,
            actor_id: None,
            kind,
            content: String::new(),
            created_at,
        });
    }

    fn lead(&self, id: LeadId) -> Lead {
        self.leads
            .borrow()
            .iter()
            .find(|lead| lead.id == id)
            .cloned()
            .expect("lead")
    }
}

impl LeadStore for MemoryStore {
    type Error = MemoryError;

    fn fetch_lead(&self, id: LeadId) -> Result<Option<Lead>, Self::Error> {
        Ok(self.leads.borrow().iter().find(|lead| lead.id == id).cloned())
    }

    fn list_interactions(&self, lead_id: LeadId) -> Result<Vec<Interaction>, Self::Error> {
        Ok(self
            .interactions
            .borrow()
            .iter()
            .filter(|item| item.lead_id == lead_id)
            .cloned()
            .collect())
    }

    fn count_leads_by_owner(&self, org_id: OrgId) -> Result<HashMap<MemberId, i64>, Self::Error> {
        let mut counts = HashMap::new();
        for lead in self.leads.borrow().iter().filter(|lead| lead.org_id == org_id) {
            if let Some(owner) = lead.owner_id {
                *counts.entry(owner).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    fn list_org_members(
        &self,
        org_id: OrgId,
        roles: &[MemberRole],
        limit: usize,
    ) -> Result<Vec<OrgMember>, Self::Error> {
        let mut members: Vec<OrgMember> = self
            .members
            .borrow()
            .iter()
            .filter(|member| member.org_id == org_id && roles.contains(&member.role))
            .cloned()
            .collect();
        members.sort_by_key(|member| member.created_at);
        members.truncate(limit);
        Ok(members)
    }

    fn list_open_leads(&self, org_id: OrgId) -> Result<Vec<Lead>, Self::Error> {
        Ok(self
            .leads
            .borrow()
            .iter()
            .filter(|lead| lead.org_id == org_id && !lead.status.is_terminal())
            .cloned()
            .collect())
    }

    fn update_lead(
        &self,
        id: LeadId,
        update: LeadUpdate,
        now_utc: i64,
    ) -> Result<Lead, Self::Error> {
        let mut leads = self.leads.borrow_mut();
        let lead = leads
            .iter_mut()
            .find(|lead| lead.id == id)
            .ok_or(CoreError::LeadNotFound(id))?;
        update.apply(lead);
        lead.updated_at = now_utc;
        Ok(lead.clone())
    }

    fn find_pending_task(
        &self,
        lead_id: LeadId,
        kind: &TaskKind,
    ) -> Result<Option<Task>, Self::Error> {
        Ok(self
            .tasks
            .borrow()
            .iter()
            .find(|task| {
                task.lead_id == lead_id && &task.kind == kind && task.status == TaskStatus::Pending
            })
            .cloned())
    }

    fn create_task(&self, input: TaskNew) -> Result<Task, Self::Error> {
        let task = Task {
            id: TaskId::new(),
            org_id: input.org_id,
            lead_id: input.lead_id,
            owner_id: input.owner_id,
            kind: input.kind,
            status: TaskStatus::Pending,
            title: input.title,
            rationale: input.rationale,
            payload: input.payload,
            due_at: input.due_at,
            created_at: input.created_at,
            updated_at: input.created_at,
        };
        self.tasks.borrow_mut().push(task.clone());
        Ok(task)
    }
}

#[test]
fn rescore_writes_temperature_and_last_contact() {
    let store = MemoryStore::default();
    let lead_id = store.add_lead(OrgId::new(), LeadStatus::Qualified, None);
    store.log(lead_id, InteractionKind::Call, NOW - 3 * SECONDS_PER_DAY);
    store.log(lead_id, InteractionKind::Meeting, NOW - SECONDS_PER_DAY);

    let lead = rescore_lead(&store, lead_id, NOW).expect("rescore");
    assert_eq!(lead.temperature.value(), 74);
    assert_eq!(lead.last_contact_at, Some(NOW - SECONDS_PER_DAY));
    assert_eq!(lead.updated_at, NOW);
    assert_eq!(store.lead(lead_id), lead);
}

#[test]
fn rescore_unknown_lead_is_not_found() {
    let store = MemoryStore::default();
    let missing = LeadId::new();
    let err = rescore_lead(&store, missing, NOW).unwrap_err();
    assert_eq!(err, MemoryError::Core(CoreError::LeadNotFound(missing)));
}

#[test]
fn follow_up_created_once_per_pending_window() {
    let store = MemoryStore::default();
    let lead_id = store.add_lead(OrgId::new(), LeadStatus::New, None);

    let first = materialize_follow_up(&store, lead_id, NOW).expect("first");
    let created = match &first {
        FollowUpOutcome::Created(task) => task.clone(),
        other => panic!("expected created, got {other:?}"),
    };
    assert_eq!(created.due_at, NOW + 2 * SECONDS_PER_HOUR);
    assert_eq!(created.kind, TaskKind::FollowUp);
    assert_eq!(store.lead(lead_id).next_action_at, Some(created.due_at));

    let second = materialize_follow_up(&store, lead_id, NOW + 60).expect("second");
    assert_eq!(second, FollowUpOutcome::Existing(created.clone()));
    assert_eq!(store.tasks.borrow().len(), 1);
    assert_eq!(store.lead(lead_id).next_action_at, Some(created.due_at));
}

#[test]
fn follow_up_recreated_after_completion() {
    let store = MemoryStore::default();
    let lead_id = store.add_lead(OrgId::new(), LeadStatus::Contacted, None);
    materialize_follow_up(&store, lead_id, NOW).expect("first");
    store.tasks.borrow_mut()[0].status = TaskStatus::Done;

    let outcome = materialize_follow_up(&store, lead_id, NOW + 3_600).expect("second");
    assert!(matches!(outcome, FollowUpOutcome::Created(_)));
    assert_eq!(store.tasks.borrow().len(), 2);
}

#[test]
fn terminal_lead_gets_no_follow_up() {
    let store = MemoryStore::default();
    let lead_id = store.add_lead(OrgId::new(), LeadStatus::Won, None);
    let outcome = materialize_follow_up(&store, lead_id, NOW).expect("plan");
    assert_eq!(outcome, FollowUpOutcome::NotNeeded);
    assert!(outcome.task().is_none());
    assert!(store.tasks.borrow().is_empty());
    assert_eq!(store.lead(lead_id).next_action_at, None);
}

#[test]
fn follow_up_inherits_lead_owner() {
    let store = MemoryStore::default();
    let org = OrgId::new();
    let agent = store.add_member(org, MemberRole::Agent, NOW);
    let lead_id = store.add_lead(org, LeadStatus::Viewing, Some(agent));
    let outcome = materialize_follow_up(&store, lead_id, NOW).expect("plan");
    let task = outcome.task().expect("task");
    assert_eq!(task.owner_id, Some(agent));
    assert_eq!(task.org_id, org);
}

#[test]
fn sweep_plans_open_leads_only() {
    let store = MemoryStore::default();
    let org = OrgId::new();
    let open = store.add_lead(org, LeadStatus::New, None);
    let already = store.add_lead(org, LeadStatus::Offer, None);
    store.add_lead(org, LeadStatus::Lost, None);
    store.add_lead(OrgId::new(), LeadStatus::New, None);
    materialize_follow_up(&store, already, NOW - 60).expect("seed");

    let outcomes = sweep_follow_ups(&store, org, NOW).expect("sweep");
    assert_eq!(outcomes.len(), 2);
    let by_lead: HashMap<LeadId, FollowUpOutcome> = outcomes.into_iter().collect();
    assert!(matches!(by_lead[&open], FollowUpOutcome::Created(_)));
    assert!(matches!(by_lead[&already], FollowUpOutcome::Existing(_)));
    assert_eq!(store.tasks.borrow().len(), 2);
}

#[test]
fn assign_picks_least_loaded_eligible_member() {
    let store = MemoryStore::default();
    let org = OrgId::new();
    let busy = store.add_member(org, MemberRole::Owner, NOW - 300);
    let manager = store.add_member(org, MemberRole::Manager, NOW - 200);
    let later = store.add_member(org, MemberRole::Agent, NOW - 100);
    store.add_member(org, MemberRole::parse("assistant"), NOW - 400);
    store.add_member(OrgId::new(), MemberRole::Agent, NOW - 500);

    store.add_lead(org, LeadStatus::New, Some(busy));
    store.add_lead(org, LeadStatus::New, Some(busy));
    // Closed leads still count toward load.
    store.add_lead(org, LeadStatus::Won, Some(manager));

    let lead_id = store.add_lead(org, LeadStatus::New, None);
    let (lead, assignment) = assign_owner(&store, lead_id, 200, NOW).expect("assign");
    assert_eq!(assignment.agent_id, later);
    assert_eq!(assignment.count_at_decision, 0);
    assert_eq!(lead.owner_id, Some(later));

    let next_id = store.add_lead(org, LeadStatus::New, None);
    let (_, next) = assign_owner(&store, next_id, 200, NOW).expect("assign");
    assert_eq!(next.agent_id, manager);
    assert_eq!(next.count_at_decision, 1);
}

#[test]
fn assign_respects_page_size() {
    let store = MemoryStore::default();
    let org = OrgId::new();
    let first = store.add_member(org, MemberRole::Agent, NOW - 300);
    store.add_member(org, MemberRole::Agent, NOW - 200);
    store.add_lead(org, LeadStatus::New, Some(first));

    let lead_id = store.add_lead(org, LeadStatus::New, None);
    let (_, assignment) = assign_owner(&store, lead_id, 1, NOW).expect("assign");
    assert_eq!(assignment.agent_id, first);
    assert_eq!(assignment.count_at_decision, 1);
}

#[test]
fn assign_without_members_fails_without_writing() {
    let store = MemoryStore::default();
    let org = OrgId::new();
    store.add_member(org, MemberRole::parse("viewer"), NOW);
    let lead_id = store.add_lead(org, LeadStatus::New, None);
    let before = store.lead(lead_id);

    let err = assign_owner(&store, lead_id, 200, NOW).unwrap_err();
    assert_eq!(err, MemoryError::Core(CoreError::NoCandidates));
    assert_eq!(store.lead(lead_id), before);
}
