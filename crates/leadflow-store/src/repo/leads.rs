use crate::error::{Result, StoreError};
use crate::repo::members::MembersRepo;
use leadflow_core::domain::{Lead, LeadId, LeadStatus, LeadUpdate, MemberId, OrgId, Temperature};
use leadflow_core::rules::score_temperature;
use leadflow_core::CoreError;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::str::FromStr;

const LEAD_COLUMNS: &str = "id, org_id, owner_id, display_name, email, phone, source, status, \
     temperature, last_contact_at, next_action_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct LeadNew {
    pub org_id: OrgId,
    pub owner_id: Option<MemberId>,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: LeadStatus,
}

pub struct LeadsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> LeadsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Inserts a lead scored as if it had no contact history yet.
    pub fn create(&self, now_utc: i64, input: LeadNew) -> Result<Lead> {
        if let Some(owner_id) = input.owner_id {
            ensure_member_of(self.conn, owner_id, input.org_id)?;
        }

        let initial = score_temperature(&input.status, &[], now_utc);
        let lead = Lead {
            id: LeadId::new(),
            org_id: input.org_id,
            owner_id: input.owner_id,
            display_name: input.display_name.trim().to_string(),
            email: input.email,
            phone: input.phone,
            source: input.source,
            status: input.status,
            temperature: initial.temperature,
            last_contact_at: initial.last_contact_at,
            next_action_at: None,
            created_at: now_utc,
            updated_at: now_utc,
        };
        lead.validate()?;

        self.conn.execute(
            &format!(
                "INSERT INTO leads ({LEAD_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);"
            ),
            params![
                lead.id.to_string(),
                lead.org_id.to_string(),
                lead.owner_id.map(|id| id.to_string()),
                lead.display_name,
                lead.email,
                lead.phone,
                lead.source,
                lead.status.as_str(),
                i64::from(lead.temperature),
                lead.last_contact_at,
                lead.next_action_at,
                lead.created_at,
                lead.updated_at,
            ],
        )?;
        Ok(lead)
    }

    pub fn get(&self, id: LeadId) -> Result<Option<Lead>> {
        get_inner(self.conn, id)
    }

    pub fn update(&self, now_utc: i64, id: LeadId, update: LeadUpdate) -> Result<Lead> {
        let mut lead = get_inner(self.conn, id)?.ok_or(CoreError::LeadNotFound(id))?;
        if let Some(Some(owner_id)) = update.owner_id {
            ensure_member_of(self.conn, owner_id, lead.org_id)?;
        }

        update.apply(&mut lead);
        lead.display_name = lead.display_name.trim().to_string();
        lead.updated_at = now_utc;
        lead.validate()?;

        self.conn.execute(
            "UPDATE leads
             SET owner_id = ?2, display_name = ?3, email = ?4, phone = ?5, source = ?6,
                 status = ?7, temperature = ?8, last_contact_at = ?9, next_action_at = ?10,
                 updated_at = ?11
             WHERE id = ?1;",
            params![
                lead.id.to_string(),
                lead.owner_id.map(|id| id.to_string()),
                lead.display_name,
                lead.email,
                lead.phone,
                lead.source,
                lead.status.as_str(),
                i64::from(lead.temperature),
                lead.last_contact_at,
                lead.next_action_at,
                lead.updated_at,
            ],
        )?;
        Ok(lead)
    }

    /// Hottest leads first.
    pub fn list_for_org(&self, org_id: OrgId, owner_id: Option<MemberId>) -> Result<Vec<Lead>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LEAD_COLUMNS}
             FROM leads
             WHERE org_id = ?1 AND (?2 IS NULL OR owner_id = ?2)
             ORDER BY temperature DESC, created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query(params![
            org_id.to_string(),
            owner_id.map(|id| id.to_string())
        ])?;
        let mut leads = Vec::new();
        while let Some(row) = rows.next()? {
            leads.push(lead_from_row(row)?);
        }
        Ok(leads)
    }

    /// Leads still in play, oldest first.
    pub fn list_open_for_org(&self, org_id: OrgId) -> Result<Vec<Lead>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LEAD_COLUMNS}
             FROM leads
             WHERE org_id = ?1 AND status NOT IN ('WON', 'LOST', 'ARCHIVED')
             ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([org_id.to_string()])?;
        let mut leads = Vec::new();
        while let Some(row) = rows.next()? {
            leads.push(lead_from_row(row)?);
        }
        Ok(leads)
    }

    /// Owned-lead counts per owner. Closed and archived leads count too.
    pub fn count_by_owner(&self, org_id: OrgId) -> Result<HashMap<MemberId, i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT owner_id, COUNT(*)
             FROM leads
             WHERE org_id = ?1 AND owner_id IS NOT NULL
             GROUP BY owner_id;",
        )?;
        let mut rows = stmt.query([org_id.to_string()])?;
        let mut counts = HashMap::new();
        while let Some(row) = rows.next()? {
            let owner_raw: String = row.get(0)?;
            let owner_id = MemberId::from_str(&owner_raw)
                .map_err(|_| StoreError::InvalidId(owner_raw.clone()))?;
            counts.insert(owner_id, row.get(1)?);
        }
        Ok(counts)
    }
}

fn ensure_member_of(conn: &Connection, member_id: MemberId, org_id: OrgId) -> Result<()> {
    let member = MembersRepo::new(conn)
        .get(member_id)?
        .ok_or(CoreError::MemberNotFound(member_id))?;
    if member.org_id != org_id {
        return Err(CoreError::MemberOutsideOrg {
            member: member_id,
            org: org_id,
        }
        .into());
    }
    Ok(())
}

fn get_inner(conn: &Connection, id: LeadId) -> Result<Option<Lead>> {
    let mut stmt = conn.prepare(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        Ok(Some(lead_from_row(row)?))
    } else {
        Ok(None)
    }
}

fn lead_from_row(row: &rusqlite::Row<'_>) -> Result<Lead> {
    let id_str: String = row.get(0)?;
    let id = LeadId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    let org_str: String = row.get(1)?;
    let org_id = OrgId::from_str(&org_str).map_err(|_| StoreError::InvalidId(org_str.clone()))?;
    let owner_raw: Option<String> = row.get(2)?;
    let owner_id = owner_raw
        .map(|raw| MemberId::from_str(&raw).map_err(|_| StoreError::InvalidId(raw.clone())))
        .transpose()?;
    let status_raw: String = row.get(7)?;
    let temperature: i64 = row.get(8)?;
    Ok(Lead {
        id,
        org_id,
        owner_id,
        display_name: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        source: row.get(6)?,
        status: LeadStatus::parse(&status_raw),
        temperature: Temperature::new(temperature)?,
        last_contact_at: row.get(9)?,
        next_action_at: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}
