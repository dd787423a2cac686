use crate::error::{Result, StoreError};
use leadflow_core::domain::{Interaction, InteractionId, InteractionKind, LeadId, MemberId};
use leadflow_core::CoreError;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct InteractionNew {
    pub lead_id: LeadId,
    pub actor_id: Option<MemberId>,
    pub kind: InteractionKind,
    pub content: String,
    pub created_at: i64,
}

pub struct InteractionsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> InteractionsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn add(&self, input: InteractionNew) -> Result<Interaction> {
        let lead_exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM leads WHERE id = ?1;",
                [input.lead_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if lead_exists.is_none() {
            return Err(CoreError::LeadNotFound(input.lead_id).into());
        }

        let id = InteractionId::new();
        self.conn.execute(
            "INSERT INTO interactions (id, lead_id, actor_id, kind, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                input.lead_id.to_string(),
                input.actor_id.map(|actor| actor.to_string()),
                input.kind.as_str(),
                input.content,
                input.created_at,
            ],
        )?;

        Ok(Interaction {
            id,
            lead_id: input.lead_id,
            actor_id: input.actor_id,
            kind: input.kind,
            content: input.content,
            created_at: input.created_at,
        })
    }

    /// Full history in insertion order within equal timestamps.
    pub fn list_for_lead(&self, lead_id: LeadId) -> Result<Vec<Interaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, lead_id, actor_id, kind, content, created_at
             FROM interactions
             WHERE lead_id = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([lead_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(interaction_from_row(row)?);
        }
        Ok(items)
    }

    pub fn list_recent(&self, lead_id: LeadId, limit: i64) -> Result<Vec<Interaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, lead_id, actor_id, kind, content, created_at
             FROM interactions
             WHERE lead_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![lead_id.to_string(), limit])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(interaction_from_row(row)?);
        }
        Ok(items)
    }
}

fn interaction_from_row(row: &rusqlite::Row<'_>) -> Result<Interaction> {
    let id_str: String = row.get(0)?;
    let id = InteractionId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    let lead_str: String = row.get(1)?;
    let lead_id =
        LeadId::from_str(&lead_str).map_err(|_| StoreError::InvalidId(lead_str.clone()))?;
    let actor_raw: Option<String> = row.get(2)?;
    let actor_id = actor_raw
        .map(|raw| MemberId::from_str(&raw).map_err(|_| StoreError::InvalidId(raw.clone())))
        .transpose()?;
    let kind_raw: String = row.get(3)?;
    Ok(Interaction {
        id,
        lead_id,
        actor_id,
        kind: InteractionKind::parse(&kind_raw),
        content: row.get(4)?,
        created_at: row.get(5)?,
    })
}
