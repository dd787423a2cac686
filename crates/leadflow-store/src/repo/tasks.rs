use crate::error::{Result, StoreError};
use leadflow_core::domain::{
    LeadId, MemberId, OrgId, Task, TaskId, TaskKind, TaskNew, TaskPayload, TaskStatus,
};
use leadflow_core::CoreError;
use rusqlite::{ffi, params, Connection};
use std::str::FromStr;

const TASK_COLUMNS: &str = "id, org_id, lead_id, owner_id, kind, status, title, rationale, \
     payload, due_at, created_at, updated_at";

pub struct TasksRepo<'a> {
    conn: &'a Connection,
}

impl<'a> TasksRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Inserts a pending task. A second pending follow-up for the same lead
    /// is rejected by the schema and reported as `DuplicatePendingTask`.
    pub fn create(&self, input: TaskNew) -> Result<Task> {
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
        let payload = serde_json::to_string(&task.payload)?;

        let inserted = self.conn.execute(
            &format!(
                "INSERT INTO tasks ({TASK_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);"
            ),
            params![
                task.id.to_string(),
                task.org_id.to_string(),
                task.lead_id.to_string(),
                task.owner_id.map(|id| id.to_string()),
                task.kind.as_str(),
                task.status.as_str(),
                task.title,
                task.rationale,
                payload,
                task.due_at,
                task.created_at,
                task.updated_at,
            ],
        );
        match inserted {
            Ok(_) => Ok(task),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(StoreError::DuplicatePendingTask(task.lead_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn get(&self, id: TaskId) -> Result<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(task_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn find_pending(&self, lead_id: LeadId, kind: &TaskKind) -> Result<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS}
             FROM tasks
             WHERE lead_id = ?1 AND kind = ?2 AND status = ?3
             ORDER BY created_at ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![
            lead_id.to_string(),
            kind.as_str(),
            TaskStatus::Pending.as_str()
        ])?;
        if let Some(row) = rows.next()? {
            Ok(Some(task_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Newest first.
    pub fn list_for_lead(&self, lead_id: LeadId) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS}
             FROM tasks
             WHERE lead_id = ?1
             ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([lead_id.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(task_from_row(row)?);
        }
        Ok(tasks)
    }

    /// Pending work for an organization, soonest due first.
    pub fn list_pending_for_org(
        &self,
        org_id: OrgId,
        owner_id: Option<MemberId>,
    ) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS}
             FROM tasks
             WHERE org_id = ?1 AND status = ?2 AND (?3 IS NULL OR owner_id = ?3)
             ORDER BY due_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query(params![
            org_id.to_string(),
            TaskStatus::Pending.as_str(),
            owner_id.map(|id| id.to_string())
        ])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(task_from_row(row)?);
        }
        Ok(tasks)
    }

    pub fn set_status(&self, now_utc: i64, id: TaskId, status: TaskStatus) -> Result<Task> {
        let mut task = self.get(id)?.ok_or(CoreError::TaskNotFound(id))?;
        task.status.ensure_transition(&status)?;
        task.status = status;
        task.updated_at = now_utc;

        self.conn.execute(
            "UPDATE tasks SET status = ?2, updated_at = ?3 WHERE id = ?1;",
            params![task.id.to_string(), task.status.as_str(), task.updated_at],
        )?;
        Ok(task)
    }
}

fn task_from_row(row: &rusqlite::Row<'_>) -> Result<Task> {
    let id_str: String = row.get(0)?;
    let id = TaskId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    let org_str: String = row.get(1)?;
    let org_id = OrgId::from_str(&org_str).map_err(|_| StoreError::InvalidId(org_str.clone()))?;
    let lead_str: String = row.get(2)?;
    let lead_id =
        LeadId::from_str(&lead_str).map_err(|_| StoreError::InvalidId(lead_str.clone()))?;
    let owner_raw: Option<String> = row.get(3)?;
    let owner_id = owner_raw
        .map(|raw| MemberId::from_str(&raw).map_err(|_| StoreError::InvalidId(raw.clone())))
        .transpose()?;
    let kind_raw: String = row.get(4)?;
    let status_raw: String = row.get(5)?;
    let payload_raw: String = row.get(8)?;
    let payload: TaskPayload = serde_json::from_str(&payload_raw)?;
    Ok(Task {
        id,
        org_id,
        lead_id,
        owner_id,
        kind: TaskKind::parse(&kind_raw),
        status: TaskStatus::parse(&status_raw),
        title: row.get(6)?,
        rationale: row.get(7)?,
        payload,
        due_at: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
