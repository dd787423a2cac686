use crate::error::{Result, StoreError};
use leadflow_core::domain::{MemberId, MemberRole, OrgId, OrgMember};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::str::FromStr;

const MEMBER_COLUMNS: &str = "id, org_id, role, display_name, email, phone, created_at";

#[derive(Debug, Clone)]
pub struct MemberNew {
    pub org_id: OrgId,
    pub role: MemberRole,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

pub struct MembersRepo<'a> {
    conn: &'a Connection,
}

impl<'a> MembersRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, input: MemberNew) -> Result<OrgMember> {
        let member = OrgMember {
            id: MemberId::new(),
            org_id: input.org_id,
            role: input.role,
            display_name: input.display_name.trim().to_string(),
            email: input.email,
            phone: input.phone,
            created_at: now_utc,
        };
        member.validate()?;

        self.conn.execute(
            "INSERT INTO org_members (id, org_id, role, display_name, email, phone, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                member.id.to_string(),
                member.org_id.to_string(),
                member.role.as_str(),
                member.display_name,
                member.email,
                member.phone,
                member.created_at,
            ],
        )?;
        Ok(member)
    }

    pub fn get(&self, id: MemberId) -> Result<Option<OrgMember>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEMBER_COLUMNS} FROM org_members WHERE id = ?1;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(member_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Members of `org_id` holding one of `roles`, oldest first.
    pub fn list_for_org(
        &self,
        org_id: OrgId,
        roles: &[MemberRole],
        limit: usize,
    ) -> Result<Vec<OrgMember>> {
        if roles.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let placeholders = (0..roles.len())
            .map(|index| format!("?{}", index + 3))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEMBER_COLUMNS}
             FROM org_members
             WHERE org_id = ?1 AND role IN ({placeholders})
             ORDER BY created_at ASC, rowid ASC
             LIMIT ?2;"
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut values: Vec<Value> = vec![Value::from(org_id.to_string()), Value::from(limit)];
        values.extend(roles.iter().map(|role| Value::from(role.as_str().to_string())));

        let mut rows = stmt.query(params_from_iter(values))?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(member_from_row(row)?);
        }
        Ok(members)
    }

    pub fn list_all_for_org(&self, org_id: OrgId) -> Result<Vec<OrgMember>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEMBER_COLUMNS}
             FROM org_members
             WHERE org_id = ?1
             ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([org_id.to_string()])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(member_from_row(row)?);
        }
        Ok(members)
    }
}

fn member_from_row(row: &rusqlite::Row<'_>) -> Result<OrgMember> {
    let id_str: String = row.get(0)?;
    let id = MemberId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    let org_str: String = row.get(1)?;
    let org_id = OrgId::from_str(&org_str).map_err(|_| StoreError::InvalidId(org_str.clone()))?;
    let role_raw: String = row.get(2)?;
    Ok(OrgMember {
        id,
        org_id,
        role: MemberRole::parse(&role_raw),
        display_name: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        created_at: row.get(6)?,
    })
}
