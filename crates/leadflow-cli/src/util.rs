use crate::error::invalid_input;
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use leadflow_core::domain::{
    InteractionKind, LeadId, LeadStatus, MemberId, MemberRole, OrgId, TaskId,
};
use leadflow_core::CoreError;
use std::str::FromStr;

pub use leadflow_core::time::{now_utc, parse_local_timestamp};

fn parse_id<T: FromStr>(raw: &str, label: &str) -> Result<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input(format!("{label} id cannot be empty")));
    }
    T::from_str(trimmed).map_err(|_| invalid_input(format!("invalid {label} id: {trimmed}")))
}

pub fn parse_lead_id(raw: &str) -> Result<LeadId> {
    if raw.trim().is_empty() {
        return Err(CoreError::MissingLeadId.into());
    }
    parse_id(raw, "lead")
}

pub fn parse_member_id(raw: &str) -> Result<MemberId> {
    parse_id(raw, "member")
}

pub fn parse_org_id(raw: &str) -> Result<OrgId> {
    parse_id(raw, "org")
}

pub fn parse_task_id(raw: &str) -> Result<TaskId> {
    parse_id(raw, "task")
}

fn ensure_label(raw: &str, what: &str) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(invalid_input(format!("{what} cannot be empty")));
    }
    Ok(())
}

pub fn parse_status(raw: &str) -> Result<LeadStatus> {
    ensure_label(raw, "status")?;
    Ok(LeadStatus::parse(raw))
}

pub fn parse_interaction_kind(raw: &str) -> Result<InteractionKind> {
    ensure_label(raw, "interaction kind")?;
    Ok(InteractionKind::parse(raw))
}

pub fn parse_role(raw: &str) -> Result<MemberRole> {
    ensure_label(raw, "role")?;
    Ok(MemberRole::parse(raw))
}

pub fn format_timestamp_datetime(ts: i64) -> String {
    let dt = DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_default()
        .with_timezone(&Local);
    dt.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_optional_timestamp(ts: Option<i64>) -> String {
    ts.map(format_timestamp_datetime)
        .unwrap_or_else(|| "-".to_string())
}
