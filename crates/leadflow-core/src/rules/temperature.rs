use crate::domain::{Interaction, InteractionKind, LeadStatus, Temperature};
use crate::time::whole_days_between;
use serde::{Deserialize, Serialize};

pub const NO_CONTACT_PENALTY: i64 = 10;
pub const DECAY_PER_DAY: i64 = 4;
pub const MAX_DECAY: i64 = 40;
/// Only the most recent interactions earn a bonus.
pub const BONUS_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureScore {
    pub temperature: Temperature,
    pub last_contact_at: Option<i64>,
}

pub fn base_score(status: &LeadStatus) -> i64 {
    match status {
        LeadStatus::New => 55,
        LeadStatus::Contacted => 60,
        LeadStatus::Qualified => 70,
        LeadStatus::Viewing => 78,
        LeadStatus::Offer => 85,
        LeadStatus::Won => 100,
        LeadStatus::Lost => 10,
        LeadStatus::Archived | LeadStatus::Other(_) => 40,
    }
}

pub fn interaction_bonus(kind: &InteractionKind) -> i64 {
    match kind {
        InteractionKind::Meeting => 5,
        InteractionKind::Call => 3,
        InteractionKind::Sms | InteractionKind::Whatsapp => 2,
        InteractionKind::Email => 1,
        InteractionKind::Note | InteractionKind::Other(_) => 0,
    }
}

/// Scores engagement from the pipeline stage and the full interaction
/// history. Input order only matters for interactions sharing a timestamp
/// at the edge of the bonus window; earlier entries win.
pub fn score_temperature(
    status: &LeadStatus,
    interactions: &[Interaction],
    now_utc: i64,
) -> TemperatureScore {
    let mut score = base_score(status);

    let last_contact_at = interactions.iter().map(|item| item.created_at).max();
    match last_contact_at {
        Some(last) => {
            let days = whole_days_between(last, now_utc);
            score -= days.saturating_mul(DECAY_PER_DAY).min(MAX_DECAY);
        }
        None => score -= NO_CONTACT_PENALTY,
    }

    let mut recent: Vec<&Interaction> = interactions.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    score += recent
        .iter()
        .take(BONUS_WINDOW)
        .map(|item| interaction_bonus(&item.kind))
        .sum::<i64>();

    TemperatureScore {
        temperature: Temperature::clamped(score),
        last_contact_at,
    }
}
