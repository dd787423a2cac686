use crate::domain::MemberId;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_CANDIDATE_PAGE_SIZE: usize = 200;
pub const MAX_CANDIDATE_PAGE_SIZE: usize = 1_000;

pub fn validate_page_size(value: i64) -> Result<usize, CoreError> {
    match usize::try_from(value) {
        Ok(size) if (1..=MAX_CANDIDATE_PAGE_SIZE).contains(&size) => Ok(size),
        _ => Err(CoreError::InvalidPageSize(value)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub agent_id: MemberId,
    /// Owned-lead count of the winner before this assignment lands.
    pub count_at_decision: i64,
}

/// Picks the least-loaded candidate. Candidates are scanned in the given
/// order and the first one seen wins every tie; missing counts are zero.
pub fn assign_least<I>(
    candidates: I,
    load_counts: &HashMap<MemberId, i64>,
) -> Result<Assignment, CoreError>
where
    I: IntoIterator<Item = MemberId>,
{
    let load_of = |id: &MemberId| load_counts.get(id).copied().unwrap_or(0);

    let mut candidates = candidates.into_iter();
    let first = candidates.next().ok_or(CoreError::NoCandidates)?;
    let mut best = Assignment {
        agent_id: first,
        count_at_decision: load_of(&first),
    };

    for candidate in candidates {
        let count = load_of(&candidate);
        if count < best.count_at_decision {
            best = Assignment {
                agent_id: candidate,
                count_at_decision: count,
            };
        }
    }

    Ok(best)
}
