use crate::domain::{Channel, Lead, LeadStatus, TaskPayload, Temperature};
use crate::time::{whole_days_between, SECONDS_PER_HOUR};
use serde::{Deserialize, Serialize};

/// Days without contact after which pacing gives way to urgent re-engagement.
pub const ESCALATION_DAYS: i64 = 3;
pub const ESCALATION_WAIT_HOURS: i64 = 2;
/// Leads at or above this temperature get a call and curated options.
pub const PROACTIVE_THRESHOLD: u8 = 70;

/// The parts of a lead the planner reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadSnapshot<'a> {
    pub display_name: &'a str,
    pub status: &'a LeadStatus,
    pub temperature: Temperature,
    pub last_contact_at: Option<i64>,
}

impl<'a> From<&'a Lead> for LeadSnapshot<'a> {
    fn from(lead: &'a Lead) -> Self {
        Self {
            display_name: &lead.display_name,
            status: &lead.status,
            temperature: lead.temperature,
            last_contact_at: lead.last_contact_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpProposal {
    pub title: String,
    pub rationale: String,
    pub due_at: i64,
    pub payload: TaskPayload,
}

pub fn tier_wait_hours(temperature: Temperature) -> i64 {
    match temperature.value() {
        80.. => 6,
        65.. => 12,
        50.. => 24,
        _ => 36,
    }
}

pub fn plan_follow_up(lead: &LeadSnapshot<'_>, now_utc: i64) -> Option<FollowUpProposal> {
    if lead.status.is_terminal() {
        return None;
    }

    let days_since = lead
        .last_contact_at
        .map(|last| whole_days_between(last, now_utc));
    let overdue = days_since.is_none_or(|days| days >= ESCALATION_DAYS);
    let wait_hours = if overdue {
        ESCALATION_WAIT_HOURS
    } else {
        tier_wait_hours(lead.temperature)
    };

    let proactive = lead.temperature.value() >= PROACTIVE_THRESHOLD;
    let suggested_channel = if proactive { Channel::Call } else { Channel::Sms };
    let name = greeting_name(lead.display_name);
    let message_draft = if proactive {
        format!(
            "Hi {name}, I've put together a few curated options that match what you're looking for. Want me to send them over?"
        )
    } else {
        format!(
            "Hi {name}, just checking in to see if you're still interested. Happy to help whenever you're ready."
        )
    };

    Some(FollowUpProposal {
        title: format!("Follow up with {}", lead.display_name.trim()),
        rationale: rationale(lead.temperature, days_since),
        due_at: now_utc + wait_hours * SECONDS_PER_HOUR,
        payload: TaskPayload {
            message_draft,
            suggested_channel,
        },
    })
}

fn rationale(temperature: Temperature, days_since: Option<i64>) -> String {
    match days_since {
        Some(1) => format!("Temperature {temperature}; last contact 1 day ago."),
        Some(days) => format!("Temperature {temperature}; last contact {days} days ago."),
        None => format!("Temperature {temperature}; no prior contact."),
    }
}

fn greeting_name(display_name: &str) -> &str {
    let trimmed = display_name.trim();
    if trimmed.is_empty() {
        "there"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::{plan_follow_up, tier_wait_hours, LeadSnapshot};
    use crate::domain::{Channel, LeadStatus, Temperature};
    use crate::time::{SECONDS_PER_DAY, SECONDS_PER_HOUR};

    const NOW: i64 = 1_700_000_000;

    fn snapshot(
        status: &LeadStatus,
        temperature: i64,
        last_contact_at: Option<i64>,
    ) -> LeadSnapshot<'_> {
        LeadSnapshot {
            display_name: "Maya",
            status,
            temperature: Temperature::new(temperature).unwrap(),
            last_contact_at,
        }
    }

    #[test]
    fn terminal_statuses_get_no_proposal() {
        for status in [LeadStatus::Won, LeadStatus::Lost, LeadStatus::Archived] {
            assert!(plan_follow_up(&snapshot(&status, 90, None), NOW).is_none());
            assert!(plan_follow_up(&snapshot(&status, 10, Some(NOW)), NOW).is_none());
        }
    }

    #[test]
    fn stale_hot_lead_escalates_to_call() {
        let status = LeadStatus::Offer;
        let lead = snapshot(&status, 82, Some(NOW - 5 * SECONDS_PER_DAY));
        let proposal = plan_follow_up(&lead, NOW).expect("proposal");
        assert_eq!(proposal.due_at, NOW + 2 * SECONDS_PER_HOUR);
        assert_eq!(proposal.payload.suggested_channel, Channel::Call);
        assert!(proposal.payload.message_draft.contains("curated options"));
        assert!(proposal.payload.message_draft.contains("Maya"));
        assert!(proposal.rationale.contains("82"));
        assert!(proposal.rationale.contains("5 days ago"));
    }

    #[test]
    fn never_contacted_cool_lead_escalates_to_sms() {
        let status = LeadStatus::New;
        let proposal = plan_follow_up(&snapshot(&status, 40, None), NOW).expect("proposal");
        assert_eq!(proposal.due_at, NOW + 2 * SECONDS_PER_HOUR);
        assert_eq!(proposal.payload.suggested_channel, Channel::Sms);
        assert!(proposal.payload.message_draft.contains("still interested"));
        assert!(proposal.rationale.contains("no prior contact"));
    }

    #[test]
    fn recent_contact_follows_temperature_tier() {
        let status = LeadStatus::Qualified;
        let recent = Some(NOW - SECONDS_PER_DAY);
        let cases = [(85, 6), (70, 12), (65, 12), (55, 24), (50, 24), (49, 36)];
        for (temperature, hours) in cases {
            let proposal =
                plan_follow_up(&snapshot(&status, temperature, recent), NOW).expect("proposal");
            assert_eq!(
                proposal.due_at,
                NOW + hours * SECONDS_PER_HOUR,
                "temperature {temperature}"
            );
        }
    }

    #[test]
    fn two_days_since_contact_does_not_escalate() {
        let status = LeadStatus::Contacted;
        let lead = snapshot(&status, 60, Some(NOW - 2 * SECONDS_PER_DAY - 100));
        let proposal = plan_follow_up(&lead, NOW).expect("proposal");
        assert_eq!(proposal.due_at, NOW + 24 * SECONDS_PER_HOUR);
        assert!(proposal.rationale.contains("2 days ago"));
    }

    #[test]
    fn channel_switches_at_threshold() {
        let status = LeadStatus::Viewing;
        let recent = Some(NOW);
        let warm = plan_follow_up(&snapshot(&status, 69, recent), NOW).unwrap();
        let hot = plan_follow_up(&snapshot(&status, 70, recent), NOW).unwrap();
        assert_eq!(warm.payload.suggested_channel, Channel::Sms);
        assert_eq!(hot.payload.suggested_channel, Channel::Call);
    }

    #[test]
    fn greeting_fallback_stays_out_of_the_title() {
        let status = LeadStatus::New;
        let mut lead = snapshot(&status, 40, None);
        let named = plan_follow_up(&lead, NOW).expect("proposal");
        assert_eq!(named.title, "Follow up with Maya");

        lead.display_name = "  ";
        let blank = plan_follow_up(&lead, NOW).expect("proposal");
        assert!(blank.payload.message_draft.starts_with("Hi there,"));
        assert!(!blank.title.contains("there"));
    }

    #[test]
    fn unknown_status_is_not_terminal() {
        let status = LeadStatus::parse("paused");
        assert!(plan_follow_up(&snapshot(&status, 40, None), NOW).is_some());
    }

    #[test]
    fn tiers() {
        assert_eq!(tier_wait_hours(Temperature::new(100).unwrap()), 6);
        assert_eq!(tier_wait_hours(Temperature::new(0).unwrap()), 36);
    }

    #[test]
    fn identical_inputs_give_identical_proposals() {
        let status = LeadStatus::Contacted;
        let lead = snapshot(&status, 61, Some(NOW - 3_600));
        assert_eq!(plan_follow_up(&lead, NOW), plan_follow_up(&lead, NOW));
    }
}
