use leadflow_core::domain::{
    Interaction, InteractionId, InteractionKind, LeadId, LeadStatus, MemberId, Temperature,
};
use leadflow_core::rules::{assign_least, plan_follow_up, score_temperature, LeadSnapshot};
use leadflow_core::time::SECONDS_PER_HOUR;
use proptest::prelude::*;
use std::collections::HashMap;

const NOW: i64 = 1_700_000_000;

fn status_strategy() -> impl Strategy<Value = LeadStatus> {
    prop_oneof![
        Just(LeadStatus::New),
        Just(LeadStatus::Contacted),
        Just(LeadStatus::Qualified),
        Just(LeadStatus::Viewing),
        Just(LeadStatus::Offer),
        Just(LeadStatus::Won),
        Just(LeadStatus::Lost),
        Just(LeadStatus::Archived),
        "[a-z]{1,12}".prop_map(|raw| LeadStatus::parse(&raw)),
    ]
}

fn kind_strategy() -> impl Strategy<Value = InteractionKind> {
    prop_oneof![
        Just(InteractionKind::Call),
        Just(InteractionKind::Sms),
        Just(InteractionKind::Email),
        Just(InteractionKind::Meeting),
        Just(InteractionKind::Note),
        Just(InteractionKind::Whatsapp),
        "[a-z]{1,8}".prop_map(|raw| InteractionKind::parse(&raw)),
    ]
}

fn history_strategy() -> impl Strategy<Value = Vec<Interaction>> {
    let lead_id = LeadId::new();
    prop::collection::vec(
        (kind_strategy(), -400 * 86_400i64..5 * 86_400),
        0..40,
    )
    .prop_map(move |items| {
        items
            .into_iter()
            .map(|(kind, offset)| Interaction {
                id: InteractionId::new(),
                lead_id,
                actor_id: None,
                kind,
                content: String::new(),
                created_at: NOW + offset,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn temperature_stays_in_range(status in status_strategy(), history in history_strategy()) {
        let score = score_temperature(&status, &history, NOW);
        prop_assert!(i64::from(score.temperature) <= 100);
        prop_assert_eq!(
            score.last_contact_at,
            history.iter().map(|item| item.created_at).max()
        );
    }

    #[test]
    fn scoring_is_deterministic(status in status_strategy(), history in history_strategy()) {
        prop_assert_eq!(
            score_temperature(&status, &history, NOW),
            score_temperature(&status, &history, NOW)
        );
    }

    #[test]
    fn planner_due_window_is_bounded(
        status in status_strategy(),
        temperature in 0i64..=100,
        last_offset in proptest::option::of(0i64..30 * 86_400),
    ) {
        let lead = LeadSnapshot {
            display_name: "Sam",
            status: &status,
            temperature: Temperature::new(temperature).unwrap(),
            last_contact_at: last_offset.map(|offset| NOW - offset),
        };
        match plan_follow_up(&lead, NOW) {
            None => prop_assert!(status.is_terminal()),
            Some(proposal) => {
                prop_assert!(!status.is_terminal());
                let wait = proposal.due_at - NOW;
                prop_assert!([2, 6, 12, 24, 36].contains(&(wait / SECONDS_PER_HOUR)));
                prop_assert_eq!(wait % SECONDS_PER_HOUR, 0);
                prop_assert_eq!(Some(proposal.clone()), plan_follow_up(&lead, NOW));
            }
        }
    }

    #[test]
    fn balancer_returns_a_minimum(loads in prop::collection::vec(0i64..20, 1..30)) {
        let ids: Vec<MemberId> = loads.iter().map(|_| MemberId::new()).collect();
        let counts: HashMap<MemberId, i64> =
            ids.iter().copied().zip(loads.iter().copied()).collect();
        let assignment = assign_least(ids.iter().copied(), &counts).unwrap();
        let min = *loads.iter().min().unwrap();
        let first_min = loads.iter().position(|load| *load == min).unwrap();
        prop_assert_eq!(assignment.count_at_decision, min);
        prop_assert_eq!(assignment.agent_id, ids[first_min]);
    }
}
