use crate::commands::{print_json, Context};
use crate::util::{format_timestamp_datetime, now_utc, parse_lead_id, parse_org_id};
use anyhow::Result;
use clap::Args;
use leadflow_core::dto::SweepItemDto;
use leadflow_core::FollowUpOutcome;

#[derive(Debug, Args)]
pub struct PlanArgs {
    pub lead: String,
}

#[derive(Debug, Args)]
pub struct SweepArgs {
    #[arg(long)]
    pub org: String,
}

pub fn plan(ctx: &Context<'_>, args: PlanArgs) -> Result<()> {
    let lead_id = parse_lead_id(&args.lead)?;
    let outcome = ctx.store.plan_follow_up(now_utc(), lead_id)?;

    if ctx.json {
        return print_json(&outcome);
    }
    match &outcome {
        FollowUpOutcome::Created(task) => println!("planned {}", describe(task)),
        FollowUpOutcome::Existing(task) => println!("already pending {}", describe(task)),
        FollowUpOutcome::NotNeeded => println!("no follow-up needed for {lead_id}"),
    }
    if let Some(task) = outcome.task() {
        println!("  {}", task.rationale);
        println!("  {}", task.payload.message_draft);
    }
    Ok(())
}

pub fn sweep(ctx: &Context<'_>, args: SweepArgs) -> Result<()> {
    let org_id = parse_org_id(&args.org)?;
    let outcomes = ctx.store.sweep_follow_ups(now_utc(), org_id)?;

    if ctx.json {
        let items: Vec<SweepItemDto> = outcomes
            .into_iter()
            .map(|(lead_id, outcome)| SweepItemDto { lead_id, outcome })
            .collect();
        return print_json(&items);
    }

    let created = outcomes
        .iter()
        .filter(|(_, outcome)| matches!(outcome, FollowUpOutcome::Created(_)))
        .count();
    for (lead_id, outcome) in &outcomes {
        if let FollowUpOutcome::Created(task) = outcome {
            println!("{lead_id}  {}", describe(task));
        }
    }
    println!(
        "swept {} open leads, {} new follow-ups",
        outcomes.len(),
        created
    );
    Ok(())
}

fn describe(task: &leadflow_core::Task) -> String {
    format!(
        "{} \"{}\" via {} at {}",
        task.id,
        task.title,
        task.payload.suggested_channel.as_str(),
        format_timestamp_datetime(task.due_at)
    )
}
