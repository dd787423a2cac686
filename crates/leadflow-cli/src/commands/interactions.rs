use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::{
    now_utc, parse_interaction_kind, parse_lead_id, parse_local_timestamp, parse_member_id,
};
use anyhow::Result;
use clap::{ArgAction, Args};
use leadflow_core::dto::{InteractionDto, InteractionLoggedDto, LeadListItemDto};
use leadflow_store::repo::InteractionNew;
use std::io::{self, Read};

#[derive(Debug, Args)]
pub struct LogArgs {
    pub lead: String,
    #[arg(long, default_value = "note")]
    pub kind: String,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub actor: Option<String>,
    #[arg(long)]
    pub when: Option<String>,
    /// Plan a follow-up after logging
    #[arg(long, action = ArgAction::SetTrue)]
    pub plan: bool,
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "plan")]
    pub no_plan: bool,
}

pub fn log_interaction(ctx: &Context<'_>, args: LogArgs) -> Result<()> {
    let lead_id = parse_lead_id(&args.lead)?;
    let kind = parse_interaction_kind(&args.kind)?;
    let actor_id = args.actor.as_deref().map(parse_member_id).transpose()?;
    let now = now_utc();
    let created_at = match args.when {
        Some(value) => parse_local_timestamp(&value)?,
        None => now,
    };
    let content = match args.content {
        Some(value) => value,
        None => read_content_from_stdin()?,
    };
    let plan = if args.plan {
        true
    } else if args.no_plan {
        false
    } else {
        ctx.config.follow_up.plan_after_interaction
    };

    let recorded = ctx.store.record_interaction(
        now,
        InteractionNew {
            lead_id,
            actor_id,
            kind,
            content,
            created_at,
        },
        plan,
    )?;

    if ctx.json {
        print_json(&InteractionLoggedDto {
            interaction: InteractionDto::from(&recorded.interaction),
            lead: LeadListItemDto::from(&recorded.lead),
            follow_up: recorded.follow_up,
        })?;
    } else {
        println!(
            "logged {} for {} (temperature {})",
            recorded.interaction.kind, recorded.lead.display_name, recorded.lead.temperature
        );
        if let Some(task) = recorded.follow_up.as_ref().and_then(|outcome| outcome.task()) {
            println!("follow-up {}: {}", task.id, task.title);
        }
    }
    Ok(())
}

fn read_content_from_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    if buffer.trim().is_empty() {
        return Err(invalid_input(
            "interaction content is empty (provide --content or stdin)",
        ));
    }
    Ok(buffer.trim_end().to_string())
}
