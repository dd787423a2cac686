use crate::commands::{print_json, Context, DEFAULT_INTERACTION_LIMIT};
use crate::error::not_found;
use crate::util::{
    format_optional_timestamp, format_timestamp_datetime, now_utc, parse_lead_id,
    parse_member_id, parse_org_id, parse_status,
};
use anyhow::Result;
use clap::{ArgAction, Args, Subcommand};
use leadflow_core::domain::{LeadStatus, TaskKind};
use leadflow_core::dto::{LeadDetailDto, LeadListItemDto};
use leadflow_core::rules::validate_page_size;
use leadflow_store::repo::LeadNew;

#[derive(Debug, Subcommand)]
pub enum LeadCommand {
    /// Create a lead, routing it to an agent unless an owner is given
    Add(AddLeadArgs),
    Show(ShowLeadArgs),
    Ls(ListLeadsArgs),
    /// Move a lead through the pipeline
    Status(StatusArgs),
    /// Route a lead to the least-loaded agent
    Assign(AssignArgs),
}

#[derive(Debug, Args)]
pub struct AddLeadArgs {
    #[arg(long)]
    pub org: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub source: Option<String>,
    /// Pipeline stage; NEW when omitted
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub owner: Option<String>,
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "owner")]
    pub no_assign: bool,
}

#[derive(Debug, Args)]
pub struct ShowLeadArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListLeadsArgs {
    #[arg(long)]
    pub org: String,
    #[arg(long)]
    pub owner: Option<String>,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Args)]
pub struct AssignArgs {
    pub id: String,
    #[arg(long)]
    pub page_size: Option<i64>,
}

pub fn add_lead(ctx: &Context<'_>, args: AddLeadArgs) -> Result<()> {
    let org_id = parse_org_id(&args.org)?;
    let owner_id = args.owner.as_deref().map(parse_member_id).transpose()?;
    let status = args
        .status
        .as_deref()
        .map(parse_status)
        .transpose()?
        .unwrap_or_default();
    let auto_assign = (ctx.config.assignment.auto_assign && !args.no_assign)
        .then_some(ctx.config.assignment.page_size);

    let created = ctx.store.create_lead(
        now_utc(),
        LeadNew {
            org_id,
            owner_id,
            display_name: args.name,
            email: args.email,
            phone: args.phone,
            source: args.source,
            status,
        },
        auto_assign,
    )?;

    if ctx.json {
        print_json(&created.lead)?;
    } else {
        let lead = &created.lead;
        println!("created {} {} ({})", lead.id, lead.display_name, lead.temperature);
        if let Some(assignment) = created.assignment {
            println!(
                "assigned to {} ({} leads before)",
                assignment.agent_id, assignment.count_at_decision
            );
        }
    }
    Ok(())
}

pub fn show_lead(ctx: &Context<'_>, args: ShowLeadArgs) -> Result<()> {
    let id = parse_lead_id(&args.id)?;
    let lead = ctx
        .store
        .leads()
        .get(id)?
        .ok_or_else(|| not_found("lead not found"))?;
    let recent = ctx
        .store
        .interactions()
        .list_recent(id, DEFAULT_INTERACTION_LIMIT)?;
    let pending = ctx.store.tasks().find_pending(id, &TaskKind::FollowUp)?;
    let detail = LeadDetailDto::new(lead, &recent, pending);

    if ctx.json {
        return print_json(&detail);
    }

    println!("{} {}", detail.id, detail.display_name);
    println!("status: {}", detail.status);
    println!("temperature: {}", detail.temperature);
    if let Some(owner) = detail.owner_id {
        println!("owner: {owner}");
    }
    if let Some(email) = &detail.email {
        println!("email: {email}");
    }
    if let Some(phone) = &detail.phone {
        println!("phone: {phone}");
    }
    if let Some(source) = &detail.source {
        println!("source: {source}");
    }
    println!(
        "last contact: {}",
        format_optional_timestamp(detail.last_contact_at)
    );
    println!(
        "next action: {}",
        format_optional_timestamp(detail.next_action_at)
    );
    if let Some(task) = &detail.pending_follow_up {
        println!(
            "follow-up: {} via {} at {}",
            task.title,
            task.payload.suggested_channel.as_str(),
            format_timestamp_datetime(task.due_at)
        );
        println!("  {}", task.payload.message_draft);
    }
    if !detail.recent_interactions.is_empty() {
        println!("recent interactions:");
        for item in &detail.recent_interactions {
            println!(
                "  {} {:<8} {}",
                format_timestamp_datetime(item.created_at),
                item.kind,
                item.content
            );
        }
    }
    Ok(())
}

pub fn list_leads(ctx: &Context<'_>, args: ListLeadsArgs) -> Result<()> {
    let org_id = parse_org_id(&args.org)?;
    let owner_id = args.owner.as_deref().map(parse_member_id).transpose()?;
    let leads = ctx.store.leads().list_for_org(org_id, owner_id)?;
    let items: Vec<LeadListItemDto> = leads.iter().map(LeadListItemDto::from).collect();

    if ctx.json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("no leads");
        return Ok(());
    }
    for item in items {
        println!(
            "{}  {:>3}  {:<10} {}  next: {}",
            item.id,
            item.temperature,
            item.status,
            item.display_name,
            format_optional_timestamp(item.next_action_at)
        );
    }
    Ok(())
}

pub fn change_status(ctx: &Context<'_>, args: StatusArgs) -> Result<()> {
    let id = parse_lead_id(&args.id)?;
    let status: LeadStatus = parse_status(&args.status)?;
    let lead = ctx.store.change_status(now_utc(), id, status)?;

    if ctx.json {
        print_json(&lead)?;
    } else {
        println!(
            "{} is now {} ({})",
            lead.display_name, lead.status, lead.temperature
        );
    }
    Ok(())
}

pub fn assign_lead(ctx: &Context<'_>, args: AssignArgs) -> Result<()> {
    let id = parse_lead_id(&args.id)?;
    let page_size = match args.page_size {
        Some(raw) => validate_page_size(raw)?,
        None => ctx.config.assignment.page_size,
    };
    let (lead, assignment) = ctx.store.assign_lead(now_utc(), id, page_size)?;

    if ctx.json {
        print_json(&assignment)?;
    } else {
        println!(
            "assigned {} to {} ({} leads before)",
            lead.display_name, assignment.agent_id, assignment.count_at_decision
        );
    }
    Ok(())
}
