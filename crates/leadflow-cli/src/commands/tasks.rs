use crate::commands::{print_json, Context};
use crate::util::{
    format_timestamp_datetime, now_utc, parse_member_id, parse_org_id, parse_task_id,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use leadflow_core::domain::TaskStatus;

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// List pending tasks, soonest first
    Ls(ListTasksArgs),
    Done(TaskIdArgs),
    Cancel(TaskIdArgs),
}

#[derive(Debug, Args)]
pub struct ListTasksArgs {
    #[arg(long)]
    pub org: String,
    #[arg(long)]
    pub owner: Option<String>,
}

#[derive(Debug, Args)]
pub struct TaskIdArgs {
    pub id: String,
}

pub fn list_tasks(ctx: &Context<'_>, args: ListTasksArgs) -> Result<()> {
    let org_id = parse_org_id(&args.org)?;
    let owner_id = args.owner.as_deref().map(parse_member_id).transpose()?;
    let tasks = ctx.store.tasks().list_pending_for_org(org_id, owner_id)?;

    if ctx.json {
        return print_json(&tasks);
    }
    if tasks.is_empty() {
        println!("no pending tasks");
        return Ok(());
    }
    for task in tasks {
        println!(
            "{}  {}  {:<4} {}",
            task.id,
            format_timestamp_datetime(task.due_at),
            task.payload.suggested_channel.as_str(),
            task.title
        );
    }
    Ok(())
}

pub fn complete_task(ctx: &Context<'_>, args: TaskIdArgs) -> Result<()> {
    set_status(ctx, args, TaskStatus::Done)
}

pub fn cancel_task(ctx: &Context<'_>, args: TaskIdArgs) -> Result<()> {
    set_status(ctx, args, TaskStatus::Cancelled)
}

fn set_status(ctx: &Context<'_>, args: TaskIdArgs, status: TaskStatus) -> Result<()> {
    let id = parse_task_id(&args.id)?;
    let task = ctx.store.tasks().set_status(now_utc(), id, status)?;

    if ctx.json {
        print_json(&task)?;
    } else {
        println!("{} {}", task.id, task.status.as_str().to_ascii_lowercase());
    }
    Ok(())
}
