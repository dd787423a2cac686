use crate::commands::{print_json, Context};
use crate::util::{now_utc, parse_org_id, parse_role};
use anyhow::Result;
use clap::{Args, Subcommand};
use leadflow_store::repo::MemberNew;

#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    /// Add a member to an organization
    Add(AddMemberArgs),
    /// List the members of an organization
    Ls(ListMembersArgs),
}

#[derive(Debug, Args)]
pub struct AddMemberArgs {
    #[arg(long)]
    pub org: String,
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "agent")]
    pub role: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListMembersArgs {
    #[arg(long)]
    pub org: String,
}

pub fn add_member(ctx: &Context<'_>, args: AddMemberArgs) -> Result<()> {
    let org_id = parse_org_id(&args.org)?;
    let role = parse_role(&args.role)?;
    let member = ctx.store.members().create(
        now_utc(),
        MemberNew {
            org_id,
            role,
            display_name: args.name,
            email: args.email,
            phone: args.phone,
        },
    )?;

    if ctx.json {
        print_json(&member)?;
    } else {
        println!("created {} {} ({})", member.id, member.display_name, member.role);
    }
    Ok(())
}

pub fn list_members(ctx: &Context<'_>, args: ListMembersArgs) -> Result<()> {
    let org_id = parse_org_id(&args.org)?;
    let members = ctx.store.members().list_all_for_org(org_id)?;

    if ctx.json {
        return print_json(&members);
    }
    if members.is_empty() {
        println!("no members");
        return Ok(());
    }
    let counts = ctx.store.leads().count_by_owner(org_id)?;
    for member in members {
        let load = counts.get(&member.id).copied().unwrap_or(0);
        println!(
            "{}  {:<8} {:>4} leads  {}",
            member.id, member.role, load, member.display_name
        );
    }
    Ok(())
}
