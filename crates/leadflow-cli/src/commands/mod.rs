use anyhow::Result;
use leadflow_config::AppConfig;
use leadflow_store::Store;
use serde::Serialize;
use std::io::{self, Write};

pub mod follow_ups;
pub mod interactions;
pub mod leads;
pub mod members;
pub mod tasks;

pub const DEFAULT_INTERACTION_LIMIT: i64 = 20;

pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
