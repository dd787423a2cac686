pub mod domain;
pub mod dto;
pub mod engine;
pub mod error;
pub mod rules;
pub mod time;

pub use domain::*;
pub use engine::{FollowUpOutcome, LeadStore};
pub use error::CoreError;
pub use rules::*;
