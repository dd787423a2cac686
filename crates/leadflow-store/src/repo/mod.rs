pub mod interactions;
pub mod leads;
pub mod members;
pub mod tasks;

pub use interactions::{InteractionNew, InteractionsRepo};
pub use leads::{LeadNew, LeadsRepo};
pub use members::{MemberNew, MembersRepo};
pub use tasks::TasksRepo;
