#[macro_use]
mod label;

pub mod ids;
pub mod interaction;
pub mod lead;
pub mod member;
pub mod task;

pub use ids::{InteractionId, LeadId, MemberId, OrgId, TaskId};
pub use interaction::{Interaction, InteractionKind};
pub use lead::{Lead, LeadStatus, LeadUpdate, Temperature};
pub use member::{assignable_roles, MemberRole, OrgMember};
pub use task::{Channel, Task, TaskKind, TaskNew, TaskPayload, TaskStatus};
