pub mod assignment;
pub mod follow_up;
pub mod temperature;

pub use assignment::{
    assign_least, validate_page_size, Assignment, DEFAULT_CANDIDATE_PAGE_SIZE,
    MAX_CANDIDATE_PAGE_SIZE,
};
pub use follow_up::{plan_follow_up, FollowUpProposal, LeadSnapshot};
pub use temperature::{score_temperature, TemperatureScore};
