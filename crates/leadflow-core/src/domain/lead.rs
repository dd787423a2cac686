use crate::domain::ids::{LeadId, MemberId, OrgId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

label_enum! {
    /// Pipeline stage of a lead.
    LeadStatus {
        New => "NEW",
        Contacted => "CONTACTED",
        Qualified => "QUALIFIED",
        Viewing => "VIEWING",
        Offer => "OFFER",
        Won => "WON",
        Lost => "LOST",
        Archived => "ARCHIVED",
    }
}

impl LeadStatus {
    /// Terminal stages never get another follow-up.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LeadStatus::Won | LeadStatus::Lost | LeadStatus::Archived
        )
    }
}

impl Default for LeadStatus {
    /// Leads enter the pipeline as NEW.
    fn default() -> Self {
        LeadStatus::New
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Temperature(u8);

impl Temperature {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 100;

    pub fn new(value: i64) -> Result<Self, CoreError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(CoreError::InvalidTemperature(value));
        }
        Ok(Self(value as u8))
    }

    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Temperature {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Temperature> for i64 {
    fn from(value: Temperature) -> Self {
        i64::from(value.0)
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub org_id: OrgId,
    pub owner_id: Option<MemberId>,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: LeadStatus,
    pub temperature: Temperature,
    pub last_contact_at: Option<i64>,
    pub next_action_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Lead {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.display_name.trim().is_empty() {
            return Err(CoreError::EmptyDisplayName);
        }
        Ok(())
    }
}

/// Field-level patch for a lead. `None` leaves a field untouched; the inner
/// `Option` of nullable fields distinguishes "clear" from "set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadUpdate {
    pub display_name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub source: Option<Option<String>>,
    pub status: Option<LeadStatus>,
    pub owner_id: Option<Option<MemberId>>,
    pub temperature: Option<Temperature>,
    pub last_contact_at: Option<Option<i64>>,
    pub next_action_at: Option<Option<i64>>,
}

impl LeadUpdate {
    pub fn apply(self, lead: &mut Lead) {
        if let Some(value) = self.display_name {
            lead.display_name = value;
        }
        if let Some(value) = self.email {
            lead.email = value;
        }
        if let Some(value) = self.phone {
            lead.phone = value;
        }
        if let Some(value) = self.source {
            lead.source = value;
        }
        if let Some(value) = self.status {
            lead.status = value;
        }
        if let Some(value) = self.owner_id {
            lead.owner_id = value;
        }
        if let Some(value) = self.temperature {
            lead.temperature = value;
        }
        if let Some(value) = self.last_contact_at {
            lead.last_contact_at = value;
        }
        if let Some(value) = self.next_action_at {
            lead.next_action_at = value;
        }
    }
}
