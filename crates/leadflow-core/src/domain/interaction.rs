use crate::domain::ids::{InteractionId, LeadId, MemberId};
use serde::{Deserialize, Serialize};

label_enum! {
    InteractionKind {
        Call => "CALL",
        Sms => "SMS",
        Email => "EMAIL",
        Meeting => "MEETING",
        Note => "NOTE",
        Whatsapp => "WHATSAPP",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub lead_id: LeadId,
    pub actor_id: Option<MemberId>,
    pub kind: InteractionKind,
    pub content: String,
    pub created_at: i64,
}
