use crate::models::{Participant, ParticipantKind};
use uuid::Uuid;

/// One authenticated transport session. Lives exactly as long as the
/// connection that produced it and is never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    pub connection_id: Uuid,
    pub participant_id: i64,
    pub kind: ParticipantKind,
    pub display_name: String,
}

impl Session {
    pub const fn participant(&self) -> Participant {
        Participant::new(self.kind, self.participant_id)
    }
}
