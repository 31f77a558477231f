pub mod conversations;
pub mod events;
pub mod messages;
pub mod sessions;

use crate::common::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The two sides of every conversation. Receiver kind is always the
/// complement of the sender kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    User,
    Merchant,
}

impl ParticipantKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ParticipantKind::User => "user",
            ParticipantKind::Merchant => "merchant",
        }
    }

    pub const fn counterpart(&self) -> ParticipantKind {
        match self {
            ParticipantKind::User => ParticipantKind::Merchant,
            ParticipantKind::Merchant => ParticipantKind::User,
        }
    }
}

impl TryFrom<&str> for ParticipantKind {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(ParticipantKind::User),
            "merchant" => Ok(ParticipantKind::Merchant),
            _ => Err(AppError::DecodingRequestFailed),
        }
    }
}

impl Display for ParticipantKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One identity taking part in chat: a buyer or a merchant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Participant {
    pub kind: ParticipantKind,
    pub id: i64,
}

impl Participant {
    pub const fn new(kind: ParticipantKind, id: i64) -> Self {
        Self { kind, id }
    }
}

impl Display for Participant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
