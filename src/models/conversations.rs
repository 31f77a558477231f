use crate::common::error::{AppError, ServiceResult};
use crate::entities::conversations::Conversation as ConversationEntity;
use crate::models::ParticipantKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Deterministic room identifier derived from the typed participant pair.
/// The buyer id always comes first, so one (buyer, merchant) pair maps to
/// exactly one id no matter which side initiates the conversation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConversationId {
    pub user_id: i64,
    pub merchant_id: i64,
}

impl ConversationId {
    pub const fn new(user_id: i64, merchant_id: i64) -> Self {
        Self {
            user_id,
            merchant_id,
        }
    }

    pub fn from_key(key: &str) -> ServiceResult<Self> {
        let rest = key
            .strip_prefix("room_")
            .ok_or(AppError::ConversationsInvalidId)?;
        let (user_id, merchant_id) = rest
            .split_once('_')
            .ok_or(AppError::ConversationsInvalidId)?;
        let user_id =
            i64::from_str(user_id).map_err(|_| AppError::ConversationsInvalidId)?;
        let merchant_id =
            i64::from_str(merchant_id).map_err(|_| AppError::ConversationsInvalidId)?;
        if user_id <= 0 || merchant_id <= 0 {
            return Err(AppError::ConversationsInvalidId);
        }
        Ok(Self {
            user_id,
            merchant_id,
        })
    }

    pub const fn participant_id(&self, kind: ParticipantKind) -> i64 {
        match kind {
            ParticipantKind::User => self.user_id,
            ParticipantKind::Merchant => self.merchant_id,
        }
    }

    pub const fn involves(&self, kind: ParticipantKind, id: i64) -> bool {
        self.participant_id(kind) == id
    }
}

impl Display for ConversationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "room_{}_{}", self.user_id, self.merchant_id)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Archived,
    Blocked,
}

impl ConversationStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Active => "active",
            ConversationStatus::Archived => "archived",
            ConversationStatus::Blocked => "blocked",
        }
    }
}

impl TryFrom<&str> for ConversationStatus {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(ConversationStatus::Active),
            "archived" => Ok(ConversationStatus::Archived),
            "blocked" => Ok(ConversationStatus::Blocked),
            _ => Err(AppError::DecodingRequestFailed),
        }
    }
}

/// Buyer display info captured at conversation creation time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub username: String,
    pub nickname: String,
    pub avatar: String,
}

/// Merchant display info captured at conversation creation time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantInfo {
    pub name: String,
    pub logo: String,
    pub account_name: String,
}

/// Denormalized summary of the newest message, kept on the conversation for
/// list screens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    pub content: String,
    pub sender_id: i64,
    pub sender_type: ParticipantKind,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Copy, Clone, Serialize)]
pub struct UnreadCount {
    pub user: i64,
    pub merchant: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub room_id: String,
    pub user_id: i64,
    pub merchant_id: i64,
    pub user_info: UserInfo,
    pub merchant_info: MerchantInfo,
    pub last_message: Option<LastMessage>,
    pub unread_count: UnreadCount,
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub const fn participant_id(&self, kind: ParticipantKind) -> i64 {
        match kind {
            ParticipantKind::User => self.user_id,
            ParticipantKind::Merchant => self.merchant_id,
        }
    }
}

impl TryFrom<ConversationEntity> for Conversation {
    type Error = AppError;

    fn try_from(value: ConversationEntity) -> Result<Self, Self::Error> {
        let status = ConversationStatus::try_from(value.status.as_str())?;
        let last_message = match (
            value.last_message_content,
            value.last_message_sender_id,
            value.last_message_sender_kind,
            value.last_message_at,
        ) {
            (Some(content), Some(sender_id), Some(sender_kind), Some(timestamp)) => {
                Some(LastMessage {
                    content,
                    sender_id,
                    sender_type: ParticipantKind::try_from(sender_kind.as_str())?,
                    timestamp,
                })
            }
            _ => None,
        };
        Ok(Self {
            room_id: value.conversation_id,
            user_id: value.user_id,
            merchant_id: value.merchant_id,
            user_info: UserInfo {
                username: value.user_username,
                nickname: value.user_nickname,
                avatar: value.user_avatar,
            },
            merchant_info: MerchantInfo {
                name: value.merchant_name,
                logo: value.merchant_logo,
                account_name: value.merchant_account_name,
            },
            last_message,
            unread_count: UnreadCount {
                user: value.unread_user,
                merchant: value.unread_merchant,
            },
            status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_id_is_deterministic_for_a_pair() {
        let id = ConversationId::new(42, 7);
        assert_eq!(id.to_string(), "room_42_7");
        assert_eq!(ConversationId::from_key("room_42_7").unwrap(), id);
    }

    #[test]
    fn conversation_id_identifies_participants() {
        let id = ConversationId::new(42, 7);
        assert!(id.involves(ParticipantKind::User, 42));
        assert!(id.involves(ParticipantKind::Merchant, 7));
        assert!(!id.involves(ParticipantKind::User, 7));
        assert!(!id.involves(ParticipantKind::Merchant, 42));
    }

    #[test]
    fn malformed_conversation_keys_are_rejected() {
        for key in ["", "room_", "room_42", "room_a_b", "42_7", "room_0_7", "room_42_-1"] {
            assert_eq!(
                ConversationId::from_key(key).unwrap_err(),
                AppError::ConversationsInvalidId,
                "key {key:?} should be invalid",
            );
        }
    }
}
