use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::conversations::CreateConversationArgs;
use crate::models::conversations::{Conversation, ConversationId};
use crate::models::messages::Message;
use crate::models::sessions::Session;
use crate::models::{Participant, ParticipantKind};
use crate::repositories::{conversations, merchants, users};

/// Checks that the caller is one of the two sides encoded in the room key.
/// The deterministic id makes this a pure parse-and-compare.
pub fn authorize(session: &Session, room_key: &str) -> ServiceResult<ConversationId> {
    let conversation_id = ConversationId::from_key(room_key)?;
    if !conversation_id.involves(session.kind, session.participant_id) {
        return Err(AppError::ConversationsNotParticipant);
    }
    Ok(conversation_id)
}

pub async fn fetch_one<C: Context>(
    ctx: &C,
    conversation_id: ConversationId,
) -> ServiceResult<Conversation> {
    match conversations::fetch_one(ctx, &conversation_id.to_string()).await {
        Ok(conversation) => Conversation::try_from(conversation),
        Err(sqlx::Error::RowNotFound) => Err(AppError::ConversationsNotFound),
        Err(e) => unexpected(e),
    }
}

/// Idempotent, race-safe room creation for a buyer/merchant pair. Both sides
/// may fire their first message concurrently: the loser of the INSERT race
/// sees a unique violation and simply reads the winner's row.
pub async fn get_or_create<C: Context>(
    ctx: &C,
    user_id: i64,
    merchant_id: i64,
) -> ServiceResult<Conversation> {
    let conversation_id = ConversationId::new(user_id, merchant_id);
    match conversations::fetch_one(ctx, &conversation_id.to_string()).await {
        Ok(conversation) => Conversation::try_from(conversation),
        Err(sqlx::Error::RowNotFound) => create(ctx, conversation_id).await,
        Err(e) => unexpected(e),
    }
}

async fn create<C: Context>(
    ctx: &C,
    conversation_id: ConversationId,
) -> ServiceResult<Conversation> {
    let user = match users::fetch_one(ctx, conversation_id.user_id).await {
        Ok(user) => user,
        Err(sqlx::Error::RowNotFound) => return Err(AppError::UsersNotFound),
        Err(e) => return unexpected(e),
    };
    let merchant = match merchants::fetch_one(ctx, conversation_id.merchant_id).await {
        Ok(merchant) => merchant,
        Err(sqlx::Error::RowNotFound) => return Err(AppError::MerchantsNotFound),
        Err(e) => return unexpected(e),
    };

    let args = CreateConversationArgs {
        conversation_id: conversation_id.to_string(),
        user_id: user.id,
        merchant_id: merchant.id,
        user_nickname: user.nickname.unwrap_or_else(|| user.username.clone()),
        user_username: user.username,
        user_avatar: user.avatar.unwrap_or_default(),
        merchant_name: merchant.name,
        merchant_logo: merchant.logo.unwrap_or_default(),
        merchant_account_name: merchant.account_name,
    };
    match conversations::create(ctx, &args).await {
        Ok(()) => {}
        // the other side created it first
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {}
        Err(e) => return unexpected(e),
    }
    fetch_one(ctx, conversation_id).await
}

pub async fn list_for_participant<C: Context>(
    ctx: &C,
    participant: Participant,
) -> ServiceResult<Vec<Conversation>> {
    let result = match participant.kind {
        ParticipantKind::User => conversations::fetch_for_user(ctx, participant.id).await,
        ParticipantKind::Merchant => {
            conversations::fetch_for_merchant(ctx, participant.id).await
        }
    };
    match result {
        Ok(rows) => rows.into_iter().map(Conversation::try_from).collect(),
        Err(e) => unexpected(e),
    }
}

pub async fn reset_unread<C: Context>(
    ctx: &C,
    conversation_id: ConversationId,
    kind: ParticipantKind,
) -> ServiceResult<()> {
    let participant_id = conversation_id.participant_id(kind);
    match conversations::reset_unread(
        ctx,
        &conversation_id.to_string(),
        kind,
        participant_id,
    )
    .await
    {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

/// Routes one freshly appended message into the conversation summary.
pub async fn apply_inbound_message<C: Context>(
    ctx: &C,
    message: &Message,
) -> ServiceResult<()> {
    match conversations::apply_inbound_message(
        ctx,
        &message.room_id,
        &message.content,
        message.sender_id,
        message.sender_type,
        message.created_at,
    )
    .await
    {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

pub async fn total_unread<C: Context>(
    ctx: &C,
    participant: Participant,
) -> ServiceResult<i64> {
    match conversations::total_unread(ctx, participant.kind, participant.id).await {
        Ok(count) => Ok(count),
        Err(e) => unexpected(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn session_for(kind: ParticipantKind, participant_id: i64) -> Session {
        Session {
            connection_id: Uuid::new_v4(),
            participant_id,
            kind,
            display_name: "someone".into(),
        }
    }

    #[test]
    fn both_sides_are_authorized_for_their_room() {
        let buyer = session_for(ParticipantKind::User, 42);
        let merchant = session_for(ParticipantKind::Merchant, 7);
        assert_eq!(
            authorize(&buyer, "room_42_7").unwrap(),
            ConversationId::new(42, 7)
        );
        assert_eq!(
            authorize(&merchant, "room_42_7").unwrap(),
            ConversationId::new(42, 7)
        );
    }

    #[test]
    fn outsiders_are_not_authorized() {
        let other_buyer = session_for(ParticipantKind::User, 5);
        assert_eq!(
            authorize(&other_buyer, "room_42_7").unwrap_err(),
            AppError::ConversationsNotParticipant
        );
        // the right id on the wrong side does not sneak through either
        let merchant = session_for(ParticipantKind::Merchant, 42);
        assert_eq!(
            authorize(&merchant, "room_42_7").unwrap_err(),
            AppError::ConversationsNotParticipant
        );
    }

    #[test]
    fn malformed_room_keys_fail_validation() {
        let buyer = session_for(ParticipantKind::User, 42);
        assert_eq!(
            authorize(&buyer, "lobby").unwrap_err(),
            AppError::ConversationsInvalidId
        );
    }
}
