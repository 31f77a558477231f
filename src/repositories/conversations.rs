use crate::common::context::Context;
use crate::entities::conversations::{Conversation, CreateConversationArgs};
use crate::models::ParticipantKind;
use chrono::{DateTime, Utc};

const TABLE_NAME: &str = "chat_conversations";
const READ_FIELDS: &str = r#"
conversation_id, user_id, merchant_id,
user_username, user_nickname, user_avatar,
merchant_name, merchant_logo, merchant_account_name,
last_message_content, last_message_sender_id, last_message_sender_kind, last_message_at,
unread_user, unread_merchant, status, created_at, updated_at"#;

pub async fn fetch_one<C: Context>(
    ctx: &C,
    conversation_id: &str,
) -> sqlx::Result<Conversation> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE conversation_id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(conversation_id)
        .fetch_one(ctx.db())
        .await
}

pub async fn fetch_for_user<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<Vec<Conversation>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE user_id = ? ORDER BY last_message_at DESC"
    );
    sqlx::query_as(QUERY).bind(user_id).fetch_all(ctx.db()).await
}

pub async fn fetch_for_merchant<C: Context>(
    ctx: &C,
    merchant_id: i64,
) -> sqlx::Result<Vec<Conversation>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE merchant_id = ? ORDER BY last_message_at DESC"
    );
    sqlx::query_as(QUERY)
        .bind(merchant_id)
        .fetch_all(ctx.db())
        .await
}

/// The UNIQUE KEY on (user_id, merchant_id) is what makes concurrent
/// first-message races safe; callers treat a unique violation here as
/// "already created" and re-fetch.
pub async fn create<C: Context>(ctx: &C, args: &CreateConversationArgs) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (conversation_id, user_id, merchant_id,",
        " user_username, user_nickname, user_avatar,",
        " merchant_name, merchant_logo, merchant_account_name)",
        " VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
    );
    sqlx::query(QUERY)
        .bind(&args.conversation_id)
        .bind(args.user_id)
        .bind(args.merchant_id)
        .bind(&args.user_username)
        .bind(&args.user_nickname)
        .bind(&args.user_avatar)
        .bind(&args.merchant_name)
        .bind(&args.merchant_logo)
        .bind(&args.merchant_account_name)
        .execute(ctx.db())
        .await?;
    Ok(())
}

/// Projects one inbound message onto the conversation summary: last-message
/// fields plus exactly the recipient side's unread counter, in a single
/// UPDATE so concurrent sends and resets never lose an increment.
pub async fn apply_inbound_message<C: Context>(
    ctx: &C,
    conversation_id: &str,
    content: &str,
    sender_id: i64,
    sender_kind: ParticipantKind,
    sent_at: DateTime<Utc>,
) -> sqlx::Result<()> {
    const QUERY_NOTIFY_MERCHANT: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET last_message_content = ?, last_message_sender_id = ?,",
        " last_message_sender_kind = ?, last_message_at = ?,",
        " unread_merchant = unread_merchant + 1, updated_at = CURRENT_TIMESTAMP",
        " WHERE conversation_id = ?"
    );
    const QUERY_NOTIFY_USER: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET last_message_content = ?, last_message_sender_id = ?,",
        " last_message_sender_kind = ?, last_message_at = ?,",
        " unread_user = unread_user + 1, updated_at = CURRENT_TIMESTAMP",
        " WHERE conversation_id = ?"
    );
    let query = match sender_kind.counterpart() {
        ParticipantKind::Merchant => QUERY_NOTIFY_MERCHANT,
        ParticipantKind::User => QUERY_NOTIFY_USER,
    };
    sqlx::query(query)
        .bind(content)
        .bind(sender_id)
        .bind(sender_kind.as_str())
        .bind(sent_at)
        .bind(conversation_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

/// Zeroes one side's unread counter. The participant id guard keeps a caller
/// from resetting a room they are not part of.
pub async fn reset_unread<C: Context>(
    ctx: &C,
    conversation_id: &str,
    kind: ParticipantKind,
    participant_id: i64,
) -> sqlx::Result<()> {
    const QUERY_USER: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET unread_user = 0, updated_at = CURRENT_TIMESTAMP",
        " WHERE conversation_id = ? AND user_id = ?"
    );
    const QUERY_MERCHANT: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET unread_merchant = 0, updated_at = CURRENT_TIMESTAMP",
        " WHERE conversation_id = ? AND merchant_id = ?"
    );
    let query = match kind {
        ParticipantKind::User => QUERY_USER,
        ParticipantKind::Merchant => QUERY_MERCHANT,
    };
    sqlx::query(query)
        .bind(conversation_id)
        .bind(participant_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

pub async fn total_unread<C: Context>(
    ctx: &C,
    kind: ParticipantKind,
    participant_id: i64,
) -> sqlx::Result<i64> {
    const QUERY_USER: &str = const_str::concat!(
        "SELECT CAST(COALESCE(SUM(unread_user), 0) AS SIGNED) FROM ",
        TABLE_NAME,
        " WHERE user_id = ?"
    );
    const QUERY_MERCHANT: &str = const_str::concat!(
        "SELECT CAST(COALESCE(SUM(unread_merchant), 0) AS SIGNED) FROM ",
        TABLE_NAME,
        " WHERE merchant_id = ?"
    );
    let query = match kind {
        ParticipantKind::User => QUERY_USER,
        ParticipantKind::Merchant => QUERY_MERCHANT,
    };
    sqlx::query_scalar(query)
        .bind(participant_id)
        .fetch_one(ctx.db())
        .await
}
