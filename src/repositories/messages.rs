use crate::common::context::Context;
use crate::entities::messages::Message;
use crate::models::messages::MessageStatus;
use chrono::{DateTime, Utc};

const TABLE_NAME: &str = "chat_messages";
const READ_FIELDS: &str = r#"
message_id, conversation_id, sender_id, sender_kind, receiver_id, receiver_kind,
content, message_type, metadata, status, is_read, is_deleted, created_at, updated_at"#;

pub async fn create<C: Context>(ctx: &C, message: &Message) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (message_id, conversation_id, sender_id, sender_kind,",
        " receiver_id, receiver_kind, content, message_type, metadata,",
        " status, is_read, is_deleted, created_at, updated_at)",
        " VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    );
    sqlx::query(QUERY)
        .bind(&message.message_id)
        .bind(&message.conversation_id)
        .bind(message.sender_id)
        .bind(&message.sender_kind)
        .bind(message.receiver_id)
        .bind(&message.receiver_kind)
        .bind(&message.content)
        .bind(&message.message_type)
        .bind(&message.metadata)
        .bind(&message.status)
        .bind(message.is_read)
        .bind(message.is_deleted)
        .bind(message.created_at)
        .bind(message.updated_at)
        .execute(ctx.db())
        .await?;
    Ok(())
}

/// Newest-first page of a conversation's messages, excluding soft-deleted
/// rows. `before` restarts the read from a prior page's oldest timestamp.
pub async fn fetch_page<C: Context>(
    ctx: &C,
    conversation_id: &str,
    limit: i64,
    before: Option<DateTime<Utc>>,
) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE conversation_id = ? AND is_deleted IS FALSE",
        " ORDER BY created_at DESC LIMIT ?"
    );
    const QUERY_BEFORE: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE conversation_id = ? AND is_deleted IS FALSE AND created_at < ?",
        " ORDER BY created_at DESC LIMIT ?"
    );
    match before {
        Some(before) => {
            sqlx::query_as(QUERY_BEFORE)
                .bind(conversation_id)
                .bind(before)
                .bind(limit)
                .fetch_all(ctx.db())
                .await
        }
        None => {
            sqlx::query_as(QUERY)
                .bind(conversation_id)
                .bind(limit)
                .fetch_all(ctx.db())
                .await
        }
    }
}

/// Flips every currently-unread message addressed to the recipient in this
/// conversation. Returns how many rows changed.
pub async fn mark_read<C: Context>(
    ctx: &C,
    conversation_id: &str,
    receiver_id: i64,
    receiver_kind: &str,
) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET is_read = TRUE, status = ?, updated_at = CURRENT_TIMESTAMP",
        " WHERE conversation_id = ? AND receiver_id = ? AND receiver_kind = ?",
        " AND is_read IS FALSE AND is_deleted IS FALSE"
    );
    let result = sqlx::query(QUERY)
        .bind(MessageStatus::Read.as_str())
        .bind(conversation_id)
        .bind(receiver_id)
        .bind(receiver_kind)
        .execute(ctx.db())
        .await?;
    Ok(result.rows_affected())
}
