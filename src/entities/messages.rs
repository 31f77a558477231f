use chrono::{DateTime, Utc};
use sqlx::types::Json;

#[derive(Debug, sqlx::FromRow)]
pub struct Message {
    pub message_id: String,
    pub conversation_id: String,
    pub sender_id: i64,
    pub sender_kind: String,
    pub receiver_id: i64,
    pub receiver_kind: String,
    pub content: String,
    pub message_type: String,
    pub metadata: Json<serde_json::Value>,
    pub status: String,
    pub is_read: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
