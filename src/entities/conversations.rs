use chrono::{DateTime, Utc};

#[derive(Debug, sqlx::FromRow)]
pub struct Conversation {
    pub conversation_id: String,
    pub user_id: i64,
    pub merchant_id: i64,
    pub user_username: String,
    pub user_nickname: String,
    pub user_avatar: String,
    pub merchant_name: String,
    pub merchant_logo: String,
    pub merchant_account_name: String,
    pub last_message_content: Option<String>,
    pub last_message_sender_id: Option<i64>,
    pub last_message_sender_kind: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_user: i64,
    pub unread_merchant: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct CreateConversationArgs {
    pub conversation_id: String,
    pub user_id: i64,
    pub merchant_id: i64,
    pub user_username: String,
    pub user_nickname: String,
    pub user_avatar: String,
    pub merchant_name: String,
    pub merchant_logo: String,
    pub merchant_account_name: String,
}
