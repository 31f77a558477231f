use chrono::{DateTime, Utc};

/// Buyer profile row, owned by the platform's user service. Read here only
/// to denormalize display info onto new conversations.
#[derive(Debug, sqlx::FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Merchant profile row, owned by the platform's merchant service.
#[derive(Debug, sqlx::FromRow)]
pub struct MerchantProfile {
    pub id: i64,
    pub name: String,
    pub logo: Option<String>,
    pub account_name: String,
    pub created_at: DateTime<Utc>,
}
