use chrono::{DateTime, Utc};

/// Bearer token issued by the platform's auth service; this service only
/// ever verifies, never issues.
#[derive(Debug, sqlx::FromRow)]
pub struct AccessToken {
    pub holder_id: i64,
    pub holder_kind: String,
    pub token_hash: String,
    pub expires_at: Option<DateTime<Utc>>,
}
