use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::ParticipantKind;
use crate::models::sessions::Session;
use crate::repositories::{access_tokens, merchants, users};
use uuid::Uuid;

/// Verifies the handshake triple {token, identity, kind} against the token
/// store. Runs exactly once per connection, before any command is accepted;
/// failure refuses the connection with no retry.
pub async fn authenticate<C: Context>(
    ctx: &C,
    token: &str,
    participant_id: i64,
    kind: ParticipantKind,
) -> ServiceResult<Session> {
    if token.is_empty() {
        return Err(AppError::SessionsInvalidToken);
    }

    let record = match access_tokens::fetch_one(ctx, participant_id, kind.as_str()).await {
        Ok(record) => record,
        Err(sqlx::Error::RowNotFound) => return Err(AppError::SessionsInvalidToken),
        Err(e) => return unexpected(e),
    };
    if let Some(expires_at) = record.expires_at {
        if expires_at <= chrono::Utc::now() {
            return Err(AppError::SessionsTokenExpired);
        }
    }
    if !bcrypt::verify(token, &record.token_hash)? {
        return Err(AppError::SessionsInvalidToken);
    }

    let display_name = match kind {
        ParticipantKind::User => match users::fetch_one(ctx, participant_id).await {
            Ok(user) => user.nickname.unwrap_or(user.username),
            Err(sqlx::Error::RowNotFound) => return Err(AppError::UsersNotFound),
            Err(e) => return unexpected(e),
        },
        ParticipantKind::Merchant => match merchants::fetch_one(ctx, participant_id).await {
            Ok(merchant) => merchant.name,
            Err(sqlx::Error::RowNotFound) => return Err(AppError::MerchantsNotFound),
            Err(e) => return unexpected(e),
        },
    };

    Ok(Session {
        connection_id: Uuid::new_v4(),
        participant_id,
        kind,
        display_name,
    })
}

/// How many participants currently hold a live connection.
pub async fn online_count<C: Context>(ctx: &C) -> usize {
    ctx.registry().online_count().await
}
