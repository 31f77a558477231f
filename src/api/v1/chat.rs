use crate::api::{Principal, RequestContext};
use crate::common::error::{AppError, ServiceResponse};
use crate::events;
use crate::models::conversations::{Conversation, ConversationId};
use crate::models::messages::Message;
use crate::usecases::{conversations, messages, sessions};
use axum::Json;
use axum::extract::{Path, Query};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub user_id: i64,
    pub merchant_id: i64,
}

/// Get-or-create the room for a buyer/merchant pair. The caller must be one
/// of the two sides.
pub async fn create_room(
    ctx: RequestContext,
    Principal(session): Principal,
    Json(body): Json<CreateRoomRequest>,
) -> ServiceResponse<Conversation> {
    let pair = ConversationId::new(body.user_id, body.merchant_id);
    if !pair.involves(session.kind, session.participant_id) {
        return Err(AppError::ConversationsNotParticipant);
    }
    let conversation = conversations::get_or_create(&ctx, body.user_id, body.merchant_id).await?;
    Ok(Json(conversation))
}

/// The caller's conversations, most recently active first.
pub async fn list_rooms(
    ctx: RequestContext,
    Principal(session): Principal,
) -> ServiceResponse<Vec<Conversation>> {
    let rooms = conversations::list_for_participant(&ctx, session.participant()).await?;
    Ok(Json(rooms))
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub before: Option<DateTime<Utc>>,
}

/// One page of room history, oldest first within the page.
pub async fn room_messages(
    ctx: RequestContext,
    Principal(session): Principal,
    Path(room_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> ServiceResponse<Vec<Message>> {
    let page = messages::history(&ctx, &session, &room_id, page.limit, page.before).await?;
    Ok(Json(page))
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

/// REST fallback for `mark_as_read`; emits the same room event the socket
/// command emits.
pub async fn mark_as_read(
    ctx: RequestContext,
    Principal(session): Principal,
    Path(room_id): Path<String>,
) -> ServiceResponse<MarkReadResponse> {
    let updated = messages::mark_read(&ctx, &session, &room_id).await?;
    events::mark_as_read::notify_read(&ctx, &session, &room_id).await?;
    Ok(Json(MarkReadResponse { updated }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub room_id: String,
    pub receiver_id: i64,
    pub content: String,
    pub message_type: Option<String>,
    pub metadata: Option<Value>,
}

/// REST fallback for `send_message`: same validation, persistence and
/// fan-out as the socket command.
pub async fn send_message(
    ctx: RequestContext,
    Principal(session): Principal,
    Json(body): Json<SendMessageRequest>,
) -> ServiceResponse<Message> {
    let message = messages::send(
        &ctx,
        &session,
        messages::SendMessageArgs {
            room_id: &body.room_id,
            receiver_id: body.receiver_id,
            content: &body.content,
            message_type: body.message_type.as_deref(),
            metadata: body.metadata,
        },
    )
    .await?;
    events::send_message::broadcast(&ctx, &message).await?;
    Ok(Json(message))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineCountResponse {
    pub online_count: usize,
}

/// Total unread messages across all of the caller's conversations, for the
/// tab badge.
pub async fn unread_count(
    ctx: RequestContext,
    Principal(session): Principal,
) -> ServiceResponse<UnreadCountResponse> {
    let unread_count = conversations::total_unread(&ctx, session.participant()).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

/// Live connection count.
pub async fn online_count(ctx: RequestContext) -> ServiceResponse<OnlineCountResponse> {
    let online_count = sessions::online_count(&ctx).await;
    Ok(Json(OnlineCountResponse { online_count }))
}
