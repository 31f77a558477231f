use crate::common::context::Context;
use crate::common::error::ServiceResult;
use crate::events::EventResult;
use crate::models::Participant;
use crate::models::events::{Notification, NotificationKind, ServerEvent};
use crate::models::messages::Message;
use crate::models::sessions::Session;
use crate::usecases::{fanout, messages};
use serde_json::Value;

pub async fn handle<C: Context>(
    ctx: &C,
    session: &Session,
    room_id: &str,
    receiver_id: i64,
    content: &str,
    message_type: Option<&str>,
    metadata: Option<Value>,
) -> EventResult {
    let message = messages::send(
        ctx,
        session,
        messages::SendMessageArgs {
            room_id,
            receiver_id,
            content,
            message_type,
            metadata,
        },
    )
    .await?;
    broadcast(ctx, &message).await?;
    Ok(vec![])
}

/// Fans a persisted message out: the full message to everyone currently in
/// the room (the sender included, when joined), plus a lightweight
/// notification on the receiver's personal channel so list screens update
/// even while they are looking at a different room. Shared with the REST
/// send fallback.
pub async fn broadcast<C: Context>(ctx: &C, message: &Message) -> ServiceResult<()> {
    let event = ServerEvent::NewMessage(message.clone());
    fanout::broadcast_to_room(ctx, &message.room_id, &event, None).await?;

    let receiver = Participant::new(message.receiver_type, message.receiver_id);
    let notification = ServerEvent::Notification(Notification {
        kind: NotificationKind::NewMessage,
        room_id: message.room_id.clone(),
        sender_id: message.sender_id,
        sender_type: message.sender_type,
        message: message.content.clone(),
    });
    fanout::notify_participant(ctx, receiver, &notification).await
}
