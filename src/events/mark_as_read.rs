use crate::common::context::Context;
use crate::common::error::ServiceResult;
use crate::events::EventResult;
use crate::models::events::ServerEvent;
use crate::models::sessions::Session;
use crate::usecases::{conversations, fanout, messages};

pub async fn handle<C: Context>(ctx: &C, session: &Session, room_key: &str) -> EventResult {
    messages::mark_read(ctx, session, room_key).await?;
    notify_read(ctx, session, room_key).await?;
    Ok(vec![])
}

/// Read receipt to the other room occupants; the reader does not get an echo.
/// Shared with the REST mark-as-read fallback. The registry keys rooms by the
/// canonical id, so the receipt goes out under the parsed form of the key.
pub async fn notify_read<C: Context>(
    ctx: &C,
    session: &Session,
    room_key: &str,
) -> ServiceResult<()> {
    let room_id = conversations::authorize(session, room_key)?.to_string();
    let event = ServerEvent::MessagesRead {
        room_id: room_id.clone(),
        reader_id: session.participant_id,
        reader_type: session.kind,
    };
    fanout::broadcast_to_room(ctx, &room_id, &event, Some(session.participant())).await
}
