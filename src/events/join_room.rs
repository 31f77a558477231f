use crate::common::context::Context;
use crate::events::{ConnectionState, EventResult};
use crate::models::events::ServerEvent;
use crate::models::sessions::Session;
use crate::usecases::{conversations, messages};

/// Opens a room on this connection: membership moves to the room (implicitly
/// leaving any previous one), the caller's unread counter resets, and the
/// most recent history window comes back oldest-first. A caller who is not a
/// participant of the room gets an error event and no side effects.
pub async fn handle<C: Context>(
    ctx: &C,
    session: &Session,
    state: &mut ConnectionState,
    room_key: &str,
) -> EventResult {
    let conversation_id = conversations::authorize(session, room_key)?;
    let conversation = conversations::fetch_one(ctx, conversation_id).await?;

    ctx.registry()
        .join_room(session.participant(), &conversation.room_id)
        .await;
    *state = ConnectionState::RoomJoined(conversation.room_id.clone());

    // opening the room counts as catching up on it
    conversations::reset_unread(ctx, conversation_id, session.kind).await?;

    let history = messages::history(ctx, session, room_key, None, None).await?;
    Ok(vec![
        ServerEvent::JoinedRoom {
            room_id: conversation.room_id.clone(),
        },
        ServerEvent::HistoryMessages {
            room_id: conversation.room_id,
            messages: history,
        },
    ])
}
