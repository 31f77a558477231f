use crate::common::context::Context;
use crate::events::{ConnectionState, EventResult};
use crate::models::sessions::Session;

/// Clears room membership if this connection currently occupies the room.
/// Leaving a room the caller never joined is a no-op.
pub async fn handle<C: Context>(
    ctx: &C,
    session: &Session,
    state: &mut ConnectionState,
    room_id: &str,
) -> EventResult {
    ctx.registry()
        .leave_room(session.participant(), room_id)
        .await;
    if state.current_room() == Some(room_id) {
        *state = ConnectionState::Authenticated;
    }
    Ok(vec![])
}
