pub mod chat;

use crate::common::state::AppState;
use axum::Router;
use axum::routing::{get, post};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat/rooms", post(chat::create_room).get(chat::list_rooms))
        .route("/chat/rooms/{room_id}/messages", get(chat::room_messages))
        .route("/chat/rooms/{room_id}/read", post(chat::mark_as_read))
        .route("/chat/messages", post(chat::send_message))
        .route("/chat/unread", get(chat::unread_count))
        .route("/chat/online", get(chat::online_count))
}
