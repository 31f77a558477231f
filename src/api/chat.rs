use crate::api::RequestContext;
use crate::common::context::Context;
use crate::common::error::AppError;
use crate::common::registry::{ConnectionHandle, EventSender};
use crate::events;
use crate::events::ConnectionState;
use crate::models::ParticipantKind;
use crate::models::events::{ClientCommand, ServerEvent};
use crate::models::sessions::Session;
use crate::usecases::sessions;
use axum::extract::Query;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Authentication handshake carried on the upgrade request, mirroring the
/// mobile client's connect payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectQuery {
    pub token: String,
    pub user_id: i64,
    pub user_type: ParticipantKind,
}

/// WebSocket endpoint of the chat gateway. Authentication happens exactly
/// once, before the upgrade is accepted; a bad token never gets a socket.
pub async fn handler(
    ws: WebSocketUpgrade,
    ctx: RequestContext,
    Query(query): Query<ConnectQuery>,
) -> Response {
    let session =
        match sessions::authenticate(&ctx, &query.token, query.user_id, query.user_type).await {
            Ok(session) => session,
            Err(e) => return e.into_response(),
        };
    ws.on_upgrade(move |socket| handle_socket(ctx, session, socket))
}

async fn handle_socket(ctx: RequestContext, session: Session, socket: WebSocket) {
    let (sink, stream) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let participant = session.participant();
    let connection_id = session.connection_id;
    let registry = ctx.registry.clone();

    ctx.registry()
        .register(
            participant,
            ConnectionHandle {
                connection_id,
                sender: tx.clone(),
            },
        )
        .await;
    info!(
        participant = %participant,
        name = %session.display_name,
        "chat connection established"
    );

    let send_task = pusher_loop(rx, sink);

    // commands run inline so a disconnect mid-command still lets the
    // store write finish; the sender keeps the message they believe sent
    recv_loop(&ctx, &session, stream, tx).await;
    send_task.abort();

    // compare-and-remove: if this connection was already replaced by a
    // reconnect, the newer registration stays untouched
    registry.unregister(participant, connection_id).await;
    info!(participant = %participant, "chat connection closed");
}

/// Outbound half: drains the connection's event channel into the socket.
/// Everything this connection ever receives (own responses, room broadcasts,
/// notifications) flows through one channel, keeping frame order stable.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sink: SplitSink<WebSocket, WsMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(WsMessage::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Inbound half: commands are decoded and processed one at a time, which
/// gives each connection serial command ordering. Command failures turn into
/// an `error` event for this connection only and never tear the socket down.
async fn recv_loop(
    ctx: &RequestContext,
    session: &Session,
    mut stream: SplitStream<WebSocket>,
    tx: EventSender,
) {
    let mut state = ConnectionState::default();
    while let Some(message) = stream.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "websocket transport error");
                break;
            }
        };
        match message {
            WsMessage::Text(text) => {
                let command = match serde_json::from_str::<ClientCommand>(&text) {
                    Ok(command) => command,
                    Err(_) => {
                        push_error(&tx, &AppError::DecodingRequestFailed);
                        continue;
                    }
                };
                let command_name = command.name();
                let room_id = command.room_id().to_string();
                match events::handle_command(ctx, session, &mut state, command).await {
                    Ok(events) => {
                        for event in &events {
                            push_event(&tx, event);
                        }
                    }
                    Err(e) => {
                        warn!(
                            command = command_name,
                            room_id = %room_id,
                            participant = %session.participant(),
                            code = e.code(),
                            "chat command rejected"
                        );
                        push_error(&tx, &e);
                    }
                }
            }
            WsMessage::Close(_) => break,
            _ => {}
        }
    }
}

fn push_event(tx: &EventSender, event: &ServerEvent) {
    if let Ok(frame) = serde_json::to_string(event) {
        let _ = tx.send(frame);
    }
}

fn push_error(tx: &EventSender, error: &AppError) {
    push_event(
        tx,
        &ServerEvent::Error {
            message: error.message().to_string(),
        },
    );
}
