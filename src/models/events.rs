use crate::models::ParticipantKind;
use crate::models::messages::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Commands a connected client may issue once authenticated.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientCommand {
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String },
    #[serde(rename_all = "camelCase")]
    SendMessage {
        room_id: String,
        receiver_id: i64,
        content: String,
        message_type: Option<String>,
        metadata: Option<Value>,
    },
    #[serde(rename_all = "camelCase")]
    MarkAsRead { room_id: String },
    #[serde(rename_all = "camelCase")]
    LeaveRoom { room_id: String },
}

impl ClientCommand {
    pub const fn name(&self) -> &'static str {
        match self {
            ClientCommand::JoinRoom { .. } => "join_room",
            ClientCommand::SendMessage { .. } => "send_message",
            ClientCommand::MarkAsRead { .. } => "mark_as_read",
            ClientCommand::LeaveRoom { .. } => "leave_room",
        }
    }

    pub fn room_id(&self) -> &str {
        match self {
            ClientCommand::JoinRoom { room_id }
            | ClientCommand::SendMessage { room_id, .. }
            | ClientCommand::MarkAsRead { room_id }
            | ClientCommand::LeaveRoom { room_id } => room_id,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewMessage,
}

/// Lightweight event pushed to a participant's personal channel so list
/// screens update even when the room itself is not open.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub room_id: String,
    pub sender_id: i64,
    pub sender_type: ParticipantKind,
    pub message: String,
}

/// Events the gateway emits back over the socket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    JoinedRoom { room_id: String },
    #[serde(rename_all = "camelCase")]
    HistoryMessages {
        room_id: String,
        messages: Vec<Message>,
    },
    NewMessage(Message),
    #[serde(rename_all = "camelCase")]
    MessagesRead {
        room_id: String,
        reader_id: i64,
        reader_type: ParticipantKind,
    },
    Notification(Notification),
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_commands_parse_from_the_wire_vocabulary() {
        let command: ClientCommand = serde_json::from_str(
            r#"{"event":"join_room","data":{"roomId":"room_1_2"}}"#,
        )
        .unwrap();
        assert!(matches!(
            command,
            ClientCommand::JoinRoom { ref room_id } if room_id == "room_1_2"
        ));

        let command: ClientCommand = serde_json::from_str(
            r#"{"event":"send_message","data":{
                "roomId":"room_1_2","receiverId":2,"content":"hi"
            }}"#,
        )
        .unwrap();
        let ClientCommand::SendMessage {
            room_id,
            receiver_id,
            content,
            message_type,
            metadata,
        } = command
        else {
            panic!("expected send_message");
        };
        assert_eq!(room_id, "room_1_2");
        assert_eq!(receiver_id, 2);
        assert_eq!(content, "hi");
        assert_eq!(message_type, None);
        assert_eq!(metadata, None);
    }

    #[test]
    fn unknown_events_fail_to_parse() {
        let result =
            serde_json::from_str::<ClientCommand>(r#"{"event":"typing","data":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn notification_event_matches_the_wire_shape() {
        let event = ServerEvent::Notification(Notification {
            kind: NotificationKind::NewMessage,
            room_id: "room_1_2".into(),
            sender_id: 1,
            sender_type: ParticipantKind::User,
            message: "hello".into(),
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "notification");
        assert_eq!(value["data"]["type"], "new_message");
        assert_eq!(value["data"]["roomId"], "room_1_2");
        assert_eq!(value["data"]["senderType"], "user");
        assert_eq!(value["data"]["message"], "hello");
    }

    #[test]
    fn read_receipt_event_names_the_reader() {
        let event = ServerEvent::MessagesRead {
            room_id: "room_1_2".into(),
            reader_id: 2,
            reader_type: ParticipantKind::Merchant,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "messages_read");
        assert_eq!(value["data"]["readerId"], 2);
        assert_eq!(value["data"]["readerType"], "merchant");
    }
}
