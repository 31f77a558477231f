use crate::common::error::{AppError, ServiceResult};
use crate::entities::messages::Message as MessageEntity;
use crate::models::ParticipantKind;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
    Failed,
}

impl MessageStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Read => "read",
            MessageStatus::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for MessageStatus {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "sent" => Ok(MessageStatus::Sent),
            "delivered" => Ok(MessageStatus::Delivered),
            "read" => Ok(MessageStatus::Read),
            "failed" => Ok(MessageStatus::Failed),
            _ => Err(AppError::DecodingRequestFailed),
        }
    }
}

/// Typed message payload: the `messageType`/`metadata` pair on the wire and
/// in storage. Keeping the kinds in one tagged union keeps serialization and
/// broadcast handling exhaustive; the flattened `extra` maps leave room for
/// payload fields this service does not interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "messageType", content = "metadata", rename_all = "lowercase")]
pub enum MessagePayload {
    Text(TextMetadata),
    Image(ImageMetadata),
    Product(ProductMetadata),
    Order(OrderMetadata),
    System(SystemMetadata),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextMetadata {
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMetadata {
    pub product_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMetadata {
    pub order_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for MessagePayload {
    fn default() -> Self {
        MessagePayload::Text(TextMetadata::default())
    }
}

impl MessagePayload {
    pub const fn kind(&self) -> &'static str {
        match self {
            MessagePayload::Text(_) => "text",
            MessagePayload::Image(_) => "image",
            MessagePayload::Product(_) => "product",
            MessagePayload::Order(_) => "order",
            MessagePayload::System(_) => "system",
        }
    }

    pub fn metadata_value(&self) -> Value {
        let metadata = match self {
            MessagePayload::Text(m) => serde_json::to_value(m),
            MessagePayload::Image(m) => serde_json::to_value(m),
            MessagePayload::Product(m) => serde_json::to_value(m),
            MessagePayload::Order(m) => serde_json::to_value(m),
            MessagePayload::System(m) => serde_json::to_value(m),
        };
        metadata.unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Builds the payload from the raw `messageType`/`metadata` fields a
    /// client (or a stored row) provides. Missing pieces default to a plain
    /// text payload; an unknown kind or malformed metadata is rejected.
    pub fn from_parts(kind: Option<&str>, metadata: Option<Value>) -> ServiceResult<Self> {
        let kind = match kind {
            None | Some("") => "text",
            Some(kind) => kind,
        };
        let metadata = match metadata {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(metadata) => metadata,
        };
        let tagged = serde_json::json!({ "messageType": kind, "metadata": metadata });
        serde_json::from_value(tagged).map_err(|_| AppError::MessagesInvalidType)
    }
}

/// An immutable record of one communication act. Created by the gateway on a
/// validated send, never physically deleted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    pub room_id: String,
    pub sender_id: i64,
    pub sender_type: ParticipantKind,
    pub receiver_id: i64,
    pub receiver_type: ParticipantKind,
    pub content: String,
    #[serde(flatten)]
    pub payload: MessagePayload,
    pub status: MessageStatus,
    pub is_read: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    pub fn as_entity(&self) -> MessageEntity {
        MessageEntity {
            message_id: self.message_id.clone(),
            conversation_id: self.room_id.clone(),
            sender_id: self.sender_id,
            sender_kind: self.sender_type.as_str().to_string(),
            receiver_id: self.receiver_id,
            receiver_kind: self.receiver_type.as_str().to_string(),
            content: self.content.clone(),
            message_type: self.payload.kind().to_string(),
            metadata: sqlx::types::Json(self.payload.metadata_value()),
            status: self.status.as_str().to_string(),
            is_read: self.is_read,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<MessageEntity> for Message {
    type Error = AppError;

    fn try_from(value: MessageEntity) -> Result<Self, Self::Error> {
        let payload =
            MessagePayload::from_parts(Some(&value.message_type), Some(value.metadata.0))?;
        Ok(Self {
            message_id: value.message_id,
            room_id: value.conversation_id,
            sender_id: value.sender_id,
            sender_type: ParticipantKind::try_from(value.sender_kind.as_str())?,
            receiver_id: value.receiver_id,
            receiver_type: ParticipantKind::try_from(value.receiver_kind.as_str())?,
            content: value.content,
            payload,
            status: MessageStatus::try_from(value.status.as_str())?,
            is_read: value.is_read,
            is_deleted: value.is_deleted,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_kind_defaults_to_text() {
        let payload = MessagePayload::from_parts(None, None).unwrap();
        assert_eq!(payload, MessagePayload::Text(TextMetadata::default()));
        assert_eq!(payload.kind(), "text");
    }

    #[test]
    fn explicit_null_metadata_reads_as_empty() {
        let payload = MessagePayload::from_parts(Some("text"), Some(Value::Null)).unwrap();
        assert_eq!(payload, MessagePayload::Text(TextMetadata::default()));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result = MessagePayload::from_parts(Some("sticker"), None);
        assert_eq!(result.unwrap_err(), AppError::MessagesInvalidType);
    }

    #[test]
    fn product_metadata_keeps_unknown_fields() {
        let metadata = serde_json::json!({
            "productId": 99,
            "title": "Ceramic mug",
            "price": "12.50",
            "shopBadge": "featured"
        });
        let payload = MessagePayload::from_parts(Some("product"), Some(metadata)).unwrap();
        let MessagePayload::Product(product) = &payload else {
            panic!("expected a product payload");
        };
        assert_eq!(product.product_id, 99);
        assert_eq!(product.price, Some(Decimal::new(1250, 2)));
        assert_eq!(
            product.extra.get("shopBadge"),
            Some(&Value::String("featured".into()))
        );

        let round_tripped = payload.metadata_value();
        assert_eq!(round_tripped["shopBadge"], "featured");
    }

    #[test]
    fn image_payload_requires_a_url() {
        let result =
            MessagePayload::from_parts(Some("image"), Some(serde_json::json!({ "size": 3 })));
        assert_eq!(result.unwrap_err(), AppError::MessagesInvalidType);
    }

    #[test]
    fn message_serializes_with_flattened_payload() {
        let now = Utc::now();
        let message = Message {
            message_id: "m-1".into(),
            room_id: "room_1_2".into(),
            sender_id: 1,
            sender_type: ParticipantKind::User,
            receiver_id: 2,
            receiver_type: ParticipantKind::Merchant,
            content: "hello".into(),
            payload: MessagePayload::default(),
            status: MessageStatus::Sent,
            is_read: false,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["messageId"], "m-1");
        assert_eq!(value["roomId"], "room_1_2");
        assert_eq!(value["senderType"], "user");
        assert_eq!(value["receiverType"], "merchant");
        assert_eq!(value["messageType"], "text");
        assert_eq!(value["status"], "sent");
        assert_eq!(value["isRead"], false);
    }
}
