use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;
pub type ServiceResponse<T> = ServiceResult<Json<T>>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    Unexpected,
    DecodingRequestFailed,

    SessionsInvalidToken,
    SessionsTokenExpired,

    ConversationsInvalidId,
    ConversationsNotFound,
    ConversationsNotParticipant,
    ConversationsBlocked,

    MessagesEmptyContent,
    MessagesTooLong,
    MessagesInvalidType,
    MessagesReceiverMismatch,

    UsersNotFound,
    MerchantsNotFound,
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",
            AppError::DecodingRequestFailed => "decoding_request_failed",

            AppError::SessionsInvalidToken => "sessions.invalid_token",
            AppError::SessionsTokenExpired => "sessions.token_expired",

            AppError::ConversationsInvalidId => "conversations.invalid_id",
            AppError::ConversationsNotFound => "conversations.not_found",
            AppError::ConversationsNotParticipant => "conversations.not_participant",
            AppError::ConversationsBlocked => "conversations.blocked",

            AppError::MessagesEmptyContent => "messages.empty_content",
            AppError::MessagesTooLong => "messages.too_long",
            AppError::MessagesInvalidType => "messages.invalid_type",
            AppError::MessagesReceiverMismatch => "messages.receiver_mismatch",

            AppError::UsersNotFound => "users.not_found",
            AppError::MerchantsNotFound => "merchants.not_found",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected => "An unexpected error has occurred.",
            AppError::DecodingRequestFailed => "Failed to decode request",

            AppError::SessionsInvalidToken => "Invalid authentication token.",
            AppError::SessionsTokenExpired => "Your authentication token has expired.",

            AppError::ConversationsInvalidId => "Invalid conversation id.",
            AppError::ConversationsNotFound => "Conversation not found",
            AppError::ConversationsNotParticipant => {
                "You are not a participant of this conversation."
            }
            AppError::ConversationsBlocked => "This conversation has been blocked.",

            AppError::MessagesEmptyContent => "Message content must not be empty.",
            AppError::MessagesTooLong => "Your message was too long. It has not been sent.",
            AppError::MessagesInvalidType => "Unknown message type or malformed metadata.",
            AppError::MessagesReceiverMismatch => {
                "The receiver is not the other participant of this conversation."
            }

            AppError::UsersNotFound => "This user does not exist.",
            AppError::MerchantsNotFound => "This merchant does not exist.",
        }
    }

    pub const fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::DecodingRequestFailed
            | AppError::ConversationsInvalidId
            | AppError::MessagesEmptyContent
            | AppError::MessagesTooLong
            | AppError::MessagesInvalidType
            | AppError::MessagesReceiverMismatch => StatusCode::BAD_REQUEST,

            AppError::SessionsInvalidToken
            | AppError::SessionsTokenExpired
            | AppError::ConversationsNotParticipant => StatusCode::UNAUTHORIZED,

            AppError::ConversationsBlocked => StatusCode::FORBIDDEN,

            AppError::ConversationsNotFound
            | AppError::UsersNotFound
            | AppError::MerchantsNotFound => StatusCode::NOT_FOUND,

            AppError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn response_parts(&self) -> (StatusCode, Json<ErrorResponse>) {
        let status = self.http_status_code();
        let response = ErrorResponse {
            code: self.code(),
            message: self.message(),
        };
        (status, Json(response))
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.response_parts().into_response()
    }
}
