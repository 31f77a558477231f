pub mod access_tokens;
pub mod conversations;
pub mod merchants;
pub mod messages;
pub mod users;
