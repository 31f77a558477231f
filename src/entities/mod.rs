pub mod access_tokens;
pub mod conversations;
pub mod messages;
pub mod participants;
