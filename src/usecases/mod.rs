pub mod conversations;
pub mod fanout;
pub mod messages;
pub mod sessions;
