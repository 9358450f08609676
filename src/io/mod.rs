//! 記録済みチャットログの入出力

pub mod ndjson;

pub use ndjson::{read_chat_records, write_comments, write_comments_file, LiveChatError};
