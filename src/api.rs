pub mod live_chat; // ライブチャット取得の抽象化
pub mod youtube;

pub use live_chat::{ChatMessageSource, ChatRecord, LiveChatId, LiveChatLocator};
pub use youtube::{extract_video_id, FetchError, VideoId, YouTubeDataApi};
