pub mod analyzer;
pub mod api;
pub mod config;
pub mod io;
pub mod logging;
pub mod sentiment;
pub mod server;
pub mod session;

// 主要なエラー型を再エクスポート
pub use analyzer::AnalysisError;
pub use api::youtube::FetchError;
pub use io::LiveChatError;

// サービスの公開 API を再エクスポート
pub use analyzer::{LiveChatAnalyzer, StartResult, Status};
pub use api::{extract_video_id, ChatMessageSource, ChatRecord, LiveChatId, LiveChatLocator};
pub use api::{VideoId, YouTubeDataApi};
pub use sentiment::{Classification, Label, SentimentClassifier};
pub use session::{Comment, SessionSnapshot, SessionStats, SessionStore};
