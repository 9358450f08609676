//! ライブチャット感情分析サービス
//!
//! [`LiveChatLocator`] と [`ChatMessageSource`] を [`SessionStore`] につなぎ、HTTP 層が提供する
//! 開始・更新・参照・リセットの各操作を公開する。

use crate::api::{extract_video_id, ChatMessageSource, LiveChatId, LiveChatLocator, VideoId};
use crate::sentiment::SentimentClassifier;
use crate::session::{SessionSnapshot, SessionStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// `start_analysis` がセッションを開始しない理由
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Invalid YouTube URL")]
    InvalidIdentifier { input: String },
    #[error("The link is not live")]
    NotLive { video_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// `start_analysis` の結果。エラーもここで返し、呼び出し側には伝播しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResult {
    pub status: Status,
    pub message: String,
    pub is_live: bool,
}

impl StartResult {
    pub const STARTED_MESSAGE: &'static str = "Live stream detected. Analysis started.";

    pub fn started() -> Self {
        Self {
            status: Status::Success,
            message: Self::STARTED_MESSAGE.to_string(),
            is_live: true,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            is_live: false,
        }
    }
}

impl From<&AnalysisError> for StartResult {
    fn from(error: &AnalysisError) -> Self {
        Self::error(error.to_string())
    }
}

pub struct LiveChatAnalyzer {
    locator: Arc<dyn LiveChatLocator>,
    source: Arc<dyn ChatMessageSource>,
    store: SessionStore,
}

impl std::fmt::Debug for LiveChatAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveChatAnalyzer")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl LiveChatAnalyzer {
    pub fn new(
        locator: Arc<dyn LiveChatLocator>,
        source: Arc<dyn ChatMessageSource>,
        classifier: Arc<SentimentClassifier>,
    ) -> Self {
        Self {
            locator,
            source,
            store: SessionStore::new(classifier),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// `url_or_id` がライブ配信中の場合に限りセッションを開始する
    ///
    /// 開始できなかった場合、既存のセッションはそのまま残る。
    pub async fn start_analysis(&self, url_or_id: &str) -> StartResult {
        match self.try_start(url_or_id).await {
            Ok(added) => {
                tracing::info!(initial_comments = added, "✅ Live stream detected, analysis started");
                StartResult::started()
            }
            Err(error) => {
                tracing::warn!(error = ?error, "🚫 Analysis not started: {}", error);
                StartResult::from(&error)
            }
        }
    }

    async fn try_start(&self, url_or_id: &str) -> Result<usize, AnalysisError> {
        let video_id: VideoId =
            extract_video_id(url_or_id).ok_or_else(|| AnalysisError::InvalidIdentifier {
                input: url_or_id.to_string(),
            })?;
        tracing::info!(video_id = %video_id, "🎬 Resolving live chat");

        let live_chat_id = self
            .locator
            .resolve_live_chat_id(&video_id)
            .await
            .ok_or_else(|| AnalysisError::NotLive {
                video_id: video_id.0.clone(),
            })?;

        if let Some(previous) = self.live_chat_id() {
            self.source.release(&previous);
        }
        // 新しいセッションは常にチャットの先頭から取得する
        self.source.release(&live_chat_id);
        self.store.start_session(&video_id.0, &live_chat_id.0);
        Ok(self.pull(&live_chat_id).await)
    }

    async fn pull(&self, live_chat_id: &LiveChatId) -> usize {
        let batch = self.source.fetch_batch(live_chat_id).await;
        if batch.is_empty() {
            tracing::debug!(live_chat_id = %live_chat_id, "No new chat messages");
            return 0;
        }
        self.store.ingest_batch_for(&live_chat_id.0, batch)
    }

    /// ライブ中なら次のバッチを取得・取り込みし、現在のデータを返す
    pub async fn update_comments(&self) -> SessionSnapshot {
        if let Some(live_chat_id) = self.live_chat_id() {
            self.pull(&live_chat_id).await;
        }
        self.store.snapshot()
    }

    pub fn get_data(&self) -> SessionSnapshot {
        self.store.snapshot()
    }

    pub fn reset_session(&self) -> SessionSnapshot {
        if let Some(live_chat_id) = self.live_chat_id() {
            self.source.release(&live_chat_id);
        }
        self.store.reset();
        self.store.snapshot()
    }

    /// 次の取得までの待ち時間。サーバーが示した間隔より短くはしない。
    pub fn next_poll_delay(&self, configured: Duration) -> Duration {
        match self.source.suggested_poll_interval() {
            Some(suggested) => configured.max(suggested),
            None => configured,
        }
    }

    fn live_chat_id(&self) -> Option<LiveChatId> {
        if !self.store.is_live() {
            return None;
        }
        self.store.live_chat_id().map(LiveChatId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatRecord;
    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl LiveChatLocator for Offline {
        async fn resolve_live_chat_id(&self, _video_id: &VideoId) -> Option<LiveChatId> {
            None
        }
    }

    #[async_trait]
    impl ChatMessageSource for Offline {
        async fn fetch_batch(&self, _live_chat_id: &LiveChatId) -> Vec<ChatRecord> {
            Vec::new()
        }
    }

    fn offline_analyzer() -> LiveChatAnalyzer {
        LiveChatAnalyzer::new(
            Arc::new(Offline),
            Arc::new(Offline),
            Arc::new(SentimentClassifier::new().unwrap()),
        )
    }

    #[test]
    fn test_start_result_serialization() {
        let json = serde_json::to_value(StartResult::started()).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["is_live"], true);
        assert_eq!(json["message"], "Live stream detected. Analysis started.");
    }

    #[test]
    fn test_invalid_identifier() {
        let analyzer = offline_analyzer();
        let result = tokio_test::block_on(analyzer.start_analysis("not-a-live-video"));
        assert_eq!(result, StartResult::error("Invalid YouTube URL"));
        assert!(!analyzer.store().is_live());
    }

    #[test]
    fn test_not_live() {
        let analyzer = offline_analyzer();
        let result = tokio_test::block_on(analyzer.start_analysis("dQw4w9WgXcQ"));
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.message, "The link is not live");
        assert!(!result.is_live);
        assert!(!analyzer.store().is_live());
    }

    #[test]
    fn test_poll_delay_without_suggestion_is_configured() {
        let analyzer = offline_analyzer();
        assert_eq!(
            analyzer.next_poll_delay(Duration::from_secs(5)),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_update_without_session_is_empty() {
        let analyzer = offline_analyzer();
        let snapshot = tokio_test::block_on(analyzer.update_comments());
        assert!(snapshot.comments.is_empty());
        assert_eq!(snapshot.stats.total, 0);
    }
}
