//! 統合テスト用のインメモリなライブチャット

#![allow(dead_code)]

use async_trait::async_trait;
use chatmood::api::{ChatMessageSource, ChatRecord, LiveChatId, LiveChatLocator, VideoId};
use chatmood::analyzer::LiveChatAnalyzer;
use chatmood::sentiment::SentimentClassifier;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const LIVE_VIDEO: &str = "dQw4w9WgXcQ";
pub const OFFLINE_VIDEO: &str = "aaaaaaaaaaa";

pub fn record(author: &str, text: &str) -> ChatRecord {
    ChatRecord {
        author: author.to_string(),
        text: text.to_string(),
        published_at: "2024-06-01T18:00:00Z".to_string(),
    }
}

/// 指定した動画だけライブ扱い。用意したバッチを順に返し、尽きたら空のバッチを返す。
#[derive(Default)]
pub struct ScriptedChat {
    live: HashSet<String>,
    batches: Mutex<VecDeque<Vec<ChatRecord>>>,
    fetches: AtomicUsize,
    released: Mutex<Vec<LiveChatId>>,
    poll_interval: Option<Duration>,
}

impl ScriptedChat {
    pub fn new() -> Self {
        Self::default().live_video(LIVE_VIDEO)
    }

    pub fn live_video(mut self, video_id: &str) -> Self {
        self.live.insert(video_id.to_string());
        self
    }

    pub fn batch(self, records: Vec<ChatRecord>) -> Self {
        self.batches.lock().push_back(records);
        self
    }

    pub fn push_batch(&self, records: Vec<ChatRecord>) {
        self.batches.lock().push_back(records);
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> Vec<LiveChatId> {
        self.released.lock().clone()
    }
}

pub fn chat_id_for(video_id: &str) -> LiveChatId {
    LiveChatId(format!("chat-{}", video_id))
}

#[async_trait]
impl LiveChatLocator for ScriptedChat {
    async fn resolve_live_chat_id(&self, video_id: &VideoId) -> Option<LiveChatId> {
        self.live
            .contains(&video_id.0)
            .then(|| chat_id_for(&video_id.0))
    }
}

#[async_trait]
impl ChatMessageSource for ScriptedChat {
    async fn fetch_batch(&self, _live_chat_id: &LiveChatId) -> Vec<ChatRecord> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().pop_front().unwrap_or_default()
    }

    fn release(&self, live_chat_id: &LiveChatId) {
        self.released.lock().push(live_chat_id.clone());
    }

    fn suggested_poll_interval(&self) -> Option<Duration> {
        self.poll_interval
    }
}

pub fn analyzer_with(chat: Arc<ScriptedChat>) -> LiveChatAnalyzer {
    LiveChatAnalyzer::new(
        chat.clone(),
        chat,
        Arc::new(SentimentClassifier::new().unwrap()),
    )
}
