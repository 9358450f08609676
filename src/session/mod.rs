//! ライブ分析セッションの状態
//!
//! [`SessionStore`] が唯一のライブ [`Session`] を所有する。蓄積したコメント、ラベル別の件数、
//! 完全一致の重複排除インデックスを持ち、すべてのアクセスは 1 つのミューテックスで直列化する。

mod store;

pub use store::{IngestOutcome, SessionStore};

use crate::sentiment::Label;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 分析済みコメント。作成後は変更しない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub sentiment: Label,
    /// 投稿時刻 (ISO-8601)
    pub timestamp: String,
}

/// 取り込み待ちのコメント。ラベルがなければ取り込み時に分類する。
#[derive(Debug, Clone, PartialEq)]
pub struct PendingComment {
    pub author: String,
    pub text: String,
    pub timestamp: String,
    pub sentiment: Option<Label>,
}

impl PendingComment {
    pub fn new(
        author: impl Into<String>,
        text: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            timestamp: timestamp.into(),
            sentiment: None,
        }
    }

    pub fn labeled(mut self, label: Label) -> Self {
        self.sentiment = Some(label);
        self
    }
}

impl From<crate::api::ChatRecord> for PendingComment {
    fn from(record: crate::api::ChatRecord) -> Self {
        Self::new(record.author, record.text, record.published_at)
    }
}

/// ラベル別の件数。常に `total == positive + neutral + negative`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub total: u64,
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl SessionStats {
    fn record(&mut self, label: Label) {
        self.total += 1;
        match label {
            Label::Positive => self.positive += 1,
            Label::Neutral => self.neutral += 1,
            Label::Negative => self.negative += 1,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.total == self.positive + self.neutral + self.negative
    }

    /// 全コメントに占める `label` の割合 (%)
    pub fn percentage(&self, label: Label) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let count = match label {
            Label::Positive => self.positive,
            Label::Neutral => self.neutral,
            Label::Negative => self.negative,
        };
        count as f64 / self.total as f64 * 100.0
    }
}

/// セッションのコメントと件数の読み取り専用コピー
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub comments: Vec<Comment>,
    pub stats: SessionStats,
}

/// ライブ分析の作業データ
#[derive(Debug, Clone, Default)]
pub struct Session {
    video_id: Option<String>,
    live_chat_id: Option<String>,
    is_live: bool,
    comments: Vec<Comment>,
    seen_texts: HashSet<String>,
    stats: SessionStats,
}

impl Session {
    /// 空の非ライブセッション
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn live(video_id: impl Into<String>, live_chat_id: impl Into<String>) -> Self {
        Self {
            video_id: Some(video_id.into()),
            live_chat_id: Some(live_chat_id.into()),
            is_live: true,
            ..Self::default()
        }
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    pub fn live_chat_id(&self) -> Option<&str> {
        self.live_chat_id.as_deref()
    }

    pub fn is_live(&self) -> bool {
        self.is_live
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// 保存済みコメント本文との完全一致判定
    pub fn contains_text(&self, text: &str) -> bool {
        self.seen_texts.contains(text)
    }

    fn push(&mut self, comment: Comment) {
        self.stats.record(comment.sentiment);
        self.seen_texts.insert(comment.text.clone());
        self.comments.push(comment);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            comments: self.comments.clone(),
            stats: self.stats,
        }
    }
}
