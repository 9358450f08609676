//! アナライザーとライブチャット取得元の境界
//!
//! どちらのトレイトもエラーを返さない。検索失敗は「ライブ中でない」、取得失敗は空のバッチとして
//! 扱い、実装側で元のエラーをログに残す。

use crate::api::youtube::VideoId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiveChatId(pub String);

/// 取得元から届いた分析前のチャットメッセージ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub author: String,
    pub text: String,
    /// 投稿時刻 (ISO-8601)
    pub published_at: String,
}

/// 動画のアクティブなライブチャットを探す
#[async_trait]
pub trait LiveChatLocator: Send + Sync {
    /// ライブ配信中でなければ `None`
    async fn resolve_live_chat_id(&self, video_id: &VideoId) -> Option<LiveChatId>;
}

/// ライブチャットのメッセージをページ単位で取得する
#[async_trait]
pub trait ChatMessageSource: Send + Sync {
    /// 前回呼び出し以降のメッセージ (0 件以上)。呼び出しをまたいだ重複はあり得る。
    async fn fetch_batch(&self, live_chat_id: &LiveChatId) -> Vec<ChatRecord>;

    /// ページング状態を破棄する。次の `fetch_batch` はチャットの先頭から取得し直す。
    fn release(&self, _live_chat_id: &LiveChatId) {}

    /// 直近のレスポンスでサーバーが示した最小ポーリング間隔
    fn suggested_poll_interval(&self) -> Option<Duration> {
        None
    }
}
