//! YouTube 動画IDの抽出と Data API v3 ライブチャットアダプター

use crate::api::live_chat::{ChatMessageSource, ChatRecord, LiveChatId, LiveChatLocator};
use async_trait::async_trait;
use parking_lot::Mutex;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_MAX_RESULTS: u32 = 100;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP request failed with status: {0}")]
    Status(u16),
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub struct VideoId(pub String);

#[derive(Debug, Clone, derive_more::Display)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: String) -> Self {
        Self(value)
    }
}

static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:v=|/)([0-9A-Za-z_-]{11})",
        r"(?:embed/)([0-9A-Za-z_-]{11})",
        r"^([0-9A-Za-z_-]{11})$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("video id pattern is valid"))
    .collect()
});

/// watch / 共有 / 埋め込み URL、または ID 単体から 11 文字の動画IDを取り出す
pub fn extract_video_id(url_or_id: &str) -> Option<VideoId> {
    let input = url_or_id.trim();
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(input))
        .and_then(|cap| cap.get(1))
        .map(|m| VideoId(m.as_str().to_string()))
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    #[serde(default)]
    live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveStreamingDetails {
    #[serde(default)]
    active_live_chat_id: Option<String>,
}

/// `liveChat/messages` の 1 ページ
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveChatMessagePage {
    #[serde(default)]
    pub items: Vec<LiveChatMessageItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub polling_interval_millis: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveChatMessageItem {
    #[serde(default)]
    pub snippet: MessageSnippet,
    #[serde(default)]
    pub author_details: Option<AuthorDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSnippet {
    #[serde(default)]
    pub display_message: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDetails {
    pub display_name: String,
}

impl LiveChatMessagePage {
    /// このページのテキストメッセージ。表示メッセージのない項目 (削除、BAN など) は除く。
    pub fn into_records(self) -> Vec<ChatRecord> {
        self.items
            .into_iter()
            .filter_map(|item| {
                let text = item.snippet.display_message.filter(|t| !t.is_empty())?;
                Some(ChatRecord {
                    author: item
                        .author_details
                        .map(|a| a.display_name)
                        .unwrap_or_else(|| "Unknown".to_string()),
                    text,
                    published_at: item
                        .snippet
                        .published_at
                        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
                })
            })
            .collect()
    }
}

fn parse_live_chat_id(body: &str) -> Result<Option<LiveChatId>, FetchError> {
    let response: VideoListResponse = serde_json::from_str(body)?;
    Ok(response
        .items
        .into_iter()
        .next()
        .and_then(|item| item.live_streaming_details)
        .and_then(|details| details.active_live_chat_id)
        .map(LiveChatId))
}

/// ライブチャット検索とメッセージ取得用の YouTube Data API v3 クライアント
///
/// チャットごとに `nextPageToken` を覚えておき、次回以降は新着分だけを取得する。
#[derive(Debug)]
pub struct YouTubeDataApi {
    api_key: ApiKey,
    base_url: String,
    max_results: u32,
    http_client: reqwest::Client,
    page_tokens: Mutex<HashMap<LiveChatId, String>>,
    poll_interval: Mutex<Option<Duration>>,
}

impl YouTubeDataApi {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            http_client: reqwest::Client::new(),
            page_tokens: Mutex::new(HashMap::new()),
            poll_interval: Mutex::new(None),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.clamp(1, 2000);
        self
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    pub async fn fetch_live_chat_id(
        &self,
        video_id: &VideoId,
    ) -> Result<Option<LiveChatId>, FetchError> {
        let url = format!(
            "{}/videos?part=liveStreamingDetails&id={}&key={}",
            self.base_url,
            urlencoding::encode(&video_id.0),
            urlencoding::encode(&self.api_key.0)
        );
        tracing::debug!(video_id = %video_id, "📡 Looking up active live chat");

        let body = self.get_text(&url).await?;
        parse_live_chat_id(&body)
    }

    pub async fn fetch_messages(
        &self,
        live_chat_id: &LiveChatId,
        page_token: Option<&str>,
    ) -> Result<LiveChatMessagePage, FetchError> {
        let mut url = format!(
            "{}/liveChat/messages?liveChatId={}&part=snippet,authorDetails&maxResults={}&key={}",
            self.base_url,
            urlencoding::encode(&live_chat_id.0),
            self.max_results,
            urlencoding::encode(&self.api_key.0)
        );
        if let Some(token) = page_token {
            url.push_str("&pageToken=");
            url.push_str(&urlencoding::encode(token));
        }

        let body = self.get_text(&url).await?;
        let page: LiveChatMessagePage = serde_json::from_str(&body)?;
        tracing::debug!(
            live_chat_id = %live_chat_id,
            items = page.items.len(),
            has_next_page = page.next_page_token.is_some(),
            "📬 Live chat page received"
        );
        Ok(page)
    }
}

#[async_trait]
impl LiveChatLocator for YouTubeDataApi {
    async fn resolve_live_chat_id(&self, video_id: &VideoId) -> Option<LiveChatId> {
        match self.fetch_live_chat_id(video_id).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(video_id = %video_id, "❌ Live chat ID error: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl ChatMessageSource for YouTubeDataApi {
    async fn fetch_batch(&self, live_chat_id: &LiveChatId) -> Vec<ChatRecord> {
        let token = self.page_tokens.lock().get(live_chat_id).cloned();

        match self.fetch_messages(live_chat_id, token.as_deref()).await {
            Ok(page) => {
                if let Some(next) = page.next_page_token.clone() {
                    self.page_tokens.lock().insert(live_chat_id.clone(), next);
                }
                if let Some(millis) = page.polling_interval_millis {
                    *self.poll_interval.lock() = Some(Duration::from_millis(millis));
                }
                page.into_records()
            }
            Err(e) => {
                tracing::error!(live_chat_id = %live_chat_id, "❌ Live comment error: {}", e);
                Vec::new()
            }
        }
    }

    fn release(&self, live_chat_id: &LiveChatId) {
        if self.page_tokens.lock().remove(live_chat_id).is_some() {
            tracing::debug!(live_chat_id = %live_chat_id, "Page token dropped");
        }
    }

    fn suggested_poll_interval(&self) -> Option<Duration> {
        *self.poll_interval.lock()
    }
}
