//! YouTube Data API v3 ライブチャットエンドポイントのモックサーバー
//!
//! `GET /youtube/v3/videos` と `GET /youtube/v3/liveChat/messages` で用意したコメントを返し、
//! API キーなしで chatmood を動かせるようにする:
//!
//! ```text
//! cd crates/mock-server && cargo run -- --port 3030 --live-video dQw4w9WgXcQ
//! chatmood --config mock.toml watch dQw4w9WgXcQ
//! ```
//!
//! `mock.toml` には `youtube.base_url = "http://127.0.0.1:3030/youtube/v3"` を設定する。

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use clap::Parser;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use warp::Filter;

const COMMENTS: &[&str] = &[
    "I LOVE this!! 😍😍😍",
    "gg wp 🔥🔥",
    "this is amazing, best stream ever",
    "so good 👍",
    "hello from Brazil",
    "what game is this?",
    "is this good???",
    "the stream started a bit earlier today",
    "first time here",
    "this is terrible 😢",
    "so boring, worst stream 👎",
    "lag again 😡",
    "not bad",
    "LOL 😂😂",
    "can you play the song again?",
];

const AUTHORS: &[&str] = &[
    "alice", "bob", "carol", "dave", "erin", "frank", "grace", "heidi", "ivan", "judy",
];

#[derive(Parser, Debug, Clone)]
#[command(name = "mock-server", about = "Mock YouTube Data API live chat server")]
struct Args {
    #[arg(long, default_value_t = 3030)]
    port: u16,

    /// ライブ配信中として扱う動画ID
    #[arg(long = "live-video", default_value = "dQw4w9WgXcQ")]
    live_videos: Vec<String>,

    /// 1 ページあたりのメッセージ数
    #[arg(long, default_value_t = 5)]
    batch_size: usize,

    /// クライアントに返すポーリング間隔
    #[arg(long, default_value_t = 2000)]
    polling_interval_ms: u64,

    /// 既出のコメント本文を繰り返すページの割合
    #[arg(long, default_value_t = 0.2)]
    duplicate_rate: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageItem {
    id: String,
    snippet: Snippet,
    author_details: AuthorDetails,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(rename = "type")]
    kind: &'static str,
    display_message: String,
    published_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthorDetails {
    display_name: String,
}

fn chat_id_for(video_id: &str) -> String {
    format!("mock-chat-{}", video_id)
}

fn encode_offset(offset: usize) -> String {
    URL_SAFE_NO_PAD.encode(format!("offset:{}", offset))
}

fn decode_offset(token: &str) -> Option<usize> {
    let bytes = URL_SAFE_NO_PAD.decode(token).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.strip_prefix("offset:")?.parse().ok()
}

fn videos_response(args: &Args, query: &HashMap<String, String>) -> serde_json::Value {
    let video_id = query.get("id").cloned().unwrap_or_default();
    if args.live_videos.iter().any(|v| v == &video_id) {
        info!("Video {} is live", video_id);
        json!({
            "items": [{
                "id": video_id,
                "liveStreamingDetails": { "activeLiveChatId": chat_id_for(&video_id) }
            }]
        })
    } else {
        info!("Video {} is not live", video_id);
        json!({ "items": [] })
    }
}

fn messages_page(args: &Args, offset: usize) -> serde_json::Value {
    let mut rng = rand::thread_rng();
    let repeat = offset > 0 && rng.gen_bool(args.duplicate_rate.clamp(0.0, 1.0));

    let items: Vec<MessageItem> = (0..args.batch_size)
        .map(|i| {
            let text = if repeat && i == 0 {
                COMMENTS[0]
            } else {
                COMMENTS.choose(&mut rng).copied().unwrap_or(COMMENTS[0])
            };
            MessageItem {
                id: uuid::Uuid::new_v4().to_string(),
                snippet: Snippet {
                    kind: "textMessageEvent",
                    display_message: text.to_string(),
                    published_at: chrono::Utc::now().to_rfc3339(),
                },
                author_details: AuthorDetails {
                    display_name: AUTHORS.choose(&mut rng).copied().unwrap_or("viewer").to_string(),
                },
            }
        })
        .collect();

    json!({
        "items": items,
        "nextPageToken": encode_offset(offset + items.len()),
        "pollingIntervalMillis": args.polling_interval_ms,
    })
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Arc::new(Args::parse());
    let with_args = {
        let args = args.clone();
        warp::any().map(move || args.clone())
    };

    let videos = warp::get()
        .and(warp::path!("youtube" / "v3" / "videos"))
        .and(warp::query::<HashMap<String, String>>())
        .and(with_args.clone())
        .map(|query: HashMap<String, String>, args: Arc<Args>| {
            warp::reply::json(&videos_response(&args, &query))
        });

    let messages = warp::get()
        .and(warp::path!("youtube" / "v3" / "liveChat" / "messages"))
        .and(warp::query::<HashMap<String, String>>())
        .and(with_args)
        .map(|query: HashMap<String, String>, args: Arc<Args>| {
            let chat_id = query.get("liveChatId").cloned().unwrap_or_default();
            let known = args.live_videos.iter().any(|v| chat_id_for(v) == chat_id);
            if !known {
                warn!("Unknown live chat {}", chat_id);
                return warp::reply::with_status(
                    warp::reply::json(&json!({
                        "error": { "code": 404, "message": "liveChatNotFound" }
                    })),
                    warp::http::StatusCode::NOT_FOUND,
                );
            }

            let offset = query
                .get("pageToken")
                .and_then(|token| decode_offset(token))
                .unwrap_or(0);
            debug!("Serving page for {} at offset {}", chat_id, offset);
            warp::reply::with_status(
                warp::reply::json(&messages_page(&args, offset)),
                warp::http::StatusCode::OK,
            )
        });

    let routes = videos.or(messages).with(warp::log("mock_server"));

    info!("Mock YouTube API on http://127.0.0.1:{}/youtube/v3", args.port);
    info!("Live videos: {:?}", args.live_videos);
    warp::serve(routes).run(([127, 0, 0, 1], args.port)).await;
}
