//! [`LiveChatAnalyzer`] を公開する JSON HTTP エンドポイント
//!
//! | method | path        | 内容                                    |
//! |--------|-------------|-----------------------------------------|
//! | POST   | `/start`    | `{"video_url": "..."}` → 開始結果       |
//! | GET    | `/comments` | 取得してから `{comments, stats}`        |
//! | GET    | `/data`     | 取得せずに `{comments, stats}`          |
//! | POST   | `/reset`    | 空の `{comments, stats}`                |
//! | GET    | `/health`   | 死活確認                                |

use crate::analyzer::{LiveChatAnalyzer, StartResult};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Default, Deserialize)]
struct StartRequest {
    #[serde(default)]
    video_url: String,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    message: &'static str,
}

fn with_analyzer(
    analyzer: Arc<LiveChatAnalyzer>,
) -> impl Filter<Extract = (Arc<LiveChatAnalyzer>,), Error = Infallible> + Clone {
    warp::any().map(move || analyzer.clone())
}

/// 全ルート (CORS は全オリジン許可)
pub fn routes(
    analyzer: Arc<LiveChatAnalyzer>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let start = warp::path("start")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::bytes())
        .and(with_analyzer(analyzer.clone()))
        .and_then(handle_start);

    let comments = warp::path("comments")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_analyzer(analyzer.clone()))
        .and_then(handle_comments);

    let data = warp::path("data")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_analyzer(analyzer.clone()))
        .map(|analyzer: Arc<LiveChatAnalyzer>| warp::reply::json(&analyzer.get_data()));

    let reset = warp::path("reset")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_analyzer(analyzer))
        .map(|analyzer: Arc<LiveChatAnalyzer>| warp::reply::json(&analyzer.reset_session()));

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| {
            warp::reply::json(&Health {
                status: "ok",
                message: "Server is running",
            })
        });

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    start
        .or(comments)
        .or(data)
        .or(reset)
        .or(health)
        .with(cors)
        .with(warp::trace::request())
}

async fn handle_start(
    body: warp::hyper::body::Bytes,
    analyzer: Arc<LiveChatAnalyzer>,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, Infallible> {
    let request: StartRequest = serde_json::from_slice(&body).unwrap_or_default();
    let video_url = request.video_url.trim();

    if video_url.is_empty() {
        return Ok(warp::reply::with_status(
            warp::reply::json(&StartResult::error("No video URL provided")),
            StatusCode::BAD_REQUEST,
        ));
    }

    let result = analyzer.start_analysis(video_url).await;
    Ok(warp::reply::with_status(
        warp::reply::json(&result),
        StatusCode::OK,
    ))
}

async fn handle_comments(analyzer: Arc<LiveChatAnalyzer>) -> Result<warp::reply::Json, Infallible> {
    let snapshot = analyzer.update_comments().await;
    Ok(warp::reply::json(&snapshot))
}

/// `shutdown` が完了するまで待ち受ける
pub async fn serve(
    analyzer: Arc<LiveChatAnalyzer>,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let (bound, server) =
        warp::serve(routes(analyzer)).try_bind_with_graceful_shutdown(addr, shutdown)?;
    tracing::info!("🌐 Sentiment API listening on http://{}", bound);
    server.await;
    tracing::info!("👋 Sentiment API stopped");
    Ok(())
}
