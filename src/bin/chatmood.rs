use anyhow::{Context, Result};
use chatmood::{
    analyzer::LiveChatAnalyzer,
    api::youtube::ApiKey,
    config::{AppConfig, ConfigManager, API_KEY_ENV},
    io, logging,
    sentiment::{Classification, Label, SentimentClassifier},
    server,
    session::{SessionStats, SessionStore},
    YouTubeDataApi,
};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "chatmood", version, about = "YouTube live chat sentiment analyzer")]
struct Cli {
    /// 設定ファイル (省略時はユーザー設定ディレクトリ)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// ログレベル (例: info, chatmood=debug)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// ログを JSON で出力
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// HTTP API を起動
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// テキストを分類し、シグナルの内訳を表示
    Classify {
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// 記録済み NDJSON チャットログを分析
    AnalyzeFile {
        path: PathBuf,
        /// 分析済みコメントの NDJSON 出力先
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Ctrl-C までライブ配信を追跡
    Watch {
        url: String,
        /// 取得間隔 (秒)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = manager.load_config()?;

    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    if cli.log_json {
        config.log.json = true;
    }
    Ok(config)
}

fn build_analyzer(config: &AppConfig) -> Result<LiveChatAnalyzer> {
    let api_key = config.resolve_api_key().with_context(|| {
        format!(
            "No YouTube API key: set {} or youtube.api_key in the config file",
            API_KEY_ENV
        )
    })?;

    let api = Arc::new(
        YouTubeDataApi::new(ApiKey::new(api_key))
            .with_base_url(config.youtube.base_url.clone())
            .with_max_results(config.youtube.max_results),
    );
    let classifier =
        Arc::new(SentimentClassifier::new().context("Failed to build sentiment classifier")?);

    Ok(LiveChatAnalyzer::new(api.clone(), api, classifier))
}

fn log_stats(stats: &SessionStats) {
    tracing::info!(
        total = stats.total,
        positive = stats.positive,
        neutral = stats.neutral,
        negative = stats.negative,
        "📊 Positive {:.1}% | Neutral {:.1}% | Negative {:.1}%",
        stats.percentage(Label::Positive),
        stats.percentage(Label::Neutral),
        stats.percentage(Label::Negative)
    );
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}

async fn run_serve(config: &AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address: {}:{}", host, port))?;

    let analyzer = Arc::new(build_analyzer(config)?);
    server::serve(analyzer, addr, shutdown_signal()).await
}

fn run_classify(texts: &[String]) -> Result<()> {
    let classifier = SentimentClassifier::new().context("Failed to build sentiment classifier")?;

    for text in texts {
        match classifier.evaluate(text) {
            Classification::Scored {
                label,
                score,
                signals,
                question_dampened,
            } => {
                println!("{:<8} {:+.3}  {}", label.to_string(), score, text);
                for signal in signals {
                    println!("    {:<10} {:+.3}", signal.kind.to_string(), signal.value);
                }
                if question_dampened {
                    println!("    (question, kept neutral)");
                }
            }
            Classification::Degraded { error } => {
                println!("{:<8} degraded  {}  ({})", Label::Neutral.to_string(), text, error);
            }
        }
    }
    Ok(())
}

fn run_analyze_file(path: &Path, output: Option<&Path>) -> Result<()> {
    let records = io::read_chat_records(path)
        .with_context(|| format!("Failed to read chat log: {}", path.display()))?;
    let classifier =
        Arc::new(SentimentClassifier::new().context("Failed to build sentiment classifier")?);

    let store = SessionStore::new(classifier);
    store.start_session("recorded", "recorded");
    let read = records.len();
    let added = store.ingest_batch(records);
    tracing::info!(read, added, duplicates = read - added, "📂 Chat log analyzed");

    let snapshot = store.snapshot();
    log_stats(&snapshot.stats);
    println!("{}", serde_json::to_string_pretty(&snapshot.stats)?);

    if let Some(output) = output {
        io::write_comments_file(output, &snapshot.comments)
            .with_context(|| format!("Failed to write comments: {}", output.display()))?;
        tracing::info!("💾 Comments written to {}", output.display());
    }
    Ok(())
}

async fn run_watch(config: &AppConfig, url: &str, interval: Option<u64>) -> Result<()> {
    let analyzer = build_analyzer(config)?;
    let result = analyzer.start_analysis(url).await;
    if !result.is_live {
        anyhow::bail!("{}", result.message);
    }
    println!("{}", result.message);

    let period = Duration::from_secs(interval.unwrap_or(config.server.poll_interval_secs).max(1));
    let mut printed = 0;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let snapshot = analyzer.get_data();
        for comment in snapshot.comments.iter().skip(printed) {
            println!("[{}] {}: {}", comment.sentiment, comment.author, comment.text);
        }
        printed = snapshot.comments.len();
        log_stats(&snapshot.stats);

        // サーバー指定の pollingIntervalMillis より短い間隔では取得しない
        let delay = analyzer.next_poll_delay(period);
        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(delay) => {
                analyzer.update_comments().await;
            }
        }
    }

    log_stats(&analyzer.get_data().stats);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // tokio-consoleの初期化（プロファイリング用）
    #[cfg(feature = "debug-tokio")]
    console_subscriber::init();

    #[cfg(not(feature = "debug-tokio"))]
    let _guard = logging::init_logging(&config.log)?;

    tracing::debug!(?config.server, "⚙️ Configuration resolved");

    match cli.command {
        Command::Serve { host, port } => run_serve(&config, host, port).await,
        Command::Classify { texts } => run_classify(&texts),
        Command::AnalyzeFile { path, output } => run_analyze_file(&path, output.as_deref()),
        Command::Watch { url, interval } => run_watch(&config, &url, interval).await,
    }
}
