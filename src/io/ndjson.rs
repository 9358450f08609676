//! NDJSON (Newline Delimited JSON) ファイル処理ユーティリティ
//!
//! 記録済みチャットログは 1 行 1 つの `{author, text, published_at}` として読み込み、
//! 分析済みコメントも同じく 1 行 1 オブジェクトで書き出す。

use crate::api::ChatRecord;
use crate::session::Comment;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Error types for file I/O and parsing operations.
#[derive(Error, Debug)]
pub enum LiveChatError {
    /// I/O error when reading or writing files
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error at line {line}: {source}")]
    JsonParse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonWrite(#[source] serde_json::Error),

    /// Invalid record content
    #[error("Invalid file format: {reason}")]
    InvalidFormat { reason: String },

    /// Empty or invalid data
    #[error("No valid data found: {context}")]
    NoData { context: String },

    /// Generic error with context
    #[error("Error in {context}: {message}")]
    Generic { context: String, message: String },
}

impl LiveChatError {
    pub fn generic(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generic {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }

    pub fn no_data(context: impl Into<String>) -> Self {
        Self::NoData {
            context: context.into(),
        }
    }
}

/// チャットログの 1 行。`timestamp` は `published_at` の別名として受け付ける。
#[derive(Debug, Deserialize)]
struct RecordLine {
    #[serde(default)]
    author: Option<String>,
    text: String,
    #[serde(default, alias = "timestamp")]
    published_at: Option<String>,
}

/// 任意のリーダーから NDJSON を読み込み、各エントリを検証する
///
/// 空行は読み飛ばす。パースエラーには 1 始まりの行番号が付く。
pub fn parse_ndjson_reader<T, R, F>(reader: R, validate_entry: Option<F>) -> Result<Vec<T>, LiveChatError>
where
    T: for<'de> Deserialize<'de>,
    R: BufRead,
    F: Fn(&T) -> Result<(), LiveChatError>,
{
    let mut entries = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;

        if line.trim().is_empty() {
            continue;
        }

        let entry: T = serde_json::from_str(&line).map_err(|e| LiveChatError::JsonParse {
            line: line_number + 1,
            source: e,
        })?;

        if let Some(ref validator) = validate_entry {
            validator(&entry)?;
        }

        entries.push(entry);
    }

    Ok(entries)
}

/// 記録済みチャットログを読み込む
///
/// 投稿者のない行は "Unknown"、時刻のない行は現在時刻になる。
pub fn read_chat_records(path: impl AsRef<Path>) -> Result<Vec<ChatRecord>, LiveChatError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        LiveChatError::generic(
            "opening file",
            format!("Failed to open '{}': {}", path.display(), e),
        )
    })?;

    let lines: Vec<RecordLine> = parse_ndjson_reader(
        BufReader::new(file),
        Some(|line: &RecordLine| {
            if line.text.is_empty() {
                Err(LiveChatError::invalid_format("Empty chat message text"))
            } else {
                Ok(())
            }
        }),
    )?;

    if lines.is_empty() {
        return Err(LiveChatError::no_data(format!(
            "No valid entries found in file '{}'",
            path.display()
        )));
    }

    tracing::debug!(path = %path.display(), records = lines.len(), "📂 Chat log loaded");

    Ok(lines
        .into_iter()
        .map(|line| ChatRecord {
            author: line.author.unwrap_or_else(|| "Unknown".to_string()),
            text: line.text,
            published_at: line
                .published_at
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        })
        .collect())
}

/// 分析済みコメントを 1 行 1 JSON オブジェクトで書き出す
pub fn write_comments<W: Write>(writer: W, comments: &[Comment]) -> Result<(), LiveChatError> {
    let mut writer = BufWriter::new(writer);
    for comment in comments {
        serde_json::to_writer(&mut writer, comment).map_err(LiveChatError::JsonWrite)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_comments_file(
    path: impl AsRef<Path>,
    comments: &[Comment],
) -> Result<(), LiveChatError> {
    let file = File::create(path.as_ref())?;
    write_comments(file, comments)
}
