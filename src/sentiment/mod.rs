//! コメントの感情スコアリング
//!
//! コメントは独立した複数の [`Signal`] (絵文字、語彙パターン、汎用極性、表記の強さ) で採点する。
//! [`SentimentClassifier`] が長さに応じた重みで統合し、しきい値で [`Label`] に分類する。

pub mod classifier;
pub mod emoji;
pub mod emoji_table;
pub mod intensity;
pub mod lexicon;
pub mod polarity;

pub use classifier::{Classification, SentimentClassifier, SignalScore};
pub use emoji::{EmojiSignal, EmojiTally};
pub use intensity::IntensitySignal;
pub use lexicon::PatternSignal;
pub use polarity::{LexiconPolarity, PolaritySignal, PolarityEstimator};

use serde::{Deserialize, Serialize};

/// コメントに付ける感情ラベル
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Label {
    Positive,
    Neutral,
    Negative,
}

/// スコア (または障害) を出したシグナルの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
pub enum SignalKind {
    Emoji,
    Pattern,
    Polarity,
    Intensity,
}

/// 1 件のコメントの採点中に起きた障害
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// シグナルが NaN または無限大を返した
    #[error("{signal} signal produced a non-finite score: {value}")]
    NonFinite { signal: SignalKind, value: f64 },

    /// シグナルを計算できなかった
    #[error("{signal} signal failed: {message}")]
    Failed { signal: SignalKind, message: String },
}

impl SignalError {
    pub fn failed(signal: SignalKind, message: impl Into<String>) -> Self {
        Self::Failed {
            signal,
            message: message.into(),
        }
    }
}

/// 各シグナルに渡すテキスト。コメントごとに 1 回だけ作る。
#[derive(Debug, Clone)]
pub struct ScoringInput<'a> {
    /// 受け取ったままのテキスト
    pub raw: &'a str,
    /// 語彙照合用の小文字版
    pub lowercase: String,
    /// 前後の空白を除いた文字数
    pub trimmed_len: usize,
}

impl<'a> ScoringInput<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            lowercase: raw.to_lowercase(),
            trimmed_len: raw.trim().chars().count(),
        }
    }

    pub fn has_question(&self) -> bool {
        self.raw.contains('?')
    }
}

/// 統合スコアに寄与する独立したシグナル
///
/// 実装は純粋であること (同じ入力には常に同じスコア)。
pub trait Signal: Send + Sync {
    fn kind(&self) -> SignalKind;

    fn score(&self, input: &ScoringInput<'_>) -> Result<f64, SignalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_input_lengths() {
        let input = ScoringInput::new("  Hi 😍  ");
        assert_eq!(input.trimmed_len, 4);
        assert_eq!(input.lowercase, "  hi 😍  ");
        assert!(!input.has_question());
        assert!(ScoringInput::new("why?").has_question());
    }

    #[test]
    fn test_label_display_and_serde() {
        assert_eq!(Label::Positive.to_string(), "Positive");
        assert_eq!(serde_json::to_string(&Label::Negative).unwrap(), "\"Negative\"");
        let label: Label = serde_json::from_str("\"Neutral\"").unwrap();
        assert_eq!(label, Label::Neutral);
    }

    #[test]
    fn test_signal_error_display() {
        let error = SignalError::failed(SignalKind::Polarity, "estimator unavailable");
        assert_eq!(
            error.to_string(),
            "Polarity signal failed: estimator unavailable"
        );
    }
}
