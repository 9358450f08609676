//! シグナルの統合としきい値による分類

use super::{
    EmojiSignal, IntensitySignal, Label, LexiconPolarity, PatternSignal, PolarityEstimator,
    PolaritySignal, ScoringInput, Signal, SignalError, SignalKind,
};
use serde::Serialize;
use std::sync::Arc;

/// これより短い (空白除去後の文字数) メッセージは short の重みを使う
const SHORT_LEN: usize = 10;
/// これより短ければ medium、それ以上は long の重み
const MEDIUM_LEN: usize = 30;

const POSITIVE_THRESHOLD: f64 = 0.12;
const NEGATIVE_THRESHOLD: f64 = -0.12;
/// 絶対値がこれ未満の質問は中立の問いかけとみなす
const QUESTION_DAMPENING: f64 = 0.3;

/// メッセージ長の区分ごとのシグナルの重み
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthWeights {
    pub short: f64,
    pub medium: f64,
    pub long: f64,
}

impl LengthWeights {
    pub const fn new(short: f64, medium: f64, long: f64) -> Self {
        Self {
            short,
            medium,
            long,
        }
    }

    pub fn for_length(&self, len: usize) -> f64 {
        if len < SHORT_LEN {
            self.short
        } else if len < MEDIUM_LEN {
            self.medium
        } else {
            self.long
        }
    }
}

const EMOJI_WEIGHTS: LengthWeights = LengthWeights::new(0.6, 0.4, 0.25);
const PATTERN_WEIGHTS: LengthWeights = LengthWeights::new(0.3, 0.3, 0.25);
const POLARITY_WEIGHTS: LengthWeights = LengthWeights::new(0.1, 0.3, 0.5);
const INTENSITY_GAIN: f64 = 0.3;

/// シグナルの統合への関わり方
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    /// 長さに応じた重みを掛けて加算する
    Weighted(LengthWeights),
    /// 統合スコアに `1 + score * gain` を掛ける
    Amplifier { gain: f64 },
}

struct FusedSignal {
    signal: Box<dyn Signal>,
    role: Role,
}

/// 1 件のコメントに対する 1 シグナルの生の出力
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalScore {
    pub kind: SignalKind,
    pub value: f64,
}

/// 1 件のコメントの分類結果
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// 全シグナルを計算済み。`score` は統合・増幅後の値
    Scored {
        label: Label,
        score: f64,
        signals: Vec<SignalScore>,
        /// 質問ルールにより Neutral になった
        question_dampened: bool,
    },
    /// シグナルの障害により Neutral にフォールバックした
    Degraded { error: SignalError },
}

impl Classification {
    pub fn label(&self) -> Label {
        match self {
            Classification::Scored { label, .. } => *label,
            Classification::Degraded { .. } => Label::Neutral,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Classification::Degraded { .. })
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            Classification::Scored { score, .. } => Some(*score),
            Classification::Degraded { .. } => None,
        }
    }
}

/// 絵文字・パターン・極性・強さのシグナルを長さに応じて統合する分類器
pub struct SentimentClassifier {
    signals: Vec<FusedSignal>,
}

impl std::fmt::Debug for SentimentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<SignalKind> = self.signals.iter().map(|s| s.signal.kind()).collect();
        f.debug_struct("SentimentClassifier")
            .field("signals", &kinds)
            .finish()
    }
}

impl SentimentClassifier {
    /// 組み込みの英語辞書による極性推定を使う分類器
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_polarity(Arc::new(LexiconPolarity::new()))
    }

    /// 任意の極性推定を使う分類器
    pub fn with_polarity(estimator: Arc<dyn PolarityEstimator>) -> Result<Self, regex::Error> {
        Ok(Self::empty()
            .with_signal(EmojiSignal::new(), Role::Weighted(EMOJI_WEIGHTS))
            .with_signal(PatternSignal::new()?, Role::Weighted(PATTERN_WEIGHTS))
            .with_signal(
                PolaritySignal::new(estimator),
                Role::Weighted(POLARITY_WEIGHTS),
            )
            .with_signal(
                IntensitySignal::new()?,
                Role::Amplifier {
                    gain: INTENSITY_GAIN,
                },
            ))
    }

    /// シグナルなしの分類器 (全コメントが 0 になる)
    pub fn empty() -> Self {
        Self {
            signals: Vec::new(),
        }
    }

    pub fn with_signal(mut self, signal: impl Signal + 'static, role: Role) -> Self {
        self.signals.push(FusedSignal {
            signal: Box::new(signal),
            role,
        });
        self
    }

    /// `text` のラベル。障害時は Neutral
    pub fn classify(&self, text: &str) -> Label {
        self.evaluate(text).label()
    }

    /// 分類結果の詳細。劣化 (フォールバック) と計算済みを区別する
    pub fn evaluate(&self, text: &str) -> Classification {
        match self.fuse(text) {
            Ok(classification) => classification,
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    text_preview = %text.chars().take(50).collect::<String>(),
                    "⚠️ Sentiment analysis failed, falling back to Neutral"
                );
                Classification::Degraded { error }
            }
        }
    }

    fn fuse(&self, text: &str) -> Result<Classification, SignalError> {
        let input = ScoringInput::new(text);
        let mut weighted = 0.0;
        let mut amplification = 1.0;
        let mut signals = Vec::with_capacity(self.signals.len());

        for fused in &self.signals {
            let kind = fused.signal.kind();
            let value = fused.signal.score(&input)?;
            if !value.is_finite() {
                return Err(SignalError::NonFinite {
                    signal: kind,
                    value,
                });
            }
            signals.push(SignalScore { kind, value });

            match fused.role {
                Role::Weighted(weights) => weighted += weights.for_length(input.trimmed_len) * value,
                Role::Amplifier { gain } => amplification *= 1.0 + value * gain,
            }
        }

        let score = weighted * amplification;

        if input.has_question() && score.abs() < QUESTION_DAMPENING {
            return Ok(Classification::Scored {
                label: Label::Neutral,
                score,
                signals,
                question_dampened: true,
            });
        }

        let label = if score > POSITIVE_THRESHOLD {
            Label::Positive
        } else if score < NEGATIVE_THRESHOLD {
            Label::Negative
        } else {
            Label::Neutral
        };

        tracing::trace!(score, label = %label, "Comment classified");

        Ok(Classification::Scored {
            label,
            score,
            signals,
            question_dampened: false,
        })
    }
}
