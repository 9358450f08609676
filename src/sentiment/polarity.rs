//! 汎用の極性推定
//!
//! [`PolarityEstimator`] はテキストを [-1, 1] に写す任意のスコアラーの差し替え口。
//! [`LexiconPolarity`] は組み込みの英語実装で、強調語と否定を考慮した単語極性の平均を取る。

use super::{ScoringInput, Signal, SignalError, SignalKind};
use std::collections::HashMap;
use std::sync::Arc;

/// [-1, 1] の連続的な極性 (大きいほどポジティブ)。純粋関数であること。
pub trait PolarityEstimator: Send + Sync {
    fn polarity(&self, text: &str) -> Result<f64, SignalError>;
}

/// 単語ごとの極性
const LEXICON: &[(&str, f64)] = &[
    // ポジティブ
    ("love", 0.5),
    ("loved", 0.7),
    ("lovely", 0.5),
    ("like", 0.2),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("excellent", 1.0),
    ("fantastic", 0.4),
    ("wonderful", 1.0),
    ("brilliant", 0.9),
    ("perfect", 1.0),
    ("great", 0.8),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("good", 0.6),
    ("nice", 0.6),
    ("cool", 0.35),
    ("fun", 0.3),
    ("funny", 0.25),
    ("happy", 0.8),
    ("glad", 0.5),
    ("enjoy", 0.4),
    ("enjoyed", 0.4),
    ("impressive", 1.0),
    ("outstanding", 0.5),
    ("superb", 1.0),
    ("magnificent", 1.0),
    ("incredible", 0.9),
    ("extraordinary", 0.6),
    ("phenomenal", 1.0),
    ("epic", 0.5),
    ("hype", 0.4),
    ("cute", 0.5),
    ("sweet", 0.35),
    ("wow", 0.1),
    ("thanks", 0.2),
    ("interesting", 0.5),
    ("exciting", 0.3),
    ("excited", 0.4),
    ("legendary", 0.6),
    ("win", 0.8),
    // ネガティブ
    ("bad", -0.7),
    ("worse", -0.4),
    ("worst", -1.0),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("hate", -0.8),
    ("disgusting", -1.0),
    ("pathetic", -1.0),
    ("stupid", -0.8),
    ("dumb", -0.4),
    ("poor", -0.4),
    ("disappointing", -0.6),
    ("disappointed", -0.75),
    ("boring", -1.0),
    ("annoying", -0.8),
    ("irritating", -0.7),
    ("useless", -0.5),
    ("pointless", -0.3),
    ("ridiculous", -0.35),
    ("absurd", -0.3),
    ("sad", -0.5),
    ("angry", -0.5),
    ("ugly", -0.7),
    ("wrong", -0.5),
    ("lame", -0.5),
    ("trash", -0.6),
    ("garbage", -0.6),
    ("cringe", -0.6),
    ("broken", -0.4),
    ("fake", -0.5),
    ("lag", -0.3),
    ("laggy", -0.4),
    ("scam", -0.8),
];

/// 直後の辞書語に掛ける倍率
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("so", 1.3),
    ("super", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("absolutely", 1.5),
    ("totally", 1.3),
    ("too", 1.2),
    ("pretty", 1.1),
    ("kinda", 0.7),
    ("slightly", 0.7),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "don't", "dont", "doesn't", "doesnt", "isn't", "isnt", "wasn't",
    "wasnt", "aren't", "can't", "cant", "won't", "nothing", "hardly",
];

/// 否定された語は符号が反転し、強さが半分になる
const NEGATION_FACTOR: f64 = -0.5;

#[derive(Debug, Clone)]
pub struct LexiconPolarity {
    lexicon: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    negations: Vec<String>,
}

impl Default for LexiconPolarity {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconPolarity {
    pub fn new() -> Self {
        Self {
            lexicon: LEXICON.iter().map(|(w, p)| (w.to_string(), *p)).collect(),
            intensifiers: INTENSIFIERS.iter().map(|(w, m)| (w.to_string(), *m)).collect(),
            negations: NEGATIONS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// 単語辞書を追加・上書きする
    pub fn with_words<'a>(mut self, words: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        for (word, polarity) in words {
            self.lexicon
                .insert(word.to_lowercase(), polarity.clamp(-1.0, 1.0));
        }
        self
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .map(|token| token.trim_matches('\''))
            .filter(|token| !token.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn estimate(&self, text: &str) -> f64 {
        let mut total = 0.0;
        let mut scored = 0usize;
        let mut multiplier = 1.0;
        let mut negated = false;

        for token in Self::tokenize(text) {
            if let Some(polarity) = self.lexicon.get(&token) {
                let mut value = polarity * multiplier;
                if negated {
                    value *= NEGATION_FACTOR;
                }
                total += value.clamp(-1.0, 1.0);
                scored += 1;
                multiplier = 1.0;
                negated = false;
            } else if let Some(m) = self.intensifiers.get(&token) {
                multiplier *= m;
            } else if self.negations.contains(&token) {
                negated = true;
            } else {
                // 修飾語は直後の語にだけ効く
                multiplier = 1.0;
                negated = false;
            }
        }

        if scored == 0 {
            return 0.0;
        }
        (total / scored as f64).clamp(-1.0, 1.0)
    }
}

impl PolarityEstimator for LexiconPolarity {
    fn polarity(&self, text: &str) -> Result<f64, SignalError> {
        Ok(self.estimate(text))
    }
}

/// 任意の [`PolarityEstimator`] を [`Signal`] として使うためのアダプター
#[derive(Clone)]
pub struct PolaritySignal {
    estimator: Arc<dyn PolarityEstimator>,
}

impl PolaritySignal {
    pub fn new(estimator: Arc<dyn PolarityEstimator>) -> Self {
        Self { estimator }
    }
}

impl std::fmt::Debug for PolaritySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolaritySignal").finish_non_exhaustive()
    }
}

impl Signal for PolaritySignal {
    fn kind(&self) -> SignalKind {
        SignalKind::Polarity
    }

    fn score(&self, input: &ScoringInput<'_>) -> Result<f64, SignalError> {
        let value = self.estimator.polarity(input.raw)?;
        if !value.is_finite() {
            return Err(SignalError::NonFinite {
                signal: SignalKind::Polarity,
                value,
            });
        }
        Ok(value.clamp(-1.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_words_are_neutral() {
        assert_eq!(LexiconPolarity::new().estimate("first time here"), 0.0);
        assert_eq!(LexiconPolarity::new().estimate(""), 0.0);
    }

    #[test]
    fn test_average_of_known_words() {
        // (0.6 + -0.7) / 2
        let value = LexiconPolarity::new().estimate("good start, bad ending");
        assert!((value + 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_negation_flips_and_halves() {
        let value = LexiconPolarity::new().estimate("not good");
        assert!((value + 0.3).abs() < 1e-9);
        let value = LexiconPolarity::new().estimate("this isn't terrible");
        assert!((value - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_intensifier_scales_and_clamps() {
        let value = LexiconPolarity::new().estimate("very good");
        assert!((value - 0.78).abs() < 1e-9);
        assert_eq!(LexiconPolarity::new().estimate("extremely awesome"), 1.0);
    }

    #[test]
    fn test_modifiers_do_not_leak_past_next_word() {
        // "best" の前の "the" で "not" は打ち消される
        let value = LexiconPolarity::new().estimate("not the best");
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_custom_words() {
        let estimator = LexiconPolarity::new().with_words([("POG", 0.7), ("mid", -2.0)]);
        assert!((estimator.estimate("pog") - 0.7).abs() < 1e-9);
        assert_eq!(estimator.estimate("mid"), -1.0);
    }

    struct Broken;

    impl PolarityEstimator for Broken {
        fn polarity(&self, _text: &str) -> Result<f64, SignalError> {
            Ok(f64::NAN)
        }
    }

    #[test]
    fn test_signal_rejects_non_finite_values() {
        let signal = PolaritySignal::new(Arc::new(Broken));
        let result = signal.score(&ScoringInput::new("anything"));
        assert!(matches!(
            result,
            Err(SignalError::NonFinite {
                signal: SignalKind::Polarity,
                ..
            })
        ));
    }
}
