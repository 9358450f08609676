//! キーワード・フレーズのパターンシグナル
//!
//! 各グループは意味のまとまりを表す 1 つの正規表現。何回マッチしても 1 グループは 1 回と数える。

use super::{ScoringInput, Signal, SignalError, SignalKind};
use regex::Regex;

pub const POSITIVE_PATTERNS: &[&str] = &[
    r"\b(love|amazing|awesome|excellent|fantastic|wonderful|brilliant|perfect|great|beautiful|best)\b",
    r"\b(good|nice|cool|enjoy|enjoyed|enjoying|happy|glad|appreciate|thanks|thank you)\b",
    r"\b(impressive|outstanding|superb|magnificent|incredible|extraordinary|phenomenal)\b",
    r"(lol|lmao|haha|hehe|😂)+",
    r"\b(yes|yeah|yay|yup|absolutely|definitely|certainly)\b",
];

pub const NEGATIVE_PATTERNS: &[&str] = &[
    r"\b(hate|terrible|awful|horrible|worst|disgusting|pathetic|trash|garbage|stupid)\b",
    r"\b(bad|poor|disappointing|disappointed|sucks|boring|annoying|irritating)\b",
    r"\b(waste|useless|pointless|ridiculous|absurd|nonsense|cringe|cringy)\b",
    r"\b(no|nope|never|not good|not great|don't like|dislike)\b",
    r"\b(wtf|omg no|are you serious|seriously\?|this is bad)\b",
];

const GROUP_WEIGHT: f64 = 0.3;
const MAX_SCORE: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct PatternSignal {
    positive: Vec<Regex>,
    negative: Vec<Regex>,
}

impl PatternSignal {
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_groups(POSITIVE_PATTERNS, NEGATIVE_PATTERNS)
    }

    /// 任意のパターングループをコンパイルする (常に大文字小文字を区別しない)
    pub fn with_groups(positive: &[&str], negative: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            positive: compile(positive)?,
            negative: compile(negative)?,
        })
    }

    /// `text` に 1 回以上マッチしたポジティブ・ネガティブのグループ数
    pub fn matches(&self, text: &str) -> (usize, usize) {
        let count = |groups: &[Regex]| groups.iter().filter(|re| re.is_match(text)).count();
        (count(&self.positive), count(&self.negative))
    }

    /// 小文字化済みのテキストを [-0.8, 0.8] で採点する
    pub fn score_text(&self, lowercase: &str) -> f64 {
        let (pos, neg) = self.matches(lowercase);
        if pos > neg {
            (pos as f64 * GROUP_WEIGHT).min(MAX_SCORE)
        } else if neg > pos {
            (-(neg as f64) * GROUP_WEIGHT).max(-MAX_SCORE)
        } else {
            0.0
        }
    }
}

fn compile(patterns: &[&str]) -> Result<Vec<Regex>, regex::Error> {
    patterns
        .iter()
        .map(|pattern| Regex::new(&format!("(?i){pattern}")))
        .collect()
}

impl Signal for PatternSignal {
    fn kind(&self) -> SignalKind {
        SignalKind::Pattern
    }

    fn score(&self, input: &ScoringInput<'_>) -> Result<f64, SignalError> {
        Ok(self.score_text(&input.lowercase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal() -> PatternSignal {
        PatternSignal::new().unwrap()
    }

    #[test]
    fn test_default_groups_compile() {
        let signal = signal();
        assert_eq!(signal.positive.len(), 5);
        assert_eq!(signal.negative.len(), 5);
    }

    #[test]
    fn test_single_positive_group() {
        assert!((signal().score_text("i love this") - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_group_counts_once() {
        // 同じグループの 3 語でも 1 と数える
        assert_eq!(signal().matches("love love great best"), (1, 0));
    }

    #[test]
    fn test_positive_score_caps_at_point_eight() {
        let text = "love it, so good, incredible, haha, yes";
        assert_eq!(signal().matches(text), (5, 0));
        assert_eq!(signal().score_text(text), 0.8);
    }

    #[test]
    fn test_negative_groups() {
        let text = "this is terrible and boring, what a waste";
        assert_eq!(signal().matches(text), (0, 3));
        assert!((signal().score_text(text) + 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_tie_is_zero() {
        assert_eq!(signal().score_text("good but bad"), 0.0);
        assert_eq!(signal().score_text("just watching"), 0.0);
    }

    #[test]
    fn test_word_boundaries() {
        // "nothing" や "badge" で "no" / "bad" に反応しないこと
        assert_eq!(signal().matches("nothing about the badge"), (0, 0));
    }

    #[test]
    fn test_laughter_without_boundaries() {
        assert_eq!(signal().matches("bahahaha"), (1, 0));
        assert_eq!(signal().matches("😂😂"), (1, 0));
    }

    #[test]
    fn test_phrases() {
        assert_eq!(signal().matches("i don't like it"), (0, 1));
        assert_eq!(signal().matches("thank you so much"), (1, 0));
    }

    #[test]
    fn test_custom_groups_are_case_insensitive() {
        let signal = PatternSignal::with_groups(&[r"\bpog\b"], &[r"\bmid\b"]).unwrap();
        assert_eq!(signal.matches("POG"), (1, 0));
        assert_eq!(signal.matches("Mid"), (0, 1));
    }

    #[test]
    fn test_invalid_group_is_an_error() {
        assert!(PatternSignal::with_groups(&["(unclosed"], &[]).is_err());
    }
}
