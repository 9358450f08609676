//! 絵文字による感情シグナル

use super::emoji_table::{base_form, extract_emojis};
use super::{ScoringInput, Signal, SignalError, SignalKind};
use std::collections::HashSet;

/// 笑顔、ハート、お祝い、賛同のジェスチャー、炎・トロフィー・星
const POSITIVE_EMOJIS: &[&str] = &[
    "😊", "😀", "😃", "😄", "😁", "🙂", "😍", "🥰", "😘", "😗", "😙", "😚",
    "❤️", "💕", "💖", "💗", "💙", "💚", "💛", "🧡", "💜", "🖤", "🤍", "🤎",
    "🤗", "🥳", "🎉", "🎊", "🎈", "🎆", "🎇", "✨", "⭐", "🌟", "💫", "⚡",
    "👍", "👏", "🙌", "💪", "🤘", "🤟", "👌", "🤌", "🫶", "❣️", "💝", "💘",
    "🔥", "💯", "🏆", "🥇", "🎯", "✅", "☑️", "✔️", "🆒", "🆗", "🤩", "😎",
    "😇", "🥹", "🤝", "🌹", "🌺", "🌸", "🌼", "🌻", "🌷", "💐", "🎁", "🍰",
];

/// 泣き顔・怒り顔、失恋、ドクロ、サムズダウン、体調不良の顔、禁止
const NEGATIVE_EMOJIS: &[&str] = &[
    "😢", "😭", "😞", "😔", "😟", "😕", "🙁", "☹️", "😣", "😖", "😫", "😩",
    "😤", "😠", "😡", "🤬", "😱", "😨", "😰", "😥", "😓", "😪", "😴", "🤐",
    "💔", "💀", "☠️", "👎", "👊", "🖕", "😒", "🙄", "😑", "😐", "😬", "😶",
    "🤮", "🤢", "😷", "🤕", "🤒", "😵", "🥴", "💩", "🚫", "❌",
];

/// どちらかの向きの絵文字がこの数を超えたら増幅する
const SPAM_THRESHOLD: usize = 2;
const SPAM_BOOST: f64 = 1.2;

/// メッセージ単位の絵文字の件数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmojiTally {
    pub positive: usize,
    pub negative: usize,
    pub total: usize,
}

impl EmojiTally {
    /// 増幅・クランプ前の `(positive - negative) / total`
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.positive as f64 - self.negative as f64) / self.total as f64
    }

    pub fn is_spam(&self) -> bool {
        self.positive > SPAM_THRESHOLD || self.negative > SPAM_THRESHOLD
    }

    /// [-1, 1] に収めた最終スコア
    pub fn score(&self) -> f64 {
        let mut score = self.ratio();
        if self.is_spam() {
            score *= SPAM_BOOST;
        }
        score.clamp(-1.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct EmojiSignal {
    positive: HashSet<char>,
    negative: HashSet<char>,
}

impl Default for EmojiSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl EmojiSignal {
    pub fn new() -> Self {
        Self::with_sets(POSITIVE_EMOJIS, NEGATIVE_EMOJIS)
    }

    /// 任意の絵文字セットから作る。基底コードポイントで照合するため、2 文字以上に
    /// なるエントリは無視する。
    pub fn with_sets(positive: &[&str], negative: &[&str]) -> Self {
        Self {
            positive: single_chars(positive),
            negative: single_chars(negative),
        }
    }

    pub fn tally(&self, text: &str) -> EmojiTally {
        let found = extract_emojis(text);
        EmojiTally {
            positive: found.iter().filter(|c| self.positive.contains(*c)).count(),
            negative: found.iter().filter(|c| self.negative.contains(*c)).count(),
            total: found.len(),
        }
    }
}

fn single_chars(symbols: &[&str]) -> HashSet<char> {
    symbols
        .iter()
        .filter_map(|symbol| {
            let base = base_form(symbol);
            let mut chars = base.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => {
                    tracing::debug!(symbol = %symbol, "Skipping multi-codepoint emoji entry");
                    None
                }
            }
        })
        .collect()
}

impl Signal for EmojiSignal {
    fn kind(&self) -> SignalKind {
        SignalKind::Emoji
    }

    fn score(&self, input: &ScoringInput<'_>) -> Result<f64, SignalError> {
        Ok(self.tally(input.raw).score())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(text: &str) -> f64 {
        EmojiSignal::new().score(&ScoringInput::new(text)).unwrap()
    }

    #[test]
    fn test_curated_set_sizes() {
        let signal = EmojiSignal::new();
        assert_eq!(signal.positive.len(), 72);
        assert_eq!(signal.negative.len(), 46);
    }

    #[test]
    fn test_no_emoji_scores_zero() {
        assert_eq!(score("hello world"), 0.0);
        assert_eq!(score(""), 0.0);
    }

    #[test]
    fn test_three_positive_emojis_saturate() {
        let tally = EmojiSignal::new().tally("😍😍😍");
        assert_eq!(tally.positive, 3);
        assert_eq!(tally.ratio(), 1.0);
        assert!(tally.is_spam());
        assert_eq!(tally.score(), 1.0);
    }

    #[test]
    fn test_text_symbols_do_not_dilute_score() {
        for text in ["😍 ★", "😍 ♪", "😍 ✓", "😍 ☆"] {
            let tally = EmojiSignal::new().tally(text);
            assert_eq!(tally.total, 1, "{text}");
            assert_eq!(tally.score(), 1.0, "{text}");
        }
    }

    #[test]
    fn test_unclassified_emoji_dilutes_score() {
        // 🚗 は絵文字だがどちらのセットにもない
        let tally = EmojiSignal::new().tally("👍🚗");
        assert_eq!(tally.total, 2);
        assert_eq!(tally.score(), 0.5);
    }

    #[test]
    fn test_spam_boost_applies_before_clamp() {
        // (3 - 1) / 4 = 0.5 を 0.6 に増幅
        let value = score("🔥🔥🔥💀");
        assert!((value - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_mixed_without_spam_is_not_boosted() {
        let value = score("😊😊😢");
        assert!((value - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_emojis() {
        assert_eq!(score("😢"), -1.0);
        assert_eq!(score("💔💔💔💔"), -1.0);
    }

    #[test]
    fn test_variation_selector_entries_match_base_char() {
        assert_eq!(score("❤️"), 1.0);
        assert_eq!(score("❤"), 1.0);
        assert_eq!(score("☹️"), -1.0);
    }
}
