//! 表記上の強さ (記号の連続、大文字での叫び)
//!
//! 向きは持たず、他のシグナルが決めた方向を増幅するだけ。

use super::{ScoringInput, Signal, SignalError, SignalKind};
use regex::Regex;

const EXCLAMATION_BONUS: f64 = 0.3;
const CAPS_WORD_BONUS: f64 = 0.2;
const MAX_CAPS_WORDS: usize = 3;
const QUESTION_BONUS: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct IntensitySignal {
    caps_word: Regex,
}

impl IntensitySignal {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            caps_word: Regex::new(r"\b[A-Z]{3,}\b")?,
        })
    }

    /// 3 文字以上の大文字の単語数 (上限あり)
    pub fn caps_words(&self, text: &str) -> usize {
        self.caps_word.find_iter(text).take(MAX_CAPS_WORDS).count()
    }

    /// [0, 1] の増幅係数
    pub fn intensity(&self, text: &str) -> f64 {
        let mut intensity = 0.0;

        if text.contains("!!") {
            intensity += EXCLAMATION_BONUS;
        }

        intensity += CAPS_WORD_BONUS * self.caps_words(text) as f64;

        if text.contains("??") {
            intensity += QUESTION_BONUS;
        }

        f64::min(intensity, 1.0)
    }
}

impl Signal for IntensitySignal {
    fn kind(&self) -> SignalKind {
        SignalKind::Intensity
    }

    fn score(&self, input: &ScoringInput<'_>) -> Result<f64, SignalError> {
        Ok(self.intensity(input.raw))
    }
}
