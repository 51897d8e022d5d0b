/*!
 * Per-language formatting parameters.
 *
 * CJK and space-delimited languages differ only in the data held here; the
 * grouper and formatter never branch on the language code themselves.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::app_config::SubtitleSettings;
use crate::language_utils;

/// Sentence-final punctuation for CJK text
const CJK_HARD_BREAKS: &[char] = &['。', '！', '？', '!', '?'];

/// Clause and phrase separators preferred as line breaks in CJK text
const CJK_SOFT_BREAKS: &[char] = &['，', '、', '；', '：', ',', ';', ':'];

/// Sentence-final punctuation for space-delimited text
const LATIN_HARD_BREAKS: &[char] = &['.', '!', '?'];

/// Clause and phrase separators preferred as line breaks in space-delimited text
const LATIN_SOFT_BREAKS: &[char] = &[',', ';', ':'];

/// What to do when a line has no acceptable break point at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlongPolicy {
    /// Keep the word whole and report the overflow
    #[default]
    Accept,
    /// Cut at the column limit without inserting anything; no character is lost
    HardCut,
}

/// Per-language formatting parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageProfile {
    /// Code the profile was resolved for
    pub language: String,
    pub max_chars_per_line: usize,
    pub max_duration_seconds: f64,
    pub min_duration_seconds: f64,
    pub max_chars_per_second: f64,
    pub pause_threshold_seconds: f64,
    /// Characters that force a block end
    pub hard_break_punctuation: Vec<char>,
    /// Characters preferred as split points
    pub soft_break_punctuation: Vec<char>,
    /// Length is measured in characters and arbitrary character cuts are acceptable
    pub is_character_counted: bool,
    pub overlong_policy: OverlongPolicy,
}

impl LanguageProfile {
    /// Profile for Chinese, Japanese and Korean with default settings
    pub fn cjk(language: &str) -> Self {
        Self::from_settings(language, true, &SubtitleSettings::default())
    }

    /// Profile for space-delimited languages with default settings
    pub fn latin(language: &str) -> Self {
        Self::from_settings(language, false, &SubtitleSettings::default())
    }

    /// Resolve the profile for a language code using the given settings
    pub fn for_language(code: &str, settings: &SubtitleSettings) -> Self {
        let is_cjk = language_utils::is_cjk_language(code);
        debug!(
            "Resolved {} profile for language '{}'",
            if is_cjk { "CJK" } else { "space-delimited" },
            code
        );
        Self::from_settings(code, is_cjk, settings)
    }

    fn from_settings(language: &str, is_cjk: bool, settings: &SubtitleSettings) -> Self {
        let (max_chars_per_line, max_chars_per_second, hard, soft) = if is_cjk {
            (settings.cjk_chars_per_line, settings.cjk_cps, CJK_HARD_BREAKS, CJK_SOFT_BREAKS)
        } else {
            (settings.latin_chars_per_line, settings.latin_cps, LATIN_HARD_BREAKS, LATIN_SOFT_BREAKS)
        };

        Self {
            language: language.to_string(),
            max_chars_per_line,
            max_duration_seconds: settings.max_subtitle_duration,
            min_duration_seconds: settings.min_subtitle_duration,
            max_chars_per_second,
            pause_threshold_seconds: settings.pause_threshold,
            hard_break_punctuation: hard.to_vec(),
            soft_break_punctuation: soft.to_vec(),
            is_character_counted: is_cjk,
            overlong_policy: settings.overlong_policy,
        }
    }

    pub fn with_max_chars_per_line(mut self, max_chars_per_line: usize) -> Self {
        self.max_chars_per_line = max_chars_per_line;
        self
    }

    pub fn with_overlong_policy(mut self, policy: OverlongPolicy) -> Self {
        self.overlong_policy = policy;
        self
    }

    pub fn is_hard_break(&self, c: char) -> bool {
        self.hard_break_punctuation.contains(&c)
    }

    pub fn is_soft_break(&self, c: char) -> bool {
        self.soft_break_punctuation.contains(&c)
    }

    /// Whether the text closes a sentence. Trailing quotes and brackets are
    /// skipped so `done."` and `好了。」` both count.
    pub fn ends_with_hard_break(&self, text: &str) -> bool {
        text.trim_end()
            .chars()
            .rev()
            .find(|c| !is_closing_mark(*c))
            .is_some_and(|c| self.is_hard_break(c))
    }

    /// Whether the text ends on a clause separator
    pub fn ends_with_soft_break(&self, text: &str) -> bool {
        text.trim_end()
            .chars()
            .next_back()
            .is_some_and(|c| self.is_soft_break(c))
    }
}

fn is_closing_mark(c: char) -> bool {
    matches!(c, '"' | '\'' | '”' | '’' | ')' | ']' | '）' | '」' | '』' | '》')
}
