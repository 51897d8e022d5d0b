/*!
 * Transcript tokens as consumed by the grouper.
 */

use serde::{Deserialize, Serialize};

/// What a token represents in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// A spoken word (or a CJK character, or punctuation attached to one)
    #[default]
    Word,
    /// Inter-word whitespace emitted by the recognizer
    Spacing,
    /// Non-speech event such as `(laughter)` or `♪`
    AudioEvent,
}

/// One word, inter-word space, or non-speech event from the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<String>,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            kind,
            start,
            end,
            speaker_id: None,
        }
    }

    pub fn word(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self::new(text, TokenKind::Word, start, end)
    }

    pub fn spacing(start: f64, end: f64) -> Self {
        Self::new(" ", TokenKind::Spacing, start, end)
    }

    pub fn audio_event(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self::new(text, TokenKind::AudioEvent, start, end)
    }

    /// Attach a diarization label
    pub fn with_speaker(mut self, speaker_id: impl Into<String>) -> Self {
        self.speaker_id = Some(speaker_id.into());
        self
    }

    /// Spacing tokens carry text but never drive break decisions
    pub fn is_significant(&self) -> bool {
        self.kind != TokenKind::Spacing
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}
