/*!
 * Word-level transcript loading.
 *
 * Reads the JSON emitted by speech-to-text services:
 *
 * ```json
 * { "language_code": "zho",
 *   "text": "...",
 *   "words": [ { "text": "我", "type": "word", "start": 0.1, "end": 0.2,
 *                "speaker_id": "speaker_0" } ] }
 * ```
 *
 * and turns it into engine tokens. Nothing here changes token content except
 * the optional orphan-punctuation pass, which moves a punctuation mark onto
 * the preceding word without dropping it.
 */

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::errors::TranscriptError;
use crate::segmentation::{Token, TokenKind};

/// Bracketed sound descriptions like `(laughter)` or `[music]`, or music notes
static AUDIO_EVENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\([^()]*\)|\[[^\[\]]*\]|[♪♫♬♩🎵🎶\s]+)\s*$").unwrap()
});

/// CJK punctuation that recognizers sometimes emit as a token of its own
const ORPHAN_PUNCTUATION: &[char] = &['。', '？', '！', '、', '，', '」', '・'];

#[derive(Debug, Deserialize)]
struct RawTranscript {
    #[serde(default)]
    language_code: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    words: Vec<RawWord>,
}

#[derive(Debug, Deserialize)]
struct RawWord {
    text: Option<String>,
    start: Option<f64>,
    end: Option<f64>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    speaker_id: Option<String>,
}

/// A loaded transcript
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    /// Language reported by the recognizer, if any
    pub language_code: Option<String>,
    /// Full plain text as reported by the recognizer
    pub text: String,
    pub tokens: Vec<Token>,
}

impl Transcript {
    /// Parse a transcript from its JSON representation
    pub fn from_json_str(content: &str) -> Result<Self, TranscriptError> {
        let raw: RawTranscript = serde_json::from_str(content)?;

        let tokens = raw
            .words
            .into_iter()
            .enumerate()
            .map(|(index, word)| word_to_token(index, word))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            language_code: raw.language_code,
            text: raw.text.unwrap_or_default(),
            tokens,
        })
    }

    /// Read and parse a transcript file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript: {}", path.display()))?;
        let transcript = Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse transcript: {}", path.display()))?;

        debug!(
            "Loaded {} tokens from {} (language: {})",
            transcript.tokens.len(),
            path.display(),
            transcript.language_code.as_deref().unwrap_or("unknown")
        );
        Ok(transcript)
    }

    /// Append the transcript of a following chunk. Timestamps must already be
    /// on the same timeline.
    pub fn append(&mut self, other: Transcript) {
        if self.language_code.is_none() {
            self.language_code = other.language_code;
        }
        if !other.text.is_empty() {
            if !self.text.is_empty() {
                self.text.push(' ');
            }
            self.text.push_str(&other.text);
        }
        self.tokens.extend(other.tokens);
    }

    /// Move standalone CJK punctuation tokens onto the preceding word so that
    /// a pause before the mark cannot leave it stranded at the start of a cue.
    /// Returns the number of tokens merged.
    pub fn attach_orphan_punctuation(&mut self) -> usize {
        let mut merged: Vec<Token> = Vec::with_capacity(self.tokens.len());
        let mut count = 0;

        for token in std::mem::take(&mut self.tokens) {
            if is_orphan_punctuation(&token) {
                if let Some(prev) = merged.last_mut() {
                    let prev_ends_in_mark = prev
                        .text
                        .chars()
                        .next_back()
                        .is_some_and(|c| ORPHAN_PUNCTUATION.contains(&c));
                    if prev.kind == TokenKind::Word && !prev.text.is_empty() && !prev_ends_in_mark {
                        prev.text.push_str(&token.text);
                        prev.end = prev.end.max(token.end);
                        count += 1;
                        continue;
                    }
                }
            }
            merged.push(token);
        }

        self.tokens = merged;
        count
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

fn is_orphan_punctuation(token: &Token) -> bool {
    let mut chars = token.text.chars();
    token.kind == TokenKind::Word
        && matches!((chars.next(), chars.next()), (Some(c), None) if ORPHAN_PUNCTUATION.contains(&c))
}

fn word_to_token(index: usize, word: RawWord) -> Result<Token, TranscriptError> {
    let text = word.text.ok_or(TranscriptError::MissingField { index, field: "text" })?;
    let start = word.start.ok_or(TranscriptError::MissingField { index, field: "start" })?;
    let end = word.end.ok_or(TranscriptError::MissingField { index, field: "end" })?;

    let kind = match word.kind.as_deref() {
        Some("spacing") => TokenKind::Spacing,
        Some("audio_event") => TokenKind::AudioEvent,
        Some(_) => TokenKind::Word,
        None if text.trim().is_empty() => TokenKind::Spacing,
        None if AUDIO_EVENT_REGEX.is_match(&text) => TokenKind::AudioEvent,
        None => TokenKind::Word,
    };

    Ok(Token {
        text,
        kind,
        start,
        end,
        speaker_id: word.speaker_id,
    })
}
