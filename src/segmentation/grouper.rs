/*!
 * Semantic grouper: partitions the token stream into subtitle blocks.
 *
 * Blocks are decided on token indices first and only then materialized, so
 * every input token ends up in exactly one block and in its original order.
 */

use log::{debug, trace};

use super::formatter::fits_in_two_lines;
use super::profile::LanguageProfile;
use super::split::text_length;
use super::token::{Token, TokenKind};
use crate::errors::SegmentationError;

/// Why a block was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakReason {
    SpeakerChange,
    HardBreak,
    LongPause,
    DurationExceeded,
    LengthOverflow,
    EndOfInput,
}

/// A contiguous run of tokens rendered as one cue
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleBlock {
    tokens: Vec<Token>,
    text: String,
    start: f64,
    end: f64,
    speaker_id: Option<String>,
    reason: BreakReason,
}

impl SubtitleBlock {
    /// Build a block from a non-empty token run
    fn from_tokens(tokens: Vec<Token>, reason: BreakReason) -> Self {
        let text: String = tokens.iter().map(|t| t.text.as_str()).collect();

        // Timing comes from significant tokens; spacing only fills the gaps
        let mut significant = tokens.iter().filter(|t| t.is_significant());
        let first = significant.next();
        let last = significant.next_back().or(first);
        let (start, end) = match (first, last) {
            (Some(f), Some(l)) => (f.start, l.end),
            _ => (
                tokens.first().map_or(0.0, |t| t.start),
                tokens.last().map_or(0.0, |t| t.end),
            ),
        };
        let speaker_id = first.and_then(|t| t.speaker_id.clone());

        Self {
            tokens,
            text,
            start,
            end,
            speaker_id,
            reason,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Concatenated token text, including original spacing
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn speaker_id(&self) -> Option<&str> {
        self.speaker_id.as_deref()
    }

    pub fn break_reason(&self) -> BreakReason {
        self.reason
    }

    /// Number of non-spacing tokens
    pub fn significant_len(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_significant()).count()
    }

    /// True when every non-spacing token is a non-speech event
    pub fn is_audio_event(&self) -> bool {
        let mut significant = self.tokens.iter().filter(|t| t.is_significant()).peekable();
        significant.peek().is_some() && significant.all(|t| t.kind == TokenKind::AudioEvent)
    }
}

/// Reject transcripts whose timing cannot be trusted
pub fn validate_tokens(tokens: &[Token]) -> Result<(), SegmentationError> {
    let mut previous_start: Option<f64> = None;

    for (index, token) in tokens.iter().enumerate() {
        let malformed = |reason: String| SegmentationError::MalformedTranscript { index, reason };

        if !token.start.is_finite() || !token.end.is_finite() {
            return Err(malformed("timestamp is not a finite number".to_string()));
        }
        if token.end < token.start {
            return Err(malformed(format!(
                "end {:.3}s precedes start {:.3}s",
                token.end, token.start
            )));
        }
        if let Some(prev) = previous_start {
            if token.start < prev {
                return Err(malformed(format!(
                    "start {:.3}s precedes previous token start {:.3}s",
                    token.start, prev
                )));
            }
        }
        previous_start = Some(token.start);
    }

    Ok(())
}

/// Group an ordered token stream into subtitle blocks.
///
/// Takes ownership of the tokens; they are moved into the blocks unchanged.
pub fn group(tokens: Vec<Token>, profile: &LanguageProfile) -> Result<Vec<SubtitleBlock>, SegmentationError> {
    validate_tokens(&tokens)?;

    let boundaries = find_block_boundaries(&tokens, profile);
    let mut blocks = Vec::with_capacity(boundaries.len());
    let mut remaining = tokens.into_iter();
    let mut consumed = 0;

    for (end, reason) in boundaries {
        let run: Vec<Token> = remaining.by_ref().take(end - consumed).collect();
        consumed = end;
        blocks.push(SubtitleBlock::from_tokens(run, reason));
    }

    debug!("Grouped {} tokens into {} blocks", consumed, blocks.len());
    Ok(blocks)
}

/// Index of the first significant token at or after `from`
fn next_significant(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&j| tokens[j].is_significant())
}

fn concat(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

/// Decide where blocks end. Returns exclusive end indices with the reason
/// each block was closed; the last entry always equals `tokens.len()`.
fn find_block_boundaries(tokens: &[Token], profile: &LanguageProfile) -> Vec<(usize, BreakReason)> {
    let mut boundaries = Vec::new();
    let mut block_start = 0;
    let mut text = String::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        text.push_str(&token.text);

        if !token.is_significant() {
            i += 1;
            continue;
        }

        // Trailing spacing after the last word simply stays in the final block
        let Some(next) = next_significant(tokens, i + 1) else {
            i += 1;
            continue;
        };

        let Some(reason) = break_reason(tokens, block_start, i, next, &text, profile) else {
            i += 1;
            continue;
        };

        let end = if reason == BreakReason::LengthOverflow {
            backtrack_to_soft_break(tokens, block_start, i, profile).unwrap_or(next)
        } else {
            next
        };

        trace!("Closing block [{}..{}) on {:?}", block_start, end, reason);
        boundaries.push((end, reason));
        block_start = end;
        text.clear();
        // Tokens carried over by a backtrack are evaluated again in the new block
        i = end;
    }

    if block_start < tokens.len() {
        boundaries.push((tokens.len(), BreakReason::EndOfInput));
    }

    boundaries
}

/// Check whether the block holding `tokens[block_start..=i]` must close
/// before the next significant token `tokens[next]` joins it.
fn break_reason(
    tokens: &[Token],
    block_start: usize,
    i: usize,
    next: usize,
    text: &str,
    profile: &LanguageProfile,
) -> Option<BreakReason> {
    let token = &tokens[i];
    let upcoming = &tokens[next];

    if token.speaker_id != upcoming.speaker_id {
        return Some(BreakReason::SpeakerChange);
    }

    if profile.ends_with_hard_break(&token.text) {
        return Some(BreakReason::HardBreak);
    }

    if upcoming.start - token.end > profile.pause_threshold_seconds {
        return Some(BreakReason::LongPause);
    }

    let block_begin = next_significant(tokens, block_start).map_or(token.start, |j| tokens[j].start);
    if upcoming.end - block_begin > profile.max_duration_seconds {
        return Some(BreakReason::DurationExceeded);
    }

    let mut candidate = String::with_capacity(text.len() + upcoming.text.len() + 1);
    candidate.push_str(text);
    candidate.push_str(&concat(&tokens[i + 1..=next]));
    if !fits_in_two_lines(&candidate, profile) {
        return Some(BreakReason::LengthOverflow);
    }

    None
}

/// On a length overflow, prefer ending the block on the latest clause
/// separator rather than mid-phrase. The closed part must fill at least one
/// line and still fit; otherwise the caller closes at the current token.
fn backtrack_to_soft_break(
    tokens: &[Token],
    block_start: usize,
    i: usize,
    profile: &LanguageProfile,
) -> Option<usize> {
    let k = (block_start..i)
        .rev()
        .find(|&k| tokens[k].is_significant() && profile.ends_with_soft_break(&tokens[k].text))?;
    let end = next_significant(tokens, k + 1)?;

    let closed = concat(&tokens[block_start..end]);
    let closed = closed.trim();
    if text_length(closed) < profile.max_chars_per_line || !fits_in_two_lines(closed, profile) {
        return None;
    }

    debug!(
        "Length overflow at token {}, backing off to clause break after token {}",
        i, k
    );
    Some(end)
}
