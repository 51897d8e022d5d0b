/*!
 * Line formatter: lays a block's text out on one or two display lines.
 *
 * The output is a set of byte ranges into the block text, never a freshly
 * built string. Lines can only be narrowed by trimming whitespace at their
 * edges, so the formatter has no way to drop, shorten or ellipsize content.
 */

use std::ops::Range;

use super::profile::LanguageProfile;
use super::split::{BreakKind, find_best_split_position, text_length};

/// The formatter's output: 1 or 2 lines as spans of the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedText<'a> {
    source: &'a str,
    first: Range<usize>,
    second: Option<Range<usize>>,
    break_kind: Option<BreakKind>,
}

impl<'a> FormattedText<'a> {
    /// The text the spans point into
    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn lines(&self) -> impl Iterator<Item = &'a str> + '_ {
        let source = self.source;
        std::iter::once(&self.first)
            .chain(self.second.as_ref())
            .map(move |range| &source[range.clone()])
    }

    pub fn line_count(&self) -> usize {
        1 + usize::from(self.second.is_some())
    }

    /// How the first line was ended, if the text was split
    pub fn break_kind(&self) -> Option<BreakKind> {
        self.break_kind
    }

    /// Length of the longest line
    pub fn longest_line(&self) -> usize {
        self.lines().map(text_length).max().unwrap_or(0)
    }

    /// Whether any line is longer than the profile allows
    pub fn is_overlong(&self, profile: &LanguageProfile) -> bool {
        self.longest_line() > profile.max_chars_per_line
    }

    pub fn to_lines(&self) -> Vec<String> {
        self.lines().map(str::to_string).collect()
    }
}

/// Narrow a range of `text` to exclude surrounding whitespace
fn trimmed(text: &str, range: Range<usize>) -> Range<usize> {
    let slice = &text[range.clone()];
    let start = range.start + (slice.len() - slice.trim_start().len());
    start..start + slice.trim().len()
}

/// Lay `text` out on one or two lines.
///
/// The second line is returned verbatim even when it is still longer than
/// `max_chars_per_line`; check [`FormattedText::is_overlong`] for that case.
pub fn format<'a>(text: &'a str, profile: &LanguageProfile) -> FormattedText<'a> {
    let whole = trimmed(text, 0..text.len());
    let body = &text[whole.clone()];

    if text_length(body) <= profile.max_chars_per_line {
        return FormattedText {
            source: text,
            first: whole,
            second: None,
            break_kind: None,
        };
    }

    match find_best_split_position(body, profile) {
        Some(split) => {
            let at = whole.start + split.offset;
            FormattedText {
                source: text,
                first: trimmed(text, whole.start..at),
                second: Some(trimmed(text, at..whole.end)),
                break_kind: Some(split.kind),
            }
        }
        None => FormattedText {
            source: text,
            first: whole,
            second: None,
            break_kind: None,
        },
    }
}

/// Whether `text` can be shown within two lines of `max_chars_per_line`.
///
/// This is the grouper's length prediction; it runs the exact layout the
/// formatter will later produce.
pub fn fits_in_two_lines(text: &str, profile: &LanguageProfile) -> bool {
    !format(text, profile).is_overlong(profile)
}
