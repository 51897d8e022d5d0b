/*!
 * Split-position search shared by the grouper and the formatter.
 *
 * The grouper predicts whether a block will fit in two lines by running the
 * formatter, which in turn asks this module where to break. Keeping a single
 * search function means the prediction and the final rendering cannot drift.
 */

use super::profile::{LanguageProfile, OverlongPolicy};

/// Kind of boundary a split was placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    /// After a clause separator such as `,` or `，`
    Punctuation,
    /// On a whitespace boundary between words
    Whitespace,
    /// Between two characters with no linguistic boundary
    HardCut,
}

/// Where to break a line, as a byte offset into the searched text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPoint {
    pub offset: usize,
    pub kind: BreakKind,
}

/// Display length of a line.
///
/// Both scripts are measured in characters; `is_character_counted` only
/// changes which break points are acceptable.
pub fn text_length(text: &str) -> usize {
    text.chars().count()
}

/// Find where to end the first line of `text`.
///
/// Returns `None` when the text already fits on one line, or when it is a
/// single unbreakable word in a space-delimited language under
/// [`OverlongPolicy::Accept`]. The caller is expected to pass trimmed text.
pub fn find_best_split_position(text: &str, profile: &LanguageProfile) -> Option<SplitPoint> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let limit = profile.max_chars_per_line.max(1);
    if chars.len() <= limit {
        return None;
    }

    let window_start = (limit / 2).max(1);
    let offset_of = |i: usize| chars.get(i).map_or(text.len(), |(b, _)| *b);
    let split = |i: usize, kind: BreakKind| Some(SplitPoint { offset: offset_of(i), kind });

    // A separator inside a token such as `1,250,000` is not a boundary in
    // space-delimited text
    let is_boundary_after = |i: usize| {
        profile.is_soft_break(chars[i - 1].1)
            && (profile.is_character_counted || chars.get(i).is_none_or(|(_, c)| c.is_whitespace()))
    };

    // Clause separators near the column, split after the mark
    if let Some(i) = (window_start..=limit).rev().find(|&i| is_boundary_after(i)) {
        return split(i, BreakKind::Punctuation);
    }

    if profile.is_character_counted {
        // Korean and embedded Latin words are still space-delimited
        if let Some(i) = (window_start..=limit).rev().find(|&i| chars[i].1.is_whitespace()) {
            return split(i, BreakKind::Whitespace);
        }
        return split(limit, BreakKind::HardCut);
    }

    // chars[limit] exists because the text is longer than the limit
    if let Some(i) = (1..=limit).rev().find(|&i| chars[i].1.is_whitespace()) {
        return split(i, BreakKind::Whitespace);
    }

    if let Some(i) = (1..window_start).rev().find(|&i| is_boundary_after(i)) {
        return split(i, BreakKind::Punctuation);
    }

    match profile.overlong_policy {
        OverlongPolicy::HardCut => split(limit, BreakKind::HardCut),
        // Keep the word whole; the first line overflows
        OverlongPolicy::Accept => (limit + 1..chars.len())
            .find(|&i| chars[i].1.is_whitespace())
            .and_then(|i| split(i, BreakKind::Whitespace)),
    }
}
