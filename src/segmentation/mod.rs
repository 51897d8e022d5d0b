/*!
 * Subtitle segmentation and formatting engine.
 *
 * Turns a word-level transcript into timed cues in two stages:
 * - `grouper`: decides which tokens belong to which cue
 * - `formatter`: lays each cue's text out on one or two lines
 *
 * Both stages share `profile` (per-language parameters) and `split` (the
 * line-break search). The engine is synchronous and keeps no state between
 * calls, so independent transcripts can be processed on separate threads.
 */

pub mod formatter;
pub mod grouper;
pub mod profile;
pub mod split;
pub mod token;

use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::SegmentationError;

pub use formatter::{FormattedText, fits_in_two_lines, format};
pub use grouper::{BreakReason, SubtitleBlock, group};
pub use profile::{LanguageProfile, OverlongPolicy};
pub use split::{BreakKind, SplitPoint, find_best_split_position, text_length};
pub use token::{Token, TokenKind};

/// One timed subtitle entry with 1 or 2 lines of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub lines: Vec<String>,
    pub speaker_id: Option<String>,
    /// Every significant token of the cue is a non-speech event
    pub is_audio_event: bool,
}

impl Cue {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Lines joined with a newline, as written to a subtitle file
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Non-fatal data-quality observations made while segmenting
#[derive(Debug, Clone, PartialEq)]
pub enum QualityWarning {
    /// A line is longer than the limit because no break point could hold it
    OverlongBlock {
        cue_index: usize,
        longest_line: usize,
        max_chars_per_line: usize,
    },
    /// A single token lasts longer than the maximum cue duration
    DurationExceeded {
        cue_index: usize,
        duration: f64,
        max_duration: f64,
    },
}

impl fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityWarning::OverlongBlock {
                cue_index,
                longest_line,
                max_chars_per_line,
            } => write!(
                f,
                "Cue {} has a {}-character line (max {}); content kept in full",
                cue_index + 1,
                longest_line,
                max_chars_per_line
            ),
            QualityWarning::DurationExceeded {
                cue_index,
                duration,
                max_duration,
            } => write!(
                f,
                "Cue {} lasts {:.2}s (max {:.2}s) because of a single long token",
                cue_index + 1,
                duration,
                max_duration
            ),
        }
    }
}

/// Cues produced for one transcript together with any quality warnings
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    pub cues: Vec<Cue>,
    pub warnings: Vec<QualityWarning>,
}

impl Segmentation {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Render one block into a cue, reporting overflow instead of correcting it
pub fn render_block(block: &SubtitleBlock, cue_index: usize, profile: &LanguageProfile) -> (Cue, Vec<QualityWarning>) {
    let formatted = format(block.text(), profile);
    let mut warnings = Vec::new();

    if formatted.is_overlong(profile) {
        warnings.push(QualityWarning::OverlongBlock {
            cue_index,
            longest_line: formatted.longest_line(),
            max_chars_per_line: profile.max_chars_per_line,
        });
    }

    if block.duration() > profile.max_duration_seconds && block.significant_len() == 1 {
        warnings.push(QualityWarning::DurationExceeded {
            cue_index,
            duration: block.duration(),
            max_duration: profile.max_duration_seconds,
        });
    }

    let cue = Cue {
        start: block.start(),
        end: block.end(),
        lines: formatted.to_lines(),
        speaker_id: block.speaker_id().map(str::to_string),
        is_audio_event: block.is_audio_event(),
    };

    (cue, warnings)
}

/// Segment a transcript into cues.
///
/// An empty token sequence yields an empty result, not an error.
pub fn segment(tokens: Vec<Token>, profile: &LanguageProfile) -> Result<Segmentation, SegmentationError> {
    let blocks = group(tokens, profile)?;
    let mut result = Segmentation {
        cues: Vec::with_capacity(blocks.len()),
        warnings: Vec::new(),
    };

    for (cue_index, block) in blocks.iter().enumerate() {
        let (cue, warnings) = render_block(block, cue_index, profile);
        for warning in &warnings {
            warn!("{}", warning);
        }
        result.warnings.extend(warnings);
        result.cues.push(cue);
    }

    debug!(
        "Segmented into {} cues with {} warnings (language '{}')",
        result.cues.len(),
        result.warnings.len(),
        profile.language
    );

    Ok(result)
}
