/*!
 * # captioner
 *
 * A Rust library that turns word-level speech-to-text transcripts into
 * readable subtitle files.
 *
 * ## Features
 *
 * - Semantic grouping of words into cues (speaker changes, sentence ends,
 *   pauses, duration and length limits)
 * - Line layout on at most two lines that never drops or ellipsizes content
 * - Per-language rules: character-counted CJK and space-delimited scripts
 * - SRT and WebVTT output with minimum-duration and reading-speed timing
 * - Quality analysis of existing subtitle files
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `segmentation`: The engine:
 *   - `segmentation::grouper`: Tokens to subtitle blocks
 *   - `segmentation::formatter`: Block text to one or two lines
 *   - `segmentation::split`: Line-break search shared by both stages
 *   - `segmentation::profile`: Per-language parameters
 * - `transcript`: Transcript JSON loading
 * - `subtitle_processor`: Subtitle file writing and parsing
 * - `validation`: Subtitle quality checks
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod segmentation;
pub mod subtitle_processor;
pub mod transcript;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, SegmentationError, TranscriptError};
pub use language_utils::{get_language_name, is_cjk_language, language_codes_match, normalize_to_part2t};
pub use segmentation::{Cue, LanguageProfile, OverlongPolicy, QualityWarning, Segmentation, Token, TokenKind, segment};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use transcript::Transcript;
