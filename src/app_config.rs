use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::segmentation::OverlongPolicy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language code used when the transcript does not carry one, or "auto"
    /// to trust the transcript's `language_code`
    #[serde(default = "default_language")]
    pub language: String,

    /// Captioning rules
    #[serde(default)]
    pub subtitle: SubtitleSettings,

    /// Output rendering options
    #[serde(default)]
    pub output: OutputConfig,

    /// Number of transcripts processed at once in folder mode
    #[serde(default = "default_concurrent_files")]
    pub concurrent_files: usize,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// User-adjustable captioning rules.
///
/// Defaults follow common broadcast guidance: 5/6 s minimum display, 7 s
/// maximum, two frames at 24 fps between cues.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubtitleSettings {
    /// Shortest display time of a cue, in seconds
    #[serde(default = "default_min_subtitle_duration")]
    pub min_subtitle_duration: f64,

    /// Longest display time of a cue, in seconds
    #[serde(default = "default_max_subtitle_duration")]
    pub max_subtitle_duration: f64,

    /// Minimum gap kept between consecutive cues, in seconds
    #[serde(default = "default_min_subtitle_gap")]
    pub min_subtitle_gap: f64,

    /// Silence longer than this starts a new cue, in seconds
    #[serde(default = "default_pause_threshold")]
    pub pause_threshold: f64,

    /// Reading speed limit for Chinese, Japanese and Korean
    #[serde(default = "default_cjk_cps")]
    pub cjk_cps: f64,

    /// Reading speed limit for space-delimited languages
    #[serde(default = "default_latin_cps")]
    pub latin_cps: f64,

    #[serde(default = "default_cjk_chars_per_line")]
    pub cjk_chars_per_line: usize,

    #[serde(default = "default_latin_chars_per_line")]
    pub latin_chars_per_line: usize,

    /// Handling of words that cannot fit on a line at all
    #[serde(default)]
    pub overlong_policy: OverlongPolicy,
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self {
            min_subtitle_duration: default_min_subtitle_duration(),
            max_subtitle_duration: default_max_subtitle_duration(),
            min_subtitle_gap: default_min_subtitle_gap(),
            pause_threshold: default_pause_threshold(),
            cjk_cps: default_cjk_cps(),
            latin_cps: default_latin_cps(),
            cjk_chars_per_line: default_cjk_chars_per_line(),
            latin_chars_per_line: default_latin_chars_per_line(),
            overlong_policy: OverlongPolicy::default(),
        }
    }
}

/// Output subtitle file format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Vtt,
}

impl SubtitleFormat {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }
}

impl std::fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for SubtitleFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" | "webvtt" => Ok(Self::Vtt),
            _ => Err(anyhow!("Invalid subtitle format: {}", s)),
        }
    }
}

/// Rendering decisions applied after segmentation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: SubtitleFormat,

    /// Prefix a cue with its speaker label whenever the speaker changes
    #[serde(default)]
    pub speaker_labels: bool,

    /// Wrap non-speech events in square brackets, e.g. `[laughter]`
    #[serde(default = "default_true")]
    pub bracket_audio_events: bool,

    /// Attach standalone CJK punctuation tokens to the preceding word
    #[serde(default = "default_true")]
    pub attach_orphan_punctuation: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: SubtitleFormat::default(),
            speaker_labels: false,
            bracket_audio_events: true,
            attach_orphan_punctuation: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_language() -> String {
    "auto".to_string()
}

fn default_concurrent_files() -> usize {
    4
}

fn default_min_subtitle_duration() -> f64 {
    0.83
}

fn default_max_subtitle_duration() -> f64 {
    7.0
}

fn default_min_subtitle_gap() -> f64 {
    0.083
}

fn default_pause_threshold() -> f64 {
    0.7
}

fn default_cjk_cps() -> f64 {
    11.0
}

fn default_latin_cps() -> f64 {
    15.0
}

fn default_cjk_chars_per_line() -> usize {
    25
}

fn default_latin_chars_per_line() -> usize {
    42
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !self.uses_auto_language() {
            let _name = crate::language_utils::get_language_name(&self.language)?;
        }

        if self.concurrent_files == 0 {
            return Err(anyhow!("concurrent_files must be at least 1"));
        }

        self.subtitle.validate()
    }

    /// Whether the transcript's own language code should be used
    pub fn uses_auto_language(&self) -> bool {
        self.language.trim().is_empty() || self.language.eq_ignore_ascii_case("auto")
    }

    /// Pick the language for a transcript: an explicit configured language wins,
    /// otherwise the transcript's code, otherwise English
    pub fn resolve_language(&self, transcript_language: Option<&str>) -> String {
        if !self.uses_auto_language() {
            return self.language.clone();
        }
        transcript_language
            .filter(|code| !code.trim().is_empty())
            .unwrap_or("en")
            .to_string()
    }
}

impl SubtitleSettings {
    /// Reject values that would make the captioning rules contradictory
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("min_subtitle_duration", self.min_subtitle_duration),
            ("max_subtitle_duration", self.max_subtitle_duration),
            ("pause_threshold", self.pause_threshold),
            ("cjk_cps", self.cjk_cps),
            ("latin_cps", self.latin_cps),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(anyhow!("{} must be a positive number, got {}", name, value));
            }
        }

        if !self.min_subtitle_gap.is_finite() || self.min_subtitle_gap < 0.0 {
            return Err(anyhow!("min_subtitle_gap must not be negative"));
        }

        if self.min_subtitle_duration > self.max_subtitle_duration {
            return Err(anyhow!(
                "min_subtitle_duration ({}) exceeds max_subtitle_duration ({})",
                self.min_subtitle_duration,
                self.max_subtitle_duration
            ));
        }

        if self.cjk_chars_per_line == 0 || self.latin_chars_per_line == 0 {
            return Err(anyhow!("Characters per line must be at least 1"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            language: default_language(),
            subtitle: SubtitleSettings::default(),
            output: OutputConfig::default(),
            concurrent_files: default_concurrent_files(),
            log_level: LogLevel::default(),
        }
    }
}
