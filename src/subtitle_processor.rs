use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::{OutputConfig, SubtitleFormat, SubtitleSettings};
use crate::file_utils::FileManager;
use crate::segmentation::{Cue, LanguageProfile, text_length};

// @module: Subtitle file serialization and parsing

// @const: SRT/WebVTT timestamp line
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2,}):(\d{2}):(\d{2})[,.](\d{3}) --> (\d{2,}):(\d{2}):(\d{2})[,.](\d{3})").unwrap()
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Sequence number, 1-based
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, lines separated by '\n'
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    // @creates: Validated subtitle entry
    // @validates: Time range and non-empty text
    pub fn new_validated(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Result<Self> {
        if end_time_ms <= start_time_ms {
            return Err(anyhow!(
                "Invalid time range: end time {} <= start time {}",
                end_time_ms,
                start_time_ms
            ));
        }

        let trimmed_text = text.trim();
        if trimmed_text.is_empty() {
            return Err(anyhow!("Empty subtitle text for entry {}", seq_num));
        }

        Ok(SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text: trimmed_text.to_string(),
        })
    }

    /// Parse an SRT or WebVTT timestamp to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format milliseconds as `HH:MM:SS,mmm`
    pub fn format_timestamp(ms: u64) -> String {
        Self::format_timestamp_with(ms, ',')
    }

    /// Format milliseconds as `HH:MM:SS.mmm`
    pub fn format_vtt_timestamp(ms: u64) -> String {
        Self::format_timestamp_with(ms, '.')
    }

    fn format_timestamp_with(ms: u64, separator: char) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, seconds, separator, millis)
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_time_ms.saturating_sub(self.start_time_ms)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Write the entry as a WebVTT cue
    pub fn write_vtt(&self, f: &mut impl fmt::Write) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_vtt_timestamp(self.start_time_ms),
            Self::format_vtt_timestamp(self.end_time_ms)
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_time_ms),
            Self::format_timestamp(self.end_time_ms)
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Timing and tagging rules applied when cues become file entries
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub min_gap_ms: u64,
    /// Base reading speed; short cues get a more lenient limit
    pub max_chars_per_second: f64,
    pub speaker_labels: bool,
    pub bracket_audio_events: bool,
}

impl RenderOptions {
    pub fn new(profile: &LanguageProfile, settings: &SubtitleSettings, output: &OutputConfig) -> Self {
        RenderOptions {
            min_duration_ms: seconds_to_ms(profile.min_duration_seconds),
            max_duration_ms: seconds_to_ms(profile.max_duration_seconds),
            min_gap_ms: seconds_to_ms(settings.min_subtitle_gap),
            max_chars_per_second: profile.max_chars_per_second,
            speaker_labels: output.speaker_labels,
            bracket_audio_events: output.bracket_audio_events,
        }
    }

    /// Reading speed allowed for a cue of `chars` characters
    pub fn cps_limit_for(&self, chars: usize) -> f64 {
        dynamic_cps_limit(self.max_chars_per_second, chars)
    }
}

/// Reading speed limit, scaled up for very short texts
pub fn dynamic_cps_limit(base_cps: f64, chars: usize) -> f64 {
    let multiplier = match chars {
        0..=3 => 3.0,
        4..=5 => 2.0,
        6..=10 => 1.5,
        _ => 1.0,
    };
    base_cps * multiplier
}

/// Convert seconds to whole milliseconds, clamping negatives to zero
pub fn seconds_to_ms(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    }
}

/// Collection of subtitle entries with metadata
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// File the entries were generated from or read from
    pub source_file: PathBuf,

    pub entries: Vec<SubtitleEntry>,

    pub source_language: String,
}

impl SubtitleCollection {
    pub fn new(source_file: PathBuf, source_language: String) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
            source_language,
        }
    }

    /// Build numbered entries from segmented cues.
    ///
    /// Timing is adjusted here and only here: short cues are extended up to the
    /// minimum duration and the reading-speed limit, but never into the next
    /// cue's minimum gap.
    pub fn from_cues(source_file: PathBuf, source_language: String, cues: &[Cue], options: &RenderOptions) -> Self {
        let mut collection = Self::new(source_file, source_language);
        let mut previous_speaker: Option<&str> = None;

        // A cue built only from spacing has nothing to show
        let cues: Vec<&Cue> = cues
            .iter()
            .filter(|cue| cue.lines.iter().any(|line| !line.trim().is_empty()))
            .collect();

        for (i, &cue) in cues.iter().enumerate() {
            let next_start_ms = cues.get(i + 1).map(|next| seconds_to_ms(next.start));
            let (start_time_ms, end_time_ms) = adjust_timing(cue, next_start_ms, options);

            let speaker = cue.speaker_id.as_deref();
            let show_label = options.speaker_labels && speaker.is_some() && speaker != previous_speaker;
            previous_speaker = speaker;

            let text = tag_cue_text(cue, show_label, options);
            collection
                .entries
                .push(SubtitleEntry::new(i + 1, start_time_ms, end_time_ms, text));
        }

        debug!(
            "Built {} subtitle entries for {}",
            collection.entries.len(),
            collection.source_file.display()
        );
        collection
    }

    /// Render the whole collection as SRT text
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Render the whole collection as WebVTT text
    pub fn to_vtt_string(&self) -> String {
        let mut out = String::from("WEBVTT\n\n");
        for entry in &self.entries {
            // Writing into a String cannot fail
            let _ = entry.write_vtt(&mut out);
        }
        out
    }

    pub fn render(&self, format: SubtitleFormat) -> String {
        match format {
            SubtitleFormat::Srt => self.to_srt_string(),
            SubtitleFormat::Vtt => self.to_vtt_string(),
        }
    }

    /// Write subtitles in the requested format, creating parent directories
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P, format: SubtitleFormat) -> Result<()> {
        FileManager::write_to_file(path, &self.render(format))
    }

    /// Load an existing SRT or WebVTT file
    pub fn from_srt_file<P: AsRef<Path>>(path: P, source_language: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;
        let entries = Self::parse_srt_string(&content)?;

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries,
            source_language: source_language.to_string(),
        })
    }

    /// Parse SRT content. A leading WebVTT header is tolerated.
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>> {
        let mut entries = Vec::new();

        let mut current_seq_num: Option<usize> = None;
        let mut current_times: Option<(u64, u64)> = None;
        let mut current_text = String::new();

        let mut finish_entry = |seq_num: usize, (start_ms, end_ms): (u64, u64), text: &str| {
            match SubtitleEntry::new_validated(seq_num, start_ms, end_ms, text.to_string()) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping invalid subtitle entry {}: {}", seq_num, e),
            }
        };

        for (line_index, line) in content.lines().enumerate() {
            let trimmed = line.trim().trim_start_matches('\u{feff}');

            if trimmed.is_empty() {
                if let (Some(seq_num), Some(times)) = (current_seq_num, current_times) {
                    if !current_text.is_empty() {
                        finish_entry(seq_num, times, &current_text);
                        current_seq_num = None;
                        current_times = None;
                        current_text.clear();
                    }
                }
                continue;
            }

            if line_index == 0 && trimmed.starts_with("WEBVTT") {
                continue;
            }

            if current_seq_num.is_none() && current_text.is_empty() {
                if let Ok(num) = trimmed.parse::<usize>() {
                    current_seq_num = Some(num);
                    continue;
                }
            }

            if current_seq_num.is_some() && current_times.is_none() {
                if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                    current_times = Some((Self::parse_timestamp_to_ms(&caps, 1)?, Self::parse_timestamp_to_ms(&caps, 5)?));
                    continue;
                }
            }

            if current_seq_num.is_some() && current_times.is_some() {
                if !current_text.is_empty() {
                    current_text.push('\n');
                }
                current_text.push_str(trimmed);
            } else {
                warn!(
                    "Unexpected text at line {} before sequence number or timestamp: {}",
                    line_index + 1,
                    trimmed
                );
            }
        }

        if let (Some(seq_num), Some(times)) = (current_seq_num, current_times) {
            if !current_text.is_empty() {
                finish_entry(seq_num, times, &current_text);
            }
        }

        if entries.is_empty() {
            return Err(anyhow!("No valid subtitle entries were found in the SRT content"));
        }

        entries.sort_by_key(|entry| entry.start_time_ms);
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.seq_num = i + 1;
        }

        Ok(entries)
    }

    fn parse_timestamp_to_ms(caps: &regex::Captures, start_idx: usize) -> Result<u64> {
        let field = |offset: usize| -> Result<u64> {
            caps.get(start_idx + offset)
                .ok_or_else(|| anyhow!("Missing timestamp component"))?
                .as_str()
                .parse::<u64>()
                .context("Invalid timestamp component")
        };

        Ok((field(0)? * 3600 + field(1)? * 60 + field(2)?) * 1000 + field(3)?)
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Language: {}", self.source_language)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}

/// Start and end of a cue in milliseconds after timing adjustments
fn adjust_timing(cue: &Cue, next_start_ms: Option<u64>, options: &RenderOptions) -> (u64, u64) {
    let start_ms = seconds_to_ms(cue.start);
    let end_ms = seconds_to_ms(cue.end).max(start_ms);
    let mut target_ms = end_ms;

    if end_ms - start_ms < options.min_duration_ms {
        target_ms = start_ms + options.min_duration_ms;
    }

    if !cue.is_audio_event {
        let chars: usize = cue.lines.iter().map(|line| text_length(line)).sum();
        let cps = options.cps_limit_for(chars);
        if chars > 0 && cps > 0.0 {
            let required_ms = ((chars as f64 / cps) * 1000.0).ceil() as u64;
            let capped_ms = required_ms.min(options.max_duration_ms.max(end_ms - start_ms));
            target_ms = target_ms.max(start_ms + capped_ms);
        }
    }

    let mut new_end_ms = target_ms;
    if let Some(limit) = next_start_ms.map(|next| next.saturating_sub(options.min_gap_ms)) {
        if new_end_ms > limit {
            // Pull back to the gap only while the cue keeps a positive duration
            new_end_ms = if limit > start_ms { limit } else { end_ms };
        }
    }

    if new_end_ms <= start_ms {
        new_end_ms = start_ms + 1;
    }

    (start_ms, new_end_ms)
}

/// Cue text with optional speaker label and audio-event brackets
fn tag_cue_text(cue: &Cue, show_label: bool, options: &RenderOptions) -> String {
    let mut text = cue.text();

    if cue.is_audio_event && options.bracket_audio_events {
        text = bracket_event(&text);
    }

    if show_label {
        if let Some(speaker) = cue.speaker_id.as_deref() {
            text = format!("[{}] {}", speaker, text);
        }
    }

    text
}

fn bracket_event(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        return trimmed.to_string();
    }
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(trimmed);
    format!("[{}]", inner.trim())
}
