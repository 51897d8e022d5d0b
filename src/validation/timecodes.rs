/*!
 * Timing checks for subtitle entries.
 *
 * Validates that every entry:
 * - has a positive duration within the configured bounds
 * - keeps the minimum gap to the following entry and does not overlap it
 * - can be read at the allowed characters-per-second rate
 */

use log::debug;

use crate::subtitle_processor::{SubtitleEntry, dynamic_cps_limit};

/// Result of timecode validation for a single entry
#[derive(Debug, Clone)]
pub struct TimecodeEntryResult {
    pub seq_num: usize,
    pub passed: bool,
    pub issues: Vec<TimecodeIssue>,
}

impl TimecodeEntryResult {
    pub fn passed(seq_num: usize) -> Self {
        Self {
            seq_num,
            passed: true,
            issues: vec![],
        }
    }

    pub fn failed(seq_num: usize, issues: Vec<TimecodeIssue>) -> Self {
        Self {
            seq_num,
            passed: false,
            issues,
        }
    }
}

/// Types of timecode issues
#[derive(Debug, Clone, PartialEq)]
pub enum TimecodeIssue {
    /// End time is not after start time
    InvalidTimeRange { start_ms: u64, end_ms: u64 },
    DurationTooShort { duration_ms: u64, min_duration_ms: u64 },
    DurationTooLong { duration_ms: u64, max_duration_ms: u64 },
    ReadingSpeedTooHigh { cps: f64, max_cps: f64 },
    /// Starts before the previous entry ends
    OverlapsWithEntry { other_seq_num: usize, overlap_ms: u64 },
    /// Starts less than the minimum gap after the previous entry
    GapTooSmall { prev_seq_num: usize, gap_ms: u64, min_gap_ms: u64 },
}

impl std::fmt::Display for TimecodeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimecodeIssue::InvalidTimeRange { start_ms, end_ms } => {
                write!(f, "Invalid time range: start {}ms >= end {}ms", start_ms, end_ms)
            }
            TimecodeIssue::DurationTooShort {
                duration_ms,
                min_duration_ms,
            } => {
                write!(f, "Duration too short: {}ms (min: {}ms)", duration_ms, min_duration_ms)
            }
            TimecodeIssue::DurationTooLong {
                duration_ms,
                max_duration_ms,
            } => {
                write!(f, "Duration too long: {}ms (max: {}ms)", duration_ms, max_duration_ms)
            }
            TimecodeIssue::ReadingSpeedTooHigh { cps, max_cps } => {
                write!(f, "Reading speed too high: {:.1} CPS (max: {:.1})", cps, max_cps)
            }
            TimecodeIssue::OverlapsWithEntry {
                other_seq_num,
                overlap_ms,
            } => {
                write!(f, "Overlaps with entry {} by {}ms", other_seq_num, overlap_ms)
            }
            TimecodeIssue::GapTooSmall {
                prev_seq_num,
                gap_ms,
                min_gap_ms,
            } => {
                write!(
                    f,
                    "Gap of {}ms after entry {} (min: {}ms)",
                    gap_ms, prev_seq_num, min_gap_ms
                )
            }
        }
    }
}

/// Result of validating all timecodes in a collection
#[derive(Debug, Clone)]
pub struct TimecodeValidationResult {
    pub passed: bool,
    pub entry_results: Vec<TimecodeEntryResult>,
    pub total_issues: usize,
    pub overlap_count: usize,
}

/// Configuration for timecode validation
#[derive(Debug, Clone)]
pub struct TimecodeValidatorConfig {
    /// Base characters per second; short entries get the usual leniency
    pub max_cps: f64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub min_gap_ms: u64,
}

impl Default for TimecodeValidatorConfig {
    fn default() -> Self {
        Self {
            max_cps: 15.0,
            min_duration_ms: 830,
            max_duration_ms: 7000,
            min_gap_ms: 83,
        }
    }
}

/// Timecode validator for subtitle entries
pub struct TimecodeValidator {
    config: TimecodeValidatorConfig,
}

impl TimecodeValidator {
    pub fn new() -> Self {
        Self {
            config: TimecodeValidatorConfig::default(),
        }
    }

    pub fn with_config(config: TimecodeValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate a single subtitle entry in isolation
    pub fn validate_entry(&self, entry: &SubtitleEntry) -> TimecodeEntryResult {
        let mut issues = Vec::new();

        if entry.end_time_ms <= entry.start_time_ms {
            issues.push(TimecodeIssue::InvalidTimeRange {
                start_ms: entry.start_time_ms,
                end_ms: entry.end_time_ms,
            });
            return TimecodeEntryResult::failed(entry.seq_num, issues);
        }

        let duration_ms = entry.duration_ms();

        if duration_ms < self.config.min_duration_ms {
            issues.push(TimecodeIssue::DurationTooShort {
                duration_ms,
                min_duration_ms: self.config.min_duration_ms,
            });
        }

        if duration_ms > self.config.max_duration_ms {
            issues.push(TimecodeIssue::DurationTooLong {
                duration_ms,
                max_duration_ms: self.config.max_duration_ms,
            });
        }

        // Bracketed sound descriptions are not reading material
        if !is_audio_event_text(&entry.text) {
            let char_count: usize = entry.lines().map(|line| line.chars().count()).sum();
            let cps = char_count as f64 / (duration_ms as f64 / 1000.0);
            let max_cps = dynamic_cps_limit(self.config.max_cps, char_count);

            // Timestamps are rounded to whole milliseconds
            if cps > max_cps + 0.05 {
                issues.push(TimecodeIssue::ReadingSpeedTooHigh { cps, max_cps });
            }
        }

        if issues.is_empty() {
            TimecodeEntryResult::passed(entry.seq_num)
        } else {
            TimecodeEntryResult::failed(entry.seq_num, issues)
        }
    }

    /// Validate a collection, including spacing between neighbours
    pub fn validate_collection(&self, entries: &[SubtitleEntry]) -> TimecodeValidationResult {
        let mut entry_results: Vec<TimecodeEntryResult> = entries.iter().map(|e| self.validate_entry(e)).collect();
        let mut overlap_count = 0;

        let mut sorted_indices: Vec<usize> = (0..entries.len()).collect();
        sorted_indices.sort_by_key(|&i| entries[i].start_time_ms);

        for pair in sorted_indices.windows(2) {
            let current = &entries[pair[0]];
            let next = &entries[pair[1]];

            let issue = if current.end_time_ms > next.start_time_ms {
                overlap_count += 1;
                TimecodeIssue::OverlapsWithEntry {
                    other_seq_num: current.seq_num,
                    overlap_ms: current.end_time_ms - next.start_time_ms,
                }
            } else if next.start_time_ms - current.end_time_ms < self.config.min_gap_ms {
                TimecodeIssue::GapTooSmall {
                    prev_seq_num: current.seq_num,
                    gap_ms: next.start_time_ms - current.end_time_ms,
                    min_gap_ms: self.config.min_gap_ms,
                }
            } else {
                continue;
            };

            let result = &mut entry_results[pair[1]];
            result.issues.push(issue);
            result.passed = false;
        }

        let total_issues: usize = entry_results.iter().map(|r| r.issues.len()).sum();
        let passed = entry_results.iter().all(|r| r.passed);

        debug!(
            "Timecode validation: {} entries, {} issues, {} overlaps",
            entries.len(),
            total_issues,
            overlap_count
        );

        TimecodeValidationResult {
            passed,
            entry_results,
            total_issues,
            overlap_count,
        }
    }
}

impl Default for TimecodeValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn is_audio_event_text(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('[') && trimmed.ends_with(']') && !trimmed[1..].contains('[')
}
