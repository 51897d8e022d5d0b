/*!
 * Validation service that runs all subtitle checks.
 *
 * Combines timing and layout checks into a single quality report with
 * per-rule counts and an overall compliance rate.
 */

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::app_config::SubtitleSettings;
use crate::segmentation::LanguageProfile;
use crate::subtitle_processor::{SubtitleEntry, seconds_to_ms};

use super::length::{LengthIssue, LengthValidator, LengthValidatorConfig};
use super::timecodes::{TimecodeIssue, TimecodeValidator, TimecodeValidatorConfig};

/// Limits a subtitle file is checked against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityRules {
    pub max_chars_per_line: usize,
    pub max_lines: usize,
    pub max_chars_per_second: f64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub min_gap_ms: u64,
}

impl QualityRules {
    pub fn from_profile(profile: &LanguageProfile, settings: &SubtitleSettings) -> Self {
        Self {
            max_chars_per_line: profile.max_chars_per_line,
            max_lines: 2,
            max_chars_per_second: profile.max_chars_per_second,
            min_duration_ms: seconds_to_ms(profile.min_duration_seconds),
            max_duration_ms: seconds_to_ms(profile.max_duration_seconds),
            min_gap_ms: seconds_to_ms(settings.min_subtitle_gap),
        }
    }
}

/// Number of entries breaking each rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleCounts {
    pub duration_too_short: usize,
    pub duration_too_long: usize,
    pub gap_too_small: usize,
    pub overlap: usize,
    pub cps_too_high: usize,
    pub cpl_exceeded: usize,
    pub too_many_lines: usize,
    pub ellipsis: usize,
    pub invalid: usize,
}

/// One problem found in one entry
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub seq_num: usize,
    pub message: String,
}

/// Complete quality report for a subtitle file
#[derive(Debug, Clone, Default)]
pub struct QualityReport {
    pub total_entries: usize,
    /// Entries without any issue
    pub compliant_entries: usize,
    pub counts: RuleCounts,
    pub issues: Vec<ValidationIssue>,
}

impl QualityReport {
    /// Share of compliant entries, from 0.0 to 1.0. An empty file is compliant.
    pub fn compliance_rate(&self) -> f64 {
        if self.total_entries == 0 {
            1.0
        } else {
            self.compliant_entries as f64 / self.total_entries as f64
        }
    }

    pub fn all_passed(&self) -> bool {
        self.compliant_entries == self.total_entries
    }

    pub fn summary(&self) -> String {
        format!(
            "Quality: {}/{} entries compliant ({:.1}%)",
            self.compliant_entries,
            self.total_entries,
            self.compliance_rate() * 100.0
        )
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        let c = &self.counts;
        let rows = [
            ("Duration too short", c.duration_too_short),
            ("Duration too long", c.duration_too_long),
            ("Gap too small", c.gap_too_small),
            ("Overlapping", c.overlap),
            ("Reading speed too high", c.cps_too_high),
            ("Line too long", c.cpl_exceeded),
            ("Too many lines", c.too_many_lines),
            ("Ellipsis", c.ellipsis),
            ("Invalid entry", c.invalid),
        ];
        for (label, count) in rows.iter().filter(|(_, count)| *count > 0) {
            writeln!(f, "  {:<24}{}", label, count)?;
        }
        Ok(())
    }
}

/// Validation service for subtitle files
pub struct ValidationService {
    length_validator: LengthValidator,
    timecode_validator: TimecodeValidator,
}

impl ValidationService {
    pub fn new(rules: &QualityRules) -> Self {
        let length_config = LengthValidatorConfig {
            max_chars_per_line: rules.max_chars_per_line,
            max_lines: rules.max_lines,
            check_ellipsis: true,
        };

        let timecode_config = TimecodeValidatorConfig {
            max_cps: rules.max_chars_per_second,
            min_duration_ms: rules.min_duration_ms,
            max_duration_ms: rules.max_duration_ms,
            min_gap_ms: rules.min_gap_ms,
        };

        Self {
            length_validator: LengthValidator::with_config(length_config),
            timecode_validator: TimecodeValidator::with_config(timecode_config),
        }
    }

    /// Check every entry and aggregate the findings
    pub fn analyze(&self, entries: &[SubtitleEntry]) -> QualityReport {
        let timing = self.timecode_validator.validate_collection(entries);
        let layout = self
            .length_validator
            .validate_collection(entries.iter().map(|e| (e.seq_num, e.text.as_str())));

        let mut report = QualityReport {
            total_entries: entries.len(),
            ..Default::default()
        };

        for (timing_result, layout_result) in timing.entry_results.iter().zip(&layout.entry_results) {
            if timing_result.passed && layout_result.passed {
                report.compliant_entries += 1;
            }

            for issue in &timing_result.issues {
                let counter = match issue {
                    TimecodeIssue::InvalidTimeRange { .. } => &mut report.counts.invalid,
                    TimecodeIssue::DurationTooShort { .. } => &mut report.counts.duration_too_short,
                    TimecodeIssue::DurationTooLong { .. } => &mut report.counts.duration_too_long,
                    TimecodeIssue::ReadingSpeedTooHigh { .. } => &mut report.counts.cps_too_high,
                    TimecodeIssue::OverlapsWithEntry { .. } => &mut report.counts.overlap,
                    TimecodeIssue::GapTooSmall { .. } => &mut report.counts.gap_too_small,
                };
                *counter += 1;
                report.issues.push(ValidationIssue {
                    seq_num: timing_result.seq_num,
                    message: issue.to_string(),
                });
            }

            for issue in &layout_result.issues {
                let counter = match issue {
                    LengthIssue::EmptyText => &mut report.counts.invalid,
                    LengthIssue::LineTooLong { .. } => &mut report.counts.cpl_exceeded,
                    LengthIssue::TooManyLines { .. } => &mut report.counts.too_many_lines,
                    LengthIssue::EllipsisIntroduced { .. } => &mut report.counts.ellipsis,
                };
                *counter += 1;
                report.issues.push(ValidationIssue {
                    seq_num: layout_result.seq_num,
                    message: issue.to_string(),
                });
            }
        }

        debug!("{}", report.summary());
        report
    }
}
