/*!
 * Line layout checks for subtitle entries.
 *
 * Validates that entry text respects the display limits:
 * - characters per line
 * - number of lines
 * - no truncation marks (ellipses) at line edges
 */

use log::debug;

/// Ellipsis forms that indicate cut-off text when found at a line edge
const ELLIPSES: &[&str] = &["…", "...", "。。。"];

/// Result of layout validation for a single entry
#[derive(Debug, Clone)]
pub struct LengthEntryResult {
    pub seq_num: usize,
    pub passed: bool,
    pub issues: Vec<LengthIssue>,
    /// Length of the longest line in characters
    pub longest_line: usize,
}

/// Types of layout issues
#[derive(Debug, Clone, PartialEq)]
pub enum LengthIssue {
    /// Entry has no text at all
    EmptyText,
    LineTooLong { line: usize, length: usize, max_length: usize },
    TooManyLines { count: usize, max_lines: usize },
    /// A line starts or ends with an ellipsis
    EllipsisIntroduced { line: usize },
}

impl std::fmt::Display for LengthIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthIssue::EmptyText => write!(f, "Entry text is empty"),
            LengthIssue::LineTooLong {
                line,
                length,
                max_length,
            } => {
                write!(f, "Line {} has {} characters (max: {})", line, length, max_length)
            }
            LengthIssue::TooManyLines { count, max_lines } => {
                write!(f, "{} lines (max: {})", count, max_lines)
            }
            LengthIssue::EllipsisIntroduced { line } => {
                write!(f, "Line {} looks truncated with an ellipsis", line)
            }
        }
    }
}

/// Result of validating layout for a collection
#[derive(Debug, Clone)]
pub struct LengthValidationResult {
    pub passed: bool,
    pub entry_results: Vec<LengthEntryResult>,
    pub total_issues: usize,
    /// Mean of the longest line per entry
    pub average_longest_line: f64,
}

/// Configuration for layout validation
#[derive(Debug, Clone)]
pub struct LengthValidatorConfig {
    pub max_chars_per_line: usize,
    pub max_lines: usize,
    pub check_ellipsis: bool,
}

impl Default for LengthValidatorConfig {
    fn default() -> Self {
        Self {
            max_chars_per_line: 42,
            max_lines: 2,
            check_ellipsis: true,
        }
    }
}

/// Layout validator for subtitle entries
pub struct LengthValidator {
    config: LengthValidatorConfig,
}

impl LengthValidator {
    pub fn new() -> Self {
        Self {
            config: LengthValidatorConfig::default(),
        }
    }

    pub fn with_config(config: LengthValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate the layout of one entry's text
    pub fn validate_entry(&self, seq_num: usize, text: &str) -> LengthEntryResult {
        let lines: Vec<&str> = text.lines().collect();
        let mut issues = Vec::new();

        if text.trim().is_empty() {
            issues.push(LengthIssue::EmptyText);
        }

        if lines.len() > self.config.max_lines {
            issues.push(LengthIssue::TooManyLines {
                count: lines.len(),
                max_lines: self.config.max_lines,
            });
        }

        let mut longest_line = 0;
        for (i, line) in lines.iter().enumerate() {
            let length = line.trim().chars().count();
            longest_line = longest_line.max(length);

            if length > self.config.max_chars_per_line {
                issues.push(LengthIssue::LineTooLong {
                    line: i + 1,
                    length,
                    max_length: self.config.max_chars_per_line,
                });
            }

            if self.config.check_ellipsis && has_edge_ellipsis(line) {
                issues.push(LengthIssue::EllipsisIntroduced { line: i + 1 });
            }
        }

        LengthEntryResult {
            seq_num,
            passed: issues.is_empty(),
            issues,
            longest_line,
        }
    }

    /// Validate a sequence of `(seq_num, text)` pairs
    pub fn validate_collection<'a, I>(&self, entries: I) -> LengthValidationResult
    where
        I: IntoIterator<Item = (usize, &'a str)>,
    {
        let entry_results: Vec<LengthEntryResult> = entries
            .into_iter()
            .map(|(seq_num, text)| self.validate_entry(seq_num, text))
            .collect();

        let total_issues: usize = entry_results.iter().map(|r| r.issues.len()).sum();
        let passed = entry_results.iter().all(|r| r.passed);
        let average_longest_line = if entry_results.is_empty() {
            0.0
        } else {
            entry_results.iter().map(|r| r.longest_line as f64).sum::<f64>() / entry_results.len() as f64
        };

        debug!(
            "Layout validation: {} entries, {} issues, average longest line {:.1}",
            entry_results.len(),
            total_issues,
            average_longest_line
        );

        LengthValidationResult {
            passed,
            entry_results,
            total_issues,
            average_longest_line,
        }
    }
}

impl Default for LengthValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn has_edge_ellipsis(line: &str) -> bool {
    let trimmed = line.trim();
    ELLIPSES
        .iter()
        .any(|mark| trimmed.starts_with(mark) || trimmed.ends_with(mark))
}
