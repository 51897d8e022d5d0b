/*!
 * Subtitle quality analysis.
 *
 * Checks a finished subtitle file against broadcast-style rules:
 * - `timecodes`: durations, gaps, overlaps and reading speed
 * - `length`: characters per line, line count, truncation marks
 * - `service`: runs both and builds a `QualityReport`
 */

pub mod length;
pub mod service;
pub mod timecodes;

pub use service::{QualityReport, QualityRules, RuleCounts, ValidationService};
