/*!
 * Error types for the captioner application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised by the segmentation engine.
///
/// The engine is total over well-formed input, so the only failure is a
/// transcript whose timestamps cannot be trusted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentationError {
    /// A token has inverted, non-finite or out-of-order timestamps
    #[error("Malformed transcript at token {index}: {reason}")]
    MalformedTranscript {
        /// Position of the offending token in the input sequence
        index: usize,
        /// Human readable description of the problem
        reason: String,
    },
}

/// Errors that can occur while reading a transcript document
#[derive(Error, Debug)]
pub enum TranscriptError {
    /// The document is not valid JSON or does not match the expected shape
    #[error("Failed to parse transcript: {0}")]
    ParseError(String),

    /// A word entry is missing a required field
    #[error("Transcript word {index} is missing field '{field}'")]
    MissingField {
        index: usize,
        field: &'static str,
    },
}

impl From<serde_json::Error> for TranscriptError {
    fn from(error: serde_json::Error) -> Self {
        Self::ParseError(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from transcript loading
    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    /// Error from the segmentation engine
    #[error("Segmentation error: {0}")]
    Segmentation(#[from] SegmentationError),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
