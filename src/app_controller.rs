use anyhow::{Context, Result, anyhow};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::segmentation::{self, LanguageProfile, Segmentation};
use crate::subtitle_processor::{RenderOptions, SubtitleCollection};
use crate::transcript::Transcript;
use crate::validation::{QualityReport, QualityRules, ValidationService};

// @module: Application controller for transcript captioning

/// What happened to one input file
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Written(ProcessedFile),
    /// Output already existed and overwriting was not requested
    Skipped(PathBuf),
}

/// Summary of one generated subtitle file
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub language: String,
    pub cue_count: usize,
    pub warning_count: usize,
}

/// Totals for a folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Arc<Config>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Language profile for a transcript, honoring the configured language
    pub fn profile_for(&self, transcript_language: Option<&str>) -> LanguageProfile {
        let language = self.config.resolve_language(transcript_language);
        LanguageProfile::for_language(&language, &self.config.subtitle)
    }

    /// Segment a loaded transcript and build its subtitle collection
    pub fn process_transcript(
        &self,
        mut transcript: Transcript,
        source_file: PathBuf,
    ) -> Result<(SubtitleCollection, Segmentation)> {
        if self.config.output.attach_orphan_punctuation {
            let merged = transcript.attach_orphan_punctuation();
            if merged > 0 {
                debug!("Attached {} standalone punctuation tokens", merged);
            }
        }

        let profile = self.profile_for(transcript.language_code.as_deref());
        let segmentation = segmentation::segment(transcript.into_tokens(), &profile)
            .with_context(|| format!("Failed to segment transcript: {}", source_file.display()))?;

        let options = RenderOptions::new(&profile, &self.config.subtitle, &self.config.output);
        let collection =
            SubtitleCollection::from_cues(source_file, profile.language.clone(), &segmentation.cues, &options);

        Ok((collection, segmentation))
    }

    /// Path of the subtitle file generated for `input_file`
    pub fn output_path_for(&self, input_file: &Path, output_dir: &Path, language: &str) -> PathBuf {
        let language = language_utils::normalize_to_part1_or_part2t(language).unwrap_or_else(|_| language.to_string());
        FileManager::generate_output_path(input_file, output_dir, &language, self.config.output.format.extension())
    }

    /// Convert one transcript file to a subtitle file, synchronously
    pub fn process_file(&self, input_file: &Path, output_dir: &Path, force_overwrite: bool) -> Result<FileOutcome> {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let transcript = Transcript::from_file(input_file)?;
        let language = self.config.resolve_language(transcript.language_code.as_deref());
        let output_path = self.output_path_for(input_file, output_dir, &language);

        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {}, subtitles already exist (use -f to force overwrite)",
                input_file.display()
            );
            return Ok(FileOutcome::Skipped(output_path));
        }

        let (collection, segmentation) = self.process_transcript(transcript, input_file.to_path_buf())?;
        collection.write_to_file(&output_path, self.config.output.format)?;

        info!(
            "Success: {} ({} cues, {} warnings)",
            output_path.display(),
            collection.entries.len(),
            segmentation.warnings.len()
        );

        Ok(FileOutcome::Written(ProcessedFile {
            input: input_file.to_path_buf(),
            output: output_path,
            language: collection.source_language,
            cue_count: collection.entries.len(),
            warning_count: segmentation.warnings.len(),
        }))
    }

    /// Merge the chunk transcripts below `input_dir`, in file-name order, into
    /// a single subtitle file named after the directory. Chunk timestamps must
    /// already be on one timeline.
    pub fn process_chunks(&self, input_dir: &Path, force_overwrite: bool) -> Result<FileOutcome> {
        let chunk_files = FileManager::find_transcript_files(input_dir)?;
        if chunk_files.is_empty() {
            return Err(anyhow!("No transcript chunks found in directory: {:?}", input_dir));
        }

        let mut merged = Transcript::default();
        for chunk_file in &chunk_files {
            merged.append(Transcript::from_file(chunk_file)?);
        }
        debug!("Merged {} chunks into {} tokens", chunk_files.len(), merged.tokens.len());

        let language = self.config.resolve_language(merged.language_code.as_deref());
        let output_path = self.output_path_for(input_dir, input_dir, &language);

        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {}, subtitles already exist (use -f to force overwrite)",
                input_dir.display()
            );
            return Ok(FileOutcome::Skipped(output_path));
        }

        let (collection, segmentation) = self.process_transcript(merged, input_dir.to_path_buf())?;
        collection.write_to_file(&output_path, self.config.output.format)?;

        info!(
            "Success: {} ({} chunks, {} cues, {} warnings)",
            output_path.display(),
            chunk_files.len(),
            collection.entries.len(),
            segmentation.warnings.len()
        );

        Ok(FileOutcome::Written(ProcessedFile {
            input: input_dir.to_path_buf(),
            output: output_path,
            language: collection.source_language,
            cue_count: collection.entries.len(),
            warning_count: segmentation.warnings.len(),
        }))
    }

    /// Run the chunk merge workflow off the async runtime
    pub async fn run_chunks(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FileOutcome> {
        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let config = Arc::clone(&self.config);
        tokio::task::spawn_blocking(move || {
            let controller = Controller { config };
            controller.process_chunks(&input_dir, force_overwrite)
        })
        .await
        .context("Segmentation task panicked")?
    }

    /// Run the workflow for a single transcript
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<FileOutcome> {
        let start_time = Instant::now();
        FileManager::ensure_dir(&output_dir)?;

        let config = Arc::clone(&self.config);
        let outcome = tokio::task::spawn_blocking(move || {
            let controller = Controller { config };
            controller.process_file(&input_file, &output_dir, force_overwrite)
        })
        .await
        .context("Segmentation task panicked")??;

        debug!("Completed in {}", Self::format_duration(start_time.elapsed()));
        Ok(outcome)
    }

    /// Run the workflow in folder mode, processing every `.json` transcript
    /// below `input_dir`. Files that already have subtitles are skipped.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let transcripts = FileManager::find_transcript_files(&input_dir)?;
        if transcripts.is_empty() {
            return Err(anyhow!("No transcript files found in directory: {:?}", input_dir));
        }

        let progress_bar = ProgressBar::new(transcripts.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Processing files");

        let results = stream::iter(transcripts)
            .map(|transcript_file| {
                let config = Arc::clone(&self.config);
                let progress_bar = progress_bar.clone();
                async move {
                    let output_dir = transcript_file.parent().map(Path::to_path_buf).unwrap_or_default();
                    let display_name = transcript_file.display().to_string();
                    let result = tokio::task::spawn_blocking(move || {
                        let controller = Controller { config };
                        controller.process_file(&transcript_file, &output_dir, force_overwrite)
                    })
                    .await
                    .context("Segmentation task panicked")
                    .and_then(|result| result);

                    progress_bar.inc(1);
                    (display_name, result)
                }
            })
            .buffer_unordered(self.config.concurrent_files)
            .collect::<Vec<_>>()
            .await;

        progress_bar.finish_with_message("Folder processing complete");

        let mut summary = FolderSummary::default();
        for (file_name, result) in results {
            match result {
                Ok(FileOutcome::Written(_)) => summary.processed += 1,
                Ok(FileOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.errors += 1;
                }
            }
        }

        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors in {}",
            summary.processed,
            summary.skipped,
            summary.errors,
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    /// Check an existing subtitle file against the configured rules
    pub fn analyze(&self, subtitle_file: &Path, language: Option<&str>) -> Result<QualityReport> {
        let language = self.config.resolve_language(language);
        let collection = SubtitleCollection::from_srt_file(subtitle_file, &language)?;
        let profile = LanguageProfile::for_language(&language, &self.config.subtitle);
        let rules = QualityRules::from_profile(&profile, &self.config.subtitle);

        Ok(ValidationService::new(&rules).analyze(&collection.entries))
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
