/*!
 * Tests for the application controller
 */

use anyhow::Result;
use captioner::app_config::{Config, SubtitleFormat};
use captioner::app_controller::{Controller, FileOutcome, FolderSummary};
use captioner::subtitle_processor::SubtitleCollection;
use crate::common;

fn controller() -> Controller {
    Controller::with_config(Config::default()).unwrap()
}

#[test]
fn test_processFile_withLatinTranscript_shouldWriteSrt() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let tokens = common::latin_tokens("Hello there. This is a short test transcript.", 0.0, 0.4);
    let input = common::create_test_transcript(temp_dir.path(), "talk.json", "eng", &tokens)?;
    let output_dir = temp_dir.path().join("subs");

    let outcome = controller().process_file(&input, &output_dir, false)?;

    let processed = match outcome {
        FileOutcome::Written(processed) => processed,
        FileOutcome::Skipped(path) => panic!("unexpected skip of {}", path.display()),
    };
    assert_eq!(processed.output, output_dir.join("talk.en.srt"));
    assert_eq!(processed.language, "eng");
    assert_eq!(processed.cue_count, 2);
    assert_eq!(processed.warning_count, 0);

    let collection = SubtitleCollection::from_srt_file(&processed.output, "en")?;
    assert_eq!(collection.entries.len(), 2);
    assert_eq!(collection.entries[0].text, "Hello there.");
    Ok(())
}

#[test]
fn test_processFile_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let tokens = common::latin_tokens("Short line.", 0.0, 0.5);
    let input = common::create_test_transcript(temp_dir.path(), "clip.json", "en", &tokens)?;
    let existing = common::create_test_file(temp_dir.path(), "clip.en.srt", "old content")?;

    let outcome = controller().process_file(&input, temp_dir.path(), false)?;
    assert!(matches!(outcome, FileOutcome::Skipped(ref path) if path == &existing));
    assert_eq!(std::fs::read_to_string(&existing)?, "old content");

    let outcome = controller().process_file(&input, temp_dir.path(), true)?;
    assert!(matches!(outcome, FileOutcome::Written(_)));
    assert!(std::fs::read_to_string(&existing)?.contains("Short line."));
    Ok(())
}

#[test]
fn test_processFile_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let missing = temp_dir.path().join("nothing.json");
    assert!(controller().process_file(&missing, temp_dir.path(), false).is_err());
    Ok(())
}

#[test]
fn test_processFile_withVttFormat_shouldUseVttExtension() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let tokens = common::cjk_tokens("你好。", 1.0, 0.3);
    let input = common::create_test_transcript(temp_dir.path(), "clip.json", "zho", &tokens)?;

    let mut config = Config::default();
    config.output.format = SubtitleFormat::Vtt;
    let controller = Controller::with_config(config)?;

    let outcome = controller.process_file(&input, temp_dir.path(), false)?;
    let FileOutcome::Written(processed) = outcome else {
        panic!("expected a written file");
    };
    assert_eq!(processed.output, temp_dir.path().join("clip.zh.vtt"));
    let content = std::fs::read_to_string(&processed.output)?;
    assert!(content.starts_with("WEBVTT"));
    assert!(content.contains("你好。"));
    Ok(())
}

#[test]
fn test_analyze_withWrittenSubtitles_shouldReportCompliance() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let tokens = common::latin_tokens(
        "The analysis command reads subtitles back from disk. It then checks them against the rules.",
        0.0,
        0.4,
    );
    let input = common::create_test_transcript(temp_dir.path(), "talk.json", "en", &tokens)?;
    let controller = controller();
    let FileOutcome::Written(processed) = controller.process_file(&input, temp_dir.path(), false)? else {
        panic!("expected a written file");
    };

    let report = controller.analyze(&processed.output, Some("en"))?;
    assert_eq!(report.total_entries, processed.cue_count);
    assert_eq!(report.counts.cpl_exceeded, 0);
    assert_eq!(report.counts.too_many_lines, 0);
    Ok(())
}

#[tokio::test]
async fn test_run_shouldCreateOutputDirectory() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let tokens = common::latin_tokens("Async single file run.", 0.0, 0.5);
    let input = common::create_test_transcript(temp_dir.path(), "one.json", "en", &tokens)?;
    let output_dir = temp_dir.path().join("nested/out");

    let outcome = controller().run(input, output_dir.clone(), false).await?;

    assert!(matches!(outcome, FileOutcome::Written(_)));
    assert!(output_dir.join("one.en.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_runFolder_withMixedFiles_shouldCountEachOutcome() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();

    let tokens = common::latin_tokens("First file in the folder.", 0.0, 0.5);
    common::create_test_transcript(root, "a.json", "en", &tokens)?;
    let tokens = common::cjk_tokens("第二个文件。", 0.0, 0.3);
    common::create_test_transcript(root, "nested/b.json", "zh", &tokens)?;
    let tokens = common::latin_tokens("Already done.", 0.0, 0.5);
    common::create_test_transcript(root, "c.json", "en", &tokens)?;
    common::create_test_file(root, "c.en.srt", "1\n00:00:00,000 --> 00:00:01,000\nAlready done.\n")?;
    common::create_test_file(root, "broken.json", "{ not json")?;

    let summary = controller().run_folder(root.to_path_buf(), false).await?;

    assert_eq!(
        summary,
        FolderSummary {
            processed: 2,
            skipped: 1,
            errors: 1,
        }
    );
    assert!(root.join("a.en.srt").exists());
    assert!(root.join("nested/b.zh.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_runFolder_withEmptyDirectory_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(controller().run_folder(temp_dir.path().to_path_buf(), false).await.is_err());
    Ok(())
}

#[test]
fn test_processChunks_withConsecutiveChunks_shouldWriteOneMergedFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let episode = temp_dir.path().join("episode");
    let tokens = common::latin_tokens("First chunk of the talk.", 0.0, 0.4);
    common::create_test_transcript(&episode, "part_001.json", "en", &tokens)?;
    let tokens = common::latin_tokens("Second chunk follows here.", 3.0, 0.4);
    common::create_test_transcript(&episode, "part_002.json", "en", &tokens)?;

    let FileOutcome::Written(processed) = controller().process_chunks(&episode, false)? else {
        panic!("expected a written file");
    };

    assert_eq!(processed.output, episode.join("episode.en.srt"));
    let collection = SubtitleCollection::from_srt_file(&processed.output, "en")?;
    let texts: Vec<&str> = collection.entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["First chunk of the talk.", "Second chunk follows here."]);
    assert_eq!(collection.entries[1].start_time_ms, 3000);

    let outcome = controller().process_chunks(&episode, false)?;
    assert!(matches!(outcome, FileOutcome::Skipped(_)));
    Ok(())
}

#[tokio::test]
async fn test_runChunks_withOverlappingChunks_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let episode = temp_dir.path().join("episode");
    let tokens = common::latin_tokens("Chunk one runs long.", 0.0, 0.5);
    common::create_test_transcript(&episode, "part_001.json", "en", &tokens)?;
    let tokens = common::latin_tokens("Chunk two restarts at zero.", 0.0, 0.5);
    common::create_test_transcript(&episode, "part_002.json", "en", &tokens)?;

    assert!(controller().run_chunks(episode.clone(), false).await.is_err());
    assert!(!episode.join("episode.en.srt").exists());
    Ok(())
}
