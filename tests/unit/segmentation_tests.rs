/*!
 * Property tests for the segmentation engine
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use captioner::segmentation::{
    BreakReason, LanguageProfile, OverlongPolicy, QualityWarning, Token, format, group, segment, text_length,
};
use crate::common;

const LATIN_LETTERS: &[char] = &['a', 'e', 'i', 'o', 'u', 'n', 's', 't', 'r', 'l', 'm', 'p'];
const CJK_CHARS: &[char] = &['我', '们', '可', '能', '会', '采', '取', '暗', '访', '的', '形', '式'];

/// A random transcript with punctuation, pauses and speaker turns
fn random_latin_transcript(rng: &mut StdRng, word_count: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut t = 0.0;
    let mut speaker = 0;

    for i in 0..word_count {
        if i > 0 {
            tokens.push(Token::spacing(t, t).with_speaker(format!("speaker_{}", speaker)));
        }
        if rng.random_bool(0.05) {
            speaker = 1 - speaker;
        }

        let len = rng.random_range(1..12);
        let mut word: String = (0..len)
            .map(|_| LATIN_LETTERS[rng.random_range(0..LATIN_LETTERS.len())])
            .collect();
        match rng.random_range(0..20) {
            0 => word.push('.'),
            1 | 2 => word.push(','),
            3 => word.push('?'),
            _ => {}
        }

        let duration = rng.random_range(0.1..0.6);
        tokens.push(Token::word(word, t, t + duration).with_speaker(format!("speaker_{}", speaker)));
        t += duration;
        if rng.random_bool(0.08) {
            t += rng.random_range(0.5..2.0);
        }
    }

    tokens
}

fn random_cjk_transcript(rng: &mut StdRng, char_count: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut t = 0.0;

    for _ in 0..char_count {
        let mut text = CJK_CHARS[rng.random_range(0..CJK_CHARS.len())].to_string();
        match rng.random_range(0..30) {
            0 => text.push('。'),
            1 | 2 => text.push('，'),
            _ => {}
        }
        let duration = rng.random_range(0.05..0.3);
        tokens.push(Token::word(text, t, t + duration));
        t += duration;
    }

    tokens
}

fn assert_engine_properties(tokens: Vec<Token>, profile: &LanguageProfile) {
    let source: String = tokens.iter().map(|t| t.text.as_str()).collect();

    let blocks = group(tokens.clone(), profile).unwrap();
    for block in &blocks {
        let speakers: Vec<Option<&str>> = block
            .tokens()
            .iter()
            .filter(|t| t.is_significant())
            .map(|t| t.speaker_id.as_deref())
            .collect();
        assert!(speakers.windows(2).all(|w| w[0] == w[1]), "mixed speakers in {:?}", block.text());

        if block.significant_len() > 1 {
            assert!(
                block.duration() <= profile.max_duration_seconds + 1e-9,
                "block lasts {}s: {:?}",
                block.duration(),
                block.text()
            );
        }
    }

    let result = segment(tokens, profile).unwrap();
    assert_eq!(result.cues.len(), blocks.len());

    let rendered: String = result.cues.iter().flat_map(|c| c.lines.iter()).map(String::as_str).collect();
    assert_eq!(common::non_whitespace(&rendered), common::non_whitespace(&source));
    assert!(!rendered.contains('…'));

    for (index, cue) in result.cues.iter().enumerate() {
        assert!((1..=2).contains(&cue.lines.len()));
        let longest = cue.lines.iter().map(|l| text_length(l)).max().unwrap_or(0);
        if longest > profile.max_chars_per_line {
            assert!(result.warnings.iter().any(|w| matches!(
                w,
                QualityWarning::OverlongBlock { cue_index, .. } if *cue_index == index
            )));
        }
    }
}

#[test]
fn test_segment_withRandomLatinTranscripts_shouldHoldAllProperties() {
    common::init_logger();
    let mut rng = StdRng::seed_from_u64(7);
    let profile = LanguageProfile::latin("en");

    for _ in 0..50 {
        let word_count = rng.random_range(0..200);
        assert_engine_properties(random_latin_transcript(&mut rng, word_count), &profile);
    }
}

#[test]
fn test_segment_withRandomCjkTranscripts_shouldHoldAllProperties() {
    let mut rng = StdRng::seed_from_u64(11);
    let profile = LanguageProfile::cjk("zh");

    for _ in 0..50 {
        let char_count = rng.random_range(0..300);
        assert_engine_properties(random_cjk_transcript(&mut rng, char_count), &profile);
    }
}

#[test]
fn test_segment_withNarrowLines_shouldStillPreserveContent() {
    let mut rng = StdRng::seed_from_u64(3);
    let profile = LanguageProfile::latin("en").with_max_chars_per_line(8);

    for _ in 0..20 {
        assert_engine_properties(random_latin_transcript(&mut rng, 60), &profile);
    }
}

#[test]
fn test_format_withAlreadyFormattedLine_shouldReturnItUnchanged() {
    let profile = LanguageProfile::latin("en");
    let tokens = common::latin_tokens("this is one line that the formatter must leave alone", 0.0, 0.2);
    let result = segment(tokens, &profile).unwrap();

    for cue in &result.cues {
        for line in &cue.lines {
            assert_eq!(format(line, &profile).to_lines(), vec![line.clone()]);
        }
    }
}

#[test]
fn test_group_withSpeakerChange_shouldCloseBlockEvenMidSentence() {
    let tokens = vec![
        Token::word("so", 0.0, 0.2).with_speaker("a"),
        Token::spacing(0.2, 0.2).with_speaker("a"),
        Token::word("what", 0.2, 0.4).with_speaker("b"),
    ];
    let blocks = group(tokens, &LanguageProfile::latin("en")).unwrap();

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].break_reason(), BreakReason::SpeakerChange);
    assert_eq!(blocks[0].speaker_id(), Some("a"));
    assert_eq!(blocks[1].speaker_id(), Some("b"));
}

#[test]
fn test_segment_withUnbreakableWordAndAccept_shouldWarnAndKeepWord() {
    let profile = LanguageProfile::latin("de").with_max_chars_per_line(10);
    let tokens = vec![Token::word("Donaudampfschifffahrt", 0.0, 1.0)];
    let result = segment(tokens, &profile).unwrap();

    assert_eq!(result.cues[0].lines, vec!["Donaudampfschifffahrt"]);
    assert!(matches!(result.warnings[0], QualityWarning::OverlongBlock { longest_line: 21, .. }));
}

#[test]
fn test_segment_withUnbreakableWordAndHardCut_shouldCutWithoutLosingCharacters() {
    let profile = LanguageProfile::latin("de")
        .with_max_chars_per_line(10)
        .with_overlong_policy(OverlongPolicy::HardCut);
    let tokens = vec![Token::word("Donaudampfschifffahrt", 0.0, 1.0)];
    let result = segment(tokens, &profile).unwrap();

    assert_eq!(result.cues[0].lines, vec!["Donaudampf", "schifffahrt"]);
    assert_eq!(result.cues[0].lines.concat(), "Donaudampfschifffahrt");
}

#[test]
fn test_segment_withSingleLongToken_shouldReportDurationExceeded() {
    let profile = LanguageProfile::latin("en");
    let tokens = vec![Token::audio_event("(music)", 0.0, 12.0)];
    let result = segment(tokens, &profile).unwrap();

    assert_eq!(result.cues.len(), 1);
    assert!(result.cues[0].is_audio_event);
    assert!(matches!(result.warnings[0], QualityWarning::DurationExceeded { .. }));
}

#[test]
fn test_format_withEnglishInsideChinese_shouldNotCutEnglishWord() {
    let text = "我们今天要讨论的主题是 machine learning 在工业界的实际应用场景和挑战";
    let formatted = format(text, &LanguageProfile::cjk("zh"));
    assert_eq!(
        formatted.to_lines(),
        vec!["我们今天要讨论的主题是 machine", "learning 在工业界的实际应用场景和挑战"]
    );
}

#[test]
fn test_format_withKoreanSentence_shouldBreakOnlyBetweenWords() {
    let settings = captioner::app_config::SubtitleSettings::default();
    let profile = LanguageProfile::for_language("ko", &settings);
    let text = "오늘은 우리가 함께 이야기할 주제는 인공지능의미래와가능성입니다 여러분";
    let lines = format(text, &profile).to_lines();
    assert_eq!(lines, vec!["오늘은 우리가 함께 이야기할 주제는", "인공지능의미래와가능성입니다 여러분"]);
}

#[test]
fn test_format_withLargeNumber_shouldKeepDigitsTogether() {
    let profile = LanguageProfile::latin("en").with_max_chars_per_line(30);
    let lines = format("the firm reported revenue 1,250,000 dollars last year", &profile).to_lines();
    assert_eq!(lines, vec!["the firm reported revenue", "1,250,000 dollars last year"]);
}
