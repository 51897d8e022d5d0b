/*!
 * Reference captioning scenarios run through the whole engine
 */

use captioner::segmentation::{BreakReason, LanguageProfile, Token, group, segment, text_length};
use crate::common;

/// `n` Han characters without any punctuation
fn han(n: usize) -> String {
    "字幕分段引擎会把长句拆成两行显示".chars().cycle().take(n).collect()
}

#[test]
fn test_chineseSentence_withTwoCommas_shouldSplitAfterFirstClause() {
    common::init_logger();
    let first_clause = format!("{}，", han(33));
    let second_clause = format!("{}，", han(20));
    let last_clause = format!("{}。", han(13));
    let text = format!("{}{}{}", first_clause, second_clause, last_clause);
    assert_eq!(text.chars().count(), 69);

    let profile = LanguageProfile::cjk("zh");
    let result = segment(common::cjk_tokens(&text, 0.0, 0.09), &profile).unwrap();

    assert!(result.is_clean());
    assert_eq!(result.cues.len(), 2);

    // The first block ends on the first comma, not mid-clause
    let first = &result.cues[0];
    assert_eq!(first.lines.concat(), first_clause);
    let first_lengths: Vec<usize> = first.lines.iter().map(|l| text_length(l)).collect();
    assert_eq!(first_lengths, vec![25, 9]);

    // The second block breaks its lines after its own comma
    let second = &result.cues[1];
    assert_eq!(second.lines, vec![second_clause.clone(), last_clause.clone()]);
    let second_lengths: Vec<usize> = second.lines.iter().map(|l| text_length(l)).collect();
    assert_eq!(second_lengths, vec![21, 14]);

    let rendered: String = result.cues.iter().flat_map(|c| c.lines.iter()).map(String::as_str).collect();
    assert_eq!(rendered, text);
    assert!(!rendered.contains('…'));
    assert!(!rendered.contains("..."));
}

#[test]
fn test_latinRun_withoutPunctuation_shouldBreakOnWhitespaceOnly() {
    let text = "we keep talking without any punctuation at all because the recognizer \
                never gave us a single comma or period and the captions still have to \
                look reasonable on screen for everyone watching this video";
    let profile = LanguageProfile::latin("en");
    assert!(text_length(text) > 2 * profile.max_chars_per_line);

    let result = segment(common::latin_tokens(text, 0.0, 0.25), &profile).unwrap();

    assert!(result.cues.len() > 1);
    assert!(result.is_clean());
    let input_words: Vec<&str> = text.split_whitespace().collect();
    let mut output_words = Vec::new();
    for cue in &result.cues {
        assert!(cue.lines.len() <= 2);
        for line in &cue.lines {
            assert!(text_length(line) <= profile.max_chars_per_line, "line too long: {:?}", line);
            assert_eq!(line.trim(), line);
            output_words.extend(line.split_whitespace().map(str::to_string));
        }
    }
    // No word was cut or dropped
    assert_eq!(output_words, input_words);
}

#[test]
fn test_pauseMidSentence_shouldStartNewBlock() {
    let mut tokens = common::latin_tokens("so what I wanted", 0.0, 0.3);
    tokens.push(Token::spacing(1.2, 2.5));
    tokens.extend(common::latin_tokens("to say is this", 2.5, 0.3));

    let blocks = group(tokens, &LanguageProfile::latin("en")).unwrap();

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].break_reason(), BreakReason::LongPause);
    assert_eq!(blocks[0].text().trim(), "so what I wanted");
    assert_eq!(blocks[1].text().trim(), "to say is this");
    assert!((blocks[1].start() - 2.5).abs() < 1e-9);
}

#[test]
fn test_shortPause_shouldNotBreakBlock() {
    let mut tokens = common::latin_tokens("a short", 0.0, 0.3);
    tokens.push(Token::spacing(0.6, 1.0));
    tokens.extend(common::latin_tokens("hesitation", 1.0, 0.3));

    let blocks = group(tokens, &LanguageProfile::latin("en")).unwrap();

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].break_reason(), BreakReason::EndOfInput);
}

#[test]
fn test_japaneseWithSpeakers_shouldKeepSpeakersApart() {
    let mut tokens: Vec<Token> = common::cjk_tokens("こんにちは。", 0.0, 0.1)
        .into_iter()
        .map(|t| t.with_speaker("speaker_0"))
        .collect();
    tokens.extend(
        common::cjk_tokens("はい", 0.7, 0.1)
            .into_iter()
            .map(|t| t.with_speaker("speaker_1")),
    );
    tokens.extend(
        common::cjk_tokens("元気です", 0.9, 0.1)
            .into_iter()
            .map(|t| t.with_speaker("speaker_0")),
    );

    let result = segment(tokens, &LanguageProfile::cjk("ja")).unwrap();

    let texts: Vec<String> = result.cues.iter().map(|c| c.text()).collect();
    assert_eq!(texts, vec!["こんにちは。", "はい", "元気です"]);
    let speakers: Vec<Option<&str>> = result.cues.iter().map(|c| c.speaker_id.as_deref()).collect();
    assert_eq!(speakers, vec![Some("speaker_0"), Some("speaker_1"), Some("speaker_0")]);
}
