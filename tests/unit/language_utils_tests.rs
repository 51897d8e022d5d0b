/*!
 * Tests for language utility functions
 */

use captioner::language_utils::{
    LanguageCodeType, get_language_name, is_cjk_language, language_codes_match, normalize_to_part1_or_part2t,
    normalize_to_part2t, validate_language_code,
};

/// Test validation of language codes
#[test]
fn test_validate_language_code_withValidCodes_shouldReturnCorrectType() {
    assert!(matches!(validate_language_code("en").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("zh").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("eng").unwrap(), LanguageCodeType::Part2T));
    assert!(matches!(validate_language_code("zho").unwrap(), LanguageCodeType::Part2T));
    assert!(matches!(validate_language_code("fre").unwrap(), LanguageCodeType::Part2B));
    assert!(matches!(validate_language_code("chi").unwrap(), LanguageCodeType::Part2B));

    // Whitespace, case and region subtags
    assert!(matches!(validate_language_code(" EN ").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("zh-CN").unwrap(), LanguageCodeType::Part1));

    // Invalid codes
    assert!(validate_language_code("xyz").is_err());
    assert!(validate_language_code("123").is_err());
    assert!(validate_language_code("e").is_err());
}

/// Test normalization of language codes to ISO 639-2/T format
#[test]
fn test_normalize_to_part2t_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("chi").unwrap(), "zho");
    assert_eq!(normalize_to_part2t("ja-JP").unwrap(), "jpn");
    assert_eq!(normalize_to_part2t(" EN ").unwrap(), "eng");
}

#[test]
fn test_normalize_to_part1_or_part2t_shouldPreferTwoLetterCodes() {
    assert_eq!(normalize_to_part1_or_part2t("eng").unwrap(), "en");
    assert_eq!(normalize_to_part1_or_part2t("zho").unwrap(), "zh");
    assert_eq!(normalize_to_part1_or_part2t("cmn").unwrap(), "cmn");
    assert!(normalize_to_part1_or_part2t("xyz").is_err());
}

/// Test matching of different language code formats
#[test]
fn test_language_codes_match_withMatchingCodes_shouldReturnTrue() {
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("zh", "chi"));
    assert!(language_codes_match("zh-TW", "zho"));
    assert!(!language_codes_match("en", "fra"));
    assert!(!language_codes_match("xyz", "xyz"));
}

#[test]
fn test_is_cjk_language_shouldSelectCharacterCountedScripts() {
    for code in ["zh", "zho", "cmn", "yue", "ja", "jpn", "ko", "kor"] {
        assert!(is_cjk_language(code), "{} should be CJK", code);
    }
    for code in ["en", "fra", "de", "vi", "", "unknown"] {
        assert!(!is_cjk_language(code), "{} should not be CJK", code);
    }
}

/// Test retrieval of language names from codes
#[test]
fn test_get_language_name_withValidCodes_shouldReturnCorrectName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("fre").unwrap(), "French");
    assert_eq!(get_language_name("ja").unwrap(), "Japanese");
    assert!(get_language_name("xyz").is_err());
}
