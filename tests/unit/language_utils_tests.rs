/*!
 * Tests for ISO language code utilities
 */

use mdlingo::language_utils::{get_language_name, normalize_to_part2t};

/// Codes of every form normalize to ISO 639-2/T
#[test]
fn test_normalizeToPart2t_withAllCodeForms_shouldReturnTerminologyCode() {
    assert_eq!(normalize_to_part2t("zh").unwrap(), "zho");
    assert_eq!(normalize_to_part2t("chi").unwrap(), "zho");
    assert_eq!(normalize_to_part2t("JPN").unwrap(), "jpn");
    assert!(normalize_to_part2t("english").is_err());
}

/// Display names used in the instruction
#[test]
fn test_getLanguageName_withCommonTargets_shouldReturnEnglishName() {
    assert_eq!(get_language_name("zh").unwrap(), "Chinese");
    assert_eq!(get_language_name("ja").unwrap(), "Japanese");
    assert_eq!(get_language_name("es").unwrap(), "Spanish");
    assert!(get_language_name("").is_err());
}
