//! Generic fallback parser (§4.6.6).
//!
//! Used for unrecognized languages and as the JUnit parser's malformed-XML
//! fallback. Keyword counting can double-count (`"passed"` also matches
//! inside `"PASSED tests/..."`); acceptable since this path is a last
//! resort (§9 Open Questions).

use crate::model::{TestCaseResult, TestResult, TestStatus};

pub fn parse(text: &str, exit_code: i32) -> TestResult {
    let lower = text.to_lowercase();
    let passed = count(&lower, &["passed", "pass:", " ok"]);
    let failed = count(&lower, &["failed", "failure", " fail "]);
    let skipped = count(&lower, &["skipped", "skip:"]);

    let mut result = TestResult::empty();

    if passed + failed + skipped > 0 {
        result.passed = passed as u32;
        result.failed = failed as u32;
        result.skipped = skipped as u32;
        result.total = result.passed + result.failed + result.skipped;
    } else {
        let status = if exit_code == 0 { TestStatus::Passed } else { TestStatus::Failed };
        let mut case = TestCaseResult::new("execution", status);
        match status {
            TestStatus::Passed => result.passed = 1,
            TestStatus::Failed => {
                result.failed = 1;
                case.output = Some(text.to_string());
            }
            TestStatus::Skipped => result.skipped = 1,
        }
        result.total = 1;
        result.test_cases.push(case);
    }

    result.success = result.failed == 0;
    result
}

fn count(haystack: &str, needles: &[&str]) -> usize {
    needles.iter().map(|n| haystack.matches(n).count()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_counting_when_recognizable_words_present() {
        let result = parse("1 passed, 0 failed", 0);
        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 1);
    }

    #[test]
    fn synthesizes_single_passed_case_on_clean_exit_with_no_keywords() {
        let result = parse("nothing recognizable here", 0);
        assert_eq!(result.total, 1);
        assert_eq!(result.passed, 1);
        assert!(result.success);
    }

    #[test]
    fn synthesizes_single_failed_case_on_nonzero_exit_with_no_keywords() {
        let result = parse("segmentation fault", 139);
        assert_eq!(result.total, 1);
        assert_eq!(result.failed, 1);
        assert!(!result.success);
        assert_eq!(result.test_cases[0].output.as_deref(), Some("segmentation fault"));
    }

    #[test]
    fn empty_input_with_nonzero_exit_is_one_failed_case() {
        let result = parse("", 1);
        assert_eq!(result.total, 1);
        assert!(!result.success);
    }
}
