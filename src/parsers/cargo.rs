//! Rust `cargo test` output parser (§4.6.4).

use regex::Regex;

use crate::model::{TestCaseResult, TestResult, TestStatus};

pub fn parse(text: &str) -> TestResult {
    let mut result = TestResult::empty();

    let case_re = Regex::new(r"(?m)^test\s+(\S+)\s+\.\.\.\s+(ok|FAILED|ignored)").unwrap();
    for caps in case_re.captures_iter(text) {
        let status = match &caps[2] {
            "ok" => TestStatus::Passed,
            "FAILED" => TestStatus::Failed,
            _ => TestStatus::Skipped,
        };
        result.test_cases.push(TestCaseResult::new(&caps[1], status));
    }

    let summary_re =
        Regex::new(r"test result:.*?(\d+) passed;\s+(\d+) failed;\s+(\d+) ignored").unwrap();
    if let Some(caps) = summary_re.captures(text) {
        result.passed = caps[1].parse().unwrap_or(0);
        result.failed = caps[2].parse().unwrap_or(0);
        result.skipped = caps[3].parse().unwrap_or(0);
        result.total = result.passed + result.failed + result.skipped;
    }

    result.success = result.failed == 0;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_with_ignored() {
        let output = "running 3 tests\ntest it_works ... ok\ntest it_breaks ... FAILED\ntest it_skips ... ignored\n\ntest result: FAILED. 1 passed; 1 failed; 1 ignored; 0 measured; 0 filtered out";
        let result = parse(output);
        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.total, 3);
        assert!(!result.success);
        assert_eq!(result.test_cases.len(), 3);
    }

    #[test]
    fn all_pass() {
        let output = "test a ... ok\ntest b ... ok\n\ntest result: ok. 2 passed; 0 failed; 0 ignored; 0 measured; 0 filtered out";
        let result = parse(output);
        assert_eq!(result.passed, 2);
        assert!(result.success);
    }

    #[test]
    fn no_summary_line_yields_empty_result() {
        let result = parse("Compiling foo v0.1.0");
        assert_eq!(result.total, 0);
        assert!(result.success);
    }
}
