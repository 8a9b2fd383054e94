//! Python `pytest` output parser (§4.6.2).

use regex::Regex;

use crate::model::{TestCaseResult, TestResult, TestStatus};

pub fn parse(text: &str) -> TestResult {
    let mut result = TestResult::empty();

    let case_re = Regex::new(r"(\S+)\s+(PASSED|FAILED|SKIPPED)").unwrap();
    for line in text.lines() {
        if let Some(caps) = case_re.captures(line) {
            let status = match &caps[2] {
                "PASSED" => TestStatus::Passed,
                "FAILED" => TestStatus::Failed,
                _ => TestStatus::Skipped,
            };
            result.test_cases.push(TestCaseResult::new(&caps[1], status));
        }
    }

    let summary_re = Regex::new(
        r"(\d+) passed(?:, (\d+) failed)?(?:, (\d+) skipped)?(?:, (\d+) error)?\s+in ([0-9.]+)s",
    )
    .unwrap();
    if let Some(caps) = summary_re.captures(text) {
        result.passed = caps[1].parse().unwrap_or(0);
        result.failed = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        result.skipped = caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        result.total = result.passed + result.failed + result.skipped;
        let seconds: f64 = caps[5].parse().unwrap_or(0.0);
        result.duration_ms = (seconds * 1000.0).round() as u64;
    }

    if let Some(caps) = Regex::new(r"TOTAL\s+\d+\s+\d+\s+(\d+)%").unwrap().captures(text) {
        result.coverage_pct = caps[1].parse().unwrap_or(0.0);
    }

    result.success = result.failed == 0;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_summary_and_cases() {
        let output = "test_m.py::a PASSED\ntest_m.py::b FAILED\ntest_m.py::c SKIPPED\n1 passed, 1 failed, 1 skipped in 0.23s";
        let result = parse(output);
        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.total, 3);
        assert_eq!(result.duration_ms, 230);
        assert!(!result.success);
        assert_eq!(result.test_cases.len(), 3);
    }

    #[test]
    fn passed_only_summary() {
        let result = parse("test_m.py::a PASSED\n1 passed in 0.05s");
        assert_eq!(result.passed, 1);
        assert_eq!(result.total, 1);
        assert!(result.success);
    }

    #[test]
    fn coverage_total_line_is_captured() {
        let output = "1 passed in 0.01s\nName    Stmts   Miss  Cover\nTOTAL      40      4   90%";
        let result = parse(output);
        assert_eq!(result.coverage_pct, 90.0);
    }

    #[test]
    fn no_summary_line_yields_empty_result() {
        let result = parse("collected 0 items");
        assert_eq!(result.total, 0);
        assert!(result.success);
    }
}
