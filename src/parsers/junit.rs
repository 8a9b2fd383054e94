//! Java JUnit XML parser (§4.6.5).
//!
//! Accepts both a `<testsuites>` root with multiple nested `<testsuite>`s
//! and a single bare `<testsuite>` root — both shapes appear in the wild
//! depending on the build tool. Malformed XML falls back to the Generic
//! parser with `exit_code` forced to 1, per design: unparseable structured
//! output is itself evidence of a broken run.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::model::{TestCaseResult, TestResult, TestStatus};
use crate::parsers::generic;

struct PendingCase {
    case: TestCaseResult,
    capture_tag: Option<&'static str>,
    capture_message: Option<String>,
    capture_text: String,
}

pub fn parse(text: &str) -> TestResult {
    parse_inner(text).unwrap_or_else(|| generic::parse(text, 1))
}

fn attr(e: &quick_xml::events::BytesStart, key: &str) -> Option<String> {
    e.attributes().flatten().find(|a| a.key.as_ref() == key.as_bytes()).map(|a| {
        String::from_utf8_lossy(&a.value).into_owned()
    })
}

fn parse_inner(text: &str) -> Option<TestResult> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut result = TestResult::empty();
    let mut pending: Option<PendingCase> = None;
    let mut saw_testsuite = false;

    loop {
        match reader.read_event() {
            Err(_) => return None,
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.name();
                let local = String::from_utf8_lossy(name.as_ref()).into_owned();
                match local.as_str() {
                    "testsuite" => {
                        saw_testsuite = true;
                        if let Some(time) = attr(&e, "time").and_then(|v| v.parse::<f64>().ok()) {
                            result.duration_ms += (time * 1000.0).round() as u64;
                        }
                    }
                    "testcase" => {
                        let mut case = TestCaseResult::new(
                            attr(&e, "name").unwrap_or_default(),
                            TestStatus::Passed,
                        );
                        case.suite = attr(&e, "classname");
                        case.duration_ms = attr(&e, "time")
                            .and_then(|v| v.parse::<f64>().ok())
                            .map(|t| (t * 1000.0).round() as u64)
                            .unwrap_or(0);
                        pending = Some(PendingCase {
                            case,
                            capture_tag: None,
                            capture_message: None,
                            capture_text: String::new(),
                        });
                    }
                    "skipped" => {
                        if let Some(p) = pending.as_mut() {
                            p.case.status = TestStatus::Skipped;
                        }
                    }
                    "failure" | "error" => {
                        let message = attr(&e, "message");
                        if let Some(p) = pending.as_mut() {
                            p.case.status = TestStatus::Failed;
                            p.capture_message = message;
                            p.capture_text.clear();
                            p.capture_tag = if local == "failure" {
                                Some("failure")
                            } else {
                                Some("error")
                            };
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(p) = pending.as_mut() {
                    if p.capture_tag.is_some() {
                        p.capture_text.push_str(&t.unescape().unwrap_or_default());
                    }
                }
            }
            Ok(Event::End(e)) => {
                let local = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match local.as_str() {
                    "failure" | "error" => {
                        if let Some(p) = pending.as_mut() {
                            p.case.error = p.capture_message.take();
                            if !p.capture_text.is_empty() {
                                p.case.output = Some(std::mem::take(&mut p.capture_text));
                            }
                            p.capture_tag = None;
                        }
                    }
                    "testcase" => {
                        if let Some(p) = pending.take() {
                            match p.case.status {
                                TestStatus::Passed => result.passed += 1,
                                TestStatus::Failed => result.failed += 1,
                                TestStatus::Skipped => result.skipped += 1,
                            }
                            result.test_cases.push(p.case);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    if !saw_testsuite {
        return None;
    }

    result.total = result.passed + result.failed + result.skipped;
    result.success = result.failed == 0;
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_testsuite_with_failure_and_skipped() {
        let xml = r#"<testsuite tests="3" failures="1" time="1.5">
            <testcase name="a" classname="Suite" time="0.5" />
            <testcase name="b" classname="Suite" time="0.5">
                <failure message="assertion failed">trace here</failure>
            </testcase>
            <testcase name="c" classname="Suite" time="0.5">
                <skipped/>
            </testcase>
        </testsuite>"#;
        let result = parse(xml);
        assert_eq!(result.total, 3);
        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.duration_ms, 1500);
        assert!(!result.success);
        let failed = result.test_cases.iter().find(|c| c.name == "b").unwrap();
        assert_eq!(failed.error.as_deref(), Some("assertion failed"));
        assert_eq!(failed.output.as_deref(), Some("trace here"));
    }

    #[test]
    fn multi_suite_testsuites_root() {
        let xml = r#"<testsuites>
            <testsuite name="A" time="1.0"><testcase name="a1" time="1.0" /></testsuite>
            <testsuite name="B" time="2.0"><testcase name="b1" time="2.0"><error message="boom">oops</error></testcase></testsuite>
        </testsuites>"#;
        let result = parse(xml);
        assert_eq!(result.total, 2);
        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.duration_ms, 3000);
    }

    #[test]
    fn malformed_xml_falls_back_to_generic_with_exit_code_forced() {
        let result = parse("not xml at all, just plain output, failed run");
        assert_eq!(result.failed, 1);
        assert!(!result.success);
    }
}
