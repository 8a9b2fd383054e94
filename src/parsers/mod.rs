//! Parser Bank (§4.6): framework dispatch plus per-framework parsers.
//!
//! Every parser here is a pure, total function of its input text — no
//! exceptions for malformed input, and none of them touch the filesystem or
//! a runtime. `parse` additionally enforces the handler-level post-condition
//! from Testable Property 5: a nonzero exit code forces `success = false`
//! even when a parser's own text-derived verdict disagrees.

pub mod cargo;
pub mod generic;
pub mod go;
pub mod jest;
pub mod junit;
pub mod pytest;

use crate::model::TestResult;

/// Dispatches by lowercased language and parses `output`, then applies the
/// exit-code veto (§4.6, §7).
///
/// `exit_code == -1` marks a non-normal termination (timeout, cancel, or a
/// wait-side error, per [`crate::model::RawResult`]) — `output` is then a
/// synthesized sentinel message ("Execution timed out", "Execution error:
/// ..."), not real framework output, so it is always routed through the
/// Generic parser regardless of language (§8 S5).
pub fn parse(language: &str, output: &str, exit_code: i32) -> TestResult {
    let mut result = if exit_code == -1 {
        generic::parse(output, exit_code)
    } else {
        match language.to_ascii_lowercase().as_str() {
            "go" => go::parse(output),
            "python" => pytest::parse(output),
            "node" | "javascript" | "typescript" => jest::parse(output),
            "java" => junit::parse(output),
            "rust" => cargo::parse(output),
            _ => generic::parse(output, exit_code),
        }
    };
    result.apply_exit_code(exit_code);
    result
}
