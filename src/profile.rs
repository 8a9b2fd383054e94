//! Language Profile Registry (§4.2).
//!
//! A pure, process-global immutable mapping from language name to the
//! image/command/environment bundle used to run that language's tests.
//! Callers receive owned copies so per-request overrides (e.g. a command
//! override) never mutate shared state — the same "copy on resolve"
//! discipline the teacher applies to its provider configs.

use crate::config::schema::DEFAULT_IMAGE_PLACEHOLDER;

/// An immutable, resolved profile for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageProfile {
    pub image: String,
    pub work_dir: String,
    pub default_command: Vec<String>,
    pub env: Vec<(String, String)>,
}

fn profile(image: &str, work_dir: &str, command: &[&str], env: &[(&str, &str)]) -> LanguageProfile {
    LanguageProfile {
        image: image.to_string(),
        work_dir: work_dir.to_string(),
        default_command: command.iter().map(|s| s.to_string()).collect(),
        env: env.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
    }
}

/// Returns the canonical, built-in profile for `key`, or `None` if `key` is
/// not one of the registry's fixed keys. `javascript`/`typescript` alias to
/// the `node` profile.
fn builtin(key: &str) -> Option<LanguageProfile> {
    match key {
        "go" => Some(profile(
            "golang:1.22",
            "/workspace",
            &["go", "test", "./..."],
            &[("CGO_ENABLED", "0")],
        )),
        "python" => Some(profile(
            "python:3.12-slim",
            "/workspace",
            &["pytest"],
            &[("PYTHONDONTWRITEBYTECODE", "1")],
        )),
        "node" | "javascript" | "typescript" => Some(profile(
            "node:20-slim",
            "/workspace",
            &["npx", "jest"],
            &[("CI", "true")],
        )),
        "java" => Some(profile(
            "eclipse-temurin:21-jdk",
            "/workspace",
            &["mvn", "test"],
            &[],
        )),
        "rust" => Some(profile(
            "rust:1.79-slim",
            "/workspace",
            &["cargo", "test"],
            &[("CARGO_TERM_COLOR", "never")],
        )),
        "ruby" => Some(profile(
            "ruby:3.3-slim",
            "/workspace",
            &["bundle", "exec", "rspec"],
            &[],
        )),
        _ => None,
    }
}

/// Resolves a language name (case-insensitive) to a [`LanguageProfile`].
///
/// Unknown languages resolve to the `go` profile — a documented fallback,
/// not an error (§3 registry invariant, Testable Property 6). The
/// `override_image` rule: a non-empty override that is not the literal
/// default placeholder replaces the profile's image.
pub fn resolve(language: &str, override_image: &str) -> LanguageProfile {
    let key = language.to_ascii_lowercase();
    let mut p = builtin(&key).unwrap_or_else(|| builtin("go").expect("go profile always present"));

    if !override_image.is_empty() && override_image != DEFAULT_IMAGE_PLACEHOLDER {
        p.image = override_image.to_string();
    }

    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(resolve("Go", ""), resolve("go", ""));
    }

    #[test]
    fn javascript_and_typescript_alias_to_node() {
        assert_eq!(resolve("javascript", "").image, resolve("node", "").image);
        assert_eq!(resolve("typescript", "").image, resolve("node", "").image);
    }

    #[test]
    fn unknown_language_falls_back_to_go() {
        assert_eq!(resolve("cobol", ""), resolve("go", ""));
    }

    #[test]
    fn placeholder_override_is_a_no_op() {
        let base = resolve("python", "");
        let overridden = resolve("python", DEFAULT_IMAGE_PLACEHOLDER);
        assert_eq!(base.image, overridden.image);
    }

    #[test]
    fn non_placeholder_override_replaces_image() {
        let overridden = resolve("python", "my-registry/custom:latest");
        assert_eq!(overridden.image, "my-registry/custom:latest");
    }

    #[test]
    fn empty_override_is_a_no_op() {
        let base = resolve("rust", "");
        let overridden = resolve("rust", "");
        assert_eq!(base, overridden);
    }
}
