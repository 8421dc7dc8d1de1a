// birdidq-core/src/application/sanitizer.rs

// Recovers rule statements from a raw model completion.
// Models wrap answers in markdown fences and leak their reasoning; neither may reach the executor.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// A line starting with this opens a statement.
    pub statement_prefix: String,
    /// Markers that stop a line from being read as a continuation.
    pub deny_markers: Vec<String>,
    /// Markers of leaked reasoning; any hit switches to pattern extraction.
    pub contamination_markers: Vec<String>,
    /// Case-insensitive pattern used to pull statements out of contaminated text.
    pub fallback_pattern: String,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            statement_prefix: "validator.expect_".to_string(),
            deny_markers: strings(&[
                "we need",
                "actually",
                "wait",
                "so code:",
                "but",
                "output:",
                "means",
                "they'd use",
                "should use",
            ]),
            contamination_markers: strings(&[
                "we need to produce",
                "actually",
                "wait:",
                "so code:",
                "but the",
                "means",
            ]),
            fallback_pattern: r"validator\.expect_[a-z_]+\([^)]*\)".to_string(),
        }
    }
}

pub struct Sanitizer {
    config: SanitizerConfig,
    fallback: Option<Regex>,
    deny: Option<Regex>,
    contamination: Option<Regex>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        let config = SanitizerConfig::default();
        Self {
            fallback: compile(&config.fallback_pattern).ok(),
            deny: marker_regex(&config.deny_markers).ok().flatten(),
            contamination: marker_regex(&config.contamination_markers).ok().flatten(),
            config,
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// One case-insensitive alternation over `markers`, anchored on word boundaries
/// so that `but` does not fire inside `distribution`. `None` when the list is empty.
fn marker_regex(markers: &[String]) -> Result<Option<Regex>, regex::Error> {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let alternatives: Vec<String> = markers
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .map(|m| {
            let start = if is_word(m.chars().next()) { r"\b" } else { "" };
            let end = if is_word(m.chars().last()) { r"\b" } else { "" };
            format!("{start}{}{end}", regex::escape(m))
        })
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }
    compile(&alternatives.join("|")).map(Some)
}

impl Sanitizer {
    pub fn new(config: SanitizerConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            fallback: Some(compile(&config.fallback_pattern)?),
            deny: marker_regex(&config.deny_markers)?,
            contamination: marker_regex(&config.contamination_markers)?,
            config,
        })
    }

    /// Ordered candidate statements. Never fails; may return nothing.
    pub fn sanitize(&self, raw: &str) -> Vec<String> {
        let text = first_fenced_block(raw).unwrap_or(raw);

        let mut kept: Vec<String> = Vec::new();
        for line in text.lines().map(str::trim) {
            if line.starts_with(&self.config.statement_prefix) {
                kept.push(line.to_string());
                continue;
            }
            if line.is_empty() || has_marker(line, self.deny.as_ref()) {
                continue;
            }
            if let Some(last) = kept.last_mut()
                && open_parens(last)
            {
                last.push(' ');
                last.push_str(line);
            }
        }

        let contaminated = if kept.is_empty() {
            has_marker(text, self.contamination.as_ref())
        } else {
            kept.iter()
                .any(|s| has_marker(s, self.contamination.as_ref()))
        };

        if contaminated {
            debug!("Completion contains reasoning, falling back to pattern extraction");
            return self
                .fallback
                .iter()
                .flat_map(|re| re.find_iter(text))
                .map(|m| m.as_str().to_string())
                .collect();
        }
        kept
    }
}

fn has_marker(text: &str, markers: Option<&Regex>) -> bool {
    markers.is_some_and(|re| re.is_match(text))
}

/// Contents of the first ``` block, language tag dropped. An unclosed fence runs to the end.
fn first_fenced_block(raw: &str) -> Option<&str> {
    let start = raw.find("```")? + 3;
    let rest = &raw[start..];
    let body = match rest.find('\n') {
        Some(nl) if is_language_tag(&rest[..nl]) => &rest[nl + 1..],
        _ => rest,
    };
    Some(match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    })
}

fn is_language_tag(s: &str) -> bool {
    s.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+'))
}

fn open_parens(statement: &str) -> bool {
    let opened = statement.matches('(').count();
    let closed = statement.matches(')').count();
    opened > closed
}
