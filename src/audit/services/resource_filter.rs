use crate::audit::domain::ResourceRecord;
use crate::shared::Result;
use std::cell::Cell;

/// Maximum number of exclude patterns to prevent DoS attacks
const MAX_EXCLUDE_PATTERNS: usize = 64;

/// Maximum length of a single exclude pattern to prevent DoS attacks
const MAX_PATTERN_LENGTH: usize = 255;

/// ResourceFilter - Drops resources whose id matches an exclusion pattern
///
/// Supports wildcard patterns using '*' to match zero or more characters.
/// Patterns are case-sensitive, anchored at both ends, and validated
/// against a character whitelist.
#[derive(Debug)]
pub struct ResourceFilter {
    patterns: Vec<ExcludePattern>,
}

impl ResourceFilter {
    /// Creates a new ResourceFilter from raw pattern strings
    ///
    /// # Errors
    /// - Too many patterns (> MAX_EXCLUDE_PATTERNS)
    /// - Invalid pattern format (length, characters)
    pub fn new(patterns: Vec<String>) -> Result<Self> {
        if patterns.len() > MAX_EXCLUDE_PATTERNS {
            anyhow::bail!(
                "Too many exclusion patterns: {} (maximum: {})",
                patterns.len(),
                MAX_EXCLUDE_PATTERNS
            );
        }

        let patterns = patterns
            .into_iter()
            .map(ExcludePattern::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns only the resources that don't match any exclusion pattern
    ///
    /// Excluding every resource is allowed; the audit then runs over an
    /// empty inventory.
    pub fn filter_resources(&self, resources: Vec<ResourceRecord>) -> Vec<ResourceRecord> {
        resources
            .into_iter()
            .filter(|resource| !self.matches(resource.id()))
            .collect()
    }

    fn matches(&self, resource_id: &str) -> bool {
        // Evaluate every pattern so each one records whether it matched
        self.patterns
            .iter()
            .fold(false, |hit, p| p.matches(resource_id) || hit)
    }

    /// Patterns that did not match any resource
    ///
    /// Call after filtering.
    pub fn unmatched_patterns(&self) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|p| !p.matched.get())
            .map(|p| p.original.clone())
            .collect()
    }
}

#[derive(Debug)]
struct ExcludePattern {
    original: String,
    matcher: PatternMatcher,
    matched: Cell<bool>,
}

impl ExcludePattern {
    fn new(pattern: String) -> Result<Self> {
        validate_pattern(&pattern)?;
        let matcher = compile_pattern(&pattern);

        Ok(Self {
            original: pattern,
            matcher,
            matched: Cell::new(false),
        })
    }

    fn matches(&self, resource_id: &str) -> bool {
        let is_match = self.matcher.matches(resource_id);
        if is_match {
            self.matched.set(true);
        }
        is_match
    }
}

#[derive(Debug)]
enum PatternMatcher {
    /// "i-0abc"
    Exact(String),
    /// "*-legacy"
    EndsWith(String),
    /// "i-legacy-*"
    StartsWith(String),
    /// "*legacy*"
    Contains(String),
    /// "arn:*:orders*dlq"; first and last segments are anchored
    Segments(Vec<String>),
}

impl PatternMatcher {
    fn matches(&self, resource_id: &str) -> bool {
        match self {
            PatternMatcher::Exact(s) => resource_id == s,
            PatternMatcher::EndsWith(suffix) => resource_id.ends_with(suffix.as_str()),
            PatternMatcher::StartsWith(prefix) => resource_id.starts_with(prefix.as_str()),
            PatternMatcher::Contains(middle) => resource_id.contains(middle.as_str()),
            PatternMatcher::Segments(parts) => match_segments(parts, resource_id),
        }
    }
}

/// Glob match for a pattern split on '*'
///
/// `parts[0]` must be a prefix and the last part a suffix; empty parts come
/// from leading/trailing wildcards and match anything.
fn match_segments(parts: &[String], text: &str) -> bool {
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return text.is_empty(),
    };
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return text == first,
    };

    if !text.starts_with(first.as_str()) {
        return false;
    }
    let mut remaining = &text[first.len()..];
    if remaining.len() < last.len() || !remaining.ends_with(last.as_str()) {
        return false;
    }
    remaining = &remaining[..remaining.len() - last.len()];

    for part in middle.iter().filter(|p| !p.is_empty()) {
        match remaining.find(part.as_str()) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }
    true
}

fn validate_pattern(pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        anyhow::bail!("Exclusion pattern cannot be empty");
    }

    if pattern.len() > MAX_PATTERN_LENGTH {
        anyhow::bail!(
            "Exclusion pattern is too long: '{}' ({} chars). Maximum: {} chars",
            pattern,
            pattern.len(),
            MAX_PATTERN_LENGTH
        );
    }

    if let Some(ch) = pattern.chars().find(|c| !is_valid_pattern_char(*c)) {
        anyhow::bail!(
            "Exclusion pattern contains invalid character '{}' in pattern '{}'. \
             Only alphanumeric, hyphens, underscores, dots, colons, slashes, \
             and asterisks (*) are allowed.",
            ch,
            pattern
        );
    }

    if pattern.chars().all(|c| c == '*') {
        anyhow::bail!(
            "Exclusion pattern cannot contain only wildcards: '{}'",
            pattern
        );
    }

    Ok(())
}

/// Resource ids are instance/volume ids, ARNs and queue URLs
fn is_valid_pattern_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '/' | '*')
}

fn compile_pattern(pattern: &str) -> PatternMatcher {
    let wildcard_count = pattern.matches('*').count();
    let inner = pattern.trim_matches('*');

    match wildcard_count {
        0 => PatternMatcher::Exact(pattern.to_string()),
        1 if pattern.starts_with('*') => PatternMatcher::EndsWith(inner.to_string()),
        1 if pattern.ends_with('*') => PatternMatcher::StartsWith(inner.to_string()),
        2 if pattern.starts_with('*') && pattern.ends_with('*') && !inner.contains('*') => {
            PatternMatcher::Contains(inner.to_string())
        }
        _ => PatternMatcher::Segments(pattern.split('*').map(str::to_string).collect()),
    }
}
