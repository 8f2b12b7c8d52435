//! Discovery filters
//!
//! Per resource-type path, an ordered list of compiled exclusion patterns.
//! A candidate name is excluded when any pattern matches the whole name.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;

/// A discover filter compiled once at load time.
///
/// The source pattern is wrapped as `^(?:…)$`, so a match always spans the
/// entire candidate name regardless of how the pattern itself is anchored.
#[derive(Clone)]
pub struct FilterPattern {
    source: String,
    regex: Regex,
}

impl FilterPattern {
    pub fn compile(source: &str) -> Result<Self, regex::Error> {
        // The source must stand alone; `a)|(b` is only valid once wrapped
        Regex::new(source)?;
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern text as written in the descriptor
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl fmt::Debug for FilterPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FilterPattern").field(&self.source).finish()
    }
}

impl PartialEq for FilterPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for FilterPattern {}

/// Filters for one resource-type path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    path: String,
    patterns: Vec<FilterPattern>,
}

impl FilterRule {
    pub(crate) fn new(path: String, patterns: Vec<FilterPattern>) -> Self {
        Self { path, patterns }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn patterns(&self) -> &[FilterPattern] {
        &self.patterns
    }

    /// First pattern, in descriptor order, that matches `name`
    pub fn first_match(&self, name: &str) -> Option<&FilterPattern> {
        self.patterns.iter().find(|p| p.matches(name))
    }
}

/// All discover filters of one descriptor
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    rules: Vec<FilterRule>,
    index: HashMap<String, usize>,
}

impl FilterRegistry {
    /// Build a registry; the caller has already rejected duplicate paths.
    pub(crate) fn new(rules: Vec<FilterRule>) -> Self {
        let index = rules
            .iter()
            .enumerate()
            .map(|(i, r)| (r.path.clone(), i))
            .collect();
        Self { rules, index }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule(&self, path: &str) -> Option<&FilterRule> {
        self.index.get(path).map(|&i| &self.rules[i])
    }

    /// Resource-type paths that have filters, in descriptor order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.path.as_str())
    }

    /// Whether `name` at `path` is a platform-internal artifact.
    ///
    /// A path without filters excludes nothing.
    pub fn is_excluded(&self, path: &str, name: &str) -> bool {
        self.matching_filter(path, name).is_some()
    }

    /// The pattern responsible for excluding `name`, if any
    pub fn matching_filter(&self, path: &str, name: &str) -> Option<&FilterPattern> {
        self.rule(path).and_then(|rule| rule.first_match(name))
    }

    /// Whether a name-less query for the whole folder is filtered.
    ///
    /// Any path that carries a rule set counts, even an empty one.
    pub fn excludes_folder(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }
}
