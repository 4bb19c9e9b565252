//! Expression safety filter
//!
//! A denylist heuristic over free-form expression text. It rejects anything that
//! looks like a code-execution primitive before the text reaches an evaluator.
//! This is a cheap pre-screen, not a sandbox: the evaluator must still be one that
//! cannot execute code.

use crate::error::{CalcError, Result};
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::{debug, error};

/// How a denylist entry is matched against the expression text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyPattern {
    /// Matches anywhere, e.g. `require` inside `require('fs')`
    Substring(&'static str),
    /// Matches only as a whole word, e.g. `for` but not `format`
    Word(&'static str),
}

/// Default denylist: module loading, reflective evaluation, function declaration,
/// arrow functions, control flow and variable declaration keywords.
pub const DEFAULT_DENYLIST: &[DenyPattern] = &[
    DenyPattern::Substring("import"),
    DenyPattern::Substring("require"),
    DenyPattern::Substring("eval"),
    DenyPattern::Substring("function"),
    DenyPattern::Substring("=>"),
    DenyPattern::Word("while"),
    DenyPattern::Word("for"),
    DenyPattern::Word("if"),
    DenyPattern::Word("return"),
    DenyPattern::Word("var"),
    DenyPattern::Word("let"),
    DenyPattern::Word("const"),
];

/// Predicate deciding whether an expression may be handed to an evaluator
pub trait ExpressionFilter: Send + Sync {
    fn is_safe(&self, expression: &str) -> bool;
}

/// Case-insensitive denylist matcher
#[derive(Debug, Clone)]
pub struct DenylistFilter {
    matchers: Vec<(DenyPattern, Regex)>,
}

impl DenylistFilter {
    /// Compile a filter from denylist entries
    pub fn new(patterns: &[DenyPattern]) -> Result<Self> {
        let matchers = patterns
            .iter()
            .map(|pattern| {
                let source = match pattern {
                    DenyPattern::Substring(text) => regex::escape(text),
                    DenyPattern::Word(word) => format!(r"\b{}\b", regex::escape(word)),
                };
                RegexBuilder::new(&source)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (*pattern, re))
                    .map_err(|e| CalcError::config(format!("Invalid denylist entry: {}", e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { matchers })
    }

    /// First denylist entry matched by the expression, if any
    pub fn first_match(&self, expression: &str) -> Option<DenyPattern> {
        self.matchers
            .iter()
            .find(|(_, re)| re.is_match(expression))
            .map(|(pattern, _)| *pattern)
    }
}

impl ExpressionFilter for DenylistFilter {
    fn is_safe(&self, expression: &str) -> bool {
        match self.first_match(expression) {
            Some(pattern) => {
                debug!("Expression rejected by denylist entry {:?}", pattern);
                false
            },
            None => true,
        }
    }
}

static DEFAULT_FILTER: LazyLock<Result<DenylistFilter>> =
    LazyLock::new(|| DenylistFilter::new(DEFAULT_DENYLIST));

/// Check an expression against the default denylist
///
/// Fails closed: if the default denylist could not be compiled every expression
/// is rejected.
pub fn is_safe(expression: &str) -> bool {
    match &*DEFAULT_FILTER {
        Ok(filter) => filter.is_safe(expression),
        Err(e) => {
            error!("Default denylist unavailable: {}", e);
            false
        },
    }
}
