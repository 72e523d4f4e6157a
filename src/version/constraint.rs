//! Conda dependency constraint evaluation
//!
//! Supported syntax:
//! - `3.5.0`, `>=3.5.0` - implicit and explicit lower bound
//! - `<`, `<=`, `>`, `>=`, `==`, `=`, `!=` - comparison operators
//! - `>=3.5,<3.6.0a0` - comma joins clauses that must all hold
//! - `3.5.0|3.6.0` - pipe joins alternatives within a clause
//! - `3.5.*` - wildcard, equivalent to `>=3.5,<3.6a0`

use std::borrow::Cow;

use tracing::warn;

use crate::version::key::{Version, normalize};

/// Comparison operator of a single constraint clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Operator {
    /// Parse an operator token. An empty token means `>=`.
    fn parse(token: &str) -> Option<Self> {
        match token {
            "<" => Some(Operator::Lt),
            "<=" => Some(Operator::Le),
            ">" => Some(Operator::Gt),
            "" | ">=" => Some(Operator::Ge),
            "=" | "==" => Some(Operator::Eq),
            "!=" => Some(Operator::Ne),
            _ => None,
        }
    }

    /// Apply the operator as `lhs <op> rhs`
    pub fn apply(self, lhs: &Version, rhs: &Version) -> bool {
        match self {
            Operator::Lt => lhs < rhs,
            Operator::Le => lhs <= rhs,
            Operator::Gt => lhs > rhs,
            Operator::Ge => lhs >= rhs,
            Operator::Eq => lhs == rhs,
            Operator::Ne => lhs != rhs,
        }
    }
}

/// A single `(operator, version)` comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clause {
    pub operator: Operator,
    pub version: Version,
}

impl Clause {
    /// Parse text of the form `[<>=!]*\S+`
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let split = text
            .find(|c: char| !matches!(c, '<' | '>' | '=' | '!'))
            .unwrap_or(text.len());
        let (operator, version) = text.split_at(split);

        if version.is_empty() || version.contains(|c: char| c.is_whitespace() || c == '*') {
            return None;
        }

        Some(Self {
            operator: Operator::parse(operator)?,
            version: normalize(version),
        })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.operator.apply(version, &self.version)
    }
}

/// Expand a trailing wildcard into an explicit half-open range.
///
/// `1.2.*` becomes `>=1.2,<1.3a0`; the `a0` suffix keeps pre-releases of the
/// upper boundary out of the range. Strings without a trailing wildcard, or
/// whose truncated version is not purely numeric, are returned unchanged.
pub fn expand_wildcard(spec: &str) -> Cow<'_, str> {
    let trimmed = spec.trim();
    let Some(stem) = trimmed.strip_suffix('*') else {
        return Cow::Borrowed(spec);
    };
    let stem = stem.strip_suffix('.').unwrap_or(stem);
    let stem = stem
        .strip_prefix("==")
        .or_else(|| stem.strip_prefix('='))
        .unwrap_or(stem);

    if stem.is_empty() {
        return Cow::Owned(">=0".to_string());
    }

    let Ok(mut upper) = stem
        .split('.')
        .map(str::parse::<u64>)
        .collect::<Result<Vec<_>, _>>()
    else {
        warn!("Cannot expand wildcard in constraint '{}'", spec);
        return Cow::Borrowed(spec);
    };

    if let Some(last) = upper.last_mut() {
        *last = last.saturating_add(1);
    }
    let upper = upper
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".");

    Cow::Owned(format!(">={},<{}a0", stem, upper))
}

/// Evaluate one constraint spec (commas AND, pipes OR) against a normalized version.
///
/// Wildcards are expanded per alternative, so `3.5.*|3.6.*` is two ranges.
fn spec_matches(version: &Version, spec: &str) -> bool {
    spec.split(',').all(|and_part| {
        and_part.split('|').any(|or_part| {
            expand_wildcard(or_part).split(',').all(|text| {
                let Some(clause) = Clause::parse(text) else {
                    warn!("Failed to parse constraint '{}' in '{}'", text, spec);
                    return false;
                };
                clause.matches(version)
            })
        })
    })
}

/// Check whether a version satisfies any of the given constraint specs.
///
/// Specs in the list are alternatives; an empty list matches nothing.
pub fn satisfies<S: AsRef<str>>(version: &str, specs: &[S]) -> bool {
    let version = normalize(version);
    specs
        .iter()
        .any(|spec| spec_matches(&version, spec.as_ref()))
}
