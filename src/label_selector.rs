//! Label selector parsing for tracker-served lists
//!
//! Selector strings are parsed into a `kube::core::Selector`. Supported syntax:
//! - Equality: `key=value` or `key==value`
//! - Inequality: `key!=value`
//! - Set-based: `key in (value1,value2)` or `key notin (value1,value2)`
//! - Existence: `key` or `!key`
//! - Multiple selectors combined with commas: `key1=value1,key2 in (v2,v3)`

use crate::{Error, Result};
use kube::core::{Expression, Selector, SelectorExt};
use std::collections::{BTreeMap, BTreeSet};

/// Split a selector string by commas, but not inside parentheses
fn split_preserving_parentheses(selector: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut depth = 0;

    for (i, ch) in selector.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                result.push(&selector[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if start < selector.len() {
        result.push(&selector[start..]);
    }

    result
}

/// Parse a label selector string; an empty selector matches everything
///
/// # Examples
///
/// ```
/// use kube_reactor_client::label_selector::parse_label_selector;
///
/// let selector = parse_label_selector("app=myapp,env in (production,staging)").unwrap();
/// assert!(parse_label_selector("env in production").is_err());
/// ```
pub fn parse_label_selector(selector: &str) -> Result<Selector> {
    if selector.trim().is_empty() {
        return Ok(Selector::default());
    }

    let mut expressions = Vec::new();

    let requirements = split_preserving_parentheses(selector);

    for requirement in requirements {
        let requirement = requirement.trim();
        if requirement.is_empty() {
            continue;
        }

        if let Some((key, rest)) = requirement.split_once(" in ") {
            let values = parse_value_set(rest, requirement)?;
            expressions.push(Expression::In(key.trim().to_string(), values));
        } else if let Some((key, rest)) = requirement.split_once(" notin ") {
            let values = parse_value_set(rest, requirement)?;
            expressions.push(Expression::NotIn(key.trim().to_string(), values));
        } else if let Some(key) = requirement.strip_prefix('!') {
            expressions.push(Expression::DoesNotExist(key.trim().to_string()));
        } else if let Some((key, value)) = requirement.split_once("!=") {
            // NotIn with a single value is equivalent to !=
            expressions.push(Expression::NotIn(key.trim().to_string(), single(value)));
        } else if let Some((key, value)) = requirement
            .split_once("==")
            .or_else(|| requirement.split_once('='))
        {
            expressions.push(Expression::In(key.trim().to_string(), single(value)));
        } else {
            expressions.push(Expression::Exists(requirement.to_string()));
        }
    }

    // AND semantics across requirements
    Ok(Selector::from_iter(expressions))
}

/// Parse `(value1,value2)` of a set-based requirement
fn parse_value_set(rest: &str, requirement: &str) -> Result<BTreeSet<String>> {
    let rest = rest.trim();
    let inner = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| {
            Error::InvalidRequest(format!("Invalid set-based selector syntax: {}", requirement))
        })?;
    Ok(inner.split(',').map(|v| v.trim().to_string()).collect())
}

fn single(value: &str) -> BTreeSet<String> {
    BTreeSet::from([value.trim().to_string()])
}

/// Match labels against a label selector string
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use kube_reactor_client::label_selector::matches_label_selector;
///
/// let labels = BTreeMap::from([("app".to_string(), "myapp".to_string())]);
///
/// assert!(matches_label_selector(&labels, "app=myapp").unwrap());
/// assert!(!matches_label_selector(&labels, "app=other").unwrap());
/// ```
pub fn matches_label_selector(labels: &BTreeMap<String, String>, selector: &str) -> Result<bool> {
    let selector = parse_label_selector(selector)?;
    Ok(selector.matches(labels))
}
