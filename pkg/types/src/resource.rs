//! Flat resource-name → quantity mappings and the primitives used to
//! compare them.

use std::collections::{BTreeMap, BTreeSet};

use crate::quantity::Quantity;

/// A flat mapping from resource name to amount.
///
/// Ordered so that error messages list resources deterministically.
pub type ResourceList = BTreeMap<String, Quantity>;

/// Check that every resource constrained by `b` is within it in `a`.
///
/// Only names present in both lists are compared. A resource in `a` that
/// `b` does not mention is unbounded and never reported.
pub fn less_than_or_equal(a: &ResourceList, b: &ResourceList) -> (bool, Vec<String>) {
    let exceeded: Vec<String> = b
        .iter()
        .filter_map(|(name, limit)| match a.get(name) {
            Some(value) if value > limit => Some(name.clone()),
            _ => None,
        })
        .collect();
    (exceeded.is_empty(), exceeded)
}

/// Names whose amount is below zero.
pub fn is_negative(a: &ResourceList) -> Vec<String> {
    a.iter()
        .filter(|(_, value)| value.is_negative())
        .map(|(name, _)| name.clone())
        .collect()
}

/// Restrict `a` to the given names. Names not in `a` are ignored.
pub fn mask<S: AsRef<str>>(a: &ResourceList, names: &[S]) -> ResourceList {
    names
        .iter()
        .filter_map(|name| {
            a.get_key_value(name.as_ref())
                .map(|(k, v)| (k.clone(), *v))
        })
        .collect()
}

/// Key-wise sum over the union of names.
pub fn add(a: &ResourceList, b: &ResourceList) -> ResourceList {
    let mut result = a.clone();
    for (name, value) in b {
        result
            .entry(name.clone())
            .and_modify(|existing| *existing = *existing + *value)
            .or_insert(*value);
    }
    result
}

/// Key-wise difference over the union of names. A name only in `b`
/// yields its negation.
pub fn subtract(a: &ResourceList, b: &ResourceList) -> ResourceList {
    let mut result = a.clone();
    for (name, value) in b {
        let existing = result.get(name).copied().unwrap_or_default();
        result.insert(name.clone(), existing - *value);
    }
    result
}

pub fn resource_names(a: &ResourceList) -> BTreeSet<String> {
    a.keys().cloned().collect()
}

/// Render as `name=amount` pairs for error messages.
pub fn format_resource_list(a: &ResourceList) -> String {
    a.iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}
