//! Header-to-canonical-field mapping.
//!
//! Matching is two-pass per header: an exact pass over the whole alias table
//! first, then a substring pass, both in alias-table declaration order. A
//! field is claimed by the first header that matches it and never reassigned
//! within one import, so the mapping is one-to-one and deterministic for a
//! fixed header list and vocabulary.

use std::collections::{BTreeMap, BTreeSet};

use crate::{fields::CanonicalField, vocab::Vocabulary};

/// Resolved header→field assignment for one import batch.
#[derive(Debug, Clone)]
pub struct HeaderMapping {
    /// Keyed by lower-cased input header.
    pub assignments: BTreeMap<String, CanonicalField>,
    /// Headers that matched no unclaimed field, in input order.
    pub unmapped: Vec<String>,
}

impl HeaderMapping {
    pub fn field_for(&self, header: &str) -> Option<CanonicalField> {
        self.assignments.get(&header.to_lowercase()).copied()
    }
}

/// Lower-cases, splits camelCase word boundaries, and folds every run of
/// non-alphanumeric characters into a single space.
fn normalize_header(raw: &str) -> String {
    let mut spaced = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for ch in raw.chars() {
        if ch.is_alphanumeric() {
            if prev_lower && ch.is_uppercase() {
                spaced.push(' ');
            }
            prev_lower = ch.is_lowercase();
            spaced.push(ch);
        } else {
            prev_lower = false;
            spaced.push(' ');
        }
    }
    spaced
        .split_whitespace()
        .map(|token| token.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn compact(normalized: &str) -> String {
    normalized.replace(' ', "")
}

fn exact_match(header: &str, alias: &str) -> bool {
    compact(&normalize_header(header)) == compact(&normalize_header(alias))
}

fn fuzzy_match(header: &str, alias: &str) -> bool {
    let h = compact(&normalize_header(header));
    let a = compact(&normalize_header(alias));
    if h.is_empty() || a.is_empty() {
        return false;
    }
    h.contains(&a) || a.contains(&h)
}

/// Maps input headers (in column order) onto canonical fields, one-to-one,
/// first match wins. Headers that match nothing are not an error; they are
/// surfaced in [`HeaderMapping::unmapped`] so the import can report them.
pub fn map_headers(vocab: &Vocabulary, headers: &[String]) -> HeaderMapping {
    let mut assignments: BTreeMap<String, CanonicalField> = BTreeMap::new();
    let mut claimed: BTreeSet<CanonicalField> = BTreeSet::new();
    let mut unmapped = Vec::new();

    for header in headers {
        let key = header.to_lowercase();
        if assignments.contains_key(&key) {
            // duplicate header string; the leftmost occurrence already claimed
            unmapped.push(header.clone());
            continue;
        }
        let hit = find_field(vocab, &claimed, header, exact_match)
            .or_else(|| find_field(vocab, &claimed, header, fuzzy_match));
        match hit {
            Some(field) => {
                claimed.insert(field);
                assignments.insert(key, field);
            }
            None => unmapped.push(header.clone()),
        }
    }

    HeaderMapping {
        assignments,
        unmapped,
    }
}

/// Resolves a single surface name (e.g. a filter key from a parsed edit
/// instruction) against the alias table, without claim bookkeeping.
pub fn resolve_field(vocab: &Vocabulary, name: &str) -> Option<CanonicalField> {
    let unclaimed = BTreeSet::new();
    find_field(vocab, &unclaimed, name, exact_match)
        .or_else(|| find_field(vocab, &unclaimed, name, fuzzy_match))
}

fn find_field(
    vocab: &Vocabulary,
    claimed: &BTreeSet<CanonicalField>,
    header: &str,
    matches: fn(&str, &str) -> bool,
) -> Option<CanonicalField> {
    for entry in &vocab.aliases {
        if claimed.contains(&entry.field) {
            continue;
        }
        if entry.aliases.iter().any(|alias| matches(header, alias)) {
            return Some(entry.field);
        }
    }
    None
}
