//! Fuzzy device matching.
//!
//! Scores a query fragment against device labels. Each space-separated word
//! of the fragment must match the label on its own; word scores are summed
//! and only confident matches are kept.

use std::collections::{BTreeSet, HashSet};

use crate::devices::Device;

/// Minimum total score a device needs to be returned. Exclusive.
pub const MIN_SCORE: f64 = 80.0;

/// Scores one query word against one label.
pub trait Scorer {
    /// Returns a positive score when `word` matches `label`, 0.0 otherwise.
    fn score(&self, label: &str, word: &str) -> f64;
}

/// Prefix, whole-word, initials and substring scoring.
///
/// Longer labels score lower for the same word, so more specific matches
/// rank first.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordScorer;

impl Scorer for WordScorer {
    fn score(&self, label: &str, word: &str) -> f64 {
        if word.is_empty() || label.is_empty() {
            return 0.0;
        }

        let label_lower = label.to_lowercase();
        let word = word.to_lowercase();

        let label_chars: HashSet<char> = label_lower.chars().collect();
        if !word.chars().all(|c| label_chars.contains(&c)) {
            return 0.0;
        }

        let label_len = label.chars().count() as f64;
        let word_len = word.chars().count() as f64;

        if label_lower.starts_with(&word) {
            return 100.0 - label_len / word_len;
        }

        let atoms: Vec<&str> = label_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|a| !a.is_empty())
            .collect();
        if atoms.iter().any(|a| *a == word) {
            return 100.0 - label_len / word_len;
        }

        let initials: String = atoms.iter().filter_map(|a| a.chars().next()).collect();
        if initials.starts_with(&word) {
            return 95.0 - initials.chars().count() as f64 / word_len;
        }

        if label_lower.contains(&word) {
            return 90.0 - label_len / word_len;
        }

        0.0
    }
}

/// Returns the search key of a device: its label if it exposes at least one
/// capability in `capabilities`, otherwise an empty key that matches nothing.
pub fn search_key<'a>(device: &'a Device, capabilities: &BTreeSet<&str>) -> &'a str {
    if device
        .capabilities
        .iter()
        .any(|c| capabilities.contains(c.as_str()))
    {
        &device.label
    } else {
        ""
    }
}

/// Scores a whole fragment against a key. Any non-matching word drops the key.
pub fn score_fragment(scorer: &dyn Scorer, key: &str, fragment: &str) -> f64 {
    let mut total = 0.0;
    for word in fragment.split(' ').filter(|w| !w.is_empty()) {
        let score = scorer.score(key, word);
        if score <= 0.0 {
            return 0.0;
        }
        total += score;
    }
    total
}

/// Returns the devices matching `fragment`, best first.
///
/// Ties are broken by label, case-insensitively. When the best match's label
/// equals the fragment, it is returned alone.
pub fn match_devices<'a>(
    fragment: &str,
    devices: &'a [Device],
    capabilities: &BTreeSet<&str>,
) -> Vec<&'a Device> {
    match_devices_with(&WordScorer, fragment, devices, capabilities)
}

/// [`match_devices`] with a custom scorer.
pub fn match_devices_with<'a>(
    scorer: &dyn Scorer,
    fragment: &str,
    devices: &'a [Device],
    capabilities: &BTreeSet<&str>,
) -> Vec<&'a Device> {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, String, &Device)> = devices
        .iter()
        .filter_map(|device| {
            let score = score_fragment(scorer, search_key(device, capabilities), fragment);
            (score > MIN_SCORE).then(|| (score, device.label.to_lowercase(), device))
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let mut matches: Vec<&Device> = scored.into_iter().map(|(_, _, d)| d).collect();
    if matches
        .first()
        .is_some_and(|best| best.label.to_lowercase() == fragment.to_lowercase())
    {
        matches.truncate(1);
    }
    matches
}
