//! Query resolution by progressive truncation.
//!
//! A query such as `kitchen light dim 40` mixes a device label with a
//! command and its parameters. The resolver matches the whole query, the
//! query without its last word, and the query without its last two words,
//! and only commits to a device when exactly one of those readings isolates
//! a single device.

use regex::RegexBuilder;
use tracing::debug;

use super::matcher::match_devices;
use crate::commands::Catalog;
use crate::devices::Device;

/// Outcome of resolving a free-text query.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery<'a> {
    /// The single target device, if the query identifies one.
    pub device: Option<&'a Device>,
    /// Command word following the label. May be empty or partial.
    pub command_keyword: String,
    /// Words following the command.
    pub params: Vec<String>,
    /// Devices matching the effective query, to present when ambiguous.
    pub candidates: Vec<&'a Device>,
    /// The query after a label was isolated, otherwise the raw query.
    pub query: String,
}

impl ResolvedQuery<'_> {
    /// Returns true if several devices match and none was chosen.
    pub fn is_ambiguous(&self) -> bool {
        self.device.is_none() && self.candidates.len() > 1
    }
}

/// Resolves `raw_query` against a device snapshot.
pub fn resolve<'a>(raw_query: &str, devices: &'a [Device], catalog: &Catalog) -> ResolvedQuery<'a> {
    let capabilities = catalog.capabilities();
    let words: Vec<&str> = raw_query.split_whitespace().collect();

    let truncated = |drop: usize| words[..words.len().saturating_sub(drop)].join(" ");

    let full = match_devices(raw_query, devices, &capabilities);
    let drop_last = match_devices(&truncated(1), devices, &capabilities);
    let drop_last_two = match_devices(&truncated(2), devices, &capabilities);

    let mut device = None;
    let mut command_keyword = String::new();
    let mut params = Vec::new();
    let mut query = raw_query.to_string();

    if drop_last.len() == 1
        && (full.is_empty() || (full.len() == 1 && full[0].id == drop_last[0].id))
    {
        let target = drop_last[0];
        device = Some(target);
        if let Some(first) = leftover_words(raw_query, &target.label).into_iter().next() {
            command_keyword = first;
            query = target.label.clone();
        }
    } else if drop_last_two.len() == 1 && full.is_empty() && drop_last.is_empty() {
        let target = drop_last_two[0];
        device = Some(target);
        let mut leftover = leftover_words(raw_query, &target.label).into_iter();
        if let Some(first) = leftover.next() {
            command_keyword = first;
            params = leftover.collect();
            query = target.label.clone();
        }
    }

    let candidates = if query == raw_query {
        full
    } else {
        match_devices(&query, devices, &capabilities)
    };
    if device.is_none() && candidates.len() == 1 {
        device = Some(candidates[0]);
    }

    debug!(
        raw_query,
        device = device.map(|d| d.label.as_str()),
        command_keyword = command_keyword.as_str(),
        ?params,
        candidates = candidates.len(),
        "resolved query"
    );

    ResolvedQuery {
        device,
        command_keyword,
        params,
        candidates,
        query,
    }
}

/// Removes every occurrence of `label` from `query`, ignoring case, and
/// returns the remaining words.
fn leftover_words(query: &str, label: &str) -> Vec<String> {
    let stripped = match RegexBuilder::new(&regex::escape(label))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern.replace_all(query, " ").into_owned(),
        Err(_) => query.replace(label, " "),
    };
    stripped.split_whitespace().map(str::to_string).collect()
}
