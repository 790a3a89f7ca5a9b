use once_cell::sync::Lazy;
use regex::Regex;

/// Route prefix for internal document links.
pub const DOCUMENT_ROUTE_PREFIX: &str = "/documents/";

/// Matches `[text](/documents/<id>)`; group 2 is the target id.
static DOCUMENT_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]]+)\]\(/documents/([^)]+)\)").expect("document link pattern is valid")
});

/// Extract the target ids of all internal document links in markdown content.
///
/// Only anchors whose destination starts with exactly `/documents/` count.
/// Ids are returned in order of appearance, not deduplicated and not
/// validated: `[a](/documents/x#y)` yields `x#y`.
pub fn extract_document_links(markdown: &str) -> Vec<String> {
    DOCUMENT_LINK_RE
        .captures_iter(markdown)
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Collapse repeated target ids, keeping the first occurrence of each.
///
/// Applied when a link list is persisted, so one save yields at most one
/// edge per `(source, target)` pair.
pub fn dedup_targets(targets: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(targets.len());
    for target in targets {
        if !unique.contains(&target) {
            unique.push(target);
        }
    }
    unique
}

/// The route of a document's view page.
pub fn document_href(id: &str) -> String {
    format!("{DOCUMENT_ROUTE_PREFIX}{id}")
}
