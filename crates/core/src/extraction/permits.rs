use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::catalog::ReferenceData;
use crate::extraction::{compiled, permit_subject};
use crate::search::SearchResponse;

static PERMIT_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

const PERMIT_NAMES: &[(&str, &str)] = &[
    ("building permit", "Building Permit"),
    ("noc", "NOC"),
    ("municipal approval", "Municipal Approval"),
    ("environmental clearance", "Environmental Clearance"),
    ("urban development approval", "Urban Development Approval"),
];

const PERMIT_KEYWORDS: &[&str] = &["permit", "approval", "clearance"];

/// Comma-joined permit names for the city named in `response.query`.
pub fn extract_permits(response: &SearchResponse, catalog: &dyn ReferenceData) -> Option<String> {
    match permit_subject(&response.query) {
        Some(city) => {
            if let Some(permits) = catalog.city_permits(&city) {
                debug!(event_name = "extraction.permits.reference", %city, "using reference permits");
                return Some(permits.join(", "));
            }
        }
        None => {
            warn!(
                event_name = "extraction.permits.malformed_query",
                query = %response.query,
                "could not derive location from permit query"
            );
            return None;
        }
    }

    let pattern = compiled(
        &PERMIT_PATTERN,
        r"(building permit|noc|municipal approval|environmental clearance|urban development approval)",
    )?;

    let mut permits: Vec<&'static str> = Vec::new();
    for content in response.snippets() {
        let content = content.to_lowercase();
        if !PERMIT_KEYWORDS.iter().any(|keyword| content.contains(keyword)) {
            continue;
        }
        for found in pattern.find_iter(&content) {
            let name = canonical_name(found.as_str());
            if !permits.contains(&name) {
                permits.push(name);
            }
        }
    }

    if permits.is_empty() {
        warn!(event_name = "extraction.permits.miss", query = %response.query, "no permits found in search results");
        return None;
    }
    debug!(event_name = "extraction.permits.matched", count = permits.len(), "extracted permits from snippets");
    Some(permits.join(", "))
}

fn canonical_name(matched: &str) -> &'static str {
    PERMIT_NAMES
        .iter()
        .find(|(raw, _)| *raw == matched)
        .map(|(_, name)| *name)
        .unwrap_or("Building Permit")
}
