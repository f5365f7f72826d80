//! Turns free-text search output into typed domain values.
//!
//! Each query builder here writes the phrase its extractor later parses back
//! out of `SearchResponse::query`, so the two halves stay in one place.
//! Extractors never fail: a malformed query or a missing match is a miss,
//! logged and reported as `None` (or the no-data sentinel).

mod competitors;
mod permits;
mod price;

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

pub use competitors::{extract_competitor_prices, is_no_data, NO_COMPETITOR_PRICING};
pub use permits::extract_permits;
pub use price::extract_price;

const PRICE_SUBJECT: (&str, &[&str]) = ("price of ", &[" in"]);
const PERMIT_SUBJECT: (&str, &[&str]) = ("permits needed in ", &[",", " for "]);
const COMPETITOR_SUBJECT: (&str, &[&str]) = ("pricing for ", &[" projects"]);
const COMPETITOR_REGION: (&str, &[&str]) = ("projects in ", &[" india"]);

pub fn price_query(material: &str) -> String {
    format!("current price of {} in India 2025", material.trim())
}

pub fn permit_query(location: &str, project_type: &str) -> String {
    format!(
        "construction permits needed in {} for {} projects in India",
        location.trim(),
        project_type.trim()
    )
}

pub fn competitor_query(project_type: &str, location: Option<&str>) -> String {
    match location.map(str::trim).filter(|location| !location.is_empty()) {
        Some(location) => format!(
            "competitor pricing for {} projects in {location} India 2025 area-wise",
            project_type.trim()
        ),
        None => format!("competitor pricing for {} projects India 2025 area-wise", project_type.trim()),
    }
}

/// Material named by a `price_query`.
pub fn price_subject(query: &str) -> Option<String> {
    phrase_between(query, PRICE_SUBJECT)
}

/// City named by a `permit_query`.
pub fn permit_subject(query: &str) -> Option<String> {
    phrase_between(query, PERMIT_SUBJECT)
}

/// Project type and optional region named by a `competitor_query`.
pub fn competitor_subject(query: &str) -> Option<(String, Option<String>)> {
    let project_type = phrase_between(query, COMPETITOR_SUBJECT)?;
    Some((project_type, phrase_between(query, COMPETITOR_REGION)))
}

/// Lower-cased text after `start`, cut at the earliest of `ends`.
fn phrase_between(query: &str, (start, ends): (&str, &[&str])) -> Option<String> {
    let lowered = query.to_lowercase();
    let offset = lowered.find(start)? + start.len();
    let rest = &lowered[offset..];
    let cut = ends.iter().filter_map(|end| rest.find(end)).min().unwrap_or(rest.len());
    let phrase = rest[..cut].trim();
    (!phrase.is_empty()).then(|| phrase.to_owned())
}

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(error) => {
            warn!(
                event_name = "extraction.pattern_invalid",
                pattern,
                error = %error,
                "extraction pattern failed to compile"
            );
            None
        }
    })
    .as_ref()
}
