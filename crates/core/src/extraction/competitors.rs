use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::catalog::ReferenceData;
use crate::extraction::{compiled, competitor_subject};
use crate::search::SearchResponse;

static COMPETITOR_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Single entry returned when no competitor price could be found. Callers
/// must read it as "no data", never as a price.
pub const NO_COMPETITOR_PRICING: &str = "No competitor pricing found";

pub fn is_no_data(prices: &[String]) -> bool {
    prices.is_empty() || prices.iter().all(|price| price.to_lowercase().contains("no competitor pricing"))
}

/// Competitor price quotes for the project type (and region) named in
/// `response.query`. Never empty.
pub fn extract_competitor_prices(
    response: &SearchResponse,
    catalog: &dyn ReferenceData,
) -> Vec<String> {
    match competitor_subject(&response.query) {
        Some((project_type, region)) => {
            if let Some(prices) = catalog.competitor_prices(&project_type, region.as_deref()) {
                debug!(
                    event_name = "extraction.competitors.reference",
                    %project_type,
                    region = region.as_deref().unwrap_or("national"),
                    "using reference competitor prices"
                );
                return prices;
            }
        }
        None => {
            warn!(
                event_name = "extraction.competitors.malformed_query",
                query = %response.query,
                "could not derive project type from competitor query"
            );
            return vec![NO_COMPETITOR_PRICING.to_owned()];
        }
    }

    let Some(pattern) =
        compiled(&COMPETITOR_PATTERN, r"(?:₹|inr|rs\.?)\s*(\d+\.?\d*)\s*(per\s*\w+|\w+)")
    else {
        return vec![NO_COMPETITOR_PRICING.to_owned()];
    };

    let mut prices: Vec<String> = Vec::new();
    for content in response.snippets() {
        let content = content.to_lowercase();
        for captures in pattern.captures_iter(&content) {
            let (Some(amount), Some(unit)) = (captures.get(1), captures.get(2)) else {
                continue;
            };
            let price = format!("₹{} {}", amount.as_str(), unit.as_str());
            if !prices.contains(&price) {
                prices.push(price);
            }
        }
    }

    if prices.is_empty() {
        warn!(
            event_name = "extraction.competitors.miss",
            query = %response.query,
            "no competitor prices found in search results"
        );
        return vec![NO_COMPETITOR_PRICING.to_owned()];
    }
    debug!(event_name = "extraction.competitors.matched", count = prices.len(), "extracted competitor prices");
    prices
}

#[cfg(test)]
mod tests {
    use crate::catalog::{EmptyCatalog, SeedCatalog};
    use crate::extraction::{
        competitor_query, extract_competitor_prices, is_no_data, NO_COMPETITOR_PRICING,
    };
    use crate::search::{SearchHit, SearchResponse};

    fn response(query: &str, snippets: &[&str]) -> SearchResponse {
        SearchResponse::new(query, snippets.iter().map(|text| SearchHit::snippet(*text)).collect())
    }

    #[test]
    fn reference_prices_win_and_honor_region() {
        let national = response(&competitor_query("Residential Construction", None), &[]);
        assert_eq!(
            extract_competitor_prices(&national, &SeedCatalog),
            vec!["₹2000 per sqft (Contractor A)", "₹2100 per sqft (Contractor B)"]
        );

        let regional = response(&competitor_query("Commercial Construction", Some("Delhi")), &[]);
        let prices = extract_competitor_prices(&regional, &SeedCatalog);
        assert_eq!(prices.len(), 3);
        assert!(prices[2].contains("Ghaziabad"));
    }

    #[test]
    fn live_prices_keep_first_seen_order_without_duplicates() {
        let live = response(
            &competitor_query("Villa", Some("Goa")),
            &[
                "Builders quote ₹3200 per sqft for villas; others ask Rs 3500 per sqft.",
                "Most still charge ₹3200 per sqft in North Goa.",
            ],
        );

        assert_eq!(
            extract_competitor_prices(&live, &SeedCatalog),
            vec!["₹3200 per sqft", "₹3500 per sqft"]
        );
    }

    #[test]
    fn miss_yields_the_no_data_sentinel_never_an_empty_list() {
        let live = response(&competitor_query("Villa", None), &["Contact us for a quote."]);
        let prices = extract_competitor_prices(&live, &EmptyCatalog);

        assert_eq!(prices, vec![NO_COMPETITOR_PRICING]);
        assert!(is_no_data(&prices));

        let malformed = extract_competitor_prices(&SearchResponse::empty("villas"), &SeedCatalog);
        assert_eq!(malformed, vec![NO_COMPETITOR_PRICING]);
    }

    #[test]
    fn malformed_query_ignores_priced_snippets() {
        let live = response("villa builders", &["Villas from ₹2500 per sqft"]);
        let prices = extract_competitor_prices(&live, &EmptyCatalog);

        assert_eq!(prices, vec![NO_COMPETITOR_PRICING]);
    }

    #[test]
    fn real_prices_are_not_no_data() {
        assert!(!is_no_data(&["₹2000 per sqft".to_owned()]));
        assert!(is_no_data(&[]));
    }
}
