use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::catalog::ReferenceData;
use crate::extraction::{compiled, price_subject};
use crate::search::SearchResponse;

static PRICE_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Unit price for the material named in `response.query`.
///
/// Reference data wins over live results. Otherwise the first snippet, in
/// service order, holding a rupee-prefixed amount decides.
pub fn extract_price(response: &SearchResponse, catalog: &dyn ReferenceData) -> Option<f64> {
    match price_subject(&response.query) {
        Some(material) => {
            if let Some(price) = catalog.material_price(&material) {
                debug!(event_name = "extraction.price.reference", %material, price, "using reference price");
                return Some(price);
            }
        }
        None => {
            warn!(
                event_name = "extraction.price.malformed_query",
                query = %response.query,
                "could not derive material from price query"
            );
            return None;
        }
    }

    let pattern = compiled(&PRICE_PATTERN, r"(?:₹|inr|rs\.?)\s*(\d+\.?\d*)")?;
    for content in response.snippets() {
        let content = content.to_lowercase();
        let amount = pattern
            .captures(&content)
            .and_then(|captures| captures.get(1))
            .and_then(|amount| amount.as_str().parse::<f64>().ok());
        if let Some(price) = amount {
            debug!(event_name = "extraction.price.matched", price, "extracted price from snippet");
            return Some(price);
        }
    }

    warn!(event_name = "extraction.price.miss", query = %response.query, "no price found in search results");
    None
}

#[cfg(test)]
mod tests {
    use crate::catalog::{EmptyCatalog, SeedCatalog};
    use crate::extraction::{extract_price, price_query};
    use crate::search::{SearchHit, SearchResponse};

    fn response(query: &str, snippets: &[&str]) -> SearchResponse {
        SearchResponse::new(query, snippets.iter().map(|text| SearchHit::snippet(*text)).collect())
    }

    #[test]
    fn reference_price_wins_over_live_content() {
        let live = response(&price_query("Bricks"), &["Bricks now sell at ₹12 per piece"]);
        assert_eq!(extract_price(&live, &SeedCatalog), Some(8.0));
        assert_eq!(extract_price(&live, &SeedCatalog), Some(8.0));

        let empty = SearchResponse::empty(price_query("bricks"));
        assert_eq!(extract_price(&empty, &SeedCatalog), Some(8.0));
    }

    #[test]
    fn first_matching_snippet_in_service_order_wins() {
        let live = response(
            &price_query("Granite"),
            &[
                "Granite slabs vary widely by finish.",
                "Typical rate: Rs. 145.50 per sqft in Bengaluru",
                "Premium granite at INR 300",
            ],
        );
        assert_eq!(extract_price(&live, &SeedCatalog), Some(145.5));
    }

    #[test]
    fn recognizes_symbol_and_inr_prefixes() {
        let symbol = response(&price_query("sand"), &["₹ 55 per cft"]);
        assert_eq!(extract_price(&symbol, &EmptyCatalog), Some(55.0));

        let inr = response(&price_query("sand"), &["INR60 per cft"]);
        assert_eq!(extract_price(&inr, &EmptyCatalog), Some(60.0));
    }

    #[test]
    fn miss_is_none_not_an_error() {
        let live = response(&price_query("Granite"), &["No pricing listed", "Call for quote"]);
        assert_eq!(extract_price(&live, &SeedCatalog), None);
    }

    #[test]
    fn malformed_query_is_a_miss_even_with_priced_snippets() {
        let live = response("bricks", &["bricks at rs 9 each"]);
        assert_eq!(extract_price(&live, &SeedCatalog), None);

        let nothing = response("", &[]);
        assert_eq!(extract_price(&nothing, &SeedCatalog), None);
    }
}
