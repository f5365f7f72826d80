//! The request/result mapping threaded through workflows.
//!
//! `State` stays an open JSON object at the boundary so front ends can send
//! whatever they collected. Agents parse the fields they own into typed
//! requests; nothing downstream indexes the map without a default.

use serde_json::{json, Map, Value};

pub const DEFAULT_PRICE: f64 = 100.0;
pub const DEFAULT_COMPETITOR_PRICES: &str = "No data";
pub const DEFAULT_SCHEDULE: &str = "No schedule";
pub const DEFAULT_PERMITS: &str = "No permit information";
pub const DEFAULT_OPTIMAL_BID: &str = "No bid suggestion";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct State {
    fields: Map<String, Value>,
}

impl State {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Field defaults every workflow starts from.
    pub fn defaults() -> Self {
        let mut fields = Map::new();
        fields.insert("material".to_owned(), json!(""));
        fields.insert("price".to_owned(), json!(DEFAULT_PRICE));
        fields.insert("project_type".to_owned(), json!(""));
        fields.insert("competitor_prices".to_owned(), json!([DEFAULT_COMPETITOR_PRICES]));
        fields.insert("quantity".to_owned(), json!(1));
        fields.insert("labor_cost".to_owned(), json!(0.0));
        fields.insert("total_cost".to_owned(), json!(0.0));
        fields.insert("project_details".to_owned(), json!(""));
        fields.insert("schedule".to_owned(), json!(DEFAULT_SCHEDULE));
        fields.insert("location".to_owned(), json!(""));
        fields.insert("permits".to_owned(), json!(DEFAULT_PERMITS));
        fields.insert("project_data".to_owned(), json!(""));
        fields.insert("optimal_bid".to_owned(), json!(DEFAULT_OPTIMAL_BID));
        fields.insert("error".to_owned(), Value::Null);
        Self { fields }
    }

    /// Coerces raw input into a state. Keys present in a mapping win over the
    /// defaults; any non-mapping input yields the all-default state.
    pub fn normalize(raw: Value) -> Self {
        let mut state = Self::defaults();
        if let Value::Object(fields) = raw {
            state.merge(fields);
        }
        state
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Trimmed string field. Absent, null, non-string, and blank values all
    /// read as `None`.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str).map(str::trim).filter(|value| !value.is_empty())
    }

    /// Numeric field. Numeric strings are accepted since front ends often
    /// forward raw form text. `Err` carries the offending value's kind.
    pub fn number(&self, key: &str) -> Result<Option<f64>, String> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(number)) => Ok(number.as_f64()),
            Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
            Some(Value::String(raw)) => {
                raw.trim().parse::<f64>().map(Some).map_err(|_| format!("string `{}`", raw.trim()))
            }
            Some(other) => Err(value_kind(other).to_owned()),
        }
    }

    pub fn error(&self) -> Option<&Value> {
        self.fields.get("error").filter(|value| !value.is_null())
    }

    pub fn has_error(&self) -> bool {
        self.error().is_some()
    }

    pub fn merge(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            self.fields.insert(key, value);
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for State {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// True when a result mapping carries a non-null `error`.
pub fn has_error(fields: &Map<String, Value>) -> bool {
    fields.get("error").is_some_and(|value| !value.is_null())
}

pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::state::{has_error, value_kind, State, DEFAULT_PERMITS, DEFAULT_PRICE};

    #[test]
    fn normalize_fills_documented_defaults() {
        let state = State::normalize(json!({ "material": "Bricks" }));

        assert_eq!(state.text("material"), Some("Bricks"));
        assert_eq!(state.get("price"), Some(&json!(DEFAULT_PRICE)));
        assert_eq!(state.get("competitor_prices"), Some(&json!(["No data"])));
        assert_eq!(state.get("quantity"), Some(&json!(1)));
        assert_eq!(state.get("permits"), Some(&json!(DEFAULT_PERMITS)));
        assert_eq!(state.get("error"), Some(&json!(null)));
        assert!(!state.has_error());
    }

    #[test]
    fn non_mapping_input_becomes_all_default_state() {
        for raw in [json!("bricks"), json!(42), json!(null), json!(["material"])] {
            assert_eq!(State::normalize(raw), State::defaults());
        }
    }

    #[test]
    fn blank_text_reads_as_absent() {
        let state = State::normalize(json!({ "location": "   ", "material": 7 }));

        assert_eq!(state.text("location"), None);
        assert_eq!(state.text("material"), None);
        assert_eq!(state.text("not_there"), None);
    }

    #[test]
    fn number_accepts_numeric_strings_and_rejects_other_kinds() {
        let state = State::normalize(json!({
            "floors": "2",
            "area_sqft": 1500,
            "labor_cost": [1],
            "price": "cheap",
        }));

        assert_eq!(state.number("floors"), Ok(Some(2.0)));
        assert_eq!(state.number("area_sqft"), Ok(Some(1500.0)));
        assert_eq!(state.number("missing"), Ok(None));
        assert_eq!(state.number("labor_cost"), Err("array".to_owned()));
        assert!(state.number("price").is_err());
    }

    #[test]
    fn merge_overwrites_and_error_detection_ignores_null() {
        let mut state = State::defaults();
        let fields = json!({ "price": 8.0, "error": null });
        if let serde_json::Value::Object(fields) = fields {
            assert!(!has_error(&fields));
            state.merge(fields);
        }

        assert_eq!(state.get("price"), Some(&json!(8.0)));
        assert!(!state.has_error());

        state.insert("error", json!("No material provided"));
        assert!(state.has_error());
        assert_eq!(value_kind(&state.into_value()), "object");
    }
}
