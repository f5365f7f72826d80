pub mod config;
pub mod doctor;
pub mod features;
pub mod session;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            result: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            result: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Wraps a workflow result. A non-null `error` in the result is shown
    /// verbatim as the message and exits 1.
    pub fn workflow(command: &str, error_class: &str, result: Value) -> Self {
        let error = result.get("error").filter(|error| !error.is_null()).map(|error| {
            error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string())
        });

        let (status, error_class, message, exit_code) = match error {
            Some(message) => ("error", Some(error_class.to_string()), message, 1),
            None => ("ok", None, "workflow completed".to_string(), 0),
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: status.to_string(),
            error_class,
            message,
            result: Some(result),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::commands::CommandResult;

    fn payload(result: &CommandResult) -> Value {
        serde_json::from_str(&result.output).unwrap_or_default()
    }

    #[test]
    fn workflow_error_is_shown_verbatim() {
        let result = CommandResult::workflow(
            "price",
            "workflow_error",
            json!({ "price": 100.0, "error": "No price found for granite" }),
        );

        assert_eq!(result.exit_code, 1);
        let payload = payload(&result);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["message"], "No price found for granite");
        assert_eq!(payload["result"]["price"], json!(100.0));
    }

    #[test]
    fn null_error_is_success() {
        let result =
            CommandResult::workflow("bid", "workflow_error", json!({ "optimal_bid": "x", "error": null }));

        assert_eq!(result.exit_code, 0);
        let payload = payload(&result);
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["error_class"], json!(null));
    }

    #[test]
    fn plain_outcomes_omit_result() {
        let result = CommandResult::success("session", "bye");

        assert!(payload(&result).get("result").is_none());
    }
}
