use std::env;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use brickwise_agent::{AgentRuntime, LlmClient, SearchClient, WorkflowKind};
use brickwise_cli::commands::features::{self, FeatureRequest};
use brickwise_cli::commands::{config, doctor, session};
use brickwise_core::catalog::SeedCatalog;
use brickwise_core::config::ENV_VARS;
use brickwise_core::errors::{ServiceError, ServiceKind};
use brickwise_core::search::SearchResponse;
use serde_json::Value;

#[test]
fn price_is_refused_when_search_has_no_key() {
    with_env(&[], || {
        let result = features::run(
            FeatureRequest::new(WorkflowKind::MaterialPrice).with("material", "bricks"),
        );
        assert_eq!(result.exit_code, 1, "expected workflow failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "price");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "service_unavailable");
        assert_eq!(
            payload["message"],
            "search service unavailable: no api key configured (set BRICKWISE_SEARCH_API_KEY or TAVILY_API_KEY)"
        );
        assert_eq!(payload["result"]["error"], payload["message"]);
    });
}

#[test]
fn blank_input_is_rejected_before_any_workflow() {
    with_env(&[], || {
        let result = features::run(
            FeatureRequest::new(WorkflowKind::ProjectScheduling).with("project_details", "  "),
        );
        assert_eq!(result.exit_code, 2, "expected input validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "schedule");
        assert_eq!(payload["error_class"], "invalid_input");
        assert_eq!(payload["message"], "project details must not be empty");
    });
}

#[test]
fn invalid_config_is_reported_with_its_own_class() {
    with_env(&[("BRICKWISE_SEARCH_TIMEOUT_SECS", "0")], || {
        let result = features::run(
            FeatureRequest::new(WorkflowKind::MaterialPrice).with("material", "steel"),
        );
        assert_eq!(result.exit_code, 3, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn estimate_runs_end_to_end_on_reference_data_when_search_is_down() {
    with_env(
        &[
            ("TAVILY_API_KEY", "tvly-test"),
            ("BRICKWISE_SEARCH_BASE_URL", "http://127.0.0.1:9"),
            ("BRICKWISE_SEARCH_TIMEOUT_SECS", "2"),
        ],
        || {
            let result = features::run(
                FeatureRequest::new(WorkflowKind::CostEstimation)
                    .with("material", "Steel")
                    .with("location", "Pune")
                    .with("building_type", "Commercial")
                    .with("floors", 2)
                    .with("area_sqft", 1000.0)
                    .with("labor_cost", 500000.0),
            );
            assert_eq!(result.exit_code, 0, "expected successful estimate: {}", result.output);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "estimate");
            assert_eq!(payload["status"], "ok");
            assert_eq!(payload["result"]["price"], 60.0);
            assert_eq!(payload["result"]["total_cost"], 3_000_060.0);
            assert_eq!(payload["result"]["estimated_time"], 3.0);
        },
    );
}

#[test]
fn config_redacts_keys_and_attributes_env_sources() {
    with_env(
        &[("BRICKWISE_SEARCH_API_KEY", "tvly-very-secret"), ("GEMINI_API_KEY", "AIzaSecret")],
        || {
            let output = config::run();

            assert!(output.contains(
                "- search.api_key = tvly-*** (source: env (BRICKWISE_SEARCH_API_KEY))"
            ));
            assert!(output.contains("- llm.api_key = <redacted> (source: env (GEMINI_API_KEY))"));
            assert!(output.contains("- llm.model = gemini-1.5-flash (source: default)"));
            assert!(!output.contains("very-secret"));
            assert!(!output.contains("AIzaSecret"));
        },
    );
}

#[test]
fn doctor_reports_missing_keys_as_failed_checks() {
    with_env(&[("SERPER_API_KEY", "serper-test"), ("BRICKWISE_SEARCH_PROVIDER", "serper")], || {
        let payload = parse_payload(&doctor::run(true));

        assert_eq!(payload["overall_status"], "fail");
        let checks = payload["checks"].as_array().cloned().unwrap_or_default();
        let status_of = |name: &str| {
            checks
                .iter()
                .find(|check| check["name"] == name)
                .map(|check| check["status"].clone())
                .unwrap_or(Value::Null)
        };
        assert_eq!(status_of("config_validation"), "pass");
        assert_eq!(status_of("search_service"), "pass");
        assert_eq!(status_of("text_generation_service"), "fail");
        assert_eq!(status_of("workflow_routing"), "fail");
    });
}

#[test]
fn session_remembers_last_input_per_feature() {
    let search = Arc::new(CountingSearch::default());
    let agents = AgentRuntime::new(
        Ok(search.clone() as Arc<dyn SearchClient>),
        Err(ServiceError::Unavailable {
            service: ServiceKind::TextGeneration,
            reason: "no api key configured".to_string(),
        }),
        Arc::new(SeedCatalog),
    );
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build");

    let script = "price\nCement\nprice\n\nbid\nmall\nunknown\nquit\n";
    let mut output = Vec::new();
    let completed = session::run_session(&agents, &runtime, Cursor::new(script), &mut output)
        .expect("session should run");

    let text = String::from_utf8(output).expect("session output should be utf-8");
    assert_eq!(completed, 3);
    assert!(text.contains("material [Cement]: "));
    assert!(text.contains("unknown feature `unknown`"));
    assert_eq!(search.calls(), 2);

    let outcomes: Vec<Value> = text
        .lines()
        .filter_map(|line| line.find('{').map(|start| &line[start..]))
        .filter_map(|json| serde_json::from_str(json).ok())
        .collect();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0]["result"]["price"], 400.0);
    assert_eq!(outcomes[1]["result"]["price"], 400.0);
    assert_eq!(outcomes[2]["error_class"], "service_unavailable");
}

#[test]
fn session_rejects_blank_required_input_and_ends_at_eof() {
    let search = Arc::new(CountingSearch::default());
    let agents = AgentRuntime::new(
        Ok(search.clone() as Arc<dyn SearchClient>),
        Ok(Arc::new(FixedLlm) as Arc<dyn LlmClient>),
        Arc::new(SeedCatalog),
    );
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build");

    let mut output = Vec::new();
    let completed =
        session::run_session(&agents, &runtime, Cursor::new("permits\n\n\nschedule\n"), &mut output)
            .expect("session should run");

    let text = String::from_utf8(output).expect("session output should be utf-8");
    assert_eq!(completed, 0);
    assert!(text.contains("location must not be empty"));
    assert_eq!(search.calls(), 0);
}

#[derive(Default)]
struct CountingSearch {
    calls: AtomicUsize,
}

impl CountingSearch {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchClient for CountingSearch {
    async fn search(&self, query: &str) -> Result<SearchResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SearchResponse::empty(query))
    }
}

struct FixedLlm;

#[async_trait]
impl LlmClient for FixedLlm {
    async fn complete(&self, _prompt: &str) -> Result<String, ServiceError> {
        Ok("Week 1: site survey".to_string())
    }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let previous_values: Vec<(&str, Option<String>)> =
        ENV_VARS.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in ENV_VARS {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
