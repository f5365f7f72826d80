use brickwise_agent::{AgentRuntime, WorkflowKind};
use brickwise_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

use crate::commands::features::command_name;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            let agents = AgentRuntime::from_config(&config);
            checks.extend(check_services(&agents));
            checks.push(check_routing(&agents));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["search_service", "text_generation_service", "workflow_routing"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

// Readiness reflects client construction only; no request is sent.
fn check_services(agents: &AgentRuntime) -> Vec<DoctorCheck> {
    agents
        .readiness()
        .into_iter()
        .map(|service| {
            let name = match service.service {
                "search" => "search_service",
                _ => "text_generation_service",
            };
            DoctorCheck {
                name,
                status: if service.ready { CheckStatus::Pass } else { CheckStatus::Fail },
                details: service.detail.unwrap_or_else(|| "client initialized".to_string()),
            }
        })
        .collect()
}

fn check_routing(agents: &AgentRuntime) -> DoctorCheck {
    let disabled: Vec<&str> = WorkflowKind::ALL
        .into_iter()
        .filter(|kind| agents.routable(*kind).is_err())
        .map(command_name)
        .collect();

    if disabled.is_empty() {
        DoctorCheck {
            name: "workflow_routing",
            status: CheckStatus::Pass,
            details: "all workflows can be routed".to_string(),
        }
    } else {
        DoctorCheck {
            name: "workflow_routing",
            status: CheckStatus::Fail,
            details: format!("disabled workflows: {}", disabled.join(", ")),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
