//! Interactive front end.
//!
//! One workflow runs per menu choice. The last input given for each feature
//! is remembered for the rest of the session and offered as the default on
//! the next run; nothing is persisted.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use brickwise_agent::{AgentRuntime, WorkflowKind};
use brickwise_core::config::{AppConfig, LoadOptions};
use serde_json::{Map, Value};
use tokio::runtime::Runtime;

use crate::commands::features::{command_name, execute, fields, parse_feature, FeatureRequest};
use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "session",
                "config_validation",
                format!("configuration issue: {error}"),
                3,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "session",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                4,
            );
        }
    };

    let agents = AgentRuntime::from_config(&config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    match run_session(&agents, &runtime, stdin.lock(), stdout.lock()) {
        Ok(completed) => {
            CommandResult::success("session", format!("session ended after {completed} workflow run(s)"))
        }
        Err(error) => CommandResult::failure("session", "io", format!("{error:#}"), 5),
    }
}

/// Drives the menu loop until `quit` or end of input. Returns how many
/// workflows ran.
pub fn run_session<R, W>(
    agents: &AgentRuntime,
    runtime: &Runtime,
    mut input: R,
    mut output: W,
) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut session = Session::default();
    let menu = WorkflowKind::ALL.map(command_name).join(", ");
    writeln!(output, "brickwise session. Features: {menu}. Type `quit` to leave.")?;

    loop {
        let Some(choice) = prompt(&mut input, &mut output, "feature> ")? else {
            break;
        };
        match choice.as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                writeln!(output, "Features: {menu}")?;
                continue;
            }
            _ => {}
        }

        let Some(kind) = parse_feature(&choice) else {
            writeln!(output, "unknown feature `{choice}`; try one of: {menu}")?;
            continue;
        };

        let Some(request) = session.collect(kind, &mut input, &mut output)? else {
            break;
        };
        if let Err(message) = request.validate() {
            writeln!(output, "{message}")?;
            continue;
        }

        session.remember(&request);
        let result = execute(agents, runtime, request);
        writeln!(output, "{}", result.output)?;
        session.completed += 1;
    }

    output.flush().context("failed to flush session output")?;
    Ok(session.completed)
}

#[derive(Default)]
struct Session {
    last_inputs: HashMap<WorkflowKind, Map<String, Value>>,
    completed: usize,
}

impl Session {
    /// Prompts for every field of `kind`. `None` means input ended midway.
    fn collect<R: BufRead, W: Write>(
        &self,
        kind: WorkflowKind,
        input: &mut R,
        output: &mut W,
    ) -> Result<Option<FeatureRequest>> {
        let previous = self.last_inputs.get(&kind);
        let mut request = FeatureRequest::new(kind);

        for field in fields(kind) {
            let remembered = previous.and_then(|inputs| inputs.get(field.key)).and_then(Value::as_str);
            let label = match remembered {
                Some(value) => format!("{} [{value}]: ", field.label),
                None => format!("{}: ", field.label),
            };

            let Some(answer) = prompt(input, output, &label)? else {
                return Ok(None);
            };
            let value = if answer.is_empty() { remembered.map(str::to_string) } else { Some(answer) };
            request = request.with_opt(field.key, value);
        }

        Ok(Some(request))
    }

    fn remember(&mut self, request: &FeatureRequest) {
        self.last_inputs.insert(request.kind(), request.input().clone());
    }
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<Option<String>> {
    write!(output, "{label}")?;
    output.flush().context("failed to flush prompt")?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("failed to read from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
