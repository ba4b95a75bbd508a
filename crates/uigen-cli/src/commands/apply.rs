//! `uigen apply`: runs a batch of agent tool calls against a project.
//!
//! The calls file holds either one `{"tool": .., "input": ..}` object or a
//! JSON array of them. Calls run in order and the batch stops at the first
//! rejected call. With `--in-place` the project file is rewritten only when
//! every call succeeded.

use super::common::{load_project, write_project};
use crate::formatters::format_output;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use uigen_core::cli::{ExitCode, OutputFormat};
use uigen_files::{EditOutcome, ToolCall, VirtualFileSystem};

/// One call that succeeded.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AppliedCall {
    /// Position in the batch, from zero
    pub index: usize,
    /// Message returned to the agent
    pub message: String,
    /// Structured result
    #[serde(flatten)]
    pub outcome: EditOutcome,
}

/// The call that stopped the batch.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Rejection {
    /// Position in the batch, from zero
    pub index: usize,
    /// Why the call was refused
    pub error: String,
}

/// Result of a batch.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApplyReport {
    /// Calls applied before the batch stopped
    pub applied: Vec<AppliedCall>,
    /// The rejected call, if any
    pub rejected: Option<Rejection>,
    /// Calls never attempted
    pub skipped: usize,
    /// Whether the project file was rewritten
    pub written: bool,
}

impl ApplyReport {
    /// Returns `true` if every call was applied.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.rejected.is_none()
    }
}

/// Parses a calls document.
///
/// Malformed calls are reported with their index before anything runs.
pub fn parse_calls(json: &str) -> Result<Vec<ToolCall>> {
    let value: Value = serde_json::from_str(json).context("calls file is not valid JSON")?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                ToolCall::from_value(item).with_context(|| format!("invalid tool call #{index}"))
            })
            .collect(),
        single => Ok(vec![ToolCall::from_value(single).context("invalid tool call")?]),
    }
}

/// Applies `calls` in order, stopping at the first failure.
#[must_use]
pub fn apply_calls(vfs: &mut VirtualFileSystem, calls: &[ToolCall]) -> ApplyReport {
    let mut applied = Vec::with_capacity(calls.len());
    let mut rejected = None;

    for (index, call) in calls.iter().enumerate() {
        match call.apply(vfs) {
            Ok(outcome) => applied.push(AppliedCall {
                index,
                message: outcome.to_string(),
                outcome,
            }),
            Err(e) => {
                warn!(index, error = %e, "tool call rejected");
                rejected = Some(Rejection {
                    index,
                    error: e.to_string(),
                });
                break;
            }
        }
    }

    let attempted = applied.len() + usize::from(rejected.is_some());
    ApplyReport {
        applied,
        rejected,
        skipped: calls.len() - attempted,
        written: false,
    }
}

/// Runs the apply command.
pub fn run(project: &Path, calls: &Path, in_place: bool, format: OutputFormat) -> Result<ExitCode> {
    let mut vfs = load_project(project)?;
    let json = fs::read_to_string(calls)
        .with_context(|| format!("failed to read calls {}", calls.display()))?;
    let calls = parse_calls(&json)?;

    let mut report = apply_calls(&mut vfs, &calls);

    if in_place && report.is_complete() {
        write_project(project, &vfs)?;
        report.written = true;
    }

    info!(
        applied = report.applied.len(),
        written = report.written,
        "tool calls processed"
    );
    println!("{}", format_output(&report, format)?);

    if report.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::EDIT_REJECTED)
    }
}
