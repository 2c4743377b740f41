use std::path::PathBuf;

use anyhow::Result;
use pyfind_domain::{PythonInfo, SpecError};
use serde_json::{json, Value};

use crate::discovery::Proposal;
use crate::{CommandContext, ExecutionOutcome};

#[derive(Clone, Debug)]
pub struct PythonFindRequest {
    pub spec: String,
}

#[derive(Clone, Debug)]
pub struct PythonInfoRequest {
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct PythonCandidatesRequest {
    pub spec: String,
}

/// Resolves a spec to the first interpreter that satisfies it.
///
/// A malformed spec and a missing interpreter are reported through the
/// returned outcome, not as errors.
pub fn python_find(ctx: &CommandContext, request: &PythonFindRequest) -> Result<ExecutionOutcome> {
    match ctx.discovery().find(&request.spec) {
        Ok(Some(info)) => Ok(ExecutionOutcome::success(
            format!(
                "{} {} at {}",
                info.implementation,
                info.version,
                info.executable.display()
            ),
            interpreter_to_json(&info),
        )),
        Ok(None) => Ok(ExecutionOutcome::user_error(
            format!("no interpreter satisfies `{}`", request.spec),
            json!({
                "spec": request.spec,
                "reason": "interpreter_not_found",
                "hint": "install a matching Python, adjust PATH, or pass an absolute path",
            }),
        )),
        Err(err) => Ok(invalid_spec_outcome(&request.spec, &err)),
    }
}

/// Inspects a single executable.
pub fn python_info(ctx: &CommandContext, request: &PythonInfoRequest) -> Result<ExecutionOutcome> {
    match ctx.discovery().inspect(&request.path) {
        Some(info) => Ok(ExecutionOutcome::success(
            format!(
                "{} {} ({}-bit) at {}",
                info.implementation,
                info.version,
                info.architecture,
                info.executable.display()
            ),
            interpreter_to_json(&info),
        )),
        None => Ok(ExecutionOutcome::user_error(
            format!(
                "{} is not an inspectable Python interpreter",
                request.path.display()
            ),
            json!({
                "path": request.path.display().to_string(),
                "reason": "inspection_failed",
                "hint": "re-run with -v to see why inspection failed",
            }),
        )),
    }
}

/// Lists every proposal for a spec in discovery order.
pub fn python_candidates(
    ctx: &CommandContext,
    request: &PythonCandidatesRequest,
) -> Result<ExecutionOutcome> {
    let proposals = match ctx.discovery().proposals(&request.spec) {
        Ok(proposals) => proposals,
        Err(err) => return Ok(invalid_spec_outcome(&request.spec, &err)),
    };
    let details: Vec<Value> = proposals.iter().map(proposal_to_json).collect();
    if proposals.is_empty() {
        return Ok(ExecutionOutcome::success(
            format!("no candidates proposed for `{}`", request.spec),
            json!({ "spec": request.spec, "candidates": details }),
        ));
    }
    let mut selected = false;
    let summary = proposals
        .iter()
        .map(|proposal| {
            let marker = if proposal.duplicate {
                "duplicate"
            } else if proposal.satisfies && !selected {
                selected = true;
                "selected"
            } else if proposal.satisfies {
                "satisfies"
            } else {
                "rejected"
            };
            format!(
                "{}  {} {}  {}{}",
                proposal.interpreter.executable.display(),
                proposal.interpreter.implementation,
                proposal.interpreter.version,
                marker,
                if proposal.impl_must_match {
                    ""
                } else {
                    " (name lookup)"
                }
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    Ok(ExecutionOutcome::success(
        format!("candidates for `{}`:\n{summary}", request.spec),
        json!({ "spec": request.spec, "candidates": details }),
    ))
}

fn invalid_spec_outcome(spec: &str, err: &SpecError) -> ExecutionOutcome {
    ExecutionOutcome::failure(
        format!("invalid python spec: {err}"),
        json!({
            "spec": spec,
            "reason": "invalid_spec",
        }),
    )
}

fn interpreter_to_json(info: &PythonInfo) -> Value {
    json!({
        "executable": info.executable.display().to_string(),
        "original_executable": info.original_executable.display().to_string(),
        "implementation": info.implementation,
        "version": info.version.to_string(),
        "version_info": [
            info.version_info.major,
            info.version_info.minor,
            info.version_info.micro,
        ],
        "architecture": info.architecture,
        "platform": info.platform,
    })
}

fn proposal_to_json(proposal: &Proposal) -> Value {
    json!({
        "interpreter": interpreter_to_json(&proposal.interpreter),
        "impl_must_match": proposal.impl_must_match,
        "satisfies": proposal.satisfies,
        "duplicate": proposal.duplicate,
    })
}
