//! `varsel rpc` command - JSON-lines request loop
//!
//! Reads one request object per line from stdin and writes one response
//! object per line to stdout. Besides the selector methods, `sync` re-imports
//! catalog files so a long-running client can pick up edits.

use miette::{IntoDiagnostic, Result};
use serde_json::Value;
use std::io::{BufRead, Write};

use crate::api::{RpcError, RpcRequest, RpcResponse};
use crate::cli::{GlobalOpts, Workspace};

pub fn run(global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    let mut served = 0usize;
    for line in stdin.lock().lines() {
        let line = line.into_diagnostic()?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) if request.method == "sync" => sync(&workspace, request.id),
            Ok(request) => {
                tracing::debug!(method = %request.method, "rpc request");
                workspace.selector.handle(request)
            }
            Err(e) => RpcResponse::err(Value::Null, RpcError::new("parse_error", e.to_string())),
        };

        let encoded = serde_json::to_string(&response).into_diagnostic()?;
        writeln!(stdout, "{}", encoded).into_diagnostic()?;
        stdout.flush().into_diagnostic()?;
        served += 1;
    }

    tracing::info!(requests = served, "rpc input closed");
    Ok(())
}

fn sync(workspace: &Workspace, id: Value) -> RpcResponse {
    match workspace.sync() {
        Ok(stats) => match serde_json::to_value(stats) {
            Ok(result) => RpcResponse::ok(id, result),
            Err(e) => RpcResponse::err(id, RpcError::new("internal", e.to_string())),
        },
        Err(report) => RpcResponse::err(id, RpcError::new("storage_unavailable", report.to_string())),
    }
}
