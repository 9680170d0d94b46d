// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use devspaces_workshop::cli::{init_tracing, parse_args, report_error};
use devspaces_workshop::config::Config;
use devspaces_workshop::kubernetes::create_client;
use devspaces_workshop::probe::probe_tenant;

/// Check that a workshop user's environment is ready
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Username to check, e.g. user1
    username: String,

    /// Kubeconfig context to use
    #[arg(long, env = "KUBE_CONTEXT")]
    context: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args: Args = parse_args();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<bool> {
    let mut config = Config::from_env()?;
    if args.context.is_some() {
        config.kube_context = args.context;
    }

    let client = create_client(&config).await?;
    let report = probe_tenant(&client, &config, &args.username).await?;

    print!("{}", report);
    Ok(report.passed())
}
