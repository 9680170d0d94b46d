// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use devspaces_workshop::cli::{init_tracing, parse_args, report_error};
use devspaces_workshop::config::Config;
use devspaces_workshop::detection::{run_detection, DetectionMode};
use devspaces_workshop::kubernetes::create_client;

/// Run the deployment driver's workshop user detection
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Also run the preflight check and print the deployment status
    #[arg(long)]
    test: bool,

    /// Kubeconfig context to use
    #[arg(long, env = "KUBE_CONTEXT")]
    context: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args: Args = parse_args();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::from_env()?;
    if args.context.is_some() {
        config.kube_context = args.context;
    }

    let mode = if args.test {
        DetectionMode::Test
    } else {
        DetectionMode::Detect
    };

    let client = create_client(&config).await?;
    run_detection(&client, &config, mode).await?;
    Ok(())
}
