// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;

use devspaces_workshop::cli::{init_tracing, parse_args, report_error};
use devspaces_workshop::config::Config;
use devspaces_workshop::constants::{DEFAULT_NUM_USERS, DEFAULT_PASSWORD, DEFAULT_USER_PREFIX};
use devspaces_workshop::credentials::PasswordHasher;
use devspaces_workshop::kubernetes::create_client;
use devspaces_workshop::orchestrator::{render_dry_run, run_batch, BatchRequest};

/// Create workshop users with their own Dev Spaces namespace
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Prefix of the generated usernames
    #[arg(default_value = DEFAULT_USER_PREFIX)]
    user_prefix: String,

    /// Number of users to create
    #[arg(default_value_t = DEFAULT_NUM_USERS, value_parser = clap::value_parser!(u32).range(1..))]
    num_users: u32,

    /// Password shared by all users
    #[arg(default_value = DEFAULT_PASSWORD)]
    password: String,

    /// Print the manifests instead of applying them
    #[arg(long)]
    dry_run: bool,

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

    let request = BatchRequest {
        user_prefix: args.user_prefix,
        num_users: args.num_users,
        password: args.password,
    };

    if args.dry_run {
        print!("{}", render_dry_run(&config, &request)?);
        return Ok(());
    }

    info!(
        "Creating {} users with prefix '{}'",
        request.num_users, request.user_prefix
    );

    let client = create_client(&config).await?;
    let hasher = PasswordHasher::new(config.hasher, config.bcrypt_cost);
    let summary = run_batch(&client, &config, &hasher, &request).await?;

    println!("{}", summary);
    Ok(())
}
