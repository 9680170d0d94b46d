// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Shared plumbing for the command-line entry points

use crate::error::WorkshopError;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Log to stderr so stdout only carries reports; `RUST_LOG` overrides the default level
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Print a labelled error line and its remediation, if any
pub fn report_error(err: &anyhow::Error) {
    eprintln!("ERROR: {:#}", err);

    if let Some(hint) = err
        .downcast_ref::<WorkshopError>()
        .and_then(WorkshopError::remediation)
    {
        eprintln!("  To fix: {}", hint);
    }
}

/// Parse arguments; usage errors exit with status 1, help and version with 0
pub fn parse_args<T: Parser>() -> T {
    T::try_parse().unwrap_or_else(|e| {
        if e.use_stderr() {
            let _ = e.print();
            std::process::exit(1);
        }
        e.exit()
    })
}
