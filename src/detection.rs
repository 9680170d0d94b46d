// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Forwarding to the external deployment driver's user detection modes

use crate::config::Config;
use crate::error::{Result, WorkshopError};
use crate::kubernetes::current_user;
use kube::Client;
use std::path::Path;
use tokio::process::Command;
use tracing::{info, instrument};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionMode {
    /// Only detect existing workshop users
    Detect,
    /// Preflight check, detection and status report
    Test,
}

impl DetectionMode {
    /// Driver flags run, in order
    pub fn driver_flags(&self) -> &'static [&'static str] {
        match self {
            DetectionMode::Detect => &["--detect-users"],
            DetectionMode::Test => &["--check-only", "--detect-users", "--status"],
        }
    }
}

/// Fail unless the client is logged in; returns the username
pub async fn ensure_authenticated(client: &Client) -> Result<String> {
    let user = current_user(client).await?;
    info!("Authenticated as {}", user);
    Ok(user)
}

#[instrument(skip(client, config))]
pub async fn run_detection(client: &Client, config: &Config, mode: DetectionMode) -> Result<()> {
    ensure_authenticated(client).await?;

    for flag in mode.driver_flags() {
        run_driver(&config.deploy_driver, flag).await?;
    }

    Ok(())
}

async fn run_driver(driver: &Path, flag: &str) -> Result<()> {
    info!("Running {} {}", driver.display(), flag);

    let status = Command::new(driver)
        .arg(flag)
        .status()
        .await
        .map_err(|e| {
            WorkshopError::Driver(format!("failed to start {}: {}", driver.display(), e))
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(WorkshopError::Driver(format!(
            "{} {} exited with {}",
            driver.display(),
            flag,
            status
        )))
    }
}
