// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Readiness checks for a single workshop user.
//!
//! Checks run in order: credential store, namespace, IDE URL, workspaces, repository
//! reachability. The first three are fatal and stop the probe; the last two only report.

use crate::config::Config;
use crate::credentials::fetch_credential_store;
use crate::discovery::lookup_che_url;
use crate::error::Result;
use crate::kubernetes::namespace_exists;
use crate::provision::namespace_for;
use crate::types::devspaces::{DevWorkspace, WorkspacePhase};
use kube::{api::ListParams, Api, Client, ResourceExt};
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
    Hint,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Success => "OK",
            Level::Info => "INFO",
            Level::Warning => "WARN",
            Level::Error => "ERROR",
            Level::Hint => "HINT",
        };
        write!(f, "[{}]", label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    pub level: Level,
    pub message: String,
}

/// The fatal check that stopped the probe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeFailure {
    CredentialStoreMissing,
    UserMissing,
    NamespaceMissing,
    IdeNotReady,
}

#[derive(Clone, Debug)]
pub struct ProbeReport {
    pub username: String,
    pub findings: Vec<Finding>,
    pub failure: Option<ProbeFailure>,
    pub ide_url: Option<String>,
    /// Next steps for the user, only filled when the fatal checks pass
    pub instructions: Vec<String>,
}

impl ProbeReport {
    fn new(username: &str) -> Self {
        ProbeReport {
            username: username.to_string(),
            findings: Vec::new(),
            failure: None,
            ide_url: None,
            instructions: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    pub fn has_level(&self, level: Level) -> bool {
        self.findings.iter().any(|f| f.level == level)
    }

    fn push(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Error | Level::Warning => warn!("{}", message),
            _ => debug!("{}", message),
        }
        self.findings.push(Finding { level, message });
    }

    fn fail(&mut self, failure: ProbeFailure, message: impl Into<String>, hint: impl Into<String>) {
        self.push(Level::Error, message);
        self.push(Level::Hint, hint);
        self.failure = Some(failure);
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Environment check for {}", self.username)?;
        for finding in &self.findings {
            writeln!(f, "{} {}", finding.level, finding.message)?;
        }

        if self.passed() {
            writeln!(f)?;
            writeln!(f, "Environment for {} is ready.", self.username)?;
            for (i, step) in self.instructions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, step)?;
            }
        }
        Ok(())
    }
}

/// Run every check for `username`. Errors are reserved for API failures; failed checks
/// are reported through [`ProbeReport::failure`].
#[instrument(skip(client, config))]
pub async fn probe_tenant(client: &Client, config: &Config, username: &str) -> Result<ProbeReport> {
    let mut report = ProbeReport::new(username);
    let namespace = namespace_for(username);

    match fetch_credential_store(client, config).await? {
        None => {
            report.fail(
                ProbeFailure::CredentialStoreMissing,
                format!(
                    "Credential store {}/{} does not exist",
                    config.credentials_namespace, config.credentials_secret
                ),
                "run create-workshop-users to create the workshop users",
            );
            return Ok(report);
        }
        Some(store) if !store.contains(username) => {
            report.fail(
                ProbeFailure::UserMissing,
                format!("User {} is not in the credential store", username),
                format!("known users: {}", store.usernames().join(" ")),
            );
            return Ok(report);
        }
        Some(_) => report.push(
            Level::Success,
            format!("User {} exists in the credential store", username),
        ),
    }

    if !namespace_exists(client, &namespace).await? {
        report.fail(
            ProbeFailure::NamespaceMissing,
            format!("Namespace {} does not exist", namespace),
            "the user exists but was not provisioned; re-run create-workshop-users",
        );
        return Ok(report);
    }
    report.push(Level::Success, format!("Namespace {} exists", namespace));

    let Some(ide_url) = lookup_che_url(client).await else {
        report.fail(
            ProbeFailure::IdeNotReady,
            "Dev Spaces has not published an IDE URL",
            "check the installation with `oc get checluster -A`",
        );
        return Ok(report);
    };
    report.push(Level::Success, format!("Dev Spaces is available at {}", ide_url));
    report.ide_url = Some(ide_url.clone());

    check_workspaces(client, &namespace, &mut report).await;

    match check_reachability(&config.repository_url, config.reachability_timeout).await {
        Reachability::Reachable(status) => report.push(
            Level::Success,
            format!("Repository {} is reachable ({})", config.repository_url, status),
        ),
        Reachability::Unexpected(status) => report.push(
            Level::Warning,
            format!("Repository {} answered {}", config.repository_url, status),
        ),
        Reachability::Unreachable(reason) => report.push(
            Level::Warning,
            format!("Repository {} is unreachable: {}", config.repository_url, reason),
        ),
    }

    report.instructions = vec![
        format!("Open {}", ide_url),
        format!(
            "Log in as '{}' with the '{}' provider and the workshop password",
            username, config.identity_provider
        ),
        format!("Create a workspace from {}", config.repository_url),
        format!("Your workspaces run in namespace {}", namespace),
    ];

    info!("Environment for {} passed all required checks", username);
    Ok(report)
}

async fn check_workspaces(client: &Client, namespace: &str, report: &mut ProbeReport) {
    let workspaces: Api<DevWorkspace> = Api::namespaced(client.clone(), namespace);

    let list = match workspaces.list(&ListParams::default()).await {
        Ok(list) => list,
        Err(e) => {
            report.push(
                Level::Warning,
                format!("Could not list workspaces in {}: {}", namespace, e),
            );
            return;
        }
    };

    if list.items.is_empty() {
        report.push(Level::Info, "No workspaces yet; the user has not created one");
        return;
    }

    for workspace in &list.items {
        let name = workspace.name_any();
        let id = workspace.workspace_id();
        match workspace.phase() {
            WorkspacePhase::Running => report.push(
                Level::Success,
                format!(
                    "Workspace {} ({}) is running at {}",
                    name,
                    id,
                    workspace.main_url().unwrap_or("<no url yet>")
                ),
            ),
            WorkspacePhase::Failed => report.push(
                Level::Error,
                format!(
                    "Workspace {} ({}) failed: {}",
                    name,
                    id,
                    workspace.message().unwrap_or("no message")
                ),
            ),
            phase => report.push(
                Level::Info,
                format!("Workspace {} ({}) is {}", name, id, phase),
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reachability {
    Reachable(StatusCode),
    Unexpected(StatusCode),
    Unreachable(String),
}

/// HEAD the given URL
pub async fn check_reachability(url: &str, timeout: Duration) -> Reachability {
    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => return Reachability::Unreachable(e.to_string()),
    };

    match client.head(url).send().await {
        Ok(response) if response.status().is_success() => {
            Reachability::Reachable(response.status())
        }
        Ok(response) => Reachability::Unexpected(response.status()),
        Err(e) => Reachability::Unreachable(e.to_string()),
    }
}
