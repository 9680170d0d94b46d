// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkshopError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Insufficient privileges: {0}")]
    InsufficientPrivilege(String),

    #[error("Not authenticated against the cluster: {0}")]
    NotAuthenticated(String),

    #[error("Required tool '{tool}' is not available (tried: {})", attempts.join(", "))]
    ToolingMissing { tool: String, attempts: Vec<String> },

    #[error("{kind} '{name}' not found")]
    ResourceNotFound { kind: String, name: String },

    #[error("Timed out after {}s waiting for cluster operator '{operator}' to settle", waited.as_secs())]
    SyncTimeout { operator: String, waited: Duration },

    #[error("Credential store was modified concurrently: {0}")]
    StoreConflict(String),

    #[error("Invalid credential store at line {line}: {reason}")]
    InvalidCredentialStore { line: usize, reason: String },

    #[error("Invalid username '{username}': {reason}")]
    InvalidUsername { username: String, reason: String },

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Failed to apply {kind} '{name}': {source}")]
    Apply {
        kind: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Deployment driver failed: {0}")]
    Driver(String),

    #[error("Failed to render manifest: {0}")]
    Render(#[from] serde_yaml::Error),
}

impl WorkshopError {
    /// A concrete command or action that resolves the error, if one exists
    pub fn remediation(&self) -> Option<String> {
        match self {
            WorkshopError::InsufficientPrivilege(_) => Some(
                "log in with a cluster-admin account, e.g. `oc login -u kubeadmin <api-url>`"
                    .to_string(),
            ),
            WorkshopError::NotAuthenticated(_) => {
                Some("log in first: `oc login <api-url>`".to_string())
            }
            WorkshopError::ToolingMissing { tool, .. } => Some(format!(
                "install '{}' manually (httpd-tools / apache2-utils) or set WORKSHOP_HASHER=bcrypt",
                tool
            )),
            WorkshopError::ResourceNotFound { kind, name } => Some(format!(
                "verify the {} exists: `oc get {} {}`",
                kind,
                kind.to_lowercase(),
                name
            )),
            WorkshopError::SyncTimeout { operator, .. } => Some(format!(
                "inspect the operator with `oc get clusteroperator {}` and re-run once it is Available",
                operator
            )),
            WorkshopError::StoreConflict(_) => {
                Some("another provisioning run is in progress; re-run once it finishes".to_string())
            }
            WorkshopError::InvalidUsername { .. } => Some(
                "use a USER_PREFIX of lowercase letters, digits and '-', starting with a letter or digit"
                    .to_string(),
            ),
            WorkshopError::Apply { .. } => Some(
                "fix the reported problem and re-run create-workshop-users; applies are idempotent"
                    .to_string(),
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkshopError>;
