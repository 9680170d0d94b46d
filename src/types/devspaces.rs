// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The Dev Spaces installation (`checlusters.org.eclipse.che`)
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "org.eclipse.che", version = "v2", kind = "CheCluster", plural = "checlusters")]
#[kube(namespaced)]
#[kube(status = "CheClusterStatus")]
pub struct CheClusterSpec {}

impl CheCluster {
    /// The public IDE URL reported by the operator, if any
    pub fn che_url(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.che_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheClusterStatus {
    #[serde(rename = "cheURL", skip_serializing_if = "Option::is_none")]
    pub che_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub che_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub che_phase: Option<String>,
}

/// A tenant-owned workspace, observed read-only
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "workspace.devfile.io",
    version = "v1alpha2",
    kind = "DevWorkspace",
    plural = "devworkspaces"
)]
#[kube(namespaced)]
#[kube(status = "DevWorkspaceStatus")]
pub struct DevWorkspaceSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<bool>,
}

impl DevWorkspace {
    pub fn phase(&self) -> WorkspacePhase {
        self.status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .map(WorkspacePhase::from)
            .unwrap_or_else(|| WorkspacePhase::Other("Unknown".to_string()))
    }

    pub fn workspace_id(&self) -> String {
        self.status
            .as_ref()
            .and_then(|s| s.devworkspace_id.clone())
            .unwrap_or_else(|| self.name_any())
    }

    pub fn main_url(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.main_url.as_deref())
    }

    pub fn message(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.message.as_deref())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DevWorkspaceStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devworkspace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkspacePhase {
    Starting,
    Running,
    Failed,
    Stopped,
    Other(String),
}

impl From<&str> for WorkspacePhase {
    fn from(phase: &str) -> Self {
        match phase {
            "Starting" => WorkspacePhase::Starting,
            "Running" => WorkspacePhase::Running,
            "Failed" => WorkspacePhase::Failed,
            "Stopped" => WorkspacePhase::Stopped,
            other => WorkspacePhase::Other(other.to_string()),
        }
    }
}

impl fmt::Display for WorkspacePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspacePhase::Starting => write!(f, "Starting"),
            WorkspacePhase::Running => write!(f, "Running"),
            WorkspacePhase::Failed => write!(f, "Failed"),
            WorkspacePhase::Stopped => write!(f, "Stopped"),
            WorkspacePhase::Other(phase) => write!(f, "{}", phase),
        }
    }
}
