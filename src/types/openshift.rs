// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cluster-wide ingress configuration (`ingresses.config.openshift.io/cluster`)
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "Ingress",
    root = "ClusterIngress",
    plural = "ingresses"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterIngressSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Web console configuration (`consoles.config.openshift.io/cluster`)
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "Console",
    root = "ClusterConsole",
    plural = "consoles"
)]
#[kube(status = "ClusterConsoleStatus")]
pub struct ClusterConsoleSpec {}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct ClusterConsoleStatus {
    #[serde(rename = "consoleURL", skip_serializing_if = "Option::is_none")]
    pub console_url: Option<String>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "ClusterOperator",
    plural = "clusteroperators"
)]
#[kube(status = "ClusterOperatorStatus")]
pub struct ClusterOperatorSpec {}

impl ClusterOperator {
    /// Status of the condition with the given type, if reported
    pub fn condition(&self, condition_type: &str) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.conditions.as_ref())
            .and_then(|conditions| {
                conditions
                    .iter()
                    .find(|c| c.condition_type == condition_type)
            })
            .map(|c| c.status.as_str())
    }

    /// Available, not progressing and not degraded
    pub fn is_settled(&self) -> bool {
        self.condition("Available") == Some("True")
            && self.condition("Progressing") == Some("False")
            && self.condition("Degraded") != Some("True")
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct ClusterOperatorStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Cluster authentication configuration (`oauths.config.openshift.io/cluster`)
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "OAuth",
    plural = "oauths"
)]
#[serde(rename_all = "camelCase")]
pub struct OAuthSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_providers: Option<Vec<IdentityProvider>>,
}

impl OAuth {
    /// Whether an HTPasswd provider already reads from the given secret
    pub fn has_htpasswd_provider(&self, secret_name: &str) -> bool {
        self.spec
            .identity_providers
            .as_ref()
            .is_some_and(|providers| {
                providers.iter().any(|p| {
                    p.htpasswd
                        .as_ref()
                        .is_some_and(|h| h.file_data.name == secret_name)
                })
            })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProvider {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping_method: Option<String>,
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub htpasswd: Option<HtpasswdProvider>,
    /// Settings of other provider types, carried through untouched
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl IdentityProvider {
    pub fn htpasswd(name: &str, secret_name: &str) -> Self {
        IdentityProvider {
            name: name.to_string(),
            mapping_method: Some("claim".to_string()),
            provider_type: "HTPasswd".to_string(),
            htpasswd: Some(HtpasswdProvider {
                file_data: SecretNameReference {
                    name: secret_name.to_string(),
                },
            }),
            other: BTreeMap::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HtpasswdProvider {
    pub file_data: SecretNameReference,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
pub struct SecretNameReference {
    pub name: String,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "route.openshift.io", version = "v1", kind = "Route", plural = "routes")]
#[kube(namespaced)]
pub struct RouteSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}
