// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The fixed set of objects provisioned into every tenant namespace.
//!
//! All objects are built from one [`BundleContext`], so they always share the tenant's
//! namespace and label set.

use crate::config::Config;
use crate::constants::labels;
use crate::error::Result;
use crate::provision::tenant::Tenant;
use k8s_openapi::api::core::v1::{
    LimitRange, LimitRangeItem, LimitRangeSpec, Namespace, ResourceQuota, ResourceQuotaSpec,
    ServiceAccount,
};
use k8s_openapi::api::rbac::v1::{PolicyRule, Role, RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

const WORKSPACE_API_GROUP: &str = "workspace.devfile.io";

const QUOTA_HARD: &[(&str, &str)] = &[
    ("requests.cpu", "2"),
    ("requests.memory", "4Gi"),
    ("limits.memory", "8Gi"),
    ("persistentvolumeclaims", "5"),
    ("pods", "10"),
    ("services", "5"),
    ("configmaps", "10"),
    ("secrets", "10"),
];

struct BundleContext {
    username: String,
    namespace: String,
    labels: BTreeMap<String, String>,
}

impl BundleContext {
    fn new(tenant: &Tenant, config: &Config) -> Self {
        BundleContext {
            username: tenant.username.clone(),
            namespace: tenant.namespace.clone(),
            labels: BTreeMap::from([
                (labels::APP.to_string(), config.app_label.clone()),
                (labels::USER.to_string(), tenant.username.clone()),
                (labels::AUTHOR.to_string(), config.author.clone()),
            ]),
        }
    }

    fn meta(&self, suffix: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(format!("{}-{}", self.username, suffix)),
            namespace: Some(self.namespace.clone()),
            labels: Some(self.labels.clone()),
            ..Default::default()
        }
    }

    fn service_account_name(&self) -> String {
        format!("{}-sa", self.username)
    }

    fn role_name(&self) -> String {
        format!("{}-role", self.username)
    }
}

/// Namespace, ServiceAccount, Role, RoleBinding, ResourceQuota and LimitRange for one tenant
#[derive(Clone, Debug)]
pub struct NamespaceResourceBundle {
    namespace: Namespace,
    service_account: ServiceAccount,
    role: Role,
    role_binding: RoleBinding,
    resource_quota: ResourceQuota,
    limit_range: LimitRange,
}

impl NamespaceResourceBundle {
    pub fn for_tenant(tenant: &Tenant, config: &Config) -> Self {
        let ctx = BundleContext::new(tenant, config);

        NamespaceResourceBundle {
            namespace: namespace(&ctx),
            service_account: service_account(&ctx),
            role: role(&ctx),
            role_binding: role_binding(&ctx),
            resource_quota: resource_quota(&ctx),
            limit_range: limit_range(&ctx),
        }
    }

    pub fn namespace_name(&self) -> &str {
        self.namespace.metadata.name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn service_account(&self) -> &ServiceAccount {
        &self.service_account
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn role_binding(&self) -> &RoleBinding {
        &self.role_binding
    }

    pub fn resource_quota(&self) -> &ResourceQuota {
        &self.resource_quota
    }

    pub fn limit_range(&self) -> &LimitRange {
        &self.limit_range
    }

    /// Multi-document YAML of every object, in apply order
    pub fn render_yaml(&self) -> Result<String> {
        let documents = [
            serde_yaml::to_string(&self.namespace)?,
            serde_yaml::to_string(&self.service_account)?,
            serde_yaml::to_string(&self.role)?,
            serde_yaml::to_string(&self.role_binding)?,
            serde_yaml::to_string(&self.resource_quota)?,
            serde_yaml::to_string(&self.limit_range)?,
        ];

        Ok(documents
            .iter()
            .map(|doc| format!("---\n{}", doc))
            .collect())
    }
}

fn namespace(ctx: &BundleContext) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(ctx.namespace.clone()),
            labels: Some(ctx.labels.clone()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn service_account(ctx: &BundleContext) -> ServiceAccount {
    ServiceAccount {
        metadata: ctx.meta("sa"),
        ..Default::default()
    }
}

fn rule(api_group: &str, resources: &[&str], verbs: &[&str]) -> PolicyRule {
    PolicyRule {
        api_groups: Some(vec![api_group.to_string()]),
        resources: Some(resources.iter().map(|r| r.to_string()).collect()),
        verbs: verbs.iter().map(|v| v.to_string()).collect(),
        ..Default::default()
    }
}

fn role(ctx: &BundleContext) -> Role {
    Role {
        metadata: ctx.meta("role"),
        rules: Some(vec![
            rule(
                "",
                &["pods", "services", "configmaps", "secrets"],
                &["get", "list", "watch"],
            ),
            rule(
                "",
                &["pods/log", "pods/exec", "pods/portforward"],
                &["get", "create"],
            ),
            rule(
                WORKSPACE_API_GROUP,
                &["devworkspaces"],
                &["get", "list", "watch", "create", "update", "patch", "delete"],
            ),
            rule(
                "",
                &["events", "persistentvolumeclaims"],
                &["get", "list", "watch"],
            ),
        ]),
    }
}

fn role_binding(ctx: &BundleContext) -> RoleBinding {
    RoleBinding {
        metadata: ctx.meta("rolebinding"),
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "Role".to_string(),
            name: ctx.role_name(),
        },
        subjects: Some(vec![
            Subject {
                kind: "ServiceAccount".to_string(),
                name: ctx.service_account_name(),
                namespace: Some(ctx.namespace.clone()),
                ..Default::default()
            },
            Subject {
                api_group: Some("rbac.authorization.k8s.io".to_string()),
                kind: "User".to_string(),
                name: ctx.username.clone(),
                ..Default::default()
            },
        ]),
    }
}

fn quantities(values: &[(&str, &str)]) -> BTreeMap<String, Quantity> {
    values
        .iter()
        .map(|(k, v)| (k.to_string(), Quantity(v.to_string())))
        .collect()
}

fn resource_quota(ctx: &BundleContext) -> ResourceQuota {
    ResourceQuota {
        metadata: ctx.meta("quota"),
        spec: Some(ResourceQuotaSpec {
            hard: Some(quantities(QUOTA_HARD)),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn limit_range(ctx: &BundleContext) -> LimitRange {
    LimitRange {
        metadata: ctx.meta("limits"),
        spec: Some(LimitRangeSpec {
            limits: vec![
                LimitRangeItem {
                    type_: "Container".to_string(),
                    default: Some(quantities(&[("memory", "1Gi")])),
                    default_request: Some(quantities(&[("cpu", "50m"), ("memory", "128Mi")])),
                    max: Some(quantities(&[("cpu", "1"), ("memory", "2Gi")])),
                    ..Default::default()
                },
                LimitRangeItem {
                    type_: "PersistentVolumeClaim".to_string(),
                    min: Some(quantities(&[("storage", "1Gi")])),
                    max: Some(quantities(&[("storage", "5Gi")])),
                    ..Default::default()
                },
            ],
        }),
    }
}
