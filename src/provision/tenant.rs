// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Workshop tenants and per-tenant provisioning

use crate::config::Config;
use crate::constants::NAMESPACE_SUFFIX;
use crate::error::{Result, WorkshopError};
use crate::kubernetes::{apply_resource, ensure_namespace};
use crate::provision::bundle::NamespaceResourceBundle;
use k8s_openapi::api::core::v1::{LimitRange, ResourceQuota, ServiceAccount};
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};
use kube::{Api, Client, Resource, ResourceExt};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use tracing::{info, instrument};

/// One workshop participant
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tenant {
    pub username: String,
    pub namespace: String,
    pub password: String,
}

impl Tenant {
    pub fn new(username: &str, password: &str) -> Self {
        Tenant {
            username: username.to_string(),
            namespace: namespace_for(username),
            password: password.to_string(),
        }
    }

    /// The `index`-th tenant of a batch, e.g. `user3`
    pub fn numbered(prefix: &str, index: u32, password: &str) -> Self {
        Tenant::new(&format!("{}{}", prefix, index), password)
    }

    /// The namespace must be a DNS-1123 label, which also keeps the username usable as a
    /// credential store key.
    pub fn validate(&self) -> Result<()> {
        let ns = &self.namespace;
        let reason = if ns.len() > MAX_NAMESPACE_LEN {
            format!("namespace '{}' exceeds {} characters", ns, MAX_NAMESPACE_LEN)
        } else if !ns
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            format!(
                "namespace '{}' may only contain lowercase letters, digits and '-'",
                ns.escape_debug()
            )
        } else if ns.starts_with('-') {
            format!("namespace '{}' must start with a letter or digit", ns)
        } else {
            return Ok(());
        };

        Err(WorkshopError::InvalidUsername {
            username: self.username.escape_debug().to_string(),
            reason,
        })
    }
}

const MAX_NAMESPACE_LEN: usize = 63;

/// Namespace owned by a user: always `<username>-devspaces`
pub fn namespace_for(username: &str) -> String {
    format!("{}{}", username, NAMESPACE_SUFFIX)
}

/// Tenants `1..=count` sharing one password
pub fn tenants_for(prefix: &str, count: u32, password: &str) -> Vec<Tenant> {
    (1..=count)
        .map(|i| Tenant::numbered(prefix, i, password))
        .collect()
}

/// Create the tenant's namespace and apply its resource bundle. The first failure aborts.
#[instrument(skip(client, config, tenant), fields(user = %tenant.username))]
pub async fn provision_tenant(client: &Client, config: &Config, tenant: &Tenant) -> Result<()> {
    let bundle = NamespaceResourceBundle::for_tenant(tenant, config);
    let namespace = bundle.namespace_name();

    ensure_namespace(client, bundle.namespace()).await?;

    apply_in::<ServiceAccount>(client, namespace, bundle.service_account()).await?;
    apply_in::<Role>(client, namespace, bundle.role()).await?;
    apply_in::<RoleBinding>(client, namespace, bundle.role_binding()).await?;
    apply_in::<ResourceQuota>(client, namespace, bundle.resource_quota()).await?;
    apply_in::<LimitRange>(client, namespace, bundle.limit_range()).await?;

    info!("Provisioned namespace {} for {}", namespace, tenant.username);
    Ok(())
}

async fn apply_in<K>(client: &Client, namespace: &str, resource: &K) -> Result<()>
where
    K: Resource<Scope = k8s_openapi::NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned,
    K::DynamicType: Default,
{
    let api: Api<K> = Api::namespaced(client.clone(), namespace);
    apply_resource(&api, resource)
        .await
        .map(|_| ())
        .map_err(|source| WorkshopError::Apply {
            kind: K::kind(&K::DynamicType::default()).to_string(),
            name: resource.name_any(),
            source,
        })
}
