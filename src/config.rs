// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::credentials::HasherKind;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Workshop configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Kubeconfig context to use instead of the current one
    pub kube_context: Option<String>,
    /// Namespace holding the htpasswd secret
    pub credentials_namespace: String,
    pub credentials_secret: String,
    /// Name of the HTPasswd identity provider in the cluster OAuth config
    pub identity_provider: String,
    pub devspaces_namespace: String,
    pub devspaces_route: String,
    /// Hostname label used to synthesize the IDE URL
    pub ide_subdomain: String,
    pub app_label: String,
    pub author: String,
    /// Repository the tenants clone into their workspace
    pub repository_url: String,
    pub hasher: HasherKind,
    pub bcrypt_cost: u32,
    /// Delay before the authentication operator is first polled
    pub sync_settle: Duration,
    pub sync_poll_interval: Duration,
    pub sync_timeout: Duration,
    pub reachability_timeout: Duration,
    /// External deployment script used by test-user-detection
    pub deploy_driver: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            kube_context: None,
            credentials_namespace: "openshift-config".to_string(),
            credentials_secret: "htpass-secret".to_string(),
            identity_provider: "workshop-htpasswd".to_string(),
            devspaces_namespace: "openshift-devspaces".to_string(),
            devspaces_route: "devspaces".to_string(),
            ide_subdomain: "devspaces".to_string(),
            app_label: "devspaces-workshop".to_string(),
            author: "workshop-admin".to_string(),
            repository_url:
                "https://github.com/devfile-samples/devfile-sample-java-springboot-basic"
                    .to_string(),
            hasher: HasherKind::Bcrypt,
            bcrypt_cost: 10,
            sync_settle: Duration::from_secs(10),
            sync_poll_interval: Duration::from_secs(5),
            sync_timeout: Duration::from_secs(300),
            reachability_timeout: Duration::from_secs(10),
            deploy_driver: PathBuf::from("./deploy-devspaces.sh"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the workshop defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        Ok(Config {
            kube_context: env::var("KUBE_CONTEXT").ok().filter(|c| !c.is_empty()),
            credentials_namespace: string_var(
                "WORKSHOP_CREDENTIALS_NAMESPACE",
                defaults.credentials_namespace,
            ),
            credentials_secret: string_var("WORKSHOP_CREDENTIALS_SECRET", defaults.credentials_secret),
            identity_provider: string_var("WORKSHOP_IDENTITY_PROVIDER", defaults.identity_provider),
            devspaces_namespace: string_var(
                "WORKSHOP_DEVSPACES_NAMESPACE",
                defaults.devspaces_namespace,
            ),
            devspaces_route: string_var("WORKSHOP_DEVSPACES_ROUTE", defaults.devspaces_route),
            ide_subdomain: string_var("WORKSHOP_IDE_SUBDOMAIN", defaults.ide_subdomain),
            app_label: string_var("WORKSHOP_APP_LABEL", defaults.app_label),
            author: string_var("WORKSHOP_AUTHOR", defaults.author),
            repository_url: string_var("WORKSHOP_REPOSITORY_URL", defaults.repository_url),
            hasher: parsed_var("WORKSHOP_HASHER", defaults.hasher)?,
            bcrypt_cost: parsed_var("WORKSHOP_BCRYPT_COST", defaults.bcrypt_cost)?,
            sync_settle: secs_var("WORKSHOP_SYNC_SETTLE_SECS", defaults.sync_settle)?,
            sync_poll_interval: secs_var("WORKSHOP_SYNC_POLL_SECS", defaults.sync_poll_interval)?,
            sync_timeout: secs_var("WORKSHOP_SYNC_TIMEOUT_SECS", defaults.sync_timeout)?,
            reachability_timeout: secs_var(
                "WORKSHOP_REACHABILITY_TIMEOUT_SECS",
                defaults.reachability_timeout,
            )?,
            deploy_driver: env::var("WORKSHOP_DEPLOY_DRIVER")
                .map(PathBuf::from)
                .unwrap_or(defaults.deploy_driver),
        })
    }
}

fn string_var(name: &str, default: String) -> String {
    env::var(name).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}

fn parsed_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) if !value.is_empty() => value
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", name, value)),
        _ => Ok(default),
    }
}

fn secs_var(name: &str, default: Duration) -> Result<Duration> {
    parsed_var(name, default.as_secs()).map(Duration::from_secs)
}
