// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Best-effort discovery of the cluster domain, IDE URL and console URL.
//!
//! Nothing here fails: every lookup degrades to a synthesized default.

use crate::config::Config;
use crate::constants::{CLUSTER_CONFIG_NAME, CONSOLE_SUBDOMAIN, PLACEHOLDER_DOMAIN};
use crate::types::devspaces::CheCluster;
use crate::types::openshift::{ClusterConsole, ClusterIngress, Route};
use kube::{api::ListParams, Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::{self, Debug};
use tracing::{debug, info, instrument};
use url::Url;

/// Where the IDE URL came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdeUrlSource {
    Route,
    CheClusterStatus,
    Synthesized,
}

impl fmt::Display for IdeUrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdeUrlSource::Route => write!(f, "route"),
            IdeUrlSource::CheClusterStatus => write!(f, "CheCluster status"),
            IdeUrlSource::Synthesized => write!(f, "synthesized from cluster domain"),
        }
    }
}

/// Lookups tried in order before falling back to a synthesized URL
const IDE_URL_STRATEGIES: &[IdeUrlSource] = &[IdeUrlSource::Route, IdeUrlSource::CheClusterStatus];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveryResult {
    pub cluster_domain: String,
    pub ide_url: String,
    pub ide_url_source: IdeUrlSource,
    pub console_url: String,
}

#[instrument(skip_all)]
pub async fn discover(client: &Client, config: &Config) -> DiscoveryResult {
    let cluster_domain = lookup_cluster_domain(client)
        .await
        .unwrap_or_else(|| PLACEHOLDER_DOMAIN.to_string());

    let mut ide = None;
    for strategy in IDE_URL_STRATEGIES {
        let found = match strategy {
            IdeUrlSource::Route => lookup_route_url(client, config).await,
            IdeUrlSource::CheClusterStatus => lookup_che_url(client).await,
            IdeUrlSource::Synthesized => None,
        };
        if let Some(url) = found {
            ide = Some((url, *strategy));
            break;
        }
        debug!("IDE URL strategy '{}' found nothing", strategy);
    }
    let (ide_url, ide_url_source) = ide.unwrap_or_else(|| {
        (
            format!("https://{}.{}", config.ide_subdomain, cluster_domain),
            IdeUrlSource::Synthesized,
        )
    });

    let console_url = lookup_console_url(client)
        .await
        .unwrap_or_else(|| format!("https://{}.{}", CONSOLE_SUBDOMAIN, cluster_domain));

    info!(
        "Discovered cluster domain {}, IDE {} (via {}), console {}",
        cluster_domain, ide_url, ide_url_source, console_url
    );

    DiscoveryResult {
        cluster_domain,
        ide_url,
        ide_url_source,
        console_url,
    }
}

/// The IDE URL as reported in the status of any CheCluster
pub async fn lookup_che_url(client: &Client) -> Option<String> {
    let checlusters: Api<CheCluster> = Api::all(client.clone());

    match checlusters.list(&ListParams::default()).await {
        Ok(list) => list
            .items
            .iter()
            .filter_map(CheCluster::che_url)
            .find_map(normalize_url),
        Err(e) => {
            debug!("Could not list CheClusters: {}", e);
            None
        }
    }
}

async fn lookup_cluster_domain(client: &Client) -> Option<String> {
    let ingresses: Api<ClusterIngress> = Api::all(client.clone());
    get_optional(&ingresses, CLUSTER_CONFIG_NAME)
        .await
        .and_then(|ingress| ingress.spec.domain)
        .filter(|domain| !domain.is_empty())
}

async fn lookup_route_url(client: &Client, config: &Config) -> Option<String> {
    let routes: Api<Route> = Api::namespaced(client.clone(), &config.devspaces_namespace);
    get_optional(&routes, &config.devspaces_route)
        .await
        .and_then(|route| route.spec.host)
        .and_then(|host| normalize_url(&host))
}

async fn lookup_console_url(client: &Client) -> Option<String> {
    let consoles: Api<ClusterConsole> = Api::all(client.clone());
    get_optional(&consoles, CLUSTER_CONFIG_NAME)
        .await
        .and_then(|console| console.status)
        .and_then(|status| status.console_url)
        .and_then(|url| normalize_url(&url))
}

async fn get_optional<K>(api: &Api<K>, name: &str) -> Option<K>
where
    K: Resource + Clone + Debug + DeserializeOwned,
{
    match api.get(name).await {
        Ok(resource) => Some(resource),
        Err(e) => {
            debug!("Lookup of {} failed: {}", name, e);
            None
        }
    }
}

/// Turn a bare host or URL into an `https://` URL without trailing slash
fn normalize_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    Url::parse(&candidate)
        .ok()
        .filter(|url| url.host_str().is_some())
        .map(|url| url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{che_cluster_list_json, MockService};

    const INGRESS_PATH: &str = "/apis/config.openshift.io/v1/ingresses/cluster";
    const ROUTE_PATH: &str = "/apis/route.openshift.io/v1/namespaces/openshift-devspaces/routes/devspaces";
    const CHE_PATH: &str = "/apis/org.eclipse.che/v2/checlusters";
    const CONSOLE_PATH: &str = "/apis/config.openshift.io/v1/consoles/cluster";

    fn ingress_json(domain: &str) -> String {
        serde_json::json!({
            "apiVersion": "config.openshift.io/v1",
            "kind": "Ingress",
            "metadata": { "name": "cluster" },
            "spec": { "domain": domain }
        })
        .to_string()
    }

    fn route_json(host: &str) -> String {
        serde_json::json!({
            "apiVersion": "route.openshift.io/v1",
            "kind": "Route",
            "metadata": { "name": "devspaces", "namespace": "openshift-devspaces" },
            "spec": { "host": host }
        })
        .to_string()
    }

    fn console_json(url: &str) -> String {
        serde_json::json!({
            "apiVersion": "config.openshift.io/v1",
            "kind": "Console",
            "metadata": { "name": "cluster" },
            "spec": {},
            "status": { "consoleURL": url }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_route_wins_over_checluster() {
        let mock = MockService::new()
            .on_get(INGRESS_PATH, 200, &ingress_json("apps.example.com"))
            .on_get(ROUTE_PATH, 200, &route_json("devspaces.apps.example.com"))
            .on_get(CHE_PATH, 200, &che_cluster_list_json(Some("https://ide.example.com")))
            .on_get(CONSOLE_PATH, 200, &console_json("https://console.example.com/"));

        let result = discover(&mock.into_client(), &Config::default()).await;

        assert_eq!(result.cluster_domain, "apps.example.com");
        assert_eq!(result.ide_url, "https://devspaces.apps.example.com");
        assert_eq!(result.ide_url_source, IdeUrlSource::Route);
        assert_eq!(result.console_url, "https://console.example.com");
    }

    #[tokio::test]
    async fn test_checluster_status_used_without_route() {
        let mock = MockService::new()
            .on_get(INGRESS_PATH, 200, &ingress_json("apps.example.com"))
            .on_get(CHE_PATH, 200, &che_cluster_list_json(Some("https://ide.example.com")));

        let result = discover(&mock.into_client(), &Config::default()).await;

        assert_eq!(result.ide_url, "https://ide.example.com");
        assert_eq!(result.ide_url_source, IdeUrlSource::CheClusterStatus);
        assert_eq!(
            result.console_url,
            "https://console-openshift-console.apps.example.com"
        );
    }

    #[tokio::test]
    async fn test_synthesized_from_domain() {
        let mock = MockService::new()
            .on_get(INGRESS_PATH, 200, &ingress_json("apps.example.com"))
            .on_get(CHE_PATH, 200, &che_cluster_list_json(None));

        let result = discover(&mock.into_client(), &Config::default()).await;

        assert_eq!(result.ide_url, "https://devspaces.apps.example.com");
        assert_eq!(result.ide_url_source, IdeUrlSource::Synthesized);
    }

    #[tokio::test]
    async fn test_nothing_available_uses_placeholder() {
        let mock = MockService::new();

        let result = discover(&mock.into_client(), &Config::default()).await;

        assert_eq!(result.cluster_domain, PLACEHOLDER_DOMAIN);
        assert_eq!(result.ide_url, format!("https://devspaces.{}", PLACEHOLDER_DOMAIN));
        assert_eq!(
            result.console_url,
            format!("https://console-openshift-console.{}", PLACEHOLDER_DOMAIN)
        );
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("devspaces.apps.example.com").as_deref(),
            Some("https://devspaces.apps.example.com")
        );
        assert_eq!(
            normalize_url("https://ide.example.com/").as_deref(),
            Some("https://ide.example.com")
        );
        assert_eq!(normalize_url("  "), None);
    }
}
