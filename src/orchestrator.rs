// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Batch creation of workshop users.

use crate::config::Config;
use crate::credentials::{
    ensure_identity_provider, merge_credentials, wait_for_authentication_rollout, PasswordHasher,
};
use crate::discovery::{discover, DiscoveryResult};
use crate::error::Result;
use crate::kubernetes::ensure_cluster_admin;
use crate::provision::{provision_tenant, tenants_for, NamespaceResourceBundle, Tenant};
use kube::Client;
use std::fmt;
use tracing::{info, instrument};

/// Parameters of one provisioning run
#[derive(Clone, Debug)]
pub struct BatchRequest {
    pub user_prefix: String,
    pub num_users: u32,
    pub password: String,
}

impl BatchRequest {
    pub fn tenants(&self) -> Vec<Tenant> {
        tenants_for(&self.user_prefix, self.num_users, &self.password)
    }

    /// The batch's tenants, failing on the first one whose name the cluster would reject
    pub fn validated_tenants(&self) -> Result<Vec<Tenant>> {
        let tenants = self.tenants();
        for tenant in &tenants {
            tenant.validate()?;
        }
        Ok(tenants)
    }
}

#[derive(Clone, Debug)]
pub struct SummaryRow {
    pub username: String,
    pub namespace: String,
    pub ide_url: String,
}

/// What a successful run created, and where users go next
#[derive(Clone, Debug)]
pub struct BatchSummary {
    pub rows: Vec<SummaryRow>,
    pub password: String,
    pub discovery: DiscoveryResult,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user_width = self
            .rows
            .iter()
            .map(|r| r.username.len())
            .chain(["USERNAME".len()])
            .max()
            .unwrap_or_default();
        let ns_width = self
            .rows
            .iter()
            .map(|r| r.namespace.len())
            .chain(["NAMESPACE".len()])
            .max()
            .unwrap_or_default();

        writeln!(f, "Created {} workshop users", self.rows.len())?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<user_width$}  {:<ns_width$}  IDE URL",
            "USERNAME", "NAMESPACE"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<user_width$}  {:<ns_width$}  {}",
                row.username, row.namespace, row.ide_url
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Password for all users: {}", self.password)?;
        writeln!(f, "OpenShift console:      {}", self.discovery.console_url)?;
        write!(f, "Dev Spaces:             {}", self.discovery.ide_url)
    }
}

/// Create every user of the batch. The first fatal error aborts the run; objects
/// created for earlier users stay in place.
#[instrument(skip(client, config, hasher, request), fields(prefix = %request.user_prefix, users = request.num_users))]
pub async fn run_batch(
    client: &Client,
    config: &Config,
    hasher: &PasswordHasher,
    request: &BatchRequest,
) -> Result<BatchSummary> {
    let tenants = request.validated_tenants()?;

    ensure_cluster_admin(client).await?;
    hasher.ensure_available().await?;

    let targets: Vec<(&str, &str)> = tenants
        .iter()
        .map(|t| (t.username.as_str(), t.password.as_str()))
        .collect();

    merge_credentials(client, config, hasher, &targets).await?;
    ensure_identity_provider(client, config).await?;
    wait_for_authentication_rollout(client, config).await?;

    let discovery = discover(client, config).await;

    for tenant in &tenants {
        provision_tenant(client, config, tenant).await?;
    }

    info!("Provisioned {} workshop users", tenants.len());

    Ok(BatchSummary {
        rows: tenants
            .iter()
            .map(|t| SummaryRow {
                username: t.username.clone(),
                namespace: t.namespace.clone(),
                ide_url: discovery.ide_url.clone(),
            })
            .collect(),
        password: request.password.clone(),
        discovery,
    })
}

/// Manifests every tenant of the batch would receive, without contacting the cluster
pub fn render_dry_run(config: &Config, request: &BatchRequest) -> Result<String> {
    request
        .validated_tenants()?
        .iter()
        .map(|tenant| NamespaceResourceBundle::for_tenant(tenant, config).render_yaml())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{CredentialStore, HasherKind};
    use crate::error::WorkshopError;
    use crate::probe::probe_tenant;
    use crate::test_utils::{
        access_review_json, che_cluster_list_json, cluster_operator_json, htpasswd_secret_json,
        namespace_json, oauth_json, MockService,
    };
    use k8s_openapi::api::core::v1::{ResourceQuota, Secret};
    use std::time::Duration;

    const REVIEW_PATH: &str = "/apis/authorization.k8s.io/v1/selfsubjectaccessreviews";
    const OPERATOR_PATH: &str = "/apis/config.openshift.io/v1/clusteroperators/authentication";
    const OAUTH_PATH: &str = "/apis/config.openshift.io/v1/oauths/cluster";

    fn config() -> Config {
        Config {
            sync_settle: Duration::ZERO,
            sync_poll_interval: Duration::from_millis(10),
            sync_timeout: Duration::from_millis(100),
            repository_url: "http://127.0.0.1:9/unreachable/repo".to_string(),
            reachability_timeout: Duration::from_secs(2),
            ..Config::default()
        }
    }

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HasherKind::Bcrypt, 4)
    }

    fn request(prefix: &str, count: u32, password: &str) -> BatchRequest {
        BatchRequest {
            user_prefix: prefix.to_string(),
            num_users: count,
            password: password.to_string(),
        }
    }

    fn admin_cluster() -> MockService {
        MockService::new()
            .on_post(REVIEW_PATH, 201, &access_review_json(true))
            .on_get(OAUTH_PATH, 200, &oauth_json())
            .on_patch(OAUTH_PATH, 200, &oauth_json())
            .on_get(OPERATOR_PATH, 200, &cluster_operator_json("authentication", "True", "False"))
    }

    #[tokio::test]
    async fn test_batch_provisions_numbered_namespaces() {
        let mock = admin_cluster();
        let client = mock.clone().into_client();

        let summary = run_batch(&client, &config(), &hasher(), &request("dev", 3, "pass1"))
            .await
            .unwrap();

        let namespaces: Vec<_> = mock
            .requests()
            .into_iter()
            .filter(|r| r.method == "PATCH" && r.path.matches('/').count() == 4)
            .map(|r| r.path)
            .collect();
        assert_eq!(
            namespaces,
            vec![
                "/api/v1/namespaces/dev1-devspaces",
                "/api/v1/namespaces/dev2-devspaces",
                "/api/v1/namespaces/dev3-devspaces",
            ]
        );

        for user in ["dev1", "dev2", "dev3"] {
            let quota = mock
                .requests_to(&format!("/api/v1/namespaces/{}-devspaces/resourcequotas", user))
                .pop()
                .unwrap();
            let quota: ResourceQuota = serde_json::from_str(&quota.body).unwrap();
            let hard = quota.spec.unwrap().hard.unwrap();
            assert_eq!(hard["requests.cpu"].0, "2");
            assert_eq!(hard["limits.memory"].0, "8Gi");
            assert_eq!(
                mock.requests_to(&format!("/api/v1/namespaces/{}-devspaces/", user)).len()
                    + mock
                        .requests_to(&format!(
                            "/apis/rbac.authorization.k8s.io/v1/namespaces/{}-devspaces/",
                            user
                        ))
                        .len(),
                5
            );
        }

        assert_eq!(summary.rows.len(), 3);
        assert_eq!(summary.rows[1].namespace, "dev2-devspaces");
        assert!(summary.to_string().contains("dev3-devspaces"));
    }

    #[tokio::test]
    async fn test_batch_then_probe_reports_ide_url() {
        let mock = admin_cluster();
        let client = mock.clone().into_client();

        run_batch(&client, &config(), &hasher(), &request("dev", 3, "pass1"))
            .await
            .unwrap();

        let published = mock
            .requests()
            .into_iter()
            .find(|r| r.method == "POST" && r.path.ends_with("/secrets"))
            .unwrap();
        let secret: Secret = serde_json::from_str(&published.body).unwrap();
        let contents = String::from_utf8(secret.data.unwrap()["htpasswd"].0.clone()).unwrap();
        assert_eq!(
            CredentialStore::parse(&contents).unwrap().usernames(),
            vec!["dev1", "dev2", "dev3"]
        );

        let cluster = MockService::new()
            .on_get(
                "/api/v1/namespaces/openshift-config/secrets/htpass-secret",
                200,
                &htpasswd_secret_json("openshift-config", "htpass-secret", &contents),
            )
            .on_get("/api/v1/namespaces/dev2-devspaces", 200, &namespace_json("dev2-devspaces"))
            .on_get(
                "/apis/org.eclipse.che/v2/checlusters",
                200,
                &che_cluster_list_json(Some("https://ide.example.com")),
            );

        let report = probe_tenant(&cluster.clone().into_client(), &config(), "dev2")
            .await
            .unwrap();
        assert!(report.passed());
        assert_eq!(report.ide_url.as_deref(), Some("https://ide.example.com"));

        let ghost = probe_tenant(&cluster.into_client(), &config(), "ghost")
            .await
            .unwrap();
        assert!(!ghost.passed());
        assert!(ghost.to_string().contains("dev1 dev2 dev3"));
    }

    #[tokio::test]
    async fn test_missing_privilege_stops_before_any_write() {
        let mock = MockService::new().on_post(REVIEW_PATH, 201, &access_review_json(false));
        let client = mock.clone().into_client();

        let err = run_batch(&client, &config(), &hasher(), &request("user", 5, "workshop123"))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkshopError::InsufficientPrivilege(_)));
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_prefix_is_rejected_before_contacting_the_cluster() {
        for prefix in ["Dev", "bad\nname", "bad:name"] {
            let mock = admin_cluster();
            let client = mock.clone().into_client();

            let err = run_batch(&client, &config(), &hasher(), &request(prefix, 2, "pw"))
                .await
                .unwrap_err();

            assert!(matches!(err, WorkshopError::InvalidUsername { .. }));
            assert!(mock.requests().is_empty());
        }

        assert!(render_dry_run(&Config::default(), &request("dev_", 1, "pw")).is_err());
    }

    #[tokio::test]
    async fn test_sync_timeout_aborts_before_provisioning() {
        let mock = MockService::new()
            .on_post(REVIEW_PATH, 201, &access_review_json(true))
            .on_get(OAUTH_PATH, 200, &oauth_json())
            .on_patch(OAUTH_PATH, 200, &oauth_json())
            .on_get(OPERATOR_PATH, 200, &cluster_operator_json("authentication", "True", "True"));
        let client = mock.clone().into_client();

        let err = run_batch(&client, &config(), &hasher(), &request("user", 2, "workshop123"))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkshopError::SyncTimeout { .. }));
        assert!(mock.requests_to("/api/v1/namespaces/user1-devspaces").is_empty());
    }

    #[test]
    fn test_dry_run_renders_every_tenant() {
        let yaml = render_dry_run(&Config::default(), &request("dev", 2, "pass1")).unwrap();

        assert!(yaml.contains("name: dev1-devspaces"));
        assert!(yaml.contains("name: dev2-devspaces"));
        assert!(!yaml.contains("pass1"));
    }
}
