// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Merging workshop users into the cluster's htpasswd secret

use crate::config::Config;
use crate::constants::{CLUSTER_CONFIG_NAME, HTPASSWD_KEY};
use crate::credentials::hasher::PasswordHasher;
use crate::credentials::store::{validate_username, CredentialStore};
use crate::error::{Result, WorkshopError};
use crate::types::openshift::{IdentityProvider, OAuth};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::{
    api::{ObjectMeta, Patch, PatchParams, PostParams},
    Api, Client,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, warn};

/// What a merge changed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    /// Entries carried over untouched
    pub preserved: usize,
}

/// Read the credential store. `None` when the backing secret does not exist.
#[instrument(skip(client, config))]
pub async fn fetch_credential_store(
    client: &Client,
    config: &Config,
) -> Result<Option<CredentialStore>> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), &config.credentials_namespace);

    match get_secret(&secrets, &config.credentials_secret).await? {
        Some(secret) => decode_store(&secret).map(Some),
        None => Ok(None),
    }
}

/// Add or update the given `(username, password)` pairs in the credential store.
///
/// Existing entries outside the batch are preserved. The store is written back in a single
/// request; an existing secret is replaced with its fetched resourceVersion so a concurrent
/// writer produces a [`WorkshopError::StoreConflict`] instead of a lost update. A username
/// may appear only once in `targets`.
#[instrument(skip_all, fields(users = targets.len()))]
pub async fn merge_credentials(
    client: &Client,
    config: &Config,
    hasher: &PasswordHasher,
    targets: &[(&str, &str)],
) -> Result<MergeOutcome> {
    let mut batch = BTreeSet::new();
    for (username, _) in targets {
        validate_username(username)?;
        if !batch.insert(*username) {
            return Err(WorkshopError::InvalidUsername {
                username: username.to_string(),
                reason: "listed more than once in the batch".to_string(),
            });
        }
    }

    let secrets: Api<Secret> = Api::namespaced(client.clone(), &config.credentials_namespace);
    let existing = get_secret(&secrets, &config.credentials_secret).await?;

    let mut store = match &existing {
        Some(secret) => decode_store(secret)?,
        None => {
            info!(
                "Secret {}/{} does not exist yet, starting from an empty store",
                config.credentials_namespace, config.credentials_secret
            );
            CredentialStore::new()
        }
    };

    let mut outcome = MergeOutcome {
        preserved: store
            .usernames()
            .into_iter()
            .filter(|u| !batch.contains(u))
            .count(),
        ..Default::default()
    };

    for (username, password) in targets {
        let hash = hasher.hash(username, password).await?;
        if store.upsert(username, &hash)? {
            debug!("Updated password hash for {}", username);
            outcome.updated.push(username.to_string());
        } else {
            debug!("Added {} to the credential store", username);
            outcome.added.push(username.to_string());
        }
    }

    publish(&secrets, config, existing, &store).await?;

    info!(
        "Credential store published: {} added, {} updated, {} preserved",
        outcome.added.len(),
        outcome.updated.len(),
        outcome.preserved
    );

    Ok(outcome)
}

async fn get_secret(secrets: &Api<Secret>, name: &str) -> Result<Option<Secret>> {
    match secrets.get(name).await {
        Ok(secret) => Ok(Some(secret)),
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn decode_store(secret: &Secret) -> Result<CredentialStore> {
    let Some(raw) = secret.data.as_ref().and_then(|d| d.get(HTPASSWD_KEY)) else {
        warn!("Credential secret has no '{}' key, treating it as empty", HTPASSWD_KEY);
        return Ok(CredentialStore::new());
    };

    let contents = String::from_utf8(raw.0.clone()).map_err(|e| {
        WorkshopError::InvalidCredentialStore {
            line: 0,
            reason: format!("not valid UTF-8: {}", e),
        }
    })?;

    CredentialStore::parse(&contents)
}

async fn publish(
    secrets: &Api<Secret>,
    config: &Config,
    existing: Option<Secret>,
    store: &CredentialStore,
) -> Result<()> {
    let contents = ByteString(store.render().into_bytes());
    let name = &config.credentials_secret;

    let result = match existing {
        Some(mut secret) => {
            secret.metadata.managed_fields = None;
            secret
                .data
                .get_or_insert_with(BTreeMap::new)
                .insert(HTPASSWD_KEY.to_string(), contents);
            secrets.replace(name, &PostParams::default(), &secret).await
        }
        None => {
            let secret = Secret {
                metadata: ObjectMeta {
                    name: Some(name.clone()),
                    namespace: Some(config.credentials_namespace.clone()),
                    ..Default::default()
                },
                data: Some(BTreeMap::from([(HTPASSWD_KEY.to_string(), contents)])),
                type_: Some("Opaque".to_string()),
                ..Default::default()
            };
            secrets.create(&PostParams::default(), &secret).await
        }
    };

    match result {
        Ok(_) => Ok(()),
        Err(kube::Error::Api(err)) if err.code == 409 => Err(WorkshopError::StoreConflict(
            format!("{}/{}: {}", config.credentials_namespace, name, err.message),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Make sure the cluster OAuth configuration has an HTPasswd provider reading the store.
/// Returns true when a provider was added. Without an OAuth configuration the cluster has
/// no authentication operator to roll out, so that is an error.
#[instrument(skip(client, config))]
pub async fn ensure_identity_provider(client: &Client, config: &Config) -> Result<bool> {
    let oauths: Api<OAuth> = Api::all(client.clone());

    let oauth = match oauths.get(CLUSTER_CONFIG_NAME).await {
        Ok(oauth) => oauth,
        Err(kube::Error::Api(err)) if err.code == 404 => {
            return Err(WorkshopError::ResourceNotFound {
                kind: "OAuth".to_string(),
                name: CLUSTER_CONFIG_NAME.to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if oauth.has_htpasswd_provider(&config.credentials_secret) {
        debug!(
            "OAuth already has an HTPasswd provider for {}",
            config.credentials_secret
        );
        return Ok(false);
    }

    let mut providers = oauth.spec.identity_providers.unwrap_or_default();
    providers.push(IdentityProvider::htpasswd(
        &config.identity_provider,
        &config.credentials_secret,
    ));

    info!(
        "Adding HTPasswd identity provider {} to the cluster OAuth configuration",
        config.identity_provider
    );
    let patch = serde_json::json!({ "spec": { "identityProviders": providers } });
    oauths
        .patch(CLUSTER_CONFIG_NAME, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(true)
}
