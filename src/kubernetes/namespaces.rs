// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use crate::error::{Result, WorkshopError};
use crate::kubernetes::apply::apply_resource;
use k8s_openapi::api::core::v1::Namespace;
use kube::{Api, Client, ResourceExt};
use tracing::{debug, info, instrument};

/// Check whether a namespace exists
#[instrument(skip(client))]
pub async fn namespace_exists(client: &Client, namespace: &str) -> Result<bool> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.get(namespace).await {
        Ok(_) => Ok(true),
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Ensure a namespace exists and carries the desired labels; re-applying is a no-op
#[instrument(skip(client, namespace), fields(namespace = %namespace.name_any()))]
pub async fn ensure_namespace(client: &Client, namespace: &Namespace) -> Result<()> {
    let name = namespace.name_any();

    if namespace_exists(client, &name).await? {
        debug!("Namespace {} already exists, reconciling labels", name);
    } else {
        info!("Creating namespace {}", name);
    }

    let namespaces: Api<Namespace> = Api::all(client.clone());
    apply_resource(&namespaces, namespace)
        .await
        .map_err(|source| WorkshopError::Apply {
            kind: "Namespace".to_string(),
            name: name.clone(),
            source,
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{namespace_json, not_found_json, MockService};
    use kube::api::ObjectMeta;

    fn make_namespace(name: &str) -> Namespace {
        Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_namespace_exists() {
        let mock = MockService::new().on_get(
            "/api/v1/namespaces/user1-devspaces",
            200,
            &namespace_json("user1-devspaces"),
        );

        assert!(namespace_exists(&mock.into_client(), "user1-devspaces")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_namespace_missing() {
        let mock = MockService::new().on_get(
            "/api/v1/namespaces/user1-devspaces",
            404,
            &not_found_json("namespaces", "user1-devspaces"),
        );

        assert!(!namespace_exists(&mock.into_client(), "user1-devspaces")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_ensure_namespace_applies_when_missing() {
        let mock = MockService::new();
        let client = mock.clone().into_client();

        ensure_namespace(&client, &make_namespace("user1-devspaces"))
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].method, "PATCH");
        assert_eq!(requests[1].path, "/api/v1/namespaces/user1-devspaces");
    }

    #[tokio::test]
    async fn test_ensure_namespace_apply_failure() {
        let mock = MockService::new().on_patch(
            "/api/v1/namespaces/user1-devspaces",
            403,
            &crate::test_utils::forbidden_json("namespaces", "user1-devspaces"),
        );

        let err = ensure_namespace(&mock.into_client(), &make_namespace("user1-devspaces"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkshopError::Apply { ref kind, .. } if kind == "Namespace"));
    }
}
