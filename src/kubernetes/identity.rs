// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Who the client is and what it may do

use crate::error::{Result, WorkshopError};
use k8s_openapi::api::authentication::v1::SelfSubjectReview;
use k8s_openapi::api::authorization::v1::{
    ResourceAttributes, SelfSubjectAccessReview, SelfSubjectAccessReviewSpec,
};
use kube::{api::PostParams, Api, Client};
use tracing::{debug, info, instrument};

/// Resolve the username of the current session
#[instrument(skip(client))]
pub async fn current_user(client: &Client) -> Result<String> {
    let reviews: Api<SelfSubjectReview> = Api::all(client.clone());

    let review = reviews
        .create(&PostParams::default(), &SelfSubjectReview::default())
        .await
        .map_err(|e| WorkshopError::NotAuthenticated(e.to_string()))?;

    review
        .status
        .and_then(|s| s.user_info)
        .and_then(|u| u.username)
        .ok_or_else(|| {
            WorkshopError::NotAuthenticated("the API server returned no user identity".to_string())
        })
}

/// Fail unless the current session may do anything in every namespace
#[instrument(skip(client))]
pub async fn ensure_cluster_admin(client: &Client) -> Result<()> {
    let reviews: Api<SelfSubjectAccessReview> = Api::all(client.clone());
    let review = SelfSubjectAccessReview {
        spec: SelfSubjectAccessReviewSpec {
            resource_attributes: Some(ResourceAttributes {
                group: Some("*".to_string()),
                resource: Some("*".to_string()),
                verb: Some("*".to_string()),
                namespace: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    };

    let response = reviews.create(&PostParams::default(), &review).await?;
    let status = response.status.unwrap_or_default();

    if status.allowed {
        info!("Cluster-admin privileges confirmed");
        Ok(())
    } else {
        debug!("Access review denied: {:?}", status.reason);
        Err(WorkshopError::InsufficientPrivilege(
            status
                .reason
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "current user is not a cluster-admin".to_string()),
        ))
    }
}
