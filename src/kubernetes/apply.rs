// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Server-side apply helper shared by every declarative write

use crate::constants::FIELD_MANAGER;
use kube::{
    api::{Patch, PatchParams},
    Api, Resource, ResourceExt,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use tracing::trace;

/// Apply a resource (create or update). Applying an identical object again changes nothing.
pub async fn apply_resource<K>(api: &Api<K>, resource: &K) -> Result<K, kube::Error>
where
    K: Resource + Clone + Debug + Serialize + DeserializeOwned,
{
    let name = resource.name_any();
    trace!("applying {}", name);

    let pp = PatchParams::apply(FIELD_MANAGER).force();
    api.patch(&name, &pp, &Patch::Apply(resource)).await
}
