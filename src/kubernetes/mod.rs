// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation, identity checks, namespaces and apply.

pub mod apply;
pub mod client;
pub mod identity;
pub mod namespaces;

pub use apply::apply_resource;
pub use client::create_client;
pub use identity::{current_user, ensure_cluster_admin};
pub use namespaces::{ensure_namespace, namespace_exists};
