// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-tenant namespaces and their access-control and quota objects.

pub mod bundle;
pub mod tenant;

pub use bundle::NamespaceResourceBundle;
pub use tenant::{namespace_for, provision_tenant, tenants_for, Tenant};
