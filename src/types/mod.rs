// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resources read or written by the workshop tooling.

pub mod devspaces;
pub mod openshift;

pub use devspaces::{CheCluster, DevWorkspace, WorkspacePhase};
pub use openshift::{ClusterConsole, ClusterIngress, ClusterOperator, OAuth, Route};
