// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The htpasswd credential store: parsing, hashing, merging and rollout.

pub mod hasher;
pub mod merger;
pub mod store;
pub mod sync;

pub use hasher::{HasherKind, PasswordHasher};
pub use merger::{ensure_identity_provider, fetch_credential_store, merge_credentials, MergeOutcome};
pub use store::CredentialStore;
pub use sync::wait_for_authentication_rollout;
