// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Label keys stamped on every object the workshop provisions
pub mod labels {
    pub const APP: &str = "app";
    /// Username of the tenant owning the object
    pub const USER: &str = "workshop.devspaces.io/user";
    pub const AUTHOR: &str = "workshop.devspaces.io/author";
}

/// The field manager name used for server-side apply
pub const FIELD_MANAGER: &str = "devspaces-workshop";

/// Suffix appended to a username to form its namespace
pub const NAMESPACE_SUFFIX: &str = "-devspaces";

/// Key inside the credentials secret holding the htpasswd records
pub const HTPASSWD_KEY: &str = "htpasswd";

/// Cluster operator that rolls out changes to the identity providers
pub const AUTHENTICATION_OPERATOR: &str = "authentication";

/// Name of the singleton cluster configuration objects
pub const CLUSTER_CONFIG_NAME: &str = "cluster";

/// Cluster domain used when the ingress configuration cannot be read
pub const PLACEHOLDER_DOMAIN: &str = "apps.cluster.local";

/// Hostname label of the web console under the cluster domain
pub const CONSOLE_SUBDOMAIN: &str = "console-openshift-console";

pub const DEFAULT_USER_PREFIX: &str = "user";
pub const DEFAULT_NUM_USERS: u32 = 5;
pub const DEFAULT_PASSWORD: &str = "workshop123";
