// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The htpasswd-style username/hash collection

use crate::error::{Result, WorkshopError};

/// Ordered `username -> hash` records, serialized as `username:hash` lines
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialStore {
    entries: Vec<(String, String)>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse newline-delimited `username:hash` records. Blank lines are skipped and a
    /// repeated username keeps its first position with the last hash.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut store = CredentialStore::new();

        for (index, line) in contents.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let Some((username, hash)) = line.split_once(':') else {
                return Err(WorkshopError::InvalidCredentialStore {
                    line: index + 1,
                    reason: "missing ':' separator".to_string(),
                });
            };

            if username.is_empty() {
                return Err(WorkshopError::InvalidCredentialStore {
                    line: index + 1,
                    reason: "empty username".to_string(),
                });
            }

            store.upsert(username, hash).map_err(|e| WorkshopError::InvalidCredentialStore {
                line: index + 1,
                reason: e.to_string(),
            })?;
        }

        Ok(store)
    }

    /// Overwrite the hash of an existing user in place, or append a new record.
    /// Returns true when the user was already present.
    pub fn upsert(&mut self, username: &str, hash: &str) -> Result<bool> {
        validate_username(username)?;
        if hash.contains(['\n', '\r']) {
            return Err(WorkshopError::Hashing(format!(
                "hash for '{}' spans multiple lines",
                username
            )));
        }

        match self.entries.iter_mut().find(|(u, _)| u == username) {
            Some(entry) => {
                entry.1 = hash.to_string();
                Ok(true)
            }
            None => {
                self.entries.push((username.to_string(), hash.to_string()));
                Ok(false)
            }
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.entries.iter().any(|(u, _)| u == username)
    }

    pub fn hash_of(&self, username: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(u, _)| u == username)
            .map(|(_, h)| h.as_str())
    }

    pub fn usernames(&self) -> Vec<&str> {
        self.entries.iter().map(|(u, _)| u.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(u, h)| format!("{}:{}\n", u, h))
            .collect()
    }
}

/// A username must fit on one `username:hash` line
pub fn validate_username(username: &str) -> Result<()> {
    let reason = if username.is_empty() {
        "empty username"
    } else if username.contains(':') {
        "contains ':'"
    } else if username.contains(['\n', '\r']) {
        "contains a line break"
    } else {
        return Ok(());
    };

    Err(WorkshopError::InvalidUsername {
        username: username.escape_debug().to_string(),
        reason: reason.to_string(),
    })
}
