// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Password hashing strategies for the htpasswd store

use crate::error::{Result, WorkshopError};
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

const HTPASSWD: &str = "htpasswd";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HasherKind {
    /// In-process bcrypt, always available
    Bcrypt,
    /// The external `htpasswd` utility, installed on demand
    Htpasswd,
}

#[derive(Error, Debug)]
#[error("unknown hasher '{0}', expected 'bcrypt' or 'htpasswd'")]
pub struct UnknownHasher(String);

impl FromStr for HasherKind {
    type Err = UnknownHasher;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bcrypt" => Ok(HasherKind::Bcrypt),
            "htpasswd" => Ok(HasherKind::Htpasswd),
            other => Err(UnknownHasher(other.to_string())),
        }
    }
}

/// One way of installing the htpasswd utility
struct Installer {
    manager: &'static str,
    args: &'static [&'static str],
}

/// Tried in order; managers missing from PATH are skipped
const INSTALLERS: &[Installer] = &[
    Installer {
        manager: "dnf",
        args: &["install", "-y", "httpd-tools"],
    },
    Installer {
        manager: "yum",
        args: &["install", "-y", "httpd-tools"],
    },
    Installer {
        manager: "apt-get",
        args: &["install", "-y", "apache2-utils"],
    },
    Installer {
        manager: "apk",
        args: &["add", "--no-cache", "apache2-utils"],
    },
    Installer {
        manager: "brew",
        args: &["install", "httpd"],
    },
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    ManagerMissing,
    Failed(String),
    /// The package manager succeeded but the tool is still not on PATH
    ToolStillMissing,
    Installed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallAttempt {
    pub manager: &'static str,
    pub outcome: InstallOutcome,
}

impl fmt::Display for InstallAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            InstallOutcome::ManagerMissing => write!(f, "{}: not installed", self.manager),
            InstallOutcome::Failed(reason) => write!(f, "{}: {}", self.manager, reason),
            InstallOutcome::ToolStillMissing => {
                write!(f, "{}: installed package but {} not found", self.manager, HTPASSWD)
            }
            InstallOutcome::Installed => write!(f, "{}: installed", self.manager),
        }
    }
}

/// Hashes workshop passwords into htpasswd-compatible bcrypt hashes
#[derive(Clone, Debug)]
pub struct PasswordHasher {
    kind: HasherKind,
    cost: u32,
    search_path: Option<OsString>,
}

impl PasswordHasher {
    pub fn new(kind: HasherKind, cost: u32) -> Self {
        Self {
            kind,
            cost,
            search_path: None,
        }
    }

    /// Look up executables in the given PATH-style list instead of `$PATH`
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// Make sure the selected strategy can hash, installing the external tool if needed
    #[instrument(skip(self), fields(kind = ?self.kind))]
    pub async fn ensure_available(&self) -> Result<()> {
        if self.kind == HasherKind::Bcrypt || self.find_executable(HTPASSWD).is_some() {
            debug!("Password hasher {:?} is available", self.kind);
            return Ok(());
        }

        warn!("{} not found, trying package managers", HTPASSWD);
        let mut attempts = Vec::new();

        for installer in INSTALLERS {
            let attempt = self.try_install(installer).await;
            info!("Install attempt: {}", attempt);
            let installed = attempt.outcome == InstallOutcome::Installed;
            attempts.push(attempt);

            if installed {
                return Ok(());
            }
        }

        Err(WorkshopError::ToolingMissing {
            tool: HTPASSWD.to_string(),
            attempts: attempts.iter().map(ToString::to_string).collect(),
        })
    }

    async fn try_install(&self, installer: &Installer) -> InstallAttempt {
        let Some(manager) = self.find_executable(installer.manager) else {
            return InstallAttempt {
                manager: installer.manager,
                outcome: InstallOutcome::ManagerMissing,
            };
        };

        let outcome = match Command::new(manager).args(installer.args).output().await {
            Ok(output) if output.status.success() => {
                if self.find_executable(HTPASSWD).is_some() {
                    InstallOutcome::Installed
                } else {
                    InstallOutcome::ToolStillMissing
                }
            }
            Ok(output) => InstallOutcome::Failed(format!("exited with {}", output.status)),
            Err(e) => InstallOutcome::Failed(e.to_string()),
        };

        InstallAttempt {
            manager: installer.manager,
            outcome,
        }
    }

    /// Hash a password for the given user
    pub async fn hash(&self, username: &str, password: &str) -> Result<String> {
        match self.kind {
            HasherKind::Bcrypt => self.hash_bcrypt(password).await,
            HasherKind::Htpasswd => self.hash_htpasswd(username, password).await,
        }
    }

    async fn hash_bcrypt(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.cost;

        let parts = tokio::task::spawn_blocking(move || bcrypt::hash_with_result(password, cost))
            .await
            .map_err(|e| WorkshopError::Hashing(format!("hashing task failed: {}", e)))?
            .map_err(|e| WorkshopError::Hashing(e.to_string()))?;

        Ok(parts.format_for_version(bcrypt::Version::TwoY))
    }

    async fn hash_htpasswd(&self, username: &str, password: &str) -> Result<String> {
        let tool = self
            .find_executable(HTPASSWD)
            .ok_or_else(|| WorkshopError::ToolingMissing {
                tool: HTPASSWD.to_string(),
                attempts: Vec::new(),
            })?;

        let output = Command::new(tool)
            .arg("-nbB")
            .arg("-C")
            .arg(self.cost.to_string())
            .arg(username)
            .arg(password)
            .output()
            .await
            .map_err(|e| WorkshopError::Hashing(format!("failed to run {}: {}", HTPASSWD, e)))?;

        if !output.status.success() {
            return Err(WorkshopError::Hashing(format!(
                "{} exited with {}",
                HTPASSWD, output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .find_map(|line| line.split_once(':'))
            .filter(|(user, hash)| *user == username && !hash.is_empty())
            .map(|(_, hash)| hash.to_string())
            .ok_or_else(|| {
                WorkshopError::Hashing(format!("unexpected {} output for {}", HTPASSWD, username))
            })
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        let search_path = self.search_path.clone().or_else(|| env::var_os("PATH"))?;
        env::split_paths(&search_path)
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
