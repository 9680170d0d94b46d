// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Waiting for the authentication operator to roll out a credential change

use crate::config::Config;
use crate::constants::AUTHENTICATION_OPERATOR;
use crate::error::{Result, WorkshopError};
use crate::types::openshift::ClusterOperator;
use kube::{Api, Client};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

/// Wait until the authentication operator reports a settled rollout.
///
/// Sleeps `sync_settle` once so the operator can notice the change, then polls every
/// `sync_poll_interval`. Gives up with [`WorkshopError::SyncTimeout`] after `sync_timeout`.
#[instrument(skip(client, config))]
pub async fn wait_for_authentication_rollout(client: &Client, config: &Config) -> Result<()> {
    let operators: Api<ClusterOperator> = Api::all(client.clone());
    let started = Instant::now();
    let deadline = started + config.sync_timeout;

    if !config.sync_settle.is_zero() {
        debug!("Giving the authentication operator {:?} to pick up the change", config.sync_settle);
        sleep(config.sync_settle).await;
    }

    loop {
        match operators.get(AUTHENTICATION_OPERATOR).await {
            Ok(operator) if operator.is_settled() => {
                info!(
                    "Authentication operator settled after {}s",
                    started.elapsed().as_secs()
                );
                return Ok(());
            }
            Ok(operator) => {
                debug!(
                    "Authentication operator not settled yet (Available={:?}, Progressing={:?})",
                    operator.condition("Available"),
                    operator.condition("Progressing")
                );
            }
            Err(e) => {
                warn!("Error reading cluster operator {}: {}", AUTHENTICATION_OPERATOR, e);
            }
        }

        if Instant::now() + config.sync_poll_interval > deadline {
            return Err(WorkshopError::SyncTimeout {
                operator: AUTHENTICATION_OPERATOR.to_string(),
                waited: started.elapsed(),
            });
        }

        sleep(config.sync_poll_interval).await;
    }
}
