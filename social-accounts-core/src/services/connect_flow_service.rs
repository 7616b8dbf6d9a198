//! Interactive connection flow service
//!
//! Wraps an external [`AuthenticationFlow`] with a bounded wait, then hands the
//! authorized profile to [`ReconciliationService::connect_account`].

use std::sync::Arc;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::traits::AuthenticationFlow;
use crate::types::{Account, ConnectAccountRequest, Platform, Session};

use super::ReconciliationService;

/// Interactive connection flow service
pub struct ConnectFlowService {
    reconciliation: Arc<ReconciliationService>,
    timeout: Duration,
}

impl ConnectFlowService {
    /// Create a flow service using the configured connect timeout
    #[must_use]
    pub fn new(reconciliation: Arc<ReconciliationService>) -> Self {
        let timeout = reconciliation.context().config().connect_timeout();
        Self {
            reconciliation,
            timeout,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `flow` for `platform` and connect the resulting profile
    ///
    /// The flow's secondary surface is closed once waiting ends, including on timeout.
    pub async fn connect_with_flow(
        &self,
        session: Option<&Session>,
        platform: Platform,
        flow: &dyn AuthenticationFlow,
    ) -> CoreResult<Account> {
        log::info!("Starting {platform} authentication flow");

        let outcome = tokio::time::timeout(self.timeout, flow.authorize(platform)).await;
        flow.close().await;

        let profile = match outcome {
            Ok(Ok(profile)) => profile,
            Ok(Err(e)) => {
                log::warn!("{platform} authentication flow failed: {e}");
                return Err(e);
            }
            Err(_) => {
                log::warn!(
                    "{platform} authentication flow timed out after {}s",
                    self.timeout.as_secs()
                );
                return Err(CoreError::Timeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        self.reconciliation
            .connect_account(
                session,
                ConnectAccountRequest {
                    platform: platform.as_str().to_string(),
                    username: profile.username,
                    metadata: profile.metadata,
                },
            )
            .await
    }
}
