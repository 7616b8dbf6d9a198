//! Account reconciliation service
//!
//! Produces one deduplicated view of connected accounts from the local cache and the
//! remote table, and migrates provisional (local) records into remote storage once a
//! session exists.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{
    is_local_id, normalize_username, username_key, Account, AccountStats, ConnectAccountRequest,
    NewRemoteAccount, Platform, Session, SyncFailure, SyncReport,
};

/// Account reconciliation service
pub struct ReconciliationService {
    ctx: Arc<ServiceContext>,
    /// Serializes remote writes that depend on a prior duplicate lookup
    /// (authenticated connect and whole migration runs).
    remote_write_lock: Mutex<()>,
}

impl ReconciliationService {
    /// Create a reconciliation service instance
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            ctx,
            remote_write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn context(&self) -> &Arc<ServiceContext> {
        &self.ctx
    }

    // ===== Read operations =====

    /// List connected accounts
    ///
    /// Anonymous callers see the local cache only. With a session the result is the
    /// remote accounts followed by local accounts that have no remote counterpart.
    /// Read-only: migration is a separate call to [`Self::sync_local_to_remote`].
    pub async fn list_accounts(&self, session: Option<&Session>) -> CoreResult<Vec<Account>> {
        let Some(session) = session else {
            return self.ctx.local_cache().load().await;
        };

        let remote = self
            .ctx
            .remote_repository()
            .find_by_user(&session.user_id)
            .await?;
        let local = self.ctx.local_cache().load().await?;

        Ok(merge_accounts(remote, local))
    }

    /// Get an account from the reconciled view
    pub async fn get_account(
        &self,
        session: Option<&Session>,
        account_id: &str,
    ) -> CoreResult<Option<Account>> {
        Ok(self
            .list_accounts(session)
            .await?
            .into_iter()
            .find(|a| a.id == account_id))
    }

    // ===== Life cycle operations =====

    /// Connect an account
    ///
    /// Without a session the account is staged in the local cache and remote storage is
    /// not contacted. With a session it is inserted remotely unless an active account
    /// with the same platform/username already exists.
    pub async fn connect_account(
        &self,
        session: Option<&Session>,
        request: ConnectAccountRequest,
    ) -> CoreResult<Account> {
        let platform = Platform::normalize(&request.platform)?;
        let username = normalize_username(&request.username)?;

        match session {
            None => {
                let account = Account::new_local(platform, username, request.metadata);
                let account = self.ctx.local_cache().add(account).await?;
                log::info!(
                    "Staged {platform} account @{} locally as {}",
                    account.username,
                    account.id
                );
                Ok(account)
            }
            Some(session) => {
                let _guard = self.remote_write_lock.lock().await;
                self.connect_remote(
                    session,
                    NewRemoteAccount {
                        platform,
                        username,
                        metadata: request.metadata,
                        created_at: Utc::now(),
                    },
                )
                .await
            }
        }
    }

    /// Disconnect an account
    ///
    /// Local ids are removed from the cache (absent ids succeed). Remote ids need a
    /// session; the remote row is deleted and the id is always also removed from the
    /// local cache to clean up after an interrupted migration, even when the remote
    /// delete fails.
    pub async fn disconnect_account(
        &self,
        session: Option<&Session>,
        account_id: &str,
        platform: Platform,
    ) -> CoreResult<()> {
        if is_local_id(account_id) {
            if !self.ctx.local_cache().remove(account_id).await? {
                log::debug!("Local account {account_id} already absent");
            }
            log::info!("Disconnected local {platform} account {account_id}");
            return Ok(());
        }

        let Some(session) = session else {
            log::warn!("Refusing to disconnect remote {platform} account {account_id} without a session");
            return Err(CoreError::AuthRequired);
        };

        let deleted = self
            .ctx
            .remote_repository()
            .delete(&session.user_id, account_id)
            .await;

        match self.ctx.local_cache().remove(account_id).await {
            Ok(true) => log::info!("Removed stale local copy of {account_id}"),
            Ok(false) => {}
            Err(e) => log::warn!("Failed to remove local copy of {account_id}: {e}"),
        }

        if let Err(e) = deleted {
            log::warn!("Failed to delete remote {platform} account {account_id}: {e}");
            return Err(e);
        }

        log::info!("Disconnected {platform} account {account_id}");
        Ok(())
    }

    /// Migrate local accounts to remote storage
    ///
    /// Records are processed in cache order. Each one is removed from the cache as soon
    /// as its remote insert is confirmed (or found to exist already), so an interrupted
    /// run never loses un-migrated records and never leaves migrated ones behind for
    /// longer than one record. Records whose insert fails stay in the cache.
    ///
    /// Runs are serialized: a run started while another is in progress waits for it
    /// and then only sees the records that are still pending.
    pub async fn sync_local_to_remote(&self, session: Option<&Session>) -> CoreResult<SyncReport> {
        let mut report = SyncReport::default();
        let Some(session) = session else {
            return Ok(report);
        };
        let _guard = self.remote_write_lock.lock().await;

        let pending = self.ctx.local_cache().load().await?;
        if pending.is_empty() {
            return Ok(report);
        }
        log::info!(
            "Migrating {} local account(s) for user {}",
            pending.len(),
            session.user_id
        );

        for account in pending {
            let result = match normalize_username(&account.username) {
                Ok(username) => {
                    self.connect_remote(
                        session,
                        NewRemoteAccount {
                            platform: account.platform,
                            username,
                            metadata: account.metadata(),
                            created_at: account.created_at,
                        },
                    )
                    .await
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(remote) => {
                    log::info!("Migrated {} to remote account {}", account.id, remote.id);
                    report.migrated += 1;
                    self.drop_local(&account.id).await;
                }
                Err(CoreError::DuplicateAccount { .. }) => {
                    log::info!(
                        "{} already exists remotely as {}/{}, dropping local copy",
                        account.id,
                        account.platform,
                        account.username
                    );
                    report.duplicates += 1;
                    self.drop_local(&account.id).await;
                }
                Err(e) => {
                    if e.is_expected() {
                        log::warn!("Failed to migrate {}: {e}", account.id);
                    } else {
                        log::error!("Failed to migrate {}: {e}", account.id);
                    }
                    report.failures.push(SyncFailure {
                        local_id: account.id,
                        platform: account.platform,
                        username: account.username,
                        reason: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "Local account migration complete: {} migrated, {} duplicates, {} failed",
            report.migrated,
            report.duplicates,
            report.failed_count()
        );
        Ok(report)
    }

    /// Refresh the advisory counters of an account
    pub async fn update_stats(
        &self,
        session: Option<&Session>,
        account_id: &str,
        stats: &AccountStats,
    ) -> CoreResult<Account> {
        let updated = if is_local_id(account_id) {
            self.ctx.local_cache().update_stats(account_id, stats).await?
        } else {
            let session = session.ok_or(CoreError::AuthRequired)?;
            self.ctx
                .remote_repository()
                .update_stats(&session.user_id, account_id, stats)
                .await?
        };
        updated.ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))
    }

    /// Ask the host to refresh the platform token of a remote account
    pub async fn refresh_account_token(
        &self,
        session: Option<&Session>,
        account_id: &str,
    ) -> CoreResult<()> {
        let session = session.ok_or(CoreError::AuthRequired)?;
        if is_local_id(account_id) {
            return Err(CoreError::Validation(
                "local accounts have no platform token".to_string(),
            ));
        }

        let Some(refresher) = self.ctx.token_refresher() else {
            log::warn!("No token refresher configured, skipping refresh of {account_id}");
            return Ok(());
        };

        let account = self
            .ctx
            .remote_repository()
            .find_by_id(&session.user_id, account_id)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))?;

        refresher.refresh(session, &account).await
    }

    // ===== Internal helpers =====

    async fn connect_remote(
        &self,
        session: &Session,
        account: NewRemoteAccount,
    ) -> CoreResult<Account> {
        let repo = self.ctx.remote_repository();

        if let Some(existing) = repo
            .find_active(
                &session.user_id,
                account.platform,
                &username_key(&account.username),
            )
            .await?
        {
            log::warn!(
                "Active {} account @{} already connected as {}",
                existing.platform,
                existing.username,
                existing.id
            );
            return Err(CoreError::DuplicateAccount {
                platform: existing.platform,
                username: existing.username,
            });
        }

        let created = repo.insert(&session.user_id, account).await?;
        log::info!(
            "Connected {} account @{} as {}",
            created.platform,
            created.username,
            created.id
        );
        Ok(created)
    }

    /// Remove a migrated record. A failure only delays cleanup: the next sync sees the
    /// remote copy and drops it as a duplicate.
    async fn drop_local(&self, local_id: &str) {
        if let Err(e) = self.ctx.local_cache().remove(local_id).await {
            log::warn!("Failed to remove migrated local account {local_id}: {e}");
        }
    }
}

/// Remote accounts first, then local accounts whose platform/username is not already
/// present. Among local duplicates the first one wins.
fn merge_accounts(remote: Vec<Account>, local: Vec<Account>) -> Vec<Account> {
    let mut seen: HashSet<(Platform, String)> = remote.iter().map(Account::dedup_key).collect();
    let mut merged = remote;
    merged.extend(local.into_iter().filter(|a| seen.insert(a.dedup_key())));
    merged
}
