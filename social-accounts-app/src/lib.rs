//! Platform-agnostic application bootstrap for social account reconciliation.
//!
//! Provides `AppState` (service container bound to the current session),
//! `AppStateBuilder` (adapter injection) and session-transition handling that
//! migrates locally staged accounts once the user signs in.

pub mod adapters;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use social_accounts_core::error::{CoreError, CoreResult};
use social_accounts_core::notification::Notification;
use social_accounts_core::services::{ConnectFlowService, ReconciliationService, ServiceContext};
use social_accounts_core::traits::{
    AuthSessionProvider, AuthenticationFlow, LocalStore, NoopNotificationSink, NotificationSink,
    RemoteAccountRepository, TokenRefresher,
};
use social_accounts_core::types::{
    Account, AccountStats, ConnectAccountRequest, Platform, Session, SessionEvent, SyncReport,
};
use social_accounts_core::ReconcileConfig;

/// Platform-agnostic application state.
///
/// Every operation reads the current session from the injected provider and reports
/// its outcome to the notification sink. Frontends construct this once at startup
/// via `AppStateBuilder`.
pub struct AppState {
    /// Service context (holds all storage adapters)
    pub ctx: Arc<ServiceContext>,
    /// Reconciliation service
    pub reconciliation_service: Arc<ReconciliationService>,
    /// Interactive connect flow service
    pub connect_flow_service: ConnectFlowService,
    session_provider: Arc<dyn AuthSessionProvider>,
    notification_sink: Arc<dyn NotificationSink>,
    /// Whether the startup migration has run
    pub startup_sync_completed: AtomicBool,
}

impl AppState {
    /// Run the startup sequence: migrate local accounts if a session already exists.
    pub async fn run_startup(&self) {
        match self.current_session().await {
            Some(session) => {
                log::info!("Session present at startup, migrating local accounts");
                // Failures are already reported by run_sync
                let _ = self.run_sync(&session).await;
            }
            None => log::info!("No session at startup, local accounts stay staged"),
        }
        self.startup_sync_completed.store(true, Ordering::SeqCst);
    }

    /// Current session from the auth provider
    pub async fn current_session(&self) -> Option<Session> {
        self.session_provider.current_session().await
    }

    /// List the reconciled accounts for the current session.
    pub async fn list_accounts(&self) -> CoreResult<Vec<Account>> {
        let session = self.current_session().await;
        self.reconciliation_service
            .list_accounts(session.as_ref())
            .await
            .inspect_err(|e| self.report_error("list accounts", e))
    }

    /// Connect an account for the current session.
    pub async fn connect_account(&self, request: ConnectAccountRequest) -> CoreResult<Account> {
        let session = self.current_session().await;
        let account = self
            .reconciliation_service
            .connect_account(session.as_ref(), request)
            .await
            .inspect_err(|e| self.report_error("connect account", e))?;
        self.notification_sink
            .notify(Notification::connected(&account));
        Ok(account)
    }

    /// Connect an account through an interactive authentication flow.
    pub async fn connect_with_flow(
        &self,
        platform: Platform,
        flow: &dyn AuthenticationFlow,
    ) -> CoreResult<Account> {
        let session = self.current_session().await;
        let account = self
            .connect_flow_service
            .connect_with_flow(session.as_ref(), platform, flow)
            .await
            .inspect_err(|e| self.report_error("connect account", e))?;
        self.notification_sink
            .notify(Notification::connected(&account));
        Ok(account)
    }

    /// Disconnect an account for the current session.
    pub async fn disconnect_account(&self, account_id: &str, platform: Platform) -> CoreResult<()> {
        let session = self.current_session().await;
        self.reconciliation_service
            .disconnect_account(session.as_ref(), account_id, platform)
            .await
            .inspect_err(|e| self.report_error("disconnect account", e))?;
        self.notification_sink
            .notify(Notification::disconnected(platform));
        Ok(())
    }

    /// Store freshly fetched counters. Failures are logged only: the counters are advisory.
    pub async fn update_stats(&self, account_id: &str, stats: &AccountStats) -> CoreResult<Account> {
        let session = self.current_session().await;
        self.reconciliation_service
            .update_stats(session.as_ref(), account_id, stats)
            .await
            .inspect_err(|e| log::warn!("Failed to update stats for {account_id}: {e}"))
    }

    /// Ask the host token refresher to refresh an account's platform token.
    pub async fn refresh_account_token(&self, account_id: &str) -> CoreResult<()> {
        let session = self.current_session().await;
        self.reconciliation_service
            .refresh_account_token(session.as_ref(), account_id)
            .await
            .inspect_err(|e| self.report_error("refresh token", e))
    }

    /// Migrate local accounts now (e.g. a manual "retry sync" action).
    pub async fn sync_now(&self) -> CoreResult<SyncReport> {
        let Some(session) = self.current_session().await else {
            let err = CoreError::AuthRequired;
            self.report_error("sync accounts", &err);
            return Err(err);
        };
        self.run_sync(&session).await
    }

    /// React to a session transition.
    pub async fn handle_session_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::LoggedIn(session) => {
                log::info!("User {} signed in, migrating local accounts", session.user_id);
                let _ = self.run_sync(session).await;
            }
            SessionEvent::LoggedOut => {
                log::info!("User signed out, new accounts will be staged locally");
            }
        }
    }

    /// Handle session events from the provider until its channel closes.
    pub fn spawn_session_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.session_provider.subscribe();
        let state = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => state.handle_session_event(&event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("Session listener skipped {skipped} event(s), resyncing");
                        if let Some(session) = state.current_session().await {
                            let _ = state.run_sync(&session).await;
                        }
                    }
                    Err(RecvError::Closed) => {
                        log::debug!("Session event channel closed, listener exiting");
                        break;
                    }
                }
            }
        })
    }

    /// Migrate and notify. Errors are reported to the sink before being returned.
    async fn run_sync(&self, session: &Session) -> CoreResult<SyncReport> {
        let report = self
            .reconciliation_service
            .sync_local_to_remote(Some(session))
            .await
            .inspect_err(|e| self.report_error("sync accounts", e))?;
        if let Some(notification) = Notification::sync_completed(&report) {
            self.notification_sink.notify(notification);
        }
        Ok(report)
    }

    fn report_error(&self, operation: &str, err: &CoreError) {
        if err.is_expected() {
            log::warn!("Failed to {operation}: {err}");
        } else {
            log::error!("Failed to {operation}: {err}");
        }
        self.notification_sink.notify(Notification::from_error(err));
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `local_store`: where provisional accounts are staged
/// - `remote_repository`: the user-scoped account table
/// - `session_provider`: current identity and login/logout events
///
/// # Optional
/// - `notification_sink`: defaults to `NoopNotificationSink`
/// - `token_refresher`: token refresh requests are skipped without one
/// - `config`: defaults to `ReconcileConfig::default()`
pub struct AppStateBuilder {
    local_store: Option<Arc<dyn LocalStore>>,
    remote_repository: Option<Arc<dyn RemoteAccountRepository>>,
    session_provider: Option<Arc<dyn AuthSessionProvider>>,
    notification_sink: Option<Arc<dyn NotificationSink>>,
    token_refresher: Option<Arc<dyn TokenRefresher>>,
    config: ReconcileConfig,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            local_store: None,
            remote_repository: None,
            session_provider: None,
            notification_sink: None,
            token_refresher: None,
            config: ReconcileConfig::default(),
        }
    }

    #[must_use]
    pub fn local_store(mut self, store: Arc<dyn LocalStore>) -> Self {
        self.local_store = Some(store);
        self
    }

    #[must_use]
    pub fn remote_repository(mut self, repo: Arc<dyn RemoteAccountRepository>) -> Self {
        self.remote_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn session_provider(mut self, provider: Arc<dyn AuthSessionProvider>) -> Self {
        self.session_provider = Some(provider);
        self
    }

    #[must_use]
    pub fn notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    #[must_use]
    pub fn token_refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.token_refresher = Some(refresher);
        self
    }

    #[must_use]
    pub fn config(mut self, config: ReconcileConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::Validation` if required adapters are missing or the
    /// configuration is invalid.
    pub fn build(self) -> CoreResult<AppState> {
        let local_store = self
            .local_store
            .ok_or_else(|| CoreError::Validation("local_store is required".to_string()))?;
        let remote_repository = self.remote_repository.ok_or_else(|| {
            CoreError::Validation("remote_repository is required".to_string())
        })?;
        let session_provider = self.session_provider.ok_or_else(|| {
            CoreError::Validation("session_provider is required".to_string())
        })?;
        let notification_sink = self
            .notification_sink
            .unwrap_or_else(|| Arc::new(NoopNotificationSink));
        self.config.validate()?;

        let mut ctx = ServiceContext::new(local_store, remote_repository, self.config);
        if let Some(refresher) = self.token_refresher {
            ctx = ctx.with_token_refresher(refresher);
        }
        let ctx = Arc::new(ctx);

        let reconciliation_service = Arc::new(ReconciliationService::new(Arc::clone(&ctx)));
        let connect_flow_service = ConnectFlowService::new(Arc::clone(&reconciliation_service));

        Ok(AppState {
            ctx,
            reconciliation_service,
            connect_flow_service,
            session_provider,
            notification_sink,
            startup_sync_completed: AtomicBool::new(false),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
