//! Auth session provider abstract Trait

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::types::{Session, SessionEvent};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Auth Session Provider Trait
///
/// Supplies the current identity and publishes login/logout transitions. Hosts use
/// the `LoggedIn` event to trigger local-to-remote migration.
#[async_trait]
pub trait AuthSessionProvider: Send + Sync {
    /// Current session, `None` when anonymous
    async fn current_session(&self) -> Option<Session>;

    /// Subscribe to session transitions
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

/// In-memory session provider
///
/// Default implementation for hosts that track the session themselves and push
/// changes in through [`InMemorySessionProvider::login`] / [`InMemorySessionProvider::logout`].
#[derive(Clone)]
pub struct InMemorySessionProvider {
    session: Arc<RwLock<Option<Session>>>,
    events: broadcast::Sender<SessionEvent>,
}

impl InMemorySessionProvider {
    /// Create an anonymous provider
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            session: Arc::new(RwLock::new(None)),
            events,
        }
    }

    /// Set the session and publish `LoggedIn`
    pub async fn login(&self, session: Session) {
        *self.session.write().await = Some(session.clone());
        // No subscribers is fine: the event is simply dropped.
        let _ = self.events.send(SessionEvent::LoggedIn(session));
    }

    /// Clear the session and publish `LoggedOut`
    pub async fn logout(&self) {
        *self.session.write().await = None;
        let _ = self.events.send(SessionEvent::LoggedOut);
    }
}

impl Default for InMemorySessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthSessionProvider for InMemorySessionProvider {
    async fn current_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
