//! Wiring for one client instance.
//!
//! # Design
//! - Create exactly one client per app boot; every component shares the same
//!   repository, so scope decisions and credential updates are seen everywhere.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::context::SessionContextReader;
use crate::dispatcher::Dispatcher;
use crate::guard::RouteGuard;
use crate::repository::SessionRepository;
use crate::session::SessionService;
use crate::storage::StorageScope;
use crate::transport::HttpTransport;

/// Dispatcher, session service and guard over one shared repository.
pub struct AuthClient<T> {
    repository: Arc<SessionRepository>,
    dispatcher: Dispatcher<T>,
    session: SessionService<T>,
    guard: RouteGuard,
}

impl<T: HttpTransport> AuthClient<T> {
    /// Wire every component over the two scopes.
    #[must_use]
    pub fn new(
        transport: Arc<T>,
        durable: Arc<dyn StorageScope>,
        ephemeral: Arc<dyn StorageScope>,
        config: ClientConfig,
    ) -> Self {
        let repository = Arc::new(SessionRepository::new(durable, ephemeral));
        Self::with_repository(transport, repository, config)
    }

    /// Wire every component over an existing repository.
    #[must_use]
    pub fn with_repository(
        transport: Arc<T>,
        repository: Arc<SessionRepository>,
        config: ClientConfig,
    ) -> Self {
        let session = SessionService::new(Arc::clone(&transport), Arc::clone(&repository), &config);
        let guard = RouteGuard::new(
            SessionContextReader::new(Arc::clone(&repository)),
            config.login_route.clone(),
        );
        let dispatcher = Dispatcher::new(transport, Arc::clone(&repository), config);
        Self {
            repository,
            dispatcher,
            session,
            guard,
        }
    }

    /// Shared session repository.
    #[must_use]
    pub const fn repository(&self) -> &Arc<SessionRepository> {
        &self.repository
    }

    /// Request dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    /// Login, display name and logout.
    #[must_use]
    pub const fn session(&self) -> &SessionService<T> {
        &self.session
    }

    /// Navigation guard.
    #[must_use]
    pub const fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Reader over the current session context.
    #[must_use]
    pub fn context_reader(&self) -> SessionContextReader {
        SessionContextReader::new(Arc::clone(&self.repository))
    }
}
