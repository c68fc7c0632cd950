//! Auth client context.
//!
//! # Design
//! - Create exactly one auth client per app boot so every view shares the
//!   same session repository and renewal lock.

use std::rc::Rc;

use talentrack_auth::AuthClient;

use crate::services::FetchTransport;

/// Shared auth client for components.
#[derive(Clone)]
pub(crate) struct AuthCtx {
    pub(crate) client: Rc<AuthClient<FetchTransport>>,
}

impl AuthCtx {
    pub(crate) fn new(client: AuthClient<FetchTransport>) -> Self {
        Self {
            client: Rc::new(client),
        }
    }
}

impl PartialEq for AuthCtx {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.client, &other.client)
    }
}
