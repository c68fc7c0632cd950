#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Session core for the `TalenTrack` dashboard: credential storage, token
//! renewal, the resilient request dispatcher and the role-based route guard.
//!
//! Layout:
//! - `storage.rs` / `repository.rs`: storage scopes and the session lifecycle
//! - `credentials.rs` / `context.rs`: typed views over persisted session state
//! - `transport.rs`: transport-neutral request/response types (+ reqwest impl)
//! - `renewer.rs` / `dispatcher.rs`: renew-once and retry-once request path
//! - `guard.rs` / `routes.rs`: navigation gating and the route declarations
//! - `session.rs`: login, display name and logout
//! - `client.rs`: one-per-boot wiring of the components above
//! - `config.rs` / `error.rs`: configuration and error types

pub mod client;
pub mod config;
pub mod context;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod guard;
pub mod renewer;
pub mod repository;
pub mod routes;
pub mod session;
pub mod storage;
pub mod transport;

pub use client::AuthClient;
pub use config::{ClientConfig, RenewalMode};
pub use context::{SessionContext, SessionContextReader};
pub use credentials::{CredentialPair, CredentialStore};
pub use dispatcher::{Dispatcher, RequestOptions};
pub use error::{ConfigError, LoginError, StorageError, TransportError};
pub use guard::{AllowList, GuardDecision, RedirectReason, RouteGuard};
pub use renewer::{RenewalFailure, RenewalOutcome, TokenRenewer};
pub use repository::{SessionRepository, SessionSeed};
pub use routes::{RouteAccess, RouteMatch, RouteTable};
pub use session::{LoginOutcome, LoginRequest, SessionService};
pub use storage::{MemoryScope, ScopeKind, StorageScope};
#[cfg(not(target_arch = "wasm32"))]
pub use transport::ReqwestTransport;
pub use transport::{ApiRequest, ApiResponse, Headers, HttpMethod, HttpTransport};
