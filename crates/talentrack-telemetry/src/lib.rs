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

//! Logging setup and span context helpers for the `TalenTrack` native tools.
//!
//! Layout: init.rs (subscriber installation), context.rs (app and request spans).

pub mod context;
pub mod init;

pub use context::{GlobalContextGuard, current_request_id, with_request_context};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
