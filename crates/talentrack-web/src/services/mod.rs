//! Browser implementations of the session core's capabilities.

pub mod storage;
pub mod transport;

pub use storage::BrowserScope;
pub use transport::FetchTransport;
