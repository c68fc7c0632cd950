//! Command handlers.

pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod request;
pub(crate) mod route;
pub(crate) mod whoami;
