//! Loopback listener that waits for the authorization server to redirect the
//! user's browser back with a code.

mod http;
mod server;
mod target;

pub use server::LocalServer;
