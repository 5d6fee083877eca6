//! Web API module.
//!
//! Serves the runtime config that clients read at session start, plus the
//! access password check.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use router::create_router;
pub use server::WebServer;
