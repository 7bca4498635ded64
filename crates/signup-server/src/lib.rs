//! Signup service - HTTP surface for the registration flow.
//!
//! Each client opens a session, streams raw field edits (digit-only fields
//! are sanitized as they arrive) and submits; account creation is
//! delegated to the configured account provider. Sessions that are never
//! finished expire and are swept in the background.

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod sweeper;

pub use config::Config;
pub use error::ServiceError;
pub use session::{SessionRegistry, SignupSession};
