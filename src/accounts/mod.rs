//! User accounts
//!
//! Profiles, vote history visibility and session token resolution.

pub mod profile;
pub mod session;

pub use profile::ProfileService;
pub use session::{SessionAuthenticator, StaticSessionAuthenticator};
