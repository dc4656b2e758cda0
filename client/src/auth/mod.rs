//! Authentication state
//!
//! Sign-in itself happens outside this crate; only the resulting identity and
//! token are held here.

mod context;

pub use context::{AuthSession, SessionContext};
