//! PeakPartner Client Library
//!
//! Runtime side of the coaching core: the resilient request layer, the
//! explicit session context, typed REST services and the dashboard
//! orchestrator. The pure rules live in `peak_partner_shared`.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod services;
