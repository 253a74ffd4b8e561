//! License gate for JavaScript builds.
//!
//! A [`gate::Gate`] resolves one license per dependency (override file, then the
//! first declared license, then `"none"`), checks it against an allow-list or
//! deny-list [`policy::Policy`], and either fails with every violating
//! dependency listed or writes a third-party license report.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod gate;
pub mod license;
pub mod models;
pub mod overrides;
pub mod policy;
pub mod report;
