//! License string handling shared by the policy check and the reports.
//!
//! - [`expression`] — SPDX expression parsing (`OR` / `AND` / `WITH`, parentheses).
//! - [`spdx`] — legacy-spelling normalization and per-identifier risk lookup.
//! - [`classifier`] — risk classification of a whole resolved license string.

pub mod classifier;
pub mod expression;
pub mod spdx;
