//! # Form
//!
//! Shared vocabulary of the submission relay.
//!
//! Three tiers speak about the same person record: the client that collects
//! the form, the relay that validates and dispatches it, and the vault that
//! persists it. All three link this crate so the rules for what a valid
//! submission looks like live in exactly one place.
//!
//! ## Contents
//!
//! - [`action`]: the closed set of logical actions and the operation each one maps to
//! - [`models`]: raw form input, the validated submission and the payload forwarded to the vault
//! - [`validate`]: field rules (name, mobile, dob, action) and age derivation
//! - [`env`]: environment and docker-secret lookups behind each service's `Config`
//! - [`server`]: tracing setup and shutdown handling used by both services
//!
//! ## Flow
//!
//! ```text
//! client --(FormInput)--> relay --(RecordPayload)--> vault --> store
//! ```
//!
//! The relay never forwards anything that failed [`validate::validate`]. The vault
//! re-checks presence and parses the fields again on its own side.
pub mod action;
pub mod env;
pub mod models;
pub mod server;
pub mod validate;

pub use action::{Action, Operation};
pub use models::{FormInput, RecordPayload, Submission};
pub use validate::{ValidationError, age_on, validate};
