//! midan-core library.
//!
//! The state, filter and routing engine behind Midan: events users form
//! teams around, the one-team-per-event membership rules, reactions, invite
//! attribution, and the view-models a host renders.
//!
//! # Conventions
//!
//! - **Errors**: domain failures are [`error::MidanError`]; I/O-facing code
//!   returns `anyhow::Result` or [`error::StorageError`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Time**: every time-dependent function takes `now` explicitly.

pub mod app;
pub mod chat;
pub mod config;
pub mod error;
pub mod filter;
pub mod invites;
pub mod membership;
pub mod model;
pub mod reactions;
pub mod router;
pub mod seed;
pub mod storage;
pub mod view;
pub mod wallet;

pub use app::AppState;
pub use error::{ErrorCode, MidanError};
