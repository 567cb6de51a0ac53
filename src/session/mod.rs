//! Session module - one independent tick loop per traded symbol
//!
//! [`SessionRegistry`] creates, inspects and stops sessions. Each session is
//! driven by a [`SessionWorker`] on its own task that fetches a price,
//! applies the strategy, records trades and reports every outcome.

pub mod registry;
pub mod worker;

pub use registry::{SessionRegistry, SessionSettings};
pub use worker::{SessionWorker, TickOutcome};
