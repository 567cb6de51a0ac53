//! Common types, traits and errors shared across the bot

pub mod channels;
pub mod errors;
pub mod traits;
pub mod types;
